//! Error handling for viewset.
//!
//! Every failure the crate can produce is a variant of [`ViewError`], so
//! callers can match precisely on the failure kind. The taxonomy follows the
//! load/assemble/execute pipeline:
//!
//! - [`ViewError::Read`] - the source tree could not be listed or a leaf's
//!   content could not be retrieved; the backend error is preserved unchanged.
//! - [`ViewError::Encoding`] - a leaf's content is not valid UTF-8.
//! - [`ViewError::Parse`] - template syntax error, caught at load time.
//! - [`ViewError::Bind`] - the engine rejected a name binding during assembly.
//! - [`ViewError::TemplateNotFound`] - the requested entry point does not
//!   exist in the executable artifact.
//! - [`ViewError::Render`] - evaluation of a template body failed; partial
//!   output may already have been written to the sink.
//!
//! Loading and assembly are fail-fast: the first error aborts the whole
//! operation and no partial result is returned. Retrying means re-running the
//! operation from the start.
//!
//! HTTP-style callers usually map [`ViewError::TemplateNotFound`] to a 404 and
//! everything else to a 500; [`ViewError::is_not_found`] exists for exactly
//! that split.

use std::io;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ViewError>;

/// The error type for all viewset operations.
#[derive(Debug, Error)]
pub enum ViewError {
    /// Listing a directory or reading a leaf failed inside the source tree.
    ///
    /// `name` is the canonical name of the node that could not be read. The
    /// backend's error is carried as the source, untouched.
    #[error("failed to read `{name}` from the source tree")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A leaf's content is not valid UTF-8.
    #[error("template `{name}` is not valid UTF-8")]
    Encoding {
        name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// A leaf's content is not a valid template.
    #[error("failed to parse template `{name}`")]
    Parse {
        name: String,
        #[source]
        source: tera::Error,
    },

    /// The engine rejected binding a tree under `name` during assembly.
    #[error("failed to bind template `{name}`")]
    Bind {
        name: String,
        #[source]
        source: tera::Error,
    },

    /// The requested entry point is absent from the executable artifact.
    ///
    /// This is also what executing a dangling alias slot produces: aliases
    /// whose targets were missing at assembly are skipped, not bound.
    #[error("no template named `{name}`")]
    TemplateNotFound { name: String },

    /// Evaluating a template body failed (missing variable, bad data shape,
    /// a failing function, ...).
    ///
    /// Output already written to the sink before the failure is not rolled
    /// back.
    #[error("failed to render template `{name}`")]
    Render {
        name: String,
        #[source]
        source: tera::Error,
    },
}

impl ViewError {
    /// True for the not-found condition, the one failure HTTP callers
    /// typically map to a 404 instead of a 500.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TemplateNotFound { .. })
    }

    /// Canonical name of the template involved in the failure, when the
    /// variant carries one.
    pub fn template_name(&self) -> Option<&str> {
        match self {
            Self::Read { name, .. }
            | Self::Encoding { name, .. }
            | Self::Parse { name, .. }
            | Self::Bind { name, .. }
            | Self::TemplateNotFound { name }
            | Self::Render { name, .. } => Some(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_the_only_404_kind() {
        let err = ViewError::TemplateNotFound {
            name: "contents".into(),
        };
        assert!(err.is_not_found());

        let err = ViewError::Read {
            name: "layout/".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn errors_carry_the_offending_name() {
        let err = ViewError::Encoding {
            name: "layout/broken.html".into(),
            source: String::from_utf8(vec![0xff]).unwrap_err(),
        };
        assert_eq!(err.template_name(), Some("layout/broken.html"));
        assert!(err.to_string().contains("layout/broken.html"));
    }
}
