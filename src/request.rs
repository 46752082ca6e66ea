//! Per-request view configuration.
//!
//! A [`ViewContext`] is built once per request and threaded explicitly
//! through handler code; it carries the choices rendering needs - which view
//! fills the `contents` slot, which layout answers to `main`, any extra alias
//! overrides, and a pending redirect if the handler bailed out of rendering
//! entirely. There is no ambient per-request storage: whoever renders holds
//! the value.
//!
//! [`ViewContext::render`] completes the alias table with the request's
//! defaults and executes the `main` slot, so a typical handler only sets a
//! view name and some data:
//!
//! ```
//! use viewset::{Context, FunctionTable, MemoryTree, TreeSet, ViewContext};
//!
//! # fn main() -> viewset::Result<()> {
//! let mut tree = MemoryTree::new();
//! tree.insert("index/index.html", "hello {{ who }}");
//! tree.insert("layout/main.html", "<body>{{ include \"contents\" }}</body>");
//! let set = TreeSet::load(&tree.into_root(), FunctionTable::new(), None)?;
//!
//! let mut data = Context::new();
//! data.insert("who", "world");
//!
//! let mut out = Vec::new();
//! ViewContext::new().render(&set, &data, &mut out)?;
//! assert_eq!(out, b"<body>hello world</body>");
//! # Ok(())
//! # }
//! ```

use std::io;

use tera::Context;

use crate::assemble::{AliasTable, SLOT_CONTENTS, SLOT_MAIN};
use crate::error::Result;
use crate::treeset::TreeSet;

/// View rendered when the handler sets nothing else.
pub const DEFAULT_VIEW: &str = "index/index.html";

/// Layout rendered when the handler sets nothing else.
pub const DEFAULT_LAYOUT: &str = "layout/main.html";

/// Explicit, per-request rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewContext {
    view: String,
    layout: String,
    aliases: AliasTable,
    redirect: Option<String>,
}

impl Default for ViewContext {
    fn default() -> Self {
        Self {
            view: DEFAULT_VIEW.to_string(),
            layout: DEFAULT_LAYOUT.to_string(),
            aliases: AliasTable::new(),
            redirect: None,
        }
    }
}

impl ViewContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the view that fills the `contents` slot.
    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn set_view(&mut self, name: impl Into<String>) -> &mut Self {
        self.view = name.into();
        self
    }

    /// Name of the layout that answers to the `main` slot. The layout pulls
    /// the view in with `{{ include "contents" }}`.
    pub fn layout(&self) -> &str {
        &self.layout
    }

    pub fn set_layout(&mut self, name: impl Into<String>) -> &mut Self {
        self.layout = name.into();
        self
    }

    /// Explicit alias overrides. Slots set here win over the request's
    /// view/layout defaults.
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn set_alias(&mut self, slot: impl Into<String>, target: impl Into<String>) -> &mut Self {
        self.aliases.set(slot, target);
        self
    }

    /// Record a redirect instead of a view. Rendering is skipped by the
    /// transport layer, not by this crate: callers check
    /// [`ViewContext::redirect`] before calling [`ViewContext::render`].
    pub fn redirect_to(&mut self, location: impl Into<String>) -> &mut Self {
        self.redirect = Some(location.into());
        self
    }

    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    pub fn take_redirect(&mut self) -> Option<String> {
        self.redirect.take()
    }

    /// Alias table actually used for assembly: the explicit overrides, with
    /// `main` defaulted to the layout and `contents` to the view wherever the
    /// caller left them unset.
    pub fn resolved_aliases(&self) -> AliasTable {
        let mut aliases = self.aliases.clone();
        if !aliases.contains(SLOT_MAIN) {
            aliases.set(SLOT_MAIN, self.layout.clone());
        }
        if !aliases.contains(SLOT_CONTENTS) {
            aliases.set(SLOT_CONTENTS, self.view.clone());
        }
        aliases
    }

    /// Assemble `set` with this request's aliases and execute the `main`
    /// slot against `data`, streaming output to `sink`.
    pub fn render<W: io::Write>(&self, set: &TreeSet, data: &Context, sink: W) -> Result<()> {
        let executable = set.assemble(&self.resolved_aliases())?;
        executable.execute(SLOT_MAIN, data, sink)
    }
}
