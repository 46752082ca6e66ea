//! viewset - server-side view composition.
//!
//! Loads text templates from a hierarchical source tree, compiles them into a
//! named collection, and re-assembles subsets of that collection into one
//! executable template per request, using an alias table to redirect
//! well-known slot names (`contents`, `main`) to concrete template names
//! chosen dynamically.
//!
//! # Pipeline
//!
//! Source tree → [`TreeSet`] loader → keyed collection of parsed entries →
//! [`TreeSet::assemble`] (per request, with that request's [`AliasTable`]) →
//! [`ExecutableTemplate`] → [`ExecutableTemplate::execute`].
//!
//! # Core Modules
//!
//! - [`vfs`] - the source-tree contract ([`vfs::Node`], [`vfs::Dir`],
//!   [`vfs::File`]), canonical naming, filters, and the disk and in-memory
//!   backends
//! - [`syntax`] - per-extension delimiter selection and normalization into
//!   the engine's dialect
//! - [`treeset`] - the recursive loader and the keyed collection it builds
//! - [`assemble`] - alias resolution and the render-ready artifact
//! - [`request`] - [`ViewContext`], the explicit per-request configuration
//!   value (view, layout, alias overrides, pending redirect)
//! - [`error`] - the [`ViewError`] taxonomy shared by all of the above
//!
//! # Naming convention
//!
//! Canonical names are derived from tree position, root-to-leaf: directory
//! segments end with `/`, leaf segments do not. A file `index.html` under a
//! directory `layout` is `layout/index.html`, and that exact string is what
//! alias tables point at.
//!
//! # Concurrency
//!
//! Nothing here is concurrent and nothing is shared mutably. Collections are
//! read-only once loaded; executables are read-only once assembled. Reload by
//! building a fresh collection and swapping references, and assemble a fresh
//! executable per request - assembly is cheap next to a filesystem load.
//!
//! # Example
//!
//! ```
//! use viewset::{AliasTable, Context, FunctionTable, MemoryTree, TreeSet};
//! use viewset::vfs::TemplateExtensions;
//!
//! # fn main() -> viewset::Result<()> {
//! let mut tree = MemoryTree::new();
//! tree.insert("index/index.html", "hello {{ who }}");
//! tree.insert("layout/main.html", "<body>{{ include \"contents\" }}</body>");
//! let root = tree.into_root();
//!
//! let set = TreeSet::load(&root, FunctionTable::new(), Some(&TemplateExtensions))?;
//!
//! let mut aliases = AliasTable::new();
//! aliases.set("contents", "index/index.html");
//! let executable = set.assemble(&aliases)?;
//!
//! let mut data = Context::new();
//! data.insert("who", "world");
//!
//! let mut out = Vec::new();
//! executable.execute("layout/main.html", &data, &mut out)?;
//! assert_eq!(out, b"<body>hello world</body>");
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod error;
pub mod request;
pub mod syntax;
pub mod treeset;
pub mod vfs;

pub use assemble::{AliasTable, ExecutableTemplate, SLOT_CONTENTS, SLOT_MAIN};
pub use error::{Result, ViewError};
pub use request::{DEFAULT_LAYOUT, DEFAULT_VIEW, ViewContext};
pub use treeset::{FunctionTable, TemplateEntry, TreeSet};
pub use vfs::disk::DiskDir;
pub use vfs::memory::{MemoryDir, MemoryTree};
pub use vfs::{Dir, File, Filter, Node, TemplateExtensions, canonical_name};

/// Render data, re-exported from the underlying engine.
pub use tera::Context;
