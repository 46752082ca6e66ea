//! Source-tree contract and canonical naming.
//!
//! The loader never talks to a concrete filesystem. It consumes the small
//! capability set defined here - [`Node`], [`Dir`] and [`File`] - so backends
//! can be disk-backed ([`disk::DiskDir`]), in-memory ([`memory::MemoryTree`]),
//! or anything else that can enumerate named, parentable nodes.
//!
//! # Canonical names
//!
//! Every node has a canonical, path-like name derived from its position in
//! the tree: ancestor local names concatenated root-to-leaf, each directory
//! segment terminated by `/`, the leaf segment unterminated. The unnamed root
//! contributes nothing. A file `index.html` directly under a directory
//! `layout` is therefore named `layout/index.html`, and that string is also
//! what alias tables point at.
//!
//! Two distinct leaves that derive the same canonical name are
//! indistinguishable to the collection built on top: last write wins.

pub mod disk;
pub mod memory;

use std::io;

/// A named node inside a source tree.
///
/// Parent handles are traversal aids for name derivation, never owning
/// references into the backend's storage. Parent chains are assumed finite; a
/// cyclic parent graph is the backend's bug, not a condition this crate
/// detects.
pub trait Node {
    /// Local name of the node. Leaves always have a non-empty name; the
    /// logical root directory reports an empty name.
    fn name(&self) -> String;

    /// Directory or leaf discriminator.
    fn is_dir(&self) -> bool;

    /// Parent lookup. `None` only for the root.
    fn parent(&self) -> Option<Box<dyn Dir>>;
}

/// A directory node: enumerates its direct children.
///
/// Enumeration order is whatever the backend provides; the loader imposes
/// only files-before-subdirectories per level, not an order within either
/// list.
pub trait Dir: Node {
    /// Direct file children.
    fn read_files(&self) -> io::Result<Vec<Box<dyn File>>>;

    /// Direct subdirectory children.
    fn read_dirs(&self) -> io::Result<Vec<Box<dyn Dir>>>;
}

/// A leaf node holding raw byte content.
pub trait File: Node {
    /// Full content of the leaf.
    fn contents(&self) -> io::Result<Vec<u8>>;
}

/// Derive the canonical name for a node by walking its parent chain.
///
/// Total: there is no error path, only traversal.
///
/// # Examples
///
/// ```
/// use viewset::{MemoryTree, canonical_name};
/// use viewset::vfs::Dir;
///
/// let mut tree = MemoryTree::new();
/// tree.insert("layout/index.html", "x");
/// let root = tree.into_root();
///
/// let dirs = root.read_dirs().unwrap();
/// let files = dirs[0].read_files().unwrap();
/// assert_eq!(canonical_name(files[0].as_ref()), "layout/index.html");
/// assert_eq!(canonical_name(dirs[0].as_ref()), "layout/");
/// ```
pub fn canonical_name(node: &dyn Node) -> String {
    let mut segments = Vec::new();
    let local = node.name();
    if node.is_dir() {
        if !local.is_empty() {
            segments.push(format!("{local}/"));
        }
    } else {
        segments.push(local);
    }

    let mut parent = node.parent();
    while let Some(dir) = parent {
        let local = dir.name();
        if !local.is_empty() {
            segments.push(format!("{local}/"));
        }
        parent = dir.parent();
    }

    segments.reverse();
    segments.concat()
}

/// Node predicate applied by the loader to both files and directories.
///
/// Rejecting a directory prunes its entire subtree, regardless of whether
/// individual descendants would have been accepted.
pub trait Filter {
    fn accepts(&self, node: &dyn Node) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&dyn Node) -> bool,
{
    fn accepts(&self, node: &dyn Node) -> bool {
        self(node)
    }
}

/// Stock filter: every directory, plus any file with one of the extensions
/// the delimiter table recognizes (`.html`, `.js`, `.json`, `.css`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateExtensions;

impl Filter for TemplateExtensions {
    fn accepts(&self, node: &dyn Node) -> bool {
        if node.is_dir() {
            return true;
        }
        let name = node.name();
        [".html", ".js", ".json", ".css"].iter().any(|ext| name.ends_with(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryTree;
    use super::*;

    fn sample_root() -> Box<dyn Dir> {
        let mut tree = MemoryTree::new();
        tree.insert("index.html", "root index");
        tree.insert("layout/index.html", "layout index");
        tree.insert("layout/partials/nav.html", "nav");
        Box::new(tree.into_root())
    }

    #[test]
    fn canonical_name_walks_to_the_unnamed_root() {
        let root = sample_root();
        assert_eq!(canonical_name(root.as_ref()), "");

        let files = root.read_files().unwrap();
        assert_eq!(canonical_name(files[0].as_ref()), "index.html");

        let dirs = root.read_dirs().unwrap();
        let layout = &dirs[0];
        assert_eq!(canonical_name(layout.as_ref()), "layout/");

        let files = layout.read_files().unwrap();
        assert_eq!(canonical_name(files[0].as_ref()), "layout/index.html");

        let partials = layout.read_dirs().unwrap();
        let navs = partials[0].read_files().unwrap();
        assert_eq!(canonical_name(navs[0].as_ref()), "layout/partials/nav.html");
    }

    #[test]
    fn template_extensions_accept_known_suffixes() {
        let root = sample_root();
        let filter = TemplateExtensions;
        assert!(filter.accepts(root.as_ref()));

        let mut tree = MemoryTree::new();
        tree.insert("app.js", "x");
        tree.insert("style.css", "x");
        tree.insert("data.json", "x");
        tree.insert("notes.txt", "x");
        let root = tree.into_root();

        let accepted: Vec<String> = root
            .read_files()
            .unwrap()
            .iter()
            .filter(|f| filter.accepts(f.as_ref()))
            .map(|f| f.name())
            .collect();
        assert_eq!(accepted, ["app.js", "data.json", "style.css"]);
    }

    #[test]
    fn closures_are_filters() {
        let hide_underscored = |node: &dyn Node| !node.name().starts_with('_');
        let mut tree = MemoryTree::new();
        tree.insert("_draft.html", "x");
        tree.insert("page.html", "x");
        let root = tree.into_root();

        let files = root.read_files().unwrap();
        assert!(!hide_underscored.accepts(files[0].as_ref()));
        assert!(hide_underscored.accepts(files[1].as_ref()));
    }
}
