//! In-memory source tree.
//!
//! The backing store is one immutable map from `/`-separated paths to byte
//! content, shared behind an [`Arc`]. Directory and file handles are cheap
//! path views into that store, so parent lookups never hold owning
//! back-references - the same shape a disk backend gets from `(root, path)`
//! pairs, applied to a map.
//!
//! Built trees are frozen: populate a [`MemoryTree`], then call
//! [`MemoryTree::into_root`] and only hand out read-only handles. Reloading
//! means building a new tree.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::Arc;

use super::{Dir, File, Node};

/// Builder for an in-memory source tree.
///
/// # Examples
///
/// ```
/// use viewset::MemoryTree;
/// use viewset::vfs::Dir;
///
/// let mut tree = MemoryTree::new();
/// tree.insert("index/index.html", "hello");
/// tree.insert("layout/main.html", "[{{ include \"contents\" }}]");
/// let root = tree.into_root();
/// assert_eq!(root.read_dirs().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file at a `/`-separated path relative to the root.
    /// Intermediate directories exist implicitly. Inserting the same path
    /// twice keeps the later content.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> &mut Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    /// Freeze the tree and return a handle to its root directory.
    pub fn into_root(self) -> MemoryDir {
        MemoryDir {
            tree: Arc::new(self),
            path: String::new(),
        }
    }
}

/// Directory handle into a frozen [`MemoryTree`].
///
/// `path` is empty for the root and has no trailing slash otherwise.
#[derive(Debug, Clone)]
pub struct MemoryDir {
    tree: Arc<MemoryTree>,
    path: String,
}

/// File handle into a frozen [`MemoryTree`].
#[derive(Debug, Clone)]
pub struct MemoryFile {
    tree: Arc<MemoryTree>,
    path: String,
}

fn base_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or_default().to_string()
}

fn parent_path(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => String::new(),
    }
}

impl MemoryDir {
    fn child_prefix(&self) -> String {
        if self.path.is_empty() {
            String::new()
        } else {
            format!("{}/", self.path)
        }
    }
}

impl Node for MemoryDir {
    fn name(&self) -> String {
        base_name(&self.path)
    }

    fn is_dir(&self) -> bool {
        true
    }

    fn parent(&self) -> Option<Box<dyn Dir>> {
        if self.path.is_empty() {
            return None;
        }
        Some(Box::new(MemoryDir {
            tree: Arc::clone(&self.tree),
            path: parent_path(&self.path),
        }))
    }
}

impl Dir for MemoryDir {
    fn read_files(&self) -> io::Result<Vec<Box<dyn File>>> {
        let prefix = self.child_prefix();
        let mut files: Vec<Box<dyn File>> = Vec::new();
        for path in self.tree.files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            if rest.is_empty() || rest.contains('/') {
                continue;
            }
            files.push(Box::new(MemoryFile {
                tree: Arc::clone(&self.tree),
                path: path.clone(),
            }));
        }
        Ok(files)
    }

    fn read_dirs(&self) -> io::Result<Vec<Box<dyn Dir>>> {
        let prefix = self.child_prefix();
        let mut names = BTreeSet::new();
        for path in self.tree.files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            if let Some((child, _)) = rest.split_once('/') {
                if !child.is_empty() {
                    names.insert(child.to_string());
                }
            }
        }
        Ok(names
            .into_iter()
            .map(|name| {
                Box::new(MemoryDir {
                    tree: Arc::clone(&self.tree),
                    path: format!("{prefix}{name}"),
                }) as Box<dyn Dir>
            })
            .collect())
    }
}

impl Node for MemoryFile {
    fn name(&self) -> String {
        base_name(&self.path)
    }

    fn is_dir(&self) -> bool {
        false
    }

    fn parent(&self) -> Option<Box<dyn Dir>> {
        Some(Box::new(MemoryDir {
            tree: Arc::clone(&self.tree),
            path: parent_path(&self.path),
        }))
    }
}

impl File for MemoryFile {
    fn contents(&self) -> io::Result<Vec<u8>> {
        self.tree
            .files
            .get(&self.path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, self.path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<N: ?Sized + Node>(nodes: &[Box<N>]) -> Vec<String> {
        nodes.iter().map(|n| n.name()).collect()
    }

    #[test]
    fn lists_direct_children_only() {
        let mut tree = MemoryTree::new();
        tree.insert("a.html", "A");
        tree.insert("b.html", "B");
        tree.insert("layout/main.html", "M");
        tree.insert("layout/partials/nav.html", "N");
        let root = tree.into_root();

        assert_eq!(names(&root.read_files().unwrap()), ["a.html", "b.html"]);
        assert_eq!(names(&root.read_dirs().unwrap()), ["layout"]);

        let dirs = root.read_dirs().unwrap();
        let layout = &dirs[0];
        assert_eq!(names(&layout.read_files().unwrap()), ["main.html"]);
        assert_eq!(names(&layout.read_dirs().unwrap()), ["partials"]);
    }

    #[test]
    fn parent_chain_terminates_at_the_root() {
        let mut tree = MemoryTree::new();
        tree.insert("layout/partials/nav.html", "N");
        let root = tree.into_root();
        assert!(root.parent().is_none());
        assert_eq!(root.name(), "");

        let dirs = root.read_dirs().unwrap();
        let subdirs = dirs[0].read_dirs().unwrap();
        let navs = subdirs[0].read_files().unwrap();
        let nav = &navs[0];

        let up = nav.parent().unwrap();
        assert_eq!(up.name(), "partials");
        let up = up.parent().unwrap();
        assert_eq!(up.name(), "layout");
        let up = up.parent().unwrap();
        assert_eq!(up.name(), "");
        assert!(up.parent().is_none());
    }

    #[test]
    fn contents_round_trip() {
        let mut tree = MemoryTree::new();
        tree.insert("index.html", "hello");
        let root = tree.into_root();
        let files = root.read_files().unwrap();
        assert_eq!(files[0].contents().unwrap(), b"hello");
    }

    #[test]
    fn later_insert_wins_for_the_same_path() {
        let mut tree = MemoryTree::new();
        tree.insert("index.html", "first");
        tree.insert("index.html", "second");
        let root = tree.into_root();
        let files = root.read_files().unwrap();
        assert_eq!(files[0].contents().unwrap(), b"second");
    }
}
