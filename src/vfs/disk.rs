//! Disk-backed source tree.
//!
//! Handles are `(root, path)` pairs over `std::fs`; nothing is cached, every
//! listing and read goes to the filesystem. The root directory reports an
//! empty name and no parent, so canonical names are relative to it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Dir, File, Node};

/// Directory handle into a disk-backed source tree.
#[derive(Debug, Clone)]
pub struct DiskDir {
    root: PathBuf,
    path: PathBuf,
}

/// File handle into a disk-backed source tree.
#[derive(Debug, Clone)]
pub struct DiskFile {
    root: PathBuf,
    path: PathBuf,
}

impl DiskDir {
    /// Open a source tree rooted at `root`. Fails if `root` does not exist or
    /// is not a directory.
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let meta = fs::metadata(&root)?;
        if !meta.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self {
            path: root.clone(),
            root,
        })
    }

    fn is_root(&self) -> bool {
        self.path == self.root
    }
}

fn local_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

fn parent_of(root: &Path, path: &Path) -> PathBuf {
    path.parent().map_or_else(|| root.to_path_buf(), Path::to_path_buf)
}

impl Node for DiskDir {
    fn name(&self) -> String {
        if self.is_root() { String::new() } else { local_name(&self.path) }
    }

    fn is_dir(&self) -> bool {
        true
    }

    fn parent(&self) -> Option<Box<dyn Dir>> {
        if self.is_root() {
            return None;
        }
        Some(Box::new(DiskDir {
            root: self.root.clone(),
            path: parent_of(&self.root, &self.path),
        }))
    }
}

impl Dir for DiskDir {
    fn read_files(&self) -> io::Result<Vec<Box<dyn File>>> {
        let mut files: Vec<Box<dyn File>> = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            files.push(Box::new(DiskFile {
                root: self.root.clone(),
                path: entry.path(),
            }));
        }
        files.sort_by_key(|f| f.name());
        Ok(files)
    }

    fn read_dirs(&self) -> io::Result<Vec<Box<dyn Dir>>> {
        let mut dirs: Vec<Box<dyn Dir>> = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            dirs.push(Box::new(DiskDir {
                root: self.root.clone(),
                path: entry.path(),
            }));
        }
        dirs.sort_by_key(|d| d.name());
        Ok(dirs)
    }
}

impl Node for DiskFile {
    fn name(&self) -> String {
        local_name(&self.path)
    }

    fn is_dir(&self) -> bool {
        false
    }

    fn parent(&self) -> Option<Box<dyn Dir>> {
        Some(Box::new(DiskDir {
            root: self.root.clone(),
            path: parent_of(&self.root, &self.path),
        }))
    }
}

impl File for DiskFile {
    fn contents(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}
