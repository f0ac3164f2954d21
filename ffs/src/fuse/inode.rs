//! Inode and file handle bookkeeping for the mount.
//!
//! Inodes are allocated per mount-relative path and stay stable for the
//! lifetime of the mount. The root directory is the empty path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The FUSE root inode.
pub const ROOT_INODE: u64 = 1;

/// Bidirectional path/inode mapping.
///
/// # Example
///
/// ```
/// use ffs::fuse::{InodeTable, ROOT_INODE};
/// use std::path::Path;
///
/// let mut inodes = InodeTable::new();
/// let ino = inodes.get_or_create(Path::new("music"));
///
/// assert_eq!(inodes.path(ROOT_INODE), Some(Path::new("")));
/// assert_eq!(inodes.get_or_create(Path::new("music")), ino);
/// ```
#[derive(Debug)]
pub struct InodeTable {
    inode_to_path: HashMap<u64, PathBuf>,
    path_to_inode: HashMap<PathBuf, u64>,
    next_inode: u64,
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InodeTable {
    /// Create a table with the root reserved as inode 1.
    pub fn new() -> Self {
        let mut inode_to_path = HashMap::new();
        let mut path_to_inode = HashMap::new();

        inode_to_path.insert(ROOT_INODE, PathBuf::new());
        path_to_inode.insert(PathBuf::new(), ROOT_INODE);

        Self {
            inode_to_path,
            path_to_inode,
            next_inode: ROOT_INODE + 1,
        }
    }

    /// Get the inode of a path, allocating one if needed.
    pub fn get_or_create(&mut self, path: &Path) -> u64 {
        if let Some(&inode) = self.path_to_inode.get(path) {
            return inode;
        }

        let inode = self.next_inode;
        self.next_inode += 1;

        self.path_to_inode.insert(path.to_path_buf(), inode);
        self.inode_to_path.insert(inode, path.to_path_buf());

        inode
    }

    /// Path of an inode.
    pub fn path(&self, inode: u64) -> Option<&Path> {
        self.inode_to_path.get(&inode).map(PathBuf::as_path)
    }

    /// Inode of a path, without allocating.
    pub fn inode(&self, path: &Path) -> Option<u64> {
        self.path_to_inode.get(path).copied()
    }

    /// Inode of a path's parent directory; the root is its own parent.
    pub fn parent_inode(&self, path: &Path) -> u64 {
        path.parent()
            .and_then(|parent| self.inode(parent))
            .unwrap_or(ROOT_INODE)
    }
}

/// Open file handles and the paths they were opened on.
#[derive(Debug)]
pub struct HandleTable {
    handles: HashMap<u64, PathBuf>,
    next_handle: u64,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self {
            handles: HashMap::new(),
            next_handle: 1,
        }
    }
}

impl HandleTable {
    pub fn open(&mut self, path: &Path) -> u64 {
        let fh = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(fh, path.to_path_buf());
        fh
    }

    pub fn path(&self, fh: u64) -> Option<&Path> {
        self.handles.get(&fh).map(PathBuf::as_path)
    }

    pub fn release(&mut self, fh: u64) -> bool {
        self.handles.remove(&fh).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reserves_root_inode() {
        let table = InodeTable::new();

        assert_eq!(table.path(ROOT_INODE), Some(Path::new("")));
        assert_eq!(table.inode(Path::new("")), Some(ROOT_INODE));
    }

    #[test]
    fn test_get_or_create_is_stable_and_unique() {
        let mut table = InodeTable::new();

        let music = table.get_or_create(Path::new("music"));
        let rock = table.get_or_create(Path::new("music/genre = rock"));

        assert!(music > ROOT_INODE);
        assert_ne!(music, rock);
        assert_eq!(table.get_or_create(Path::new("music")), music);
        assert_eq!(table.path(rock), Some(Path::new("music/genre = rock")));
    }

    #[test]
    fn test_unknown_lookups() {
        let table = InodeTable::new();
        assert_eq!(table.path(999), None);
        assert_eq!(table.inode(Path::new("nope")), None);
    }

    #[test]
    fn test_parent_inode() {
        let mut table = InodeTable::new();
        let music = table.get_or_create(Path::new("music"));
        table.get_or_create(Path::new("music/code"));

        assert_eq!(table.parent_inode(Path::new("music/code")), music);
        assert_eq!(table.parent_inode(Path::new("music")), ROOT_INODE);
        assert_eq!(table.parent_inode(Path::new("")), ROOT_INODE);
    }

    #[test]
    fn test_handles() {
        let mut handles = HandleTable::default();
        let a = handles.open(Path::new("@flatten/@flat-info"));
        let b = handles.open(Path::new("@flatten/@flat-info"));

        assert_ne!(a, b);
        assert_eq!(handles.path(a), Some(Path::new("@flatten/@flat-info")));
        assert!(handles.release(a));
        assert!(!handles.release(a));
        assert_eq!(handles.path(a), None);
    }
}
