//! File attributes of mount entries.
//!
//! Nothing in the mount exists on disk, so attributes are synthesized: owner
//! from the mountpoint, timestamps from mount time.

use fuser::{FileAttr, FileType};
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::time::SystemTime;

/// Permission bits of tag and point directories.
pub const DIRECTORY_PERM: u16 = 0o755;
/// Permission bits of point symlinks.
pub const LINK_PERM: u16 = 0o777;
/// Permission bits of generated read-only files.
pub const INFO_FILE_PERM: u16 = 0o444;

/// Owner and timestamp shared by every attribute of a mount.
#[derive(Debug, Clone)]
pub struct AttrTemplate {
    pub uid: u32,
    pub gid: u32,
    pub time: SystemTime,
}

impl AttrTemplate {
    pub fn new(uid: u32, gid: u32) -> Self {
        Self {
            uid,
            gid,
            time: SystemTime::now(),
        }
    }

    /// Take the owner from the mountpoint directory.
    pub fn from_mountpoint(mountpoint: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(mountpoint)?;
        Ok(Self::new(metadata.uid(), metadata.gid()))
    }

    fn attr(&self, ino: u64, kind: FileType, perm: u16, size: u64) -> FileAttr {
        FileAttr {
            ino,
            size,
            blocks: size.div_ceil(512),
            atime: self.time,
            mtime: self.time,
            ctime: self.time,
            crtime: self.time,
            kind,
            perm,
            nlink: if kind == FileType::Directory { 2 } else { 1 },
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: 512,
            flags: 0,
        }
    }

    pub fn directory(&self, ino: u64) -> FileAttr {
        self.attr(ino, FileType::Directory, DIRECTORY_PERM, 0)
    }

    /// A symlink; its size is the length of the target path.
    pub fn link(&self, ino: u64, target: &Path) -> FileAttr {
        let size = target.as_os_str().len() as u64;
        self.attr(ino, FileType::Symlink, LINK_PERM, size)
    }

    pub fn info_file(&self, ino: u64, size: u64) -> FileAttr {
        self.attr(ino, FileType::RegularFile, INFO_FILE_PERM, size)
    }
}
