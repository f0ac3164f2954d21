//! The `fuser` adapter.
//!
//! A single FUSE session thread owns [`FfsFilesystem`] and calls it with
//! `&mut self`, so the store connection is used serially.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fuser::{
    FileAttr, FileType, Filesystem, ReplyAttr, ReplyData, ReplyDirectory, ReplyEmpty, ReplyEntry,
    ReplyOpen, Request,
};
use libc::{EACCES, EEXIST, EINVAL, EIO, EISDIR, ENOENT, ENOTDIR, EPERM};
use tracing::{debug, error, trace};

use super::attributes::AttrTemplate;
use super::inode::{HandleTable, InodeTable};
use super::view::{Node, View, ViewError};
use crate::store::Store;

/// Time-to-live for attribute and entry caching.
const TTL: Duration = Duration::from_secs(1);

/// Directory entry as handed to `readdir`: inode, kind, name.
type DirEntry = (u64, FileType, String);

/// Index into a listing or file for a request offset; negative offsets
/// start at the beginning.
fn offset_index(offset: i64) -> usize {
    usize::try_from(offset).unwrap_or(0)
}

/// Entries from `offset` on, each paired with the offset of the entry that
/// follows it.
fn page(entries: &[DirEntry], offset: i64) -> impl Iterator<Item = (i64, &DirEntry)> {
    entries
        .iter()
        .enumerate()
        .skip(offset_index(offset))
        .map(|(i, entry)| ((i + 1) as i64, entry))
}

/// The bytes a read of `size` at `offset` returns from `data`.
fn byte_range(data: &[u8], offset: i64, size: u32) -> &[u8] {
    let start = offset_index(offset).min(data.len());
    let end = start.saturating_add(size as usize).min(data.len());
    &data[start..end]
}

/// Directory listings held between staggered `readdir` calls.
#[derive(Debug, Default)]
struct ListingCache {
    listings: HashMap<u64, Vec<DirEntry>>,
}

impl ListingCache {
    /// The listing of `ino` for a read at `offset`.
    ///
    /// A read at offset 0 (or with nothing cached) computes a fresh listing
    /// and keeps it; a read starting at or past the end drops it.
    fn listing<F>(&mut self, ino: u64, offset: i64, compute: F) -> Result<Vec<DirEntry>, ViewError>
    where
        F: FnOnce() -> Result<Vec<DirEntry>, ViewError>,
    {
        let cached = if offset > 0 {
            self.listings.get(&ino).cloned()
        } else {
            None
        };

        let entries = match cached {
            Some(cached) => cached,
            None => compute()?,
        };

        if offset_index(offset) >= entries.len() {
            self.listings.remove(&ino);
        } else if offset <= 0 {
            self.listings.insert(ino, entries.clone());
        }

        Ok(entries)
    }

    fn invalidate(&mut self, ino: u64) {
        self.listings.remove(&ino);
    }
}

/// Full listing of a directory, `.` and `..` included, allocating inodes
/// for its children.
fn listing(
    view: &View,
    inodes: &mut InodeTable,
    ino: u64,
    path: &Path,
) -> Result<Vec<DirEntry>, ViewError> {
    let children = view.list(path)?;

    let mut entries = Vec::with_capacity(children.len() + 2);
    entries.push((ino, FileType::Directory, ".".to_string()));
    entries.push((inodes.parent_inode(path), FileType::Directory, "..".to_string()));

    for child in children {
        let child_ino = inodes.get_or_create(&path.join(&child.name));
        entries.push((child_ino, child.kind, child.name));
    }

    Ok(entries)
}

fn errno(err: &ViewError) -> i32 {
    match err {
        ViewError::NotFound => ENOENT,
        ViewError::NotADirectory => ENOTDIR,
        ViewError::AlreadyExists => EEXIST,
        ViewError::NotPermitted => EPERM,
        ViewError::Store(e) => {
            error!(error = %e, "store query failed");
            EIO
        }
    }
}

/// Tag-query filesystem served over FUSE.
pub struct FfsFilesystem {
    view: View,
    inodes: InodeTable,
    handles: HandleTable,
    listings: ListingCache,
    attrs: AttrTemplate,
}

impl FfsFilesystem {
    pub fn new(store: Store, attrs: AttrTemplate) -> Self {
        Self {
            view: View::new(store),
            inodes: InodeTable::new(),
            handles: HandleTable::default(),
            listings: ListingCache::default(),
            attrs,
        }
    }

    fn attr_for(&self, ino: u64, node: &Node) -> FileAttr {
        match node {
            Node::Directory | Node::PointDirectory(_) => self.attrs.directory(ino),
            Node::Link { target } => self.attrs.link(ino, target),
            Node::FlatInfo(content) => self.attrs.info_file(ino, content.len() as u64),
        }
    }

    fn child_path(&self, parent: u64, name: &OsStr) -> Option<PathBuf> {
        self.inodes.path(parent).map(|p| p.join(name))
    }
}

impl Filesystem for FfsFilesystem {
    fn lookup(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
        trace!("lookup: parent={}, name={:?}", parent, name);

        let Some(path) = self.child_path(parent, name) else {
            reply.error(ENOENT);
            return;
        };

        match self.view.resolve(&path) {
            Ok(node) => {
                let ino = self.inodes.get_or_create(&path);
                reply.entry(&TTL, &self.attr_for(ino, &node), 0);
            }
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn getattr(&mut self, _req: &Request, ino: u64, reply: ReplyAttr) {
        trace!("getattr: ino={}", ino);

        let Some(path) = self.inodes.path(ino).map(Path::to_path_buf) else {
            reply.error(ENOENT);
            return;
        };

        match self.view.resolve(&path) {
            Ok(node) => reply.attr(&TTL, &self.attr_for(ino, &node)),
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn readlink(&mut self, _req: &Request, ino: u64, reply: ReplyData) {
        let Some(path) = self.inodes.path(ino).map(Path::to_path_buf) else {
            reply.error(ENOENT);
            return;
        };

        match self.view.resolve(&path) {
            Ok(Node::Link { target }) => reply.data(target.as_os_str().as_encoded_bytes()),
            Ok(_) => reply.error(EINVAL),
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        debug!("readdir: ino={}, offset={}", ino, offset);

        let view = &self.view;
        let inodes = &mut self.inodes;
        let entries = self.listings.listing(ino, offset, || {
            let path = inodes
                .path(ino)
                .map(Path::to_path_buf)
                .ok_or(ViewError::NotFound)?;
            listing(view, inodes, ino, &path)
        });

        let entries = match entries {
            Ok(entries) => entries,
            Err(e) => {
                reply.error(errno(&e));
                return;
            }
        };

        for (next, (entry_ino, kind, name)) in page(&entries, offset) {
            // `add` returns true once the reply buffer is full
            if reply.add(*entry_ino, next, *kind, name) {
                break;
            }
        }

        reply.ok();
    }

    fn mkdir(
        &mut self,
        _req: &Request,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        let (Some(parent_path), Some(name)) = (
            self.inodes.path(parent).map(Path::to_path_buf),
            name.to_str(),
        ) else {
            reply.error(ENOENT);
            return;
        };

        match self.view.mkdir(&parent_path, name) {
            Ok(()) => {
                debug!("mkdir: {:?}", parent_path.join(name));
                let ino = self.inodes.get_or_create(&parent_path.join(name));
                self.listings.invalidate(parent);
                reply.entry(&TTL, &self.attrs.directory(ino), 0);
            }
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn rmdir(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let (Some(parent_path), Some(name)) = (
            self.inodes.path(parent).map(Path::to_path_buf),
            name.to_str(),
        ) else {
            reply.error(ENOENT);
            return;
        };

        match self.view.rmdir(&parent_path, name) {
            Ok(()) => {
                debug!("rmdir: {:?}", parent_path.join(name));
                self.listings.invalidate(parent);
                reply.ok();
            }
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn open(&mut self, _req: &Request, ino: u64, flags: i32, reply: ReplyOpen) {
        let Some(path) = self.inodes.path(ino).map(Path::to_path_buf) else {
            reply.error(ENOENT);
            return;
        };

        if flags & libc::O_ACCMODE != libc::O_RDONLY {
            reply.error(EACCES);
            return;
        }

        match self.view.resolve(&path) {
            Ok(Node::FlatInfo(_)) => reply.opened(self.handles.open(&path), 0),
            Ok(node) if node.is_directory() => reply.error(EISDIR),
            Ok(_) => reply.error(EINVAL),
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn read(
        &mut self,
        _req: &Request,
        ino: u64,
        fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock: Option<u64>,
        reply: ReplyData,
    ) {
        debug!("read: ino={}, offset={}, size={}", ino, offset, size);

        let path = match self.handles.path(fh).or_else(|| self.inodes.path(ino)) {
            Some(path) => path.to_path_buf(),
            None => {
                reply.error(ENOENT);
                return;
            }
        };

        match self.view.resolve(&path) {
            Ok(Node::FlatInfo(content)) => {
                reply.data(byte_range(content.as_bytes(), offset, size));
            }
            Ok(_) => reply.error(EINVAL),
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn flush(&mut self, _req: &Request, _ino: u64, _fh: u64, _lock_owner: u64, reply: ReplyEmpty) {
        reply.ok();
    }

    fn release(
        &mut self,
        _req: &Request,
        _ino: u64,
        fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        self.handles.release(fh);
        reply.ok();
    }
}
