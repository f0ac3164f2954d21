//! Resolution and listing of mount paths against the tag store.
//!
//! [`View`] holds everything the mount knows besides inode bookkeeping: the
//! store and the directories created with `mkdir` during this mount. It is
//! independent of the FUSE session so it can be exercised directly.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use fuser::FileType;
use thiserror::Error;

use super::path::{path_names, ParsedPath, DIR_MARKER_NAME, FLATTEN_NAME, FLAT_INFO_NAME};
use crate::query::is_expression;
use crate::store::{parse_point_file_name, Point, Store, StoreError};
use crate::tag::{decode_mount_name, mount_name};

/// Errors resolving a mount path.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("no such entry")]
    NotFound,

    #[error("not a directory")]
    NotADirectory,

    #[error("entry already exists")]
    AlreadyExists,

    #[error("operation not permitted on this entry")]
    NotPermitted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ViewResult<T> = Result<T, ViewError>;

/// What a mount path resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A tag or query directory
    Directory,
    /// A directory point inside a flattened view; it holds the `@dir` link
    PointDirectory(Point),
    /// A symlink to a point's real location
    Link { target: PathBuf },
    /// The generated `@flat-info` file and its content
    FlatInfo(String),
}

impl Node {
    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory | Node::PointDirectory(_))
    }

    fn link(point: &Point) -> Option<Self> {
        point.target().map(|target| Node::Link {
            target: target.to_path_buf(),
        })
    }
}

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: FileType,
}

impl Entry {
    fn new(name: impl Into<String>, kind: FileType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Mount path components as store queries, with slashes restored.
fn store_query(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| decode_mount_name(name)).collect()
}

/// Sorted mount names of a point's tags that are not already part of `query`.
fn remaining_tags(store: &Store, point: &Point, query: &[&str]) -> ViewResult<Vec<String>> {
    let mut tags: Vec<String> = store
        .tags_for_point(point.id)?
        .iter()
        .map(mount_name)
        .filter(|tag| !query.contains(&tag.as_str()))
        .collect();
    tags.sort();
    Ok(tags)
}

/// The tag filesystem as seen through the mount.
pub struct View {
    store: Store,
    made_dirs: BTreeSet<Vec<String>>,
}

impl View {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            made_dirs: BTreeSet::new(),
        }
    }

    /// The point a file name `name.id` refers to, if it exists, carries that
    /// name and still has a real location.
    fn named_point(&self, file_name: &str) -> ViewResult<Option<Point>> {
        let Some((name, id)) = parse_point_file_name(file_name) else {
            return Ok(None);
        };

        Ok(self
            .store
            .point(id)?
            .filter(|point| point.name == name && point.path.is_some()))
    }

    fn is_made_dir(&self, names: &[&str]) -> bool {
        self.made_dirs
            .iter()
            .any(|dir| dir.iter().map(String::as_str).eq(names.iter().copied()))
    }

    /// Resolve a mount-relative path.
    pub fn resolve(&self, path: &Path) -> ViewResult<Node> {
        let names = path_names(path).ok_or(ViewError::NotFound)?;
        match ParsedPath::parse(names) {
            ParsedPath::Normal(names) => self.resolve_normal(&names),
            ParsedPath::Flattened { filter, flat } => self.resolve_flattened(&filter, &flat),
        }
    }

    fn resolve_normal(&self, names: &[&str]) -> ViewResult<Node> {
        let Some((&last, _)) = names.split_last() else {
            return Ok(Node::Directory);
        };

        if self.is_made_dir(names) {
            return Ok(Node::Directory);
        }

        if let Some(point) = self.named_point(last)? {
            return Node::link(&point).ok_or(ViewError::NotFound);
        }

        let points = self.store.points_by_parts(&store_query(names))?;
        if points.is_empty() {
            return Err(ViewError::NotFound);
        }

        if is_expression(last) {
            return Ok(Node::Directory);
        }

        let is_tag = self
            .store
            .tags_for_points(&points)?
            .iter()
            .any(|tag| mount_name(tag) == last);

        if is_tag {
            Ok(Node::Directory)
        } else {
            Err(ViewError::NotFound)
        }
    }

    fn resolve_flattened(&self, filter: &[&str], flat: &[&str]) -> ViewResult<Node> {
        let Some((&last, flat_parent)) = flat.split_last() else {
            return Ok(Node::Directory);
        };

        if flat == [FLAT_INFO_NAME] {
            return Ok(Node::FlatInfo(filter.join("/")));
        }

        if let Some(point) = self.named_point(last)? {
            return if point.dir {
                Ok(Node::PointDirectory(point))
            } else {
                Node::link(&point).ok_or(ViewError::NotFound)
            };
        }

        if last == DIR_MARKER_NAME {
            if let Some(&parent) = flat_parent.last() {
                if let Some(point) = self.named_point(parent)?.filter(|p| p.dir) {
                    return Node::link(&point).ok_or(ViewError::NotFound);
                }
            }
        }

        let parent_query: Vec<&str> = filter.iter().chain(flat_parent).copied().collect();
        for point in self.store.points_by_parts(&store_query(&parent_query))? {
            let tags = remaining_tags(&self.store, &point, &parent_query)?;
            if tags.first().map(String::as_str) == Some(last) {
                return Ok(Node::Directory);
            }
        }

        Err(ViewError::NotFound)
    }

    /// List the entries of a directory, without `.` and `..`.
    pub fn list(&self, path: &Path) -> ViewResult<Vec<Entry>> {
        let node = self.resolve(path)?;
        if !node.is_directory() {
            return Err(ViewError::NotADirectory);
        }

        let names = path_names(path).ok_or(ViewError::NotFound)?;
        match ParsedPath::parse(names) {
            ParsedPath::Normal(names) => self.list_normal(&names),
            ParsedPath::Flattened { filter, flat } => match node {
                Node::PointDirectory(_) => Ok(vec![Entry::new(DIR_MARKER_NAME, FileType::Symlink)]),
                _ => self.list_flattened(&filter, &flat),
            },
        }
    }

    fn list_normal(&self, names: &[&str]) -> ViewResult<Vec<Entry>> {
        let mut seen = BTreeSet::new();
        let mut entries = vec![Entry::new(FLATTEN_NAME, FileType::Directory)];
        seen.insert(FLATTEN_NAME.to_string());

        for dir in &self.made_dirs {
            if let Some((name, parent)) = dir.split_last() {
                let is_child = parent.iter().map(String::as_str).eq(names.iter().copied());
                if is_child && seen.insert(name.clone()) {
                    entries.push(Entry::new(name.clone(), FileType::Directory));
                }
            }
        }

        let points = self.store.points_by_parts(&store_query(names))?;

        for point in points.iter().filter(|p| p.path.is_some()) {
            let name = point.file_name();
            if seen.insert(name.clone()) {
                entries.push(Entry::new(name, FileType::Symlink));
            }
        }

        for tag in self.store.tags_for_points(&points)? {
            let name = mount_name(&tag);
            if names.contains(&name.as_str()) {
                continue;
            }
            if seen.insert(name.clone()) {
                entries.push(Entry::new(name, FileType::Directory));
            }
        }

        Ok(entries)
    }

    fn list_flattened(&self, filter: &[&str], flat: &[&str]) -> ViewResult<Vec<Entry>> {
        let mut entries = Vec::new();
        if flat.is_empty() {
            entries.push(Entry::new(FLAT_INFO_NAME, FileType::RegularFile));
        }

        let query: Vec<&str> = filter.iter().chain(flat).copied().collect();
        let mut seen = BTreeSet::new();

        for point in self.store.points_by_parts(&store_query(&query))? {
            let tags = remaining_tags(&self.store, &point, &query)?;

            if let Some(first) = tags.into_iter().next() {
                if seen.insert(first.clone()) {
                    entries.push(Entry::new(first, FileType::Directory));
                }
            } else if point.path.is_some() {
                let kind = if point.dir {
                    FileType::Directory
                } else {
                    FileType::Symlink
                };
                entries.push(Entry::new(point.file_name(), kind));
            }
        }

        Ok(entries)
    }

    /// Create a session-only directory, typically named by a query
    /// expression.
    pub fn mkdir(&mut self, parent: &Path, name: &str) -> ViewResult<()> {
        let parent_names = path_names(parent).ok_or(ViewError::NotFound)?;
        if !matches!(ParsedPath::parse(parent_names.clone()), ParsedPath::Normal(_))
            || name.starts_with('@')
        {
            return Err(ViewError::NotPermitted);
        }

        if !self.resolve(parent)?.is_directory() {
            return Err(ViewError::NotADirectory);
        }

        let child = parent.join(name);
        if self.resolve(&child).is_ok() {
            return Err(ViewError::AlreadyExists);
        }

        let mut dir: Vec<String> = parent_names.iter().map(|s| s.to_string()).collect();
        dir.push(name.to_string());
        self.made_dirs.insert(dir);
        Ok(())
    }

    /// Remove a directory created with [`View::mkdir`], together with any
    /// created directories beneath it.
    pub fn rmdir(&mut self, parent: &Path, name: &str) -> ViewResult<()> {
        let child = parent.join(name);
        let names = path_names(&child).ok_or(ViewError::NotFound)?;

        if !self.is_made_dir(&names) {
            return match self.resolve(&child) {
                Ok(_) => Err(ViewError::NotPermitted),
                Err(e) => Err(e),
            };
        }

        self.made_dirs.retain(|dir| {
            dir.len() < names.len() || !dir.iter().map(String::as_str).zip(&names).all(|(a, b)| a == *b)
        });
        Ok(())
    }
}
