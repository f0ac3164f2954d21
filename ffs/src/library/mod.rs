//! Catalogue maintenance.
//!
//! [`Library`] combines the tag [`Store`] with the content [`Inspector`] to
//! register points, keep their locations and hashes current, and apply tags.
//!
//! # Point identity
//!
//! A path being added is matched to an existing point first by its path and
//! then by its content hash. A file that moved keeps its point (and tags);
//! its recorded path follows it.

mod error;
mod import;

pub use error::{ImportError, LibraryError, LibraryResult};
pub use import::{ImportReport, FLAT_INFO_NAME, DIR_MARKER_NAME};

use std::path::Path;

use tracing::{debug, info, warn};

use crate::hash::hash_path;
use crate::inspect::Inspector;
use crate::query::SegmentQuery;
use crate::store::{NewPoint, Point, Store, Tag};
use crate::tag::TagEntry;

fn path_str(path: &Path) -> LibraryResult<&str> {
    path.to_str()
        .ok_or_else(|| LibraryError::NonUtf8Path(path.to_path_buf()))
}

/// The tag catalogue with automatic tagging.
pub struct Library {
    store: Store,
    inspector: Inspector,
}

impl Library {
    pub fn new(store: Store, inspector: Inspector) -> Self {
        Self { store, inspector }
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Give up the library, keeping the store (e.g. to mount it).
    pub fn into_store(self) -> Store {
        self.store
    }

    /// Register a file or directory under its file name.
    ///
    /// The path is canonicalized first so the recorded location is absolute.
    ///
    /// # Arguments
    ///
    /// * `path` - File or directory to register
    /// * `tags` - Tags to apply in addition to the automatic ones
    pub fn add(&mut self, path: &Path, tags: &[TagEntry]) -> LibraryResult<Point> {
        let full_path = path.canonicalize().map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let name = full_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| LibraryError::Unnamed(full_path.clone()))?
            .to_string();

        self.record(&name, &full_path, tags)
    }

    /// Register `path` under `name`, reusing the point with the same path or
    /// content if there is one, then apply `tags` and refresh it.
    pub fn record(&mut self, name: &str, path: &Path, tags: &[TagEntry]) -> LibraryResult<Point> {
        let location = path_str(path)?;
        let (hash, dir) = hash_path(path).map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let existing = match self.store.point_by_path(location)? {
            Some(point) => Some(point),
            None => self.store.point_by_hash(&hash)?,
        };

        let point = match existing {
            Some(point) => point,
            None => {
                let point = self.store.insert_point(&NewPoint {
                    name: name.to_string(),
                    path: Some(location.to_string()),
                    hash: hash.clone(),
                    dir,
                })?;
                info!(id = point.id, name = %point.name, path = location, "registered point");
                point
            }
        };

        for tag in tags {
            self.store.tag_point(point.id, tag)?;
        }

        self.refresh(&point, Some(location), Some(&hash))
    }

    /// Bring a point up to date.
    ///
    /// A new path replaces the recorded one. Without a new path, a recorded
    /// path that no longer exists is cleared. Whatever path remains is
    /// re-inspected for automatic tags, and a changed hash is stored.
    pub fn refresh(
        &mut self,
        point: &Point,
        new_path: Option<&str>,
        new_hash: Option<&str>,
    ) -> LibraryResult<Point> {
        let current = match (point.path.as_deref(), new_path) {
            (current, Some(new_path)) if current != Some(new_path) => {
                self.store.set_point_path(point.id, Some(new_path))?;
                debug!(id = point.id, path = new_path, "point moved");
                Some(new_path.to_string())
            }
            (Some(current), None) if !Path::new(current).exists() => {
                self.store.set_point_path(point.id, None)?;
                warn!(id = point.id, path = current, "backing file is gone");
                None
            }
            (current, _) => current.map(str::to_string),
        };

        if let Some(path) = current {
            self.autotag(point.id, Path::new(&path))?;
        }

        if let Some(new_hash) = new_hash {
            if point.hash != new_hash {
                self.store.set_point_hash(point.id, new_hash)?;
            }
        }

        self.store
            .point(point.id)?
            .ok_or(LibraryError::PointNotFound(point.id))
    }

    fn autotag(&mut self, id: i64, path: &Path) -> LibraryResult<()> {
        match self.inspector.inspect(path) {
            Ok(tags) => {
                for tag in &tags {
                    self.store.tag_point(id, tag)?;
                }
            }
            Err(e) => warn!(id, path = %path.display(), error = %e, "automatic tagging failed"),
        }
        Ok(())
    }

    /// Refresh every point. Returns the number of points visited.
    pub fn refresh_all(&mut self) -> LibraryResult<usize> {
        let points = self.store.all_points()?;
        for point in &points {
            self.refresh(point, None, None)?;
        }
        Ok(points.len())
    }

    /// Delete a point and its joins.
    pub fn remove(&mut self, id: i64) -> LibraryResult<()> {
        if !self.store.remove_point(id)? {
            return Err(LibraryError::PointNotFound(id));
        }
        info!(id, "removed point");
        Ok(())
    }

    /// Apply a tag to a point.
    pub fn tag(&mut self, id: i64, entry: &TagEntry) -> LibraryResult<Tag> {
        if self.store.point(id)?.is_none() {
            return Err(LibraryError::PointNotFound(id));
        }
        Ok(self.store.tag_point(id, entry)?)
    }

    /// Remove the single tag of a point selected by a query segment.
    pub fn untag(&mut self, id: i64, query: &str) -> LibraryResult<Tag> {
        if self.store.point(id)?.is_none() {
            return Err(LibraryError::PointNotFound(id));
        }

        let carried = self.store.tags_for_point(id)?;
        let mut matching: Vec<Tag> = Vec::new();
        for alternative in &SegmentQuery::parse(query).alternatives {
            for tag in self.store.tags_matching(alternative)? {
                if carried.contains(&tag) && !matching.contains(&tag) {
                    matching.push(tag);
                }
            }
        }

        let tag = match matching.len() {
            0 => {
                return Err(LibraryError::TagNotFound {
                    point: id,
                    query: query.to_string(),
                })
            }
            1 => matching.remove(0),
            count => {
                return Err(LibraryError::AmbiguousTag {
                    point: id,
                    query: query.to_string(),
                    count,
                })
            }
        };

        self.store.untag_point(id, tag.id)?;
        Ok(tag)
    }

    /// Points matching a tag path.
    pub fn find<S: AsRef<str>>(&self, parts: &[S]) -> LibraryResult<Vec<Point>> {
        Ok(self.store.points_by_parts(parts)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::inspect::{Classifier, InspectError};
    use crate::tag::format_tag;
    use std::fs;

    pub(crate) struct FixedClassifier(pub &'static str);

    impl Classifier for FixedClassifier {
        fn describe(&self, _path: &Path) -> Result<String, InspectError> {
            Ok(self.0.to_string())
        }
    }

    pub(crate) fn library(description: &'static str) -> Library {
        Library::new(
            Store::in_memory().unwrap(),
            Inspector::new(Box::new(FixedClassifier(description))),
        )
    }

    fn tag_names(library: &Library, id: i64) -> Vec<String> {
        library
            .store()
            .tags_for_point(id)
            .unwrap()
            .iter()
            .map(format_tag)
            .collect()
    }

    #[test]
    fn test_add_registers_and_autotags() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("notes.txt");
        fs::write(&file, b"hello").unwrap();

        let mut library = library("ASCII text");
        let point = library
            .add(&file, &[TagEntry::valued("mood", "calm")])
            .unwrap();

        assert_eq!(point.name, "notes.txt");
        assert!(!point.dir);
        assert_eq!(
            point.path.as_deref(),
            Some(file.canonicalize().unwrap().to_str().unwrap())
        );
        assert_eq!(
            tag_names(&library, point.id),
            vec!["ascii", "magic = ASCII text", "mood = calm", "text", "type = ascii"]
        );
    }

    #[test]
    fn test_add_twice_reuses_point() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, b"one").unwrap();

        let mut library = library("data");
        let first = library.add(&file, &[]).unwrap();
        fs::write(&file, b"two").unwrap();
        let second = library.add(&file, &[]).unwrap();

        assert_eq!(first.id, second.id);
        assert_ne!(first.hash, second.hash);
        assert_eq!(library.store().all_points().unwrap().len(), 1);
    }

    #[test]
    fn test_moved_file_found_by_hash() {
        let temp = tempfile::tempdir().unwrap();
        let old = temp.path().join("old.txt");
        let new = temp.path().join("new.txt");
        fs::write(&old, b"same content").unwrap();

        let mut library = library("data");
        let first = library.add(&old, &[]).unwrap();
        fs::rename(&old, &new).unwrap();
        let second = library.add(&new, &[]).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "old.txt");
        assert!(second.path.unwrap().ends_with("new.txt"));
    }

    #[test]
    fn test_refresh_all_clears_missing_paths() {
        let temp = tempfile::tempdir().unwrap();
        let kept = temp.path().join("kept.txt");
        let gone = temp.path().join("gone.txt");
        fs::write(&kept, b"kept").unwrap();
        fs::write(&gone, b"gone").unwrap();

        let mut library = library("data");
        let kept_point = library.add(&kept, &[]).unwrap();
        let gone_point = library.add(&gone, &[]).unwrap();
        fs::remove_file(&gone).unwrap();

        assert_eq!(library.refresh_all().unwrap(), 2);

        let store = library.store();
        assert!(store.point(kept_point.id).unwrap().unwrap().path.is_some());
        assert!(store.point(gone_point.id).unwrap().unwrap().path.is_none());
    }

    #[test]
    fn test_add_directory() {
        let temp = tempfile::tempdir().unwrap();
        let project = temp.path().join("project");
        fs::create_dir(&project).unwrap();
        fs::write(project.join("Cargo.toml"), b"[package]").unwrap();

        let mut library = library("directory");
        let point = library.add(&project, &[]).unwrap();

        assert!(point.dir);
        let tags = tag_names(&library, point.id);
        assert!(tags.contains(&"cargo".to_string()));
        assert!(tags.contains(&"language = rust".to_string()));
    }

    #[test]
    fn test_add_missing_path() {
        let temp = tempfile::tempdir().unwrap();
        let mut library = library("data");
        let err = library.add(&temp.path().join("nope"), &[]).unwrap_err();
        assert!(matches!(err, LibraryError::Io { .. }));
    }

    #[test]
    fn test_tag_and_untag() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("song.mp3");
        fs::write(&file, b"la").unwrap();

        let mut library = library("data");
        let point = library.add(&file, &[]).unwrap();
        library.tag(point.id, &TagEntry::valued("genre", "rock")).unwrap();
        library.tag(point.id, &TagEntry::valued("genre", "jazz")).unwrap();

        assert!(matches!(
            library.untag(point.id, "genre"),
            Err(LibraryError::AmbiguousTag { count: 2, .. })
        ));
        assert!(matches!(
            library.untag(point.id, "genre = pop"),
            Err(LibraryError::TagNotFound { .. })
        ));

        let removed = library.untag(point.id, "genre = rock").unwrap();
        assert_eq!(removed.value.as_deref(), Some("rock"));
        assert!(library.find(&["genre = rock"]).unwrap().is_empty());
        assert_eq!(library.find(&["genre = jazz"]).unwrap().len(), 1);
    }

    #[test]
    fn test_untag_ignores_tags_of_other_points() {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let mut library = library("data");
        let pa = library.add(&a, &[TagEntry::valued("genre", "rock")]).unwrap();
        library.add(&b, &[TagEntry::valued("genre", "jazz")]).unwrap();

        assert_eq!(library.untag(pa.id, "genre").unwrap().value.as_deref(), Some("rock"));
    }

    #[test]
    fn test_missing_point_errors() {
        let mut library = library("data");
        assert!(matches!(library.remove(5), Err(LibraryError::PointNotFound(5))));
        assert!(matches!(
            library.tag(5, &TagEntry::bare("x")),
            Err(LibraryError::PointNotFound(5))
        ));
        assert!(matches!(library.untag(5, "x"), Err(LibraryError::PointNotFound(5))));
    }
}
