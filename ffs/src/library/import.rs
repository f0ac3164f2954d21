//! Import of store directories.
//!
//! A store directory encodes tags in its layout, the same layout a flattened
//! view produces when copied out of the mount:
//!
//! ```text
//! store/
//!   @flat-info                  tags for every entry, `/` separated
//!   genre=rock/year=1999/a.mp3  file point `a.mp3`
//!   code/ffs/@dir/              directory point `ffs`
//! ```
//!
//! Each directory segment is parsed with [`parse_store_segment`].

use std::fs;
use std::path::{Component, Path};

use tracing::{info, warn};
use walkdir::WalkDir;

use super::{ImportError, Library, LibraryError};
use crate::tag::{parse_store_segment, TagEntry, TagParseError};

/// Meta file holding the tags shared by a flattened view.
pub const FLAT_INFO_NAME: &str = "@flat-info";

/// Directory marking the contents of a directory point.
pub const DIR_MARKER_NAME: &str = "@dir";

/// Outcome of a store import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Entries recorded as points
    pub imported: usize,
    /// Entries skipped with a warning
    pub skipped: usize,
}

/// Parse `/` separated tag segments, ignoring empty ones.
fn parse_segments<'a, I>(segments: I) -> Result<Vec<TagEntry>, TagParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_store_segment)
        .collect()
}

fn read_flat_info(dir: &Path) -> Result<Vec<TagEntry>, ImportError> {
    let path = dir.join(FLAT_INFO_NAME);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(ImportError::Io { path, source }),
    };

    parse_segments(content.trim().split('/')).map_err(|source| ImportError::FlatInfo {
        dir: dir.to_path_buf(),
        source,
    })
}

/// Split a path relative to the store root into the point name and the
/// tag segments above it.
fn name_and_segments(relative: &Path) -> Option<(&str, Vec<&str>)> {
    let mut parts = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<&str>>>()?;

    let name = parts.pop()?;
    Some((name, parts))
}

impl Library {
    /// Import every point in a store directory.
    ///
    /// Entries with malformed segments, symlinks and entries that cannot be
    /// read are skipped with a warning. Store failures abort the import.
    pub fn import_store(&mut self, dir: &Path) -> Result<ImportReport, ImportError> {
        if !dir.is_dir() {
            return Err(ImportError::NotADirectory(dir.to_path_buf()));
        }

        let shared = read_flat_info(dir)?;
        let mut report = ImportReport::default();
        let mut entries = WalkDir::new(dir).min_depth(1).sort_by_file_name().into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "unreadable store entry");
                    report.skipped += 1;
                    continue;
                }
            };

            let path = entry.path();
            if entry.path_is_symlink() {
                warn!(path = %path.display(), "symlinks in a store are not supported");
                report.skipped += 1;
                continue;
            }

            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };

            let is_dir_point = entry.file_type().is_dir() && entry.file_name() == DIR_MARKER_NAME;
            if is_dir_point {
                entries.skip_current_dir();
            } else if !entry.file_type().is_file() || relative == Path::new(FLAT_INFO_NAME) {
                continue;
            }

            let named = if is_dir_point {
                relative.parent().and_then(name_and_segments)
            } else {
                name_and_segments(relative)
            };

            let Some((name, segments)) = named else {
                warn!(path = %path.display(), "store entry has no usable name");
                report.skipped += 1;
                continue;
            };

            let tags = match parse_segments(segments) {
                Ok(tags) => shared.iter().cloned().chain(tags).collect::<Vec<_>>(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "malformed tag in store path");
                    report.skipped += 1;
                    continue;
                }
            };

            match self.record(name, path, &tags) {
                Ok(point) => {
                    info!(id = point.id, tags = tags.len(), "imported {}", name);
                    report.imported += 1;
                }
                Err(LibraryError::Store(e)) => return Err(LibraryError::Store(e).into()),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to import store entry");
                    report.skipped += 1;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::library;
    use super::*;
    use crate::tag::format_tag;

    fn write(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_name_and_segments() {
        assert_eq!(
            name_and_segments(Path::new("genre=rock/year=1999/a.mp3")),
            Some(("a.mp3", vec!["genre=rock", "year=1999"]))
        );
        assert_eq!(name_and_segments(Path::new("a.mp3")), Some(("a.mp3", vec![])));
        assert_eq!(name_and_segments(Path::new("")), None);
    }

    #[test]
    fn test_import_layout() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        write(&root.join(FLAT_INFO_NAME), b"music/\n");
        write(&root.join("genre=rock/year=1999/a.mp3"), b"a");
        write(&root.join("genre = jazz/b.mp3"), b"b");
        write(&root.join("code/ffs/@dir/Cargo.toml"), b"[package]");
        write(&root.join("code/ffs/@dir/src/main.rs"), b"fn main() {}");

        let mut library = library("data");
        let report = library.import_store(root).unwrap();

        assert_eq!(report, ImportReport { imported: 3, skipped: 0 });

        let store = library.store();
        let rock = library.find(&["music", "genre = rock", "year > 1990"]).unwrap();
        assert_eq!(rock.len(), 1);
        assert_eq!(rock[0].name, "a.mp3");

        let jazz = library.find(&["genre = jazz"]).unwrap();
        assert_eq!(jazz[0].name, "b.mp3");

        let code = library.find(&["code"]).unwrap();
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].name, "ffs");
        assert!(code[0].dir);
        assert!(code[0].path.as_deref().unwrap().ends_with("@dir"));

        let tags: Vec<String> = store
            .tags_for_point(code[0].id)
            .unwrap()
            .iter()
            .map(format_tag)
            .collect();
        assert!(tags.contains(&"music".to_string()));
    }

    #[test]
    fn test_import_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        write(&temp.path().join("docs/readme.txt"), b"read me");

        let mut library = library("data");
        library.import_store(temp.path()).unwrap();
        library.import_store(temp.path()).unwrap();

        assert_eq!(library.store().all_points().unwrap().len(), 1);
    }

    #[test]
    fn test_import_skips_bad_entries() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        write(&root.join("year=soon=x/a.txt"), b"a");
        write(&root.join("ok/b.txt"), b"b");
        std::os::unix::fs::symlink(root.join("ok/b.txt"), root.join("link.txt")).unwrap();

        let mut library = library("data");
        let report = library.import_store(root).unwrap();

        assert_eq!(report, ImportReport { imported: 1, skipped: 2 });
    }

    #[test]
    fn test_import_sort_override() {
        let temp = tempfile::tempdir().unwrap();
        write(&temp.path().join("year=two thousand=2000/a.txt"), b"a");

        let mut library = library("data");
        library.import_store(temp.path()).unwrap();

        assert_eq!(library.find(&["year > 1999"]).unwrap().len(), 1);
    }

    #[test]
    fn test_import_restores_slashes_in_segments() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        write(&root.join(FLAT_INFO_NAME), "artist = AC\u{2215}DC".as_bytes());
        write(&root.join("album = Live\u{2215}1991/track.mp3"), b"t");

        let mut library = library("data");
        library.import_store(root).unwrap();

        let points = library.find(&["artist = AC/DC", "album = Live/1991"]).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "track.mp3");
    }

    #[test]
    fn test_import_bad_flat_info() {
        let temp = tempfile::tempdir().unwrap();
        write(&temp.path().join(FLAT_INFO_NAME), b"a=b=c=d");

        let mut library = library("data");
        assert!(matches!(
            library.import_store(temp.path()),
            Err(ImportError::FlatInfo { .. })
        ));
    }

    #[test]
    fn test_import_missing_dir() {
        let temp = tempfile::tempdir().unwrap();
        let mut library = library("data");
        assert!(matches!(
            library.import_store(&temp.path().join("missing")),
            Err(ImportError::NotADirectory(_))
        ));
    }
}
