//! Catalogue maintenance commands: add, update-all, remove, tag, untag,
//! find and import.

use std::path::Path;

use ffs::library::Library;
use ffs::store::Point;
use ffs::tag::{format_tag, parse_assignment, TagEntry, TagParseError};

use crate::error::CliError;

/// One line per point: id, then its location.
fn describe_point(point: &Point) -> String {
    match point.path.as_deref() {
        Some(path) => format!("{}\t{}", point.id, path),
        None => format!("{}\t(missing) {}", point.id, point.file_name()),
    }
}

/// Register a path with the given `name[=value]` tags.
pub fn run_add(library: &mut Library, path: &Path, tags: &[String]) -> Result<Point, CliError> {
    let entries = tags
        .iter()
        .map(|arg| parse_assignment(arg))
        .collect::<Result<Vec<_>, _>>()?;

    let point = library.add(path, &entries)?;

    println!("{}", describe_point(&point));
    for tag in library.store().tags_for_point(point.id)? {
        println!("  {}", format_tag(&tag));
    }
    Ok(point)
}

/// Refresh every point's location, hash and automatic tags.
pub fn run_update_all(library: &mut Library) -> Result<usize, CliError> {
    let count = library.refresh_all()?;
    println!("Refreshed {} point(s)", count);
    Ok(count)
}

pub fn run_remove(library: &mut Library, id: i64) -> Result<(), CliError> {
    library.remove(id)?;
    println!("Removed point {}", id);
    Ok(())
}

/// Tag a point with `name` or `name = value`.
pub fn run_tag(
    library: &mut Library,
    id: i64,
    name: &str,
    value: Option<&str>,
) -> Result<(), CliError> {
    let entry = match value {
        Some(value) => TagEntry::valued(name.trim(), value.trim()),
        None => parse_assignment(name)?,
    };
    if entry.name.is_empty() {
        return Err(CliError::Tag(TagParseError::EmptyName(name.to_string())));
    }

    let tag = library.tag(id, &entry)?;
    println!("Tagged point {} with {}", id, format_tag(&tag));
    Ok(())
}

/// Remove the tag of a point matched by a query segment such as `genre`
/// or `year = 1999`.
pub fn run_untag(library: &mut Library, id: i64, query: &str) -> Result<(), CliError> {
    let tag = library.untag(id, query)?;
    println!("Removed {} from point {}", format_tag(&tag), id);
    Ok(())
}

/// Print the points matching a tag path given as separate segments.
pub fn run_find(library: &Library, segments: &[String]) -> Result<Vec<Point>, CliError> {
    let points = library.find(segments)?;
    for point in &points {
        println!("{}", describe_point(point));
    }
    Ok(points)
}

/// Import a store directory laid out as tag paths.
pub fn run_import(library: &mut Library, dir: &Path) -> Result<(), CliError> {
    let report = library.import_store(dir)?;
    println!(
        "Imported {} entr{} from {} ({} skipped)",
        report.imported,
        if report.imported == 1 { "y" } else { "ies" },
        dir.display(),
        report.skipped
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffs::inspect::{Classifier, InspectError, Inspector};
    use ffs::library::LibraryError;
    use ffs::store::Store;
    use std::fs;

    struct TextClassifier;

    impl Classifier for TextClassifier {
        fn describe(&self, _path: &Path) -> Result<String, InspectError> {
            Ok("ASCII text".to_string())
        }
    }

    fn library() -> Library {
        let store = Store::in_memory().unwrap();
        Library::new(store, Inspector::new(Box::new(TextClassifier)))
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
    fn test_add_applies_given_and_automatic_tags() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("notes.txt");
        fs::write(&file, "hello").unwrap();

        let mut library = library();
        let point = run_add(
            &mut library,
            &file,
            &["topic=rust".to_string(), "draft".to_string()],
        )
        .unwrap();

        let tags = tag_names(&library, point.id);
        assert!(tags.contains(&"topic = rust".to_string()));
        assert!(tags.contains(&"draft".to_string()));
        assert!(tags.contains(&"text".to_string()));
    }

    #[test]
    fn test_add_rejects_empty_tag_name() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        let mut library = library();
        let result = run_add(&mut library, &file, &["=x".to_string()]);
        assert!(matches!(result, Err(CliError::Tag(_))));
        assert!(library.store().all_points().unwrap().is_empty());
    }

    #[test]
    fn test_tag_rejects_empty_name_like_add() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        let mut library = library();
        let point = run_add(&mut library, &file, &[]).unwrap();

        let result = run_tag(&mut library, point.id, " ", Some("x"));
        assert!(matches!(
            result,
            Err(CliError::Tag(TagParseError::EmptyName(_)))
        ));
        assert!(matches!(
            run_tag(&mut library, point.id, "=x", None),
            Err(CliError::Tag(TagParseError::EmptyName(_)))
        ));
    }

    #[test]
    fn test_tag_untag_and_find() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("song.txt");
        fs::write(&file, "la la").unwrap();

        let mut library = library();
        let point = run_add(&mut library, &file, &[]).unwrap();

        run_tag(&mut library, point.id, "year", Some("1999")).unwrap();
        run_tag(&mut library, point.id, "favourite", None).unwrap();

        let found = run_find(&library, &["year > 1990".to_string()]).unwrap();
        assert_eq!(found.len(), 1);

        run_untag(&mut library, point.id, "year").unwrap();
        assert!(run_find(&library, &["year > 1990".to_string()])
            .unwrap()
            .is_empty());
        assert_eq!(
            run_find(&library, &["favourite".to_string()]).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_remove_unknown_point() {
        let mut library = library();
        assert!(matches!(
            run_remove(&mut library, 42),
            Err(CliError::Library(LibraryError::PointNotFound(42)))
        ));
    }

    #[test]
    fn test_update_all_clears_vanished_paths() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("gone.txt");
        fs::write(&file, "soon gone").unwrap();

        let mut library = library();
        let point = run_add(&mut library, &file, &[]).unwrap();
        fs::remove_file(&file).unwrap();

        assert_eq!(run_update_all(&mut library).unwrap(), 1);
        let point = library.store().point(point.id).unwrap().unwrap();
        assert!(point.path.is_none());
        assert!(describe_point(&point).contains("(missing) gone.txt."));
    }

    #[test]
    fn test_import_missing_directory() {
        let temp = tempfile::tempdir().unwrap();
        let mut library = library();
        assert!(matches!(
            run_import(&mut library, &temp.path().join("none")),
            Err(CliError::Import(_))
        ));
    }
}
