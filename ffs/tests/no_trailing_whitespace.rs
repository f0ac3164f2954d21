//! Repository hygiene: no line of any text file ends in whitespace.
//!
//! Every file that reads as UTF-8 is checked. Patch files are left out:
//! unified diffs mark blank context lines with a single space.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

const SKIPPED_EXTENSIONS: &[&str] = &["patch", "diff"];
const SKIPPED_DIRS: &[&str] = &["target", "examples", ".git"];

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

fn checked_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !SKIPPED_DIRS.iter().any(|d| entry.file_name() == *d)
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            !path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SKIPPED_EXTENSIONS.contains(&e))
        })
        .collect()
}

#[test]
fn test_no_trailing_whitespace() {
    let root = workspace_root();
    let files = checked_files(&root);
    assert!(!files.is_empty(), "no files found under {}", root.display());

    let mut offenders = Vec::new();
    for file in &files {
        // Binary files
        let Ok(content) = fs::read_to_string(file) else {
            continue;
        };
        for (number, line) in content.lines().enumerate() {
            if line.ends_with(' ') || line.ends_with('\t') {
                offenders.push(format!("{}:{}", file.display(), number + 1));
            }
        }
    }

    assert!(offenders.is_empty(), "trailing whitespace at:\n{}", offenders.join("\n"));
}

#[test]
fn test_markdown_and_manifests_are_checked() {
    let root = workspace_root();
    let files = checked_files(&root);

    for name in ["Cargo.toml", "DESIGN.md"] {
        assert!(files.contains(&root.join(name)), "{} is not checked", name);
    }
    assert!(files.iter().all(|f| !f.starts_with(root.join("examples"))));
}
