//! Mount path grammar.
//!
//! Every component of a mount path is a tag query, a point file name
//! (`name.id`) or one of the reserved names below. A path containing
//! [`FLATTEN_NAME`] is a flattened view: the components before it filter the
//! points, the components after it walk the flattened hierarchy.

use std::path::{Component, Path};

/// Entry switching a directory into its flattened view.
pub const FLATTEN_NAME: &str = "@flatten";

pub use crate::library::{DIR_MARKER_NAME, FLAT_INFO_NAME};

/// Names of the normal path components of a mount-relative path.
///
/// Returns `None` for paths that are not valid UTF-8.
pub fn path_names(path: &Path) -> Option<Vec<&str>> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_str()),
            _ => None,
        })
        .collect()
}

/// A mount path split at its first `@flatten`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPath<'a> {
    Normal(Vec<&'a str>),
    Flattened {
        filter: Vec<&'a str>,
        flat: Vec<&'a str>,
    },
}

impl<'a> ParsedPath<'a> {
    pub fn parse(names: Vec<&'a str>) -> Self {
        match names.iter().position(|&name| name == FLATTEN_NAME) {
            Some(pos) => ParsedPath::Flattened {
                filter: names[..pos].to_vec(),
                flat: names[pos + 1..].to_vec(),
            },
            None => ParsedPath::Normal(names),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_names_skips_root_and_dots() {
        assert_eq!(
            path_names(Path::new("/music/./genre = rock")),
            Some(vec!["music", "genre = rock"])
        );
        assert_eq!(path_names(Path::new("")), Some(vec![]));
    }

    #[test]
    fn test_parse_normal() {
        assert_eq!(
            ParsedPath::parse(vec!["music", "year > 2000"]),
            ParsedPath::Normal(vec!["music", "year > 2000"])
        );
    }

    #[test]
    fn test_parse_flattened() {
        assert_eq!(
            ParsedPath::parse(vec!["music", "@flatten", "genre = rock"]),
            ParsedPath::Flattened {
                filter: vec!["music"],
                flat: vec!["genre = rock"],
            }
        );
        assert_eq!(
            ParsedPath::parse(vec!["@flatten"]),
            ParsedPath::Flattened {
                filter: vec![],
                flat: vec![],
            }
        );
    }
}
