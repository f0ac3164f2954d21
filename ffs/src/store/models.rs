//! Row types.

use std::path::Path;

/// A registered file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub id: i64,
    /// Display name, usually the file name at registration time
    pub name: String,
    /// Real location; `None` once the backing file has disappeared
    pub path: Option<String>,
    /// SHA-256 of the content (hex)
    pub hash: String,
    /// Whether the point is a directory
    pub dir: bool,
}

impl Point {
    /// Name of the point inside the mount: `name.id`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.id)
    }

    /// Real location as a path.
    pub fn target(&self) -> Option<&Path> {
        self.path.as_deref().map(Path::new)
    }
}

/// Values for inserting a new point.
#[derive(Debug, Clone)]
pub struct NewPoint {
    pub name: String,
    pub path: Option<String>,
    pub hash: String,
    pub dir: bool,
}

/// A stored tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub value: Option<String>,
    pub sort_value: Option<i64>,
}

/// Split a mount file name `name.id` into its name and point id.
///
/// Returns `None` when the last `.` separated part is not an id or the name
/// part is empty.
pub fn parse_point_file_name(file_name: &str) -> Option<(&str, i64)> {
    let (name, id) = file_name.rsplit_once('.')?;
    if name.is_empty() || id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let id = id.parse::<i64>().ok()?;
    Some((name, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_round_trip() {
        let point = Point {
            id: 42,
            name: "song.mp3".to_string(),
            path: Some("/music/song.mp3".to_string()),
            hash: "abc".to_string(),
            dir: false,
        };

        assert_eq!(point.file_name(), "song.mp3.42");
        assert_eq!(parse_point_file_name(&point.file_name()), Some(("song.mp3", 42)));
        assert_eq!(point.target(), Some(Path::new("/music/song.mp3")));
    }

    #[test]
    fn test_parse_rejects_non_ids() {
        assert_eq!(parse_point_file_name("notes.txt"), None);
        assert_eq!(parse_point_file_name("width = 1.5x"), None);
        assert_eq!(parse_point_file_name(".7"), None);
        assert_eq!(parse_point_file_name("plain"), None);
        assert_eq!(parse_point_file_name("a.-1"), None);
    }
}
