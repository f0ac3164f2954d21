//! Tag entries as they travel from the CLI, the store layout and the
//! content inspector into the store.
//!
//! A tag is either bare (`code`) or carries a value (`language = rust`).
//! Valued tags may also carry a numeric sort key, which is what the
//! comparison queries (`year > 2000`) operate on.

use std::fmt;
use thiserror::Error;

use crate::store::Tag;

/// Separator used between a tag name and its value in directory names.
pub const VALUE_SEPARATOR: &str = " = ";

/// Stand-in for `/` in directory names, which may not contain a slash.
pub const SLASH_SUBSTITUTE: char = '\u{2215}';

/// Value half of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagValue {
    /// Display text of the value
    pub text: String,
    /// Numeric ordering key used by `<`, `>` and numeric `=`/`!=` queries
    pub sort: Option<i64>,
}

impl TagValue {
    /// Create a value, inferring the sort key when the text is an integer.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let sort = text.trim().parse::<i64>().ok();
        Self { text, sort }
    }

    /// Create a value with an explicit sort key.
    pub fn with_sort(text: impl Into<String>, sort: i64) -> Self {
        Self {
            text: text.into(),
            sort: Some(sort),
        }
    }

    /// Create a value that never takes part in numeric comparisons.
    pub fn unsorted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sort: None,
        }
    }
}

/// A tag to be applied to a point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagEntry {
    pub name: String,
    pub value: Option<TagValue>,
}

impl TagEntry {
    /// A tag without a value, e.g. `code`.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// A valued tag; integer text also becomes the sort key.
    pub fn valued(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(TagValue::new(text)),
        }
    }

    /// A valued tag with an explicit sort key.
    pub fn sorted(name: impl Into<String>, text: impl Into<String>, sort: i64) -> Self {
        Self {
            name: name.into(),
            value: Some(TagValue::with_sort(text, sort)),
        }
    }

    /// A valued tag whose text is never compared numerically.
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(TagValue::unsorted(text)),
        }
    }
}

impl fmt::Display for TagEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}{}{}", self.name, VALUE_SEPARATOR, value.text),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Errors parsing tag text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagParseError {
    /// The tag name is empty
    #[error("tag name is empty in '{0}'")]
    EmptyName(String),

    /// The explicit sort key is not an integer
    #[error("invalid sort value '{value}' in '{segment}'")]
    InvalidSort { segment: String, value: String },

    /// More `=` separated parts than `name=value=sort`
    #[error("too many '=' separated parts in '{0}'")]
    TooManyParts(String),
}

/// Format a stored tag as it appears in directory names.
pub fn format_tag(tag: &Tag) -> String {
    match &tag.value {
        Some(value) => format!("{}{}{}", tag.name, VALUE_SEPARATOR, value),
        None => tag.name.clone(),
    }
}

/// Format a stored tag as a single mount path component.
///
/// Any `/` in the tag becomes [`SLASH_SUBSTITUTE`], e.g. libmagic's
/// `8-bit/color RGBA` lists as `8-bit∕color RGBA`.
pub fn mount_name(tag: &Tag) -> String {
    format_tag(tag)
        .chars()
        .map(|c| if c == '/' { SLASH_SUBSTITUTE } else { c })
        .collect()
}

/// Undo [`mount_name`]'s substitution in a path component.
pub fn decode_mount_name(name: &str) -> String {
    name.replace(SLASH_SUBSTITUTE, "/")
}

/// Parse a command-line tag assignment such as `genre=rock` or `favourite`.
///
/// Everything after the first `=` is the value, so values may themselves
/// contain `=`.
pub fn parse_assignment(arg: &str) -> Result<TagEntry, TagParseError> {
    let (name, value) = match arg.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (arg.trim(), None),
    };

    if name.is_empty() {
        return Err(TagParseError::EmptyName(arg.to_string()));
    }

    Ok(match value {
        Some(value) => TagEntry::valued(name, value),
        None => TagEntry::bare(name),
    })
}

/// Parse one directory segment of a store layout: `name`, `name=value` or
/// `name=value=sort`.
///
/// The spaced form produced by [`mount_name`] (`name = value`) parses to the
/// same entry, slashes included.
pub fn parse_store_segment(segment: &str) -> Result<TagEntry, TagParseError> {
    let decoded = decode_mount_name(segment);
    let parts: Vec<&str> = decoded.split('=').map(str::trim).collect();

    let entry = match parts.as_slice() {
        [name] => TagEntry::bare(*name),
        [name, value] => TagEntry::valued(*name, *value),
        [name, value, sort] => {
            let sort = sort
                .parse::<i64>()
                .map_err(|_| TagParseError::InvalidSort {
                    segment: segment.to_string(),
                    value: sort.to_string(),
                })?;
            TagEntry::sorted(*name, *value, sort)
        }
        _ => return Err(TagParseError::TooManyParts(segment.to_string())),
    };

    if entry.name.is_empty() {
        return Err(TagParseError::EmptyName(segment.to_string()));
    }

    Ok(entry)
}
