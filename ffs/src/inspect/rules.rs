//! Mapping of libmagic descriptions to tags.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use super::audio::id3_values;
use crate::tag::{TagEntry, TagValue};

/// Separator between the parts of a libmagic description.
const PART_SEPARATOR: &str = ", ";

/// Marker files that identify a project directory, with the tags they add.
const DIRECTORY_MARKERS: &[(&str, &[(&str, Option<&str>)])] = &[
    (".git", &[("code", None), ("git", None)]),
    (
        "package.json",
        &[("code", None), ("language", Some("javascript")), ("npm", None)],
    ),
    (
        "Cargo.toml",
        &[("code", None), ("language", Some("rust")), ("cargo", None)],
    ),
    (
        "elm.json",
        &[("code", None), ("language", Some("elm")), ("elm", None)],
    ),
];

/// Extension refinements of text files: language, and whether it is code.
const TEXT_EXTENSIONS: &[(&str, &str, bool)] = &[
    ("rs", "rust", true),
    ("js", "javascript", true),
    ("elm", "elm", true),
    ("json", "json", false),
    ("toml", "toml", false),
    ("nix", "nix", false),
    ("ini", "ini", false),
];

/// Tags keyed by name; a later rule replaces an earlier one.
#[derive(Default)]
struct TagMap(BTreeMap<String, Option<TagValue>>);

impl TagMap {
    fn flag(&mut self, name: &str) {
        self.0.insert(name.to_string(), None);
    }

    fn text(&mut self, name: &str, text: &str) {
        self.0
            .insert(name.to_string(), Some(TagValue::unsorted(text)));
    }

    fn value(&mut self, name: &str, value: TagValue) {
        self.0.insert(name.to_string(), Some(value));
    }

    fn into_entries(self) -> Vec<TagEntry> {
        self.0
            .into_iter()
            .map(|(name, value)| TagEntry {
                name,
                value: value.map(|mut value| {
                    value.text = value.text.trim_matches('\0').to_string();
                    value
                }),
            })
            .collect()
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// `800 x 600` or `1920x1080`.
fn parse_resolution(part: &str) -> Option<(i64, i64)> {
    let (width, height) = part.split_once('x')?;
    let width = width.trim().parse().ok()?;
    let height = height.trim().parse().ok()?;
    Some((width, height))
}

fn image_part(tags: &mut TagMap, part: &str) {
    if let Some((width, height)) = parse_resolution(part) {
        tags.text("resolution", &format!("{}x{}", width, height));
        tags.value("width", TagValue::with_sort(width.to_string(), width));
        tags.value("height", TagValue::with_sort(height.to_string(), height));
    }

    if let Some((key, value)) = part.split_once('=') {
        let name = match key {
            "manufacturer" => "camera_manufacturer",
            "software" => "camera_software",
            "model" => "camera_model",
            _ => return,
        };
        tags.text(name, value);
    }
}

fn directory_part(tags: &mut TagMap, path: &Path) {
    for (marker, marker_tags) in DIRECTORY_MARKERS {
        if !path.join(marker).exists() {
            continue;
        }
        for (name, value) in *marker_tags {
            match value {
                Some(value) => tags.text(name, value),
                None => tags.flag(name),
            }
        }
    }
}

fn text_part(tags: &mut TagMap, path: &Path) {
    tags.flag("text");

    let Some(ext) = extension(path) else {
        return;
    };

    if let Some((_, language, is_code)) = TEXT_EXTENSIONS.iter().find(|(e, _, _)| *e == ext) {
        if *is_code {
            tags.flag("code");
        }
        tags.text("language", language);
    }
}

fn id3_part(tags: &mut TagMap, path: &Path) {
    let kind = match extension(path) {
        Some("mp3") => "mp3",
        _ => "audio",
    };
    tags.text("type", kind);

    match id3_values(path) {
        Ok(values) => {
            for (name, value) in values {
                tags.value(name, value);
            }
        }
        Err(e) => warn!(path = %path.display(), error = %e, "unreadable ID3 data"),
    }
}

/// Derive tags from a libmagic description of the content at `path`.
///
/// The description is processed part by part; the full description is always
/// kept as the `magic` tag. The result is ordered by tag name.
pub fn describe_tags(description: &str, path: &Path) -> Vec<TagEntry> {
    let mut tags = TagMap::default();
    let mut is_image = false;

    for (index, part) in description.split(PART_SEPARATOR).enumerate() {
        if index == 0 {
            if let Some(word) = part.split_whitespace().next() {
                tags.text("type", &word.to_lowercase());
            }
            is_image = part == "PNG image data" || part == "JPEG image data";
        }

        if is_image {
            image_part(&mut tags, part);
        }

        match part {
            "directory" => directory_part(&mut tags, path),
            "ASCII text" => {
                tags.flag("ascii");
                text_part(&mut tags, path);
            }
            "C source" => {
                tags.flag("code");
                tags.text("language", "c");
                text_part(&mut tags, path);
            }
            "Python script" => {
                tags.flag("code");
                tags.text("language", "python");
            }
            "dynamically linked" => tags.text("linker", "dynamic"),
            "Zip archive data" => tags.flag("archive"),
            "WAVE audio" => {
                tags.text("type", "wav");
                tags.flag("audio");
            }
            _ => {}
        }

        if part.starts_with("ELF 64-bit") {
            tags.flag("elf");
            tags.text("arch", "x86_64");
        } else if part.starts_with("ELF 32-bit") {
            tags.flag("elf");
            tags.text("arch", "i686");
        }

        if part.starts_with("MP4 ") {
            tags.text("type", "mp4");
            tags.flag("video");
        }

        if part.contains(" ID3 ") {
            id3_part(&mut tags, path);
        }
    }

    tags.text("magic", description);
    tags.into_entries()
}
