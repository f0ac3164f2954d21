//! ID3 metadata of audio files.

use std::path::Path;

use id3::TagLike;

use crate::tag::TagValue;

/// Read the album, artist, album artist, genre, year and first comment
/// frames of an ID3-tagged file.
pub fn id3_values(path: &Path) -> Result<Vec<(&'static str, TagValue)>, id3::Error> {
    let tag = id3::Tag::read_from_path(path)?;
    let mut values = Vec::new();

    if let Some(album) = tag.album() {
        values.push(("album", TagValue::unsorted(album)));
    }
    if let Some(artist) = tag.artist() {
        values.push(("artist", TagValue::unsorted(artist)));
    }
    if let Some(album_artist) = tag.album_artist() {
        values.push(("album_artist", TagValue::unsorted(album_artist)));
    }
    if let Some(genre) = tag.genre() {
        values.push(("genre", TagValue::unsorted(genre)));
    }
    if let Some(year) = tag.year() {
        values.push(("year", TagValue::with_sort(year.to_string(), i64::from(year))));
    }
    if let Some(comment) = tag.comments().next() {
        values.push(("comment", TagValue::unsorted(comment.text.clone())));
    }

    Ok(values)
}
