//! The tag record embedded into a container.

use std::fmt;

/// Flat, human-readable metadata written into a container, plus optional
/// cover art.
///
/// Empty fields are never written; an empty `poster` means no artwork is
/// attached.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MovieMetadata {
    pub title: String,
    /// Four-digit year or empty.
    pub year: String,
    pub director: String,
    /// Comma-space joined, at most five names.
    pub actors: String,
    /// Comma-space joined genre names.
    pub genres: String,
    /// Raw poster image bytes (JPEG or PNG as served by the catalog).
    pub poster: Vec<u8>,
}

impl MovieMetadata {
    /// Whether a poster image is attached.
    pub fn has_poster(&self) -> bool {
        !self.poster.is_empty()
    }

    /// Container metadata keys for every non-empty field, in write order.
    ///
    /// `date` mirrors `year` so players that only read one of them still
    /// pick it up.
    pub fn container_tags(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", self.title.as_str()),
            ("year", self.year.as_str()),
            ("date", self.year.as_str()),
            ("director", self.director.as_str()),
            ("actors", self.actors.as_str()),
            ("genre", self.genres.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

impl fmt::Debug for MovieMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovieMetadata")
            .field("title", &self.title)
            .field("year", &self.year)
            .field("director", &self.director)
            .field("actors", &self.actors)
            .field("genres", &self.genres)
            .field("poster_bytes", &self.poster.len())
            .finish()
    }
}
