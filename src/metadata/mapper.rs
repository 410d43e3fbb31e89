//! Mapping catalog details onto the tag record written into containers.

use movietag_av::MovieMetadata;

use super::provider::{release_year, MovieDetails};

/// At most this many cast members end up in the `actors` tag.
pub const MAX_ACTORS: usize = 5;

/// Crew job that identifies the director.
pub const DIRECTOR_JOB: &str = "Director";

/// Build the tag record for `details`, with `poster` as cover art (empty for
/// none).
pub fn map_details(details: &MovieDetails, poster: Vec<u8>) -> MovieMetadata {
    let director = details
        .crew
        .iter()
        .find(|c| c.job == DIRECTOR_JOB)
        .map(|c| c.name.clone())
        .unwrap_or_default();

    let actors = details
        .cast
        .iter()
        .take(MAX_ACTORS)
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let genres = details
        .genres
        .iter()
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    MovieMetadata {
        title: details.title.clone(),
        year: release_year(&details.release_date)
            .unwrap_or_default()
            .to_string(),
        director,
        actors,
        genres,
        poster,
    }
}
