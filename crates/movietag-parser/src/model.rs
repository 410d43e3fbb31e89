//! Parser output.

/// Best-effort identification of a movie from its file name.
///
/// `year` is either empty or exactly four ASCII digits in `1000..=2999`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovieInfo {
    /// Cleaned-up title guess. May be empty for file names that are nothing
    /// but release markers.
    pub title: String,
    /// Release year, or empty when none was found.
    pub year: String,
}

impl MovieInfo {
    /// The year as a search hint, `None` when no year was found.
    pub fn year_hint(&self) -> Option<&str> {
        (!self.year.is_empty()).then_some(self.year.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_hint() {
        let info = MovieInfo {
            title: "Heat".to_string(),
            year: "1995".to_string(),
        };
        assert_eq!(info.year_hint(), Some("1995"));
        assert_eq!(MovieInfo::default().year_hint(), None);
    }
}
