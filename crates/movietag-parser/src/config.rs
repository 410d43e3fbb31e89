//! Parser configuration.
//!
//! The only tunable part of file name parsing is the release marker
//! vocabulary: the quality, source, codec, size and release-group tokens that
//! mark the end of the title. Everything from the first marker onwards is
//! discarded.

/// Release markers recognised out of the box, matched literally.
pub const DEFAULT_LITERAL_MARKERS: &[&str] = &[
    "720p", "1080p", "2160p", "4k", "BRRip", "BDRip", "BluRay", "WEBRip", "HDTV", "WEB-DL",
    "x264", "x265", "10bit", "HEVC", "AAC", "AC3", "DTS", "GalaxyRG", "RARBG", "YTS", "YIFY",
];

/// Release markers recognised out of the box, given as regular expressions.
pub const DEFAULT_PATTERN_MARKERS: &[&str] = &[r"\d+MB", r"\d+GB"];

/// A single entry of the release marker vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReleaseMarker {
    /// A token matched literally (case-insensitive).
    Literal(String),
    /// A regular expression fragment, e.g. `\d+MB`.
    Pattern(String),
}

impl ReleaseMarker {
    /// The regex fragment this marker contributes to the combined pattern.
    pub(crate) fn to_pattern(&self) -> String {
        match self {
            ReleaseMarker::Literal(token) => regex::escape(token),
            ReleaseMarker::Pattern(pattern) => pattern.clone(),
        }
    }
}

/// Error raised when a [`ParserConfig`] cannot be compiled into a parser.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A pattern marker is not a valid regular expression.
    #[error("invalid release marker pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The underlying regex error.
        source: regex::Error,
    },
}

/// Configuration for the file name parser.
///
/// Use the builder to extend or replace the marker vocabulary:
///
/// ```
/// use movietag_parser::config::ParserConfig;
///
/// let config = ParserConfig::builder()
///     .marker("HDR")
///     .pattern(r"DDP\d\.\d")
///     .build();
/// assert!(config.markers.len() > 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserConfig {
    /// Markers that end the title. Order does not matter; the earliest match
    /// in the file name wins.
    pub markers: Vec<ReleaseMarker>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            markers: default_markers(),
        }
    }
}

impl ParserConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration builder seeded with the default vocabulary.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::default()
    }
}

fn default_markers() -> Vec<ReleaseMarker> {
    DEFAULT_LITERAL_MARKERS
        .iter()
        .map(|m| ReleaseMarker::Literal((*m).to_string()))
        .chain(
            DEFAULT_PATTERN_MARKERS
                .iter()
                .map(|p| ReleaseMarker::Pattern((*p).to_string())),
        )
        .collect()
}

/// Builder for `ParserConfig`.
#[derive(Debug, Clone)]
pub struct ParserConfigBuilder {
    markers: Vec<ReleaseMarker>,
}

impl Default for ParserConfigBuilder {
    fn default() -> Self {
        Self {
            markers: default_markers(),
        }
    }
}

impl ParserConfigBuilder {
    /// Create a new builder with the default vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every marker, including the defaults.
    pub fn clear_markers(mut self) -> Self {
        self.markers.clear();
        self
    }

    /// Add a literal marker.
    pub fn marker(mut self, token: impl Into<String>) -> Self {
        self.markers.push(ReleaseMarker::Literal(token.into()));
        self
    }

    /// Add several literal markers.
    pub fn markers<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers
            .extend(tokens.into_iter().map(|t| ReleaseMarker::Literal(t.into())));
        self
    }

    /// Add a regular expression marker.
    ///
    /// The pattern is validated when the configuration is turned into a
    /// [`Parser`](crate::Parser).
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.markers.push(ReleaseMarker::Pattern(pattern.into()));
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ParserConfig {
        ParserConfig {
            markers: self.markers,
        }
    }
}
