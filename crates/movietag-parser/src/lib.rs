//! # movietag-parser
//!
//! Best-effort extraction of a movie title and release year from a file
//! name, as used to seed a metadata search.
//!
//! ## Quick Start
//!
//! ```
//! use movietag_parser::parse;
//!
//! let info = parse("/downloads/The.Matrix.1999.1080p.BluRay.x264-GROUP.mkv");
//!
//! assert_eq!(info.title, "The Matrix");
//! assert_eq!(info.year, "1999");
//! ```
//!
//! ## Configurable Parsing
//!
//! ```
//! use movietag_parser::Parser;
//! use movietag_parser::config::ParserConfig;
//!
//! let config = ParserConfig::builder().marker("REMUX").build();
//! let parser = Parser::new(config)?;
//!
//! let info = parser.parse("Heat.REMUX.mkv");
//! assert_eq!(info.title, "Heat");
//! # Ok::<(), movietag_parser::config::ConfigError>(())
//! ```

pub mod config;
mod model;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use config::{ConfigError, ParserConfig};
pub use model::MovieInfo;

/// Four digits starting with 1 or 2, optionally in parentheses. Word
/// boundaries keep resolutions such as `1080p` from being read as a year.
const YEAR_PATTERN: &str = r"\(?\b([12][0-9]{3})\b\)?";

static DEFAULT_PARSER: LazyLock<Parser> = LazyLock::new(|| {
    Parser::new(ParserConfig::default()).expect("built-in release markers are valid patterns")
});

/// Parse a file path using the default release marker vocabulary.
///
/// Never fails: unrecognisable names degrade to the cleaned-up file stem with
/// an empty year.
pub fn parse(path: impl AsRef<Path>) -> MovieInfo {
    DEFAULT_PARSER.parse(path)
}

/// A file name parser with a compiled release marker vocabulary.
#[derive(Debug, Clone)]
pub struct Parser {
    config: ParserConfig,
    year: Regex,
    markers: Option<Regex>,
}

impl Default for Parser {
    fn default() -> Self {
        DEFAULT_PARSER.clone()
    }
}

impl Parser {
    /// Compile a parser from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] when a pattern marker does not
    /// compile.
    pub fn new(config: ParserConfig) -> Result<Self, ConfigError> {
        for marker in &config.markers {
            if let config::ReleaseMarker::Pattern(pattern) = marker {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            }
        }

        let markers = if config.markers.is_empty() {
            None
        } else {
            let alternation = config
                .markers
                .iter()
                .map(|m| m.to_pattern())
                .collect::<Vec<_>>()
                .join("|");
            let combined = format!(r"(?i)\b(?:{alternation})");
            Some(
                Regex::new(&combined).map_err(|source| ConfigError::InvalidPattern {
                    pattern: combined.clone(),
                    source,
                })?,
            )
        };

        let year = Regex::new(YEAR_PATTERN).map_err(|source| ConfigError::InvalidPattern {
            pattern: YEAR_PATTERN.to_string(),
            source,
        })?;

        Ok(Self {
            config,
            year,
            markers,
        })
    }

    /// The configuration this parser was compiled from.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Extract a title and year guess from a file path.
    ///
    /// The steps run in a fixed order, each relying on the previous one:
    /// strip directory and extension, turn `.` and `_` into spaces, cut out
    /// the first year token, truncate at the first release marker, then
    /// normalise whitespace.
    pub fn parse(&self, path: impl AsRef<Path>) -> MovieInfo {
        let stem = path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut name = stem.replace(['.', '_'], " ");

        let mut year = String::new();
        if let Some(caps) = self.year.captures(&name) {
            if let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) {
                year = digits.as_str().to_string();
                name.replace_range(whole.range(), " ");
            }
        }

        if let Some(markers) = &self.markers {
            if let Some(m) = markers.find(&name) {
                name.truncate(m.start());
            }
        }

        let title = name.split_whitespace().collect::<Vec<_>>().join(" ");

        MovieInfo { title, year }
    }
}
