use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use movietag_parser::config::{ConfigError, ParserConfig};

use crate::metadata::providers::tmdb;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub parser: ParserSettings,

    #[serde(default)]
    pub files: FilesConfig,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// API key. `MOVIETAG_TMDB_API_KEY` takes precedence.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_tmdb_timeout")]
    pub timeout_secs: u64,
}

fn default_language() -> String {
    tmdb::DEFAULT_LANGUAGE.to_string()
}

fn default_base_url() -> String {
    tmdb::TMDB_BASE_URL.to_string()
}

fn default_image_base_url() -> String {
    tmdb::TMDB_IMAGE_BASE.to_string()
}

fn default_tmdb_timeout() -> u64 {
    tmdb::REQUEST_TIMEOUT.as_secs()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            timeout_secs: default_tmdb_timeout(),
        }
    }
}

impl TmdbConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &if self.has_api_key() { "<set>" } else { "" })
            .field("language", &self.language)
            .field("base_url", &self.base_url)
            .field("image_base_url", &self.image_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit ffmpeg binary. When set, `PATH` is not searched.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Remux timeout in seconds (default: 1800)
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

fn default_tool_timeout() -> u64 {
    movietag_av::command::DEFAULT_TIMEOUT.as_secs()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            timeout_secs: default_tool_timeout(),
        }
    }
}

impl ToolsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Additions to the built-in release marker vocabulary.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ParserSettings {
    /// Literal markers, matched case-insensitively at the start of a word.
    #[serde(default)]
    pub extra_markers: Vec<String>,

    /// Regular expression markers.
    #[serde(default)]
    pub extra_patterns: Vec<String>,
}

impl ParserSettings {
    /// Default vocabulary plus the configured extras.
    pub fn parser_config(&self) -> ParserConfig {
        let mut builder = ParserConfig::builder();
        for marker in &self.extra_markers {
            builder = builder.marker(marker.as_str());
        }
        for pattern in &self.extra_patterns {
            builder = builder.pattern(pattern.as_str());
        }
        builder.build()
    }

    /// Compile the parser for these settings.
    pub fn build_parser(&self) -> Result<movietag_parser::Parser, ConfigError> {
        movietag_parser::Parser::new(self.parser_config())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesConfig {
    /// Accepted file extensions, without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "m4v", "mpg", "mpeg", "wmv", "flv",
];

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

impl FilesConfig {
    /// Whether `path` has one of the accepted extensions (case-insensitive).
    pub fn is_supported(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}
