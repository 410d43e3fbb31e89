pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `[tmdb] api_key`.
pub const API_KEY_ENV: &str = "MOVIETAG_TMDB_API_KEY";

/// Locations searched, in order, when no config file is given.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["./movietag.toml", "~/.config/movietag/config.toml"];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_CONFIG_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Where `set-api-key` writes when no config file is given: the first
/// existing default location, else the per-user one.
pub fn default_config_path() -> PathBuf {
    let expanded: Vec<PathBuf> = DEFAULT_CONFIG_PATHS
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .collect();

    expanded
        .iter()
        .find(|p| p.exists())
        .or_else(|| expanded.last())
        .cloned()
        .unwrap_or_else(|| PathBuf::from("movietag.toml"))
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.tmdb.api_key = key.trim().to_string();
        }
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.tmdb.timeout_secs == 0 {
        anyhow::bail!("tmdb.timeout_secs cannot be 0");
    }

    if config.tools.timeout_secs == 0 {
        anyhow::bail!("tools.timeout_secs cannot be 0");
    }

    if config.files.extensions.is_empty() {
        anyhow::bail!("files.extensions cannot be empty");
    }

    if config.tmdb.base_url.trim().is_empty() || config.tmdb.image_base_url.trim().is_empty() {
        anyhow::bail!("tmdb.base_url and tmdb.image_base_url cannot be empty");
    }

    config
        .parser
        .build_parser()
        .context("Invalid release marker in [parser]")?;

    if let Some(ref ffmpeg) = config.tools.ffmpeg_path {
        if !ffmpeg.exists() {
            tracing::warn!("Configured ffmpeg does not exist: {:?}", ffmpeg);
        }
    }

    Ok(())
}
