//! Configuration persistence using toml_edit to preserve formatting and comments.

use anyhow::{Context, Result};
use std::path::Path;
use toml_edit::{value, DocumentMut, Item, Table};

/// Store the TMDB API key in `path`, creating the file if needed.
///
/// Every other setting, comment and blank line in the file is kept as is.
pub fn set_api_key(path: &Path, api_key: &str) -> Result<()> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key cannot be empty");
    }

    let mut doc: DocumentMut = if path.exists() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?
            .parse()
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    } else {
        DocumentMut::new()
    };

    if !doc.get("tmdb").is_some_and(Item::is_table_like) {
        doc.insert("tmdb", Item::Table(Table::new()));
    }
    doc["tmdb"]["api_key"] = value(api_key);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    std::fs::write(path, doc.to_string())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}
