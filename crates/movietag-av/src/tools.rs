//! External tool detection.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// What probing an external tool found out.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    /// True when the binary was found and answered its version flag.
    pub available: bool,
    /// First line of the version banner.
    pub version: Option<String>,
    /// Resolved executable, configured or from `PATH`.
    pub path: Option<PathBuf>,
}

/// Probe `name`, preferring `configured` over a `PATH` lookup.
///
/// # Example
///
/// ```no_run
/// use movietag_av::check_tool;
///
/// let info = check_tool("ffmpeg", None);
/// if info.available {
///     println!("ffmpeg version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str, configured: Option<&Path>) -> ToolInfo {
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };

    let path = match get_tool_path(name, configured) {
        Ok(path) => path,
        Err(_) => return unavailable(name),
    };

    match Command::new(&path).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: Some(path),
            }
        }
        _ => unavailable(name),
    }
}

fn unavailable(name: &str) -> ToolInfo {
    ToolInfo {
        name: name.to_string(),
        available: false,
        version: None,
        path: None,
    }
}

/// Check the tools the rewriter depends on.
pub fn check_tools(ffmpeg_path: Option<&Path>) -> Vec<ToolInfo> {
    vec![check_tool("ffmpeg", ffmpeg_path)]
}

/// Require that a tool is available on `PATH`, returning its path.
///
/// # Errors
///
/// Returns [`Error::ToolNotFound`] if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool.
///
/// A configured path is authoritative: when it is set but does not exist the
/// tool counts as unavailable, rather than silently picking up a different
/// binary from `PATH`.
pub fn get_tool_path(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(Error::tool_not_found(format!(
            "{name} (configured at {})",
            path.display()
        ))),
        None => require_tool(name),
    }
}
