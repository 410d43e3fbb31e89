//! Workspace management for a single rewrite.

use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};

const TEMP_PREFIX: &str = ".movietag-";

/// Scoped temporary files for one rewrite.
///
/// The remux output and the poster image live next to the input file, so the
/// final move is a same-filesystem rename. Both are deleted when the
/// workspace is dropped, unless the output has been moved into place by
/// [`Workspace::finalize`].
///
/// # Example
///
/// ```no_run
/// use movietag_av::Workspace;
/// use std::path::Path;
///
/// let workspace = Workspace::new(Path::new("/movies/input.mkv"))?;
/// // ... write the rewritten container to workspace.output() ...
/// workspace.finalize(Path::new("/movies/Heat (1995).mkv"))?;
/// # Ok::<(), movietag_av::Error>(())
/// ```
#[derive(Debug)]
pub struct Workspace {
    input_path: PathBuf,
    dir: PathBuf,
    output: TempPath,
    poster: Option<TempPath>,
}

impl Workspace {
    /// Create a workspace for rewriting `input`.
    ///
    /// Reserves a hidden temporary output file with the input's extension in
    /// the input's directory.
    pub fn new(input: &Path) -> Result<Self> {
        let dir = parent_dir(input);
        let suffix = input
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let output = Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&dir)
            .map_err(|e| Error::filesystem("create temporary output in", &dir, e))?
            .into_temp_path();

        Ok(Self {
            input_path: input.to_path_buf(),
            dir,
            output,
            poster: None,
        })
    }

    /// Get the input file path.
    pub fn input(&self) -> &Path {
        &self.input_path
    }

    /// Get the temporary output path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Get the poster path, if one was written.
    pub fn poster(&self) -> Option<&Path> {
        self.poster.as_deref()
    }

    /// Write poster bytes to a temporary image file and return its path.
    pub fn write_poster(&mut self, bytes: &[u8]) -> Result<&Path> {
        let mut file = Builder::new()
            .prefix(&format!("{TEMP_PREFIX}poster-"))
            .suffix(image_extension(bytes))
            .tempfile_in(&self.dir)
            .map_err(|e| Error::filesystem("create temporary poster in", &self.dir, e))?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| Error::filesystem("write poster", file.path(), e))?;

        let poster: &Path = self.poster.insert(file.into_temp_path());
        Ok(poster)
    }

    /// Check that the tool actually produced output.
    ///
    /// A zero exit status is not enough; an empty or missing file means the
    /// tool wrote elsewhere or nothing at all.
    pub fn validate_output(&self, tool: &str) -> Result<()> {
        match std::fs::metadata(&self.output) {
            Ok(meta) if meta.len() > 0 => Ok(()),
            Ok(_) => Err(Error::tool_failed(
                tool,
                format!("produced an empty file at {}", self.output.display()),
                "",
            )),
            Err(e) => Err(Error::tool_failed(
                tool,
                format!("produced no output at {}: {e}", self.output.display()),
                "",
            )),
        }
    }

    /// Move the output into place at `destination` and retire the input.
    ///
    /// The original is only removed after the output is safely renamed to
    /// its final name, so there is never a moment where neither file exists.
    /// If the original cannot be removed, the renamed output is removed again
    /// and the original stays untouched.
    ///
    /// When `destination` is the input itself, the output atomically replaces
    /// it.
    pub fn finalize(self, destination: &Path) -> Result<PathBuf> {
        let Workspace {
            input_path,
            output,
            poster,
            ..
        } = self;

        if destination.file_name() == input_path.file_name()
            && parent_dir(destination) == parent_dir(&input_path)
        {
            output
                .persist(destination)
                .map_err(|e| Error::filesystem("replace", destination, e.error))?;
            drop(poster);
            return Ok(destination.to_path_buf());
        }

        output.persist_noclobber(destination).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                Error::DestinationExists {
                    path: destination.to_path_buf(),
                }
            } else {
                Error::filesystem("rename output to", destination, e.error)
            }
        })?;

        if let Err(e) = std::fs::remove_file(&input_path) {
            let _ = std::fs::remove_file(destination);
            return Err(Error::filesystem("remove original", &input_path, e));
        }

        drop(poster);
        Ok(destination.to_path_buf())
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent != Path::new("") => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Pick a file extension from the image's magic bytes so ffmpeg selects the
/// right demuxer.
fn image_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        ".png"
    } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP") {
        ".webp"
    } else {
        ".jpg"
    }
}
