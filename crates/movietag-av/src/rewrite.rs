//! Container rewriting: tags and cover art in, renamed file out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::remux::{MediaRemuxer, RemuxPlan};
use crate::tags::MovieMetadata;
use crate::{Error, Result, Workspace};

/// Rewrites a container's metadata without re-encoding, then renames it to
/// `"<title> (<year>)<ext>"`.
#[derive(Clone)]
pub struct ContainerRewriter {
    remuxer: Arc<dyn MediaRemuxer>,
}

impl std::fmt::Debug for ContainerRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerRewriter")
            .field("remuxer", &self.remuxer.name())
            .finish()
    }
}

impl ContainerRewriter {
    /// Create a rewriter that delegates the remux to `remuxer`.
    pub fn new(remuxer: Arc<dyn MediaRemuxer>) -> Self {
        Self { remuxer }
    }

    /// Rewrite `source` with `tags` and return the new path.
    ///
    /// Nothing on disk changes until the remux tool is known to exist and
    /// the destination name is known to be free. The original is removed
    /// only after the rewritten file is in place under its new name.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolNotFound`] if the remux tool is missing.
    /// - [`Error::FileNotFound`] if `source` does not exist.
    /// - [`Error::DestinationExists`] if another file already has the target
    ///   name.
    /// - [`Error::ToolFailed`] if the remux fails or produces no output.
    /// - [`Error::Filesystem`] for temp file, rename or removal failures.
    /// - [`Error::Cancelled`] if `cancel` fires during the remux.
    pub async fn rewrite(
        &self,
        source: &Path,
        tags: &MovieMetadata,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        self.remuxer.ensure_available()?;

        if !source.is_file() {
            return Err(Error::file_not_found(source));
        }

        let destination = destination_path(source, tags);
        let in_place = destination.file_name() == source.file_name();
        if !in_place && destination.exists() {
            return Err(Error::DestinationExists { path: destination });
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            poster = tags.has_poster(),
            "Rewriting container metadata"
        );

        let mut workspace = Workspace::new(source)?;
        if tags.has_poster() {
            workspace.write_poster(&tags.poster)?;
        }

        let plan = RemuxPlan::new(
            workspace.input(),
            workspace.poster(),
            tags,
            workspace.output(),
        );
        self.remuxer.remux(&plan, cancel).await?;
        workspace.validate_output(self.remuxer.name())?;

        let final_path = workspace.finalize(&destination)?;

        #[cfg(feature = "tracing")]
        tracing::info!(path = %final_path.display(), "Rewrite complete");

        Ok(final_path)
    }
}

/// The file name a rewritten container gets: `"<title> (<year>)<ext>"`.
///
/// Path separators in the title are replaced so the file stays in its
/// directory. Without a year the parenthesised part is left out; without a
/// title the source stem is kept.
pub fn target_file_name(source: &Path, tags: &MovieMetadata) -> String {
    let extension = source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let title = tags.title.trim().replace(['/', '\\', '\0'], "-");
    let title = if title.is_empty() {
        source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        title
    };

    if tags.year.is_empty() {
        format!("{title}{extension}")
    } else {
        format!("{title} ({}){extension}", tags.year)
    }
}

/// Full destination path beside `source`.
pub fn destination_path(source: &Path, tags: &MovieMetadata) -> PathBuf {
    let name = target_file_name(source, tags);
    match source.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
