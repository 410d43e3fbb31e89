//! Stream-copy remux operations.
//!
//! A [`RemuxPlan`] is the tool-independent description of one rewrite: which
//! inputs, which streams, which tags, where to write. A [`MediaRemuxer`]
//! executes it. [`FfmpegRemuxer`] is the production implementation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::command::{ToolCommand, DEFAULT_TIMEOUT};
use crate::tags::MovieMetadata;
use crate::tools::get_tool_path;
use crate::Result;

/// Stream selections applied to the source input.
///
/// `0:V` (upper case) selects video streams that are not attached pictures,
/// so cover art already present in the source never survives a rewrite.
pub const SOURCE_STREAM_MAPS: &[&str] = &["0:V", "0:a?", "0:s?"];

/// Stream selection for the poster input.
pub const POSTER_STREAM_MAP: &str = "1";

/// Output video stream index the poster lands on.
///
/// Assumes the source has exactly one video stream that is not cover art.
/// `0:V` may expand to several streams, and the count is not known without
/// probing. A source with a second video stream would get that stream
/// re-encoded as PNG and flagged as `attached_pic` while the poster keeps
/// the default disposition. Multi-angle sources are not supported with a
/// poster; skip the poster for them.
pub const POSTER_OUTPUT_STREAM: &str = "v:1";

/// The complete description of one remux.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemuxPlan {
    inputs: Vec<PathBuf>,
    maps: Vec<String>,
    metadata: Vec<(String, String)>,
    attach_poster: bool,
    output: PathBuf,
}

impl RemuxPlan {
    /// Build the plan for rewriting `source` into `output`.
    ///
    /// `poster`, when given, is the path of an image file to attach as cover
    /// art.
    pub fn new(
        source: &Path,
        poster: Option<&Path>,
        tags: &MovieMetadata,
        output: &Path,
    ) -> Self {
        let mut inputs = vec![source.to_path_buf()];
        let mut maps: Vec<String> = SOURCE_STREAM_MAPS.iter().map(|m| m.to_string()).collect();

        if let Some(poster) = poster {
            inputs.push(poster.to_path_buf());
            maps.push(POSTER_STREAM_MAP.to_string());
        }

        let metadata = tags
            .container_tags()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            inputs,
            maps,
            metadata,
            attach_poster: poster.is_some(),
            output: output.to_path_buf(),
        }
    }

    /// Input files, source first.
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// Stream map directives, in order.
    pub fn maps(&self) -> &[String] {
        &self.maps
    }

    /// Container metadata pairs, in order.
    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    /// Whether a poster input is attached as cover art.
    pub fn attaches_poster(&self) -> bool {
        self.attach_poster
    }

    /// Destination of the remux.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Whether the plan keeps pre-existing attached pictures out of the
    /// output: no map may select every video stream of the source.
    pub fn excludes_source_cover_art(&self) -> bool {
        self.maps
            .iter()
            .all(|m| m != "0" && m != "0:v" && m != "0:v?")
            && self.maps.iter().any(|m| m == "0:V")
    }

    /// Render the plan as an ffmpeg argument vector.
    pub fn to_ffmpeg_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-nostdin".into()];

        for input in &self.inputs {
            args.push("-i".into());
            args.push(input.into());
        }

        for map in &self.maps {
            args.push("-map".into());
            args.push(map.into());
        }

        for (key, value) in &self.metadata {
            args.push("-metadata".into());
            args.push(format!("{key}={value}").into());
        }

        args.push("-c".into());
        args.push("copy".into());

        if self.attach_poster {
            args.push(format!("-c:{POSTER_OUTPUT_STREAM}").into());
            args.push("png".into());
            args.push(format!("-disposition:{POSTER_OUTPUT_STREAM}").into());
            args.push("attached_pic".into());
        }

        args.push("-y".into());
        args.push(self.output.as_os_str().to_owned());
        args
    }
}

/// Capability that executes a [`RemuxPlan`].
#[async_trait]
pub trait MediaRemuxer: Send + Sync {
    /// Short name of the underlying tool (e.g. `"ffmpeg"`).
    fn name(&self) -> &str;

    /// Check that the tool can be run, without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`](crate::Error::ToolNotFound) when the
    /// tool is missing.
    fn ensure_available(&self) -> Result<()>;

    /// Execute the plan, writing `plan.output()`.
    async fn remux(&self, plan: &RemuxPlan, cancel: &CancellationToken) -> Result<()>;
}

/// Remuxer backed by the `ffmpeg` command line tool.
#[derive(Debug, Clone)]
pub struct FfmpegRemuxer {
    configured_path: Option<PathBuf>,
    timeout: Duration,
}

impl Default for FfmpegRemuxer {
    fn default() -> Self {
        Self {
            configured_path: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FfmpegRemuxer {
    /// Use `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit ffmpeg binary instead of searching `PATH`.
    pub fn with_path(mut self, path: Option<PathBuf>) -> Self {
        self.configured_path = path;
        self
    }

    /// Kill ffmpeg if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolve(&self) -> Result<PathBuf> {
        get_tool_path("ffmpeg", self.configured_path.as_deref())
    }
}

#[async_trait]
impl MediaRemuxer for FfmpegRemuxer {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn ensure_available(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }

    async fn remux(&self, plan: &RemuxPlan, cancel: &CancellationToken) -> Result<()> {
        let ffmpeg = self.resolve()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Remuxing with ffmpeg: {:?} -> {:?}",
            plan.inputs(),
            plan.output()
        );

        let mut cmd = ToolCommand::new(ffmpeg);
        cmd.args(plan.to_ffmpeg_args()).timeout(self.timeout);
        cmd.execute(cancel).await?;

        Ok(())
    }
}
