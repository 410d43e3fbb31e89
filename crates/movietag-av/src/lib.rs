//! # movietag-av
//!
//! Stream-preserving metadata rewriting for movie files.
//!
//! This crate provides functionality for:
//! - Detecting the external tools a rewrite needs (ffmpeg)
//! - Describing a stream-copy remux with new tags and cover art
//! - Running it in scoped temporary files next to the source
//! - Renaming the result to `"<title> (<year>)<ext>"` without ever deleting
//!   the original before its replacement is in place
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use movietag_av::{ContainerRewriter, FfmpegRemuxer, MovieMetadata};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> movietag_av::Result<()> {
//! let rewriter = ContainerRewriter::new(Arc::new(FfmpegRemuxer::new()));
//! let tags = MovieMetadata {
//!     title: "Heat".into(),
//!     year: "1995".into(),
//!     ..Default::default()
//! };
//! let renamed = rewriter
//!     .rewrite(Path::new("/movies/heat.1995.mkv"), &tags, &CancellationToken::new())
//!     .await?;
//! println!("{}", renamed.display());
//! # Ok(())
//! # }
//! ```

pub mod command;
mod error;
pub mod remux;
pub mod rewrite;
mod tags;
pub mod tools;
pub mod workspace;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use remux::{FfmpegRemuxer, MediaRemuxer, RemuxPlan};
pub use rewrite::{destination_path, target_file_name, ContainerRewriter};
pub use tags::MovieMetadata;
pub use tools::{check_tool, check_tools, require_tool, ToolInfo};
pub use workspace::Workspace;
