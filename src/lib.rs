//! Movietag - identify movie files and tag their containers
//!
//! This library crate exposes the core functionality for the CLI and for
//! integration testing.

pub mod config;
pub mod error;
pub mod metadata;
pub mod pipeline;

pub use error::{Error, Result};
pub use pipeline::{Pipeline, Session};
