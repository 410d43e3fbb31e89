//! Movie lookup against an external catalog.
//!
//! # Module layout
//!
//! - [`provider`] -- Trait definition, shared data types and errors.
//! - [`providers`] -- Concrete provider implementations (TMDB).
//! - [`resolver`] -- Tiered fuzzy search with deduplication.
//! - [`mapper`] -- Catalog details to container tag record.

pub mod mapper;
pub mod provider;
pub mod providers;
pub mod resolver;

pub use mapper::map_details;
pub use provider::{
    CastMember, CrewMember, Genre, MetadataProvider, MovieDetails, ProviderError,
    ProviderResult, SearchResult,
};
pub use providers::TmdbProvider;
pub use resolver::FuzzyResolver;
