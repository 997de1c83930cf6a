//! Core error types for Harmonia

use thiserror::Error;
use crate::types::{AlbumId, TrackId};

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Harmonia
#[derive(Error, Debug)]
pub enum CoreError {
    /// Album not found in the catalog
    #[error("Album not found: {0}")]
    AlbumNotFound(AlbumId),

    /// Track not found in the catalog
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Two catalog entries share an id
    #[error("Duplicate track id in catalog: {0}")]
    DuplicateTrack(TrackId),

    /// A duration string was not in `M:SS` form
    #[error("Invalid time string: {0:?}")]
    InvalidTimeFormat(String),

    /// Catalog document could not be parsed
    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
