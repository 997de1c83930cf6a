//! Track domain type

use super::{AlbumId, AudioFormat, TrackId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single playable audio item
///
/// Immutable once loaded. The catalog owns tracks behind `Arc` and playlists
/// hold clones of that `Arc`, never copies of the track itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Catalog-unique identifier
    pub id: TrackId,

    /// Position within the album (1-based)
    pub number: u32,

    /// Track title
    pub title: String,

    /// Performing artist
    pub artist: String,

    /// Nominal duration from the catalog
    pub duration_seconds: f64,

    /// Opaque URI resolved by the platform's resource loader
    pub source_uri: String,

    /// Album this track belongs to
    pub album_id: AlbumId,
}

impl Track {
    /// Nominal duration as a `Duration`
    pub fn duration(&self) -> Duration {
        if self.duration_seconds.is_finite() && self.duration_seconds > 0.0 {
            Duration::from_secs_f64(self.duration_seconds)
        } else {
            Duration::ZERO
        }
    }

    /// Audio container guessed from the source URI extension
    pub fn format(&self) -> Option<AudioFormat> {
        AudioFormat::from_uri(&self.source_uri)
    }
}
