//! Album types

use super::{AlbumId, Track, TrackId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An album and its tracks, in track-number order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub artist: String,
    pub cover_image: Option<String>,
    pub release_year: Option<i32>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub tracks: Vec<Arc<Track>>,
}

impl Album {
    /// Look up one of this album's tracks
    pub fn track(&self, id: TrackId) -> Option<&Arc<Track>> {
        self.tracks.iter().find(|track| track.id == id)
    }

    /// Position of a track within the album's track list
    pub fn track_index(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|track| track.id == id)
    }

    /// Sum of the nominal track durations, in seconds
    pub fn total_duration_seconds(&self) -> f64 {
        self.tracks.iter().map(|track| track.duration_seconds).sum()
    }
}

/// Album as stored in a catalog document
///
/// Track durations are `M:SS` strings and tracks inherit the album artist
/// unless they name their own.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRecord {
    pub id: AlbumId,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tracks: Vec<TrackRecord>,
}

/// Track as stored in a catalog document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub id: TrackId,
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    /// `M:SS`
    pub duration: String,
    pub audio_file: String,
}
