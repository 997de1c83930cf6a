//! Read-only playback view for UI consumers

use crate::types::{PlayMode, PlaybackState};
use harmonia_core::{AlbumId, Track, TrackId};
use serde::Serialize;
use std::sync::Arc;

/// Point-in-time copy of the playback state plus derived display values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    #[serde(flatten)]
    pub state: PlaybackState,
    pub is_playing: bool,
    pub is_loading: bool,
    pub play_mode: PlayMode,
    pub current_track: Option<Arc<Track>>,
    /// Position as a percentage of the duration
    pub progress: f64,
    pub has_next_track: bool,
    pub has_previous_track: bool,
    pub playlist_length: usize,
    pub source_album_id: Option<AlbumId>,
    /// Oldest first
    pub recently_played: Vec<TrackId>,
    /// A volume fade is running
    pub is_fading: bool,
}
