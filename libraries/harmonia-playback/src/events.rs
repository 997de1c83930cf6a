//! Playback Events
//!
//! Event-based communication for UI synchronization during playback.
//! Events are emitted at key points:
//! - Status changes (loading, playing, paused, failed)
//! - Track changes
//! - Position updates from the media resource
//! - Volume, mode and playlist changes
//! - Non-fatal errors

use crate::error::PlaybackErrorKind;
use crate::types::{PlayMode, PlayerStatus};
use harmonia_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// Player status changed
    StateChanged {
        /// The new status
        status: PlayerStatus,
    },

    /// A different track (or the same track at a new index) became current
    #[serde(rename_all = "camelCase")]
    TrackChanged {
        /// Playlist index of the new track
        index: Option<usize>,
        /// ID of the new (current) track
        track_id: Option<TrackId>,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Position update from the media resource
    PositionUpdate {
        /// Seconds into the track
        position: f64,
        /// Track duration in seconds
        duration: f64,
    },

    /// Volume changed
    #[serde(rename_all = "camelCase")]
    VolumeChanged {
        /// New volume level (0.0-1.0)
        volume: f64,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Effective play mode changed
    ModeChanged {
        mode: PlayMode,
    },

    /// Playlist replaced or cleared
    PlaylistChanged {
        /// New playlist length
        length: usize,
    },

    /// Non-fatal error recorded
    Error {
        error: PlaybackErrorKind,
        /// Human readable message
        message: String,
    },
}

impl PlaybackEvent {
    pub(crate) fn error(error: PlaybackErrorKind) -> Self {
        PlaybackEvent::Error {
            message: error.to_string(),
            error,
        }
    }
}
