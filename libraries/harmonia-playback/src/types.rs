//! Core types for playback management

use crate::error::PlaybackErrorKind;
use serde::{Deserialize, Serialize};

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the playlist ends
    #[default]
    Off,

    /// Loop the entire playlist
    All,

    /// Loop the current track only
    One,
}

impl RepeatMode {
    /// Next mode in the `Off -> All -> One -> Off` cycle
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Effective navigation policy
///
/// Derived from the repeat mode and the shuffle flag. Repeat-one wins over
/// shuffle, which wins over repeat-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayMode {
    Normal,
    RepeatAll,
    RepeatOne,
    Shuffle,
}

impl PlayMode {
    pub fn from_axes(repeat: RepeatMode, shuffle: bool) -> Self {
        match (repeat, shuffle) {
            (RepeatMode::One, _) => PlayMode::RepeatOne,
            (_, true) => PlayMode::Shuffle,
            (RepeatMode::All, false) => PlayMode::RepeatAll,
            (RepeatMode::Off, false) => PlayMode::Normal,
        }
    }

    /// The `(repeat, shuffle)` pair that selects this mode
    pub fn to_axes(self) -> (RepeatMode, bool) {
        match self {
            PlayMode::Normal => (RepeatMode::Off, false),
            PlayMode::RepeatAll => (RepeatMode::All, false),
            PlayMode::RepeatOne => (RepeatMode::One, false),
            PlayMode::Shuffle => (RepeatMode::Off, true),
        }
    }
}

/// Player status
///
/// A single enum so "playing" and "loading" can never both hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    /// No track selected
    #[default]
    Idle,

    /// Source requested, not yet ready
    Loading,

    /// Ready, not playing
    Paused,

    /// Currently playing
    Playing,

    /// The media resource failed or refused to play
    Failed,
}

/// Aggregate playback state owned by the state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Index into the active playlist, `None` when it is empty
    pub current_index: Option<usize>,
    pub status: PlayerStatus,
    /// Seconds into the current track, within `[0, duration]`
    pub current_time: f64,
    /// Duration reported by the media resource, 0 until known
    pub duration: f64,
    /// Stored volume in `[0, 1]`, untouched by muting
    pub volume: f64,
    pub is_muted: bool,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub last_error: Option<PlaybackErrorKind>,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.status == PlayerStatus::Playing
    }

    pub fn is_loading(&self) -> bool {
        self.status == PlayerStatus::Loading
    }

    pub fn play_mode(&self) -> PlayMode {
        PlayMode::from_axes(self.repeat, self.shuffle)
    }

    /// Volume actually heard, 0 while muted
    pub fn effective_volume(&self) -> f64 {
        if self.is_muted {
            0.0
        } else {
            self.volume
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_index: None,
            status: PlayerStatus::Idle,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            is_muted: false,
            repeat: RepeatMode::Off,
            shuffle: false,
            last_error: None,
        }
    }
}
