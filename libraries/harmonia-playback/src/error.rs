//! Error types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The environment refused to start playback (e.g. no prior user gesture)
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// A media command was issued with no source loaded
    #[error("No source loaded")]
    NoSourceLoaded,

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Catalog error
    #[error(transparent)]
    Core(#[from] harmonia_core::CoreError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Why the media resource failed
///
/// Mirrors the `MediaError.code` values reported by browsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureReason {
    /// Fetching was aborted by the user agent (code 1)
    Aborted,
    /// A network error interrupted fetching (code 2)
    Network,
    /// The resource could not be decoded (code 3)
    Decode,
    /// The source format is not supported (code 4)
    SourceNotSupported,
    /// Any other code
    Unknown(u16),
}

impl FailureReason {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => FailureReason::Aborted,
            2 => FailureReason::Network,
            3 => FailureReason::Decode,
            4 => FailureReason::SourceNotSupported,
            other => FailureReason::Unknown(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            FailureReason::Aborted => 1,
            FailureReason::Network => 2,
            FailureReason::Decode => 3,
            FailureReason::SourceNotSupported => 4,
            FailureReason::Unknown(code) => code,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Aborted => write!(f, "loading was aborted"),
            FailureReason::Network => write!(f, "network error"),
            FailureReason::Decode => write!(f, "audio could not be decoded"),
            FailureReason::SourceNotSupported => write!(f, "audio format not supported"),
            FailureReason::Unknown(code) => write!(f, "unknown media error (code {code})"),
        }
    }
}

/// Non-fatal error recorded in the playback state
///
/// These never abort a transition. The state machine stores the latest one
/// in `PlaybackState::last_error` until the UI clears it or playback
/// recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackErrorKind {
    #[error("Playback was rejected by the environment")]
    PlaybackRejected,

    #[error("Failed to load audio: {0}")]
    DecodeFailed(FailureReason),

    #[error("Track index {index} is out of range (playlist has {len} tracks)")]
    InvalidIndex { index: usize, len: usize },

    #[error("Playlist is empty")]
    EmptyPlaylist,
}
