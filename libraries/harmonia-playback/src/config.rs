//! Playback configuration
//!
//! Defaults can be overridden by an optional config file and by
//! `HARMONIA_*` environment variables (`HARMONIA_VOLUME=0.5`,
//! `HARMONIA_SHUFFLE=true`, ...).

use crate::error::Result;
use crate::fade::FadeCurve;
use crate::types::RepeatMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the playback machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Maximum recently-played history size (default: 50)
    pub history_size: usize,

    /// Initial volume in `[0, 1]` (default: 1.0)
    pub volume: f64,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// Seed for the shuffle generator; entropy is used when absent
    pub shuffle_seed: Option<u64>,

    /// Curve used by fade in and fade out (default: Linear)
    pub fade_curve: FadeCurve,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            history_size: 50,
            volume: 1.0,
            repeat: RepeatMode::Off,
            shuffle: false,
            shuffle_seed: None,
            fade_curve: FadeCurve::Linear,
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// A missing file is not an error. Environment variables take precedence
    /// over the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path.filter(|path| path.exists()) {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("HARMONIA").try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        Ok(config.normalized())
    }

    /// Clamp values into their valid ranges
    pub fn normalized(mut self) -> Self {
        self.volume = if self.volume.is_nan() {
            1.0
        } else {
            self.volume.clamp(0.0, 1.0)
        };
        self
    }
}
