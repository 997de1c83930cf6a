//! Volume control
//!
//! Linear `[0, 1]` volume as understood by the browser media element, with a
//! mute flag that never touches the stored level.

/// Volume controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f64,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller, clamping `level` into `[0, 1]`
    pub fn new(level: f64) -> Self {
        Self {
            level: clamp_level(level).unwrap_or(1.0),
            muted: false,
        }
    }

    /// Set volume level
    ///
    /// Values outside `[0, 1]` are clamped and NaN is ignored. Raising the
    /// level above zero while muted also un-mutes. Returns whether anything
    /// changed.
    pub fn set_level(&mut self, level: f64) -> bool {
        let Some(level) = clamp_level(level) else {
            return false;
        };
        let before = *self;
        self.level = level;
        if self.muted && level > 0.0 {
            self.muted = false;
        }
        *self != before
    }

    /// Get current volume level
    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level actually heard: 0.0 if muted
    pub fn gain(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn clamp_level(level: f64) -> Option<f64> {
    if level.is_nan() {
        None
    } else {
        Some(level.clamp(0.0, 1.0))
    }
}
