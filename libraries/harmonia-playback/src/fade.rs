//! Volume fades
//!
//! A fade ramps the element's output volume without touching the user's
//! volume setting. The state machine has no clock, so the caller advances a
//! fade by the time elapsed since the last tick.
//!
//! Curves:
//! - Linear: straight ramp (default)
//! - EqualPower: quarter sine, constant perceived loudness
//! - SCurve: slow start and end

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::time::Duration;

/// Fade curve type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FadeCurve {
    #[default]
    Linear,
    EqualPower,
    SCurve,
}

impl FadeCurve {
    /// Gain fraction in `[0, 1]` at normalized position `t`
    pub fn shape(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self {
            FadeCurve::Linear => t,
            FadeCurve::EqualPower => (t * FRAC_PI_2).sin(),
            FadeCurve::SCurve => (1.0 - (PI * t).cos()) * 0.5,
        }
    }
}

/// Which way a fade moves the volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FadeDirection {
    /// From silence up to the user's volume
    In,
    /// From the user's volume down to silence, then pause
    Out,
}

/// Fade in progress
#[derive(Debug, Clone, PartialEq)]
pub struct Fade {
    direction: FadeDirection,
    /// Volume at full strength
    level: f64,
    duration: Duration,
    elapsed: Duration,
    curve: FadeCurve,
}

impl Fade {
    pub fn fade_in(level: f64, duration: Duration, curve: FadeCurve) -> Self {
        Self::new(FadeDirection::In, level, duration, curve)
    }

    pub fn fade_out(level: f64, duration: Duration, curve: FadeCurve) -> Self {
        Self::new(FadeDirection::Out, level, duration, curve)
    }

    fn new(direction: FadeDirection, level: f64, duration: Duration, curve: FadeCurve) -> Self {
        Self {
            direction,
            level: level.clamp(0.0, 1.0),
            duration,
            elapsed: Duration::ZERO,
            curve,
        }
    }

    /// Move the fade forward and return the new output volume
    pub fn advance(&mut self, delta: Duration) -> f64 {
        self.elapsed = self.elapsed.saturating_add(delta).min(self.duration);
        self.volume()
    }

    /// Output volume at the current position
    pub fn volume(&self) -> f64 {
        let progress = self.progress();
        let t = match self.direction {
            FadeDirection::In => progress,
            FadeDirection::Out => 1.0 - progress,
        };
        self.level * self.curve.shape(t)
    }

    /// Position in `[0, 1]`; a zero-length fade is already complete
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn direction(&self) -> FadeDirection {
        self.direction
    }
}
