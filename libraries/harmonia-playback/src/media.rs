//! Media resource adapter
//!
//! `MediaElement` is the platform's decoding primitive (an `<audio>` element
//! in the browser). It reports raw lifecycle signals through a
//! [`SignalSink`]; [`MediaAdapter`] owns exactly one element, turns those
//! signals into typed [`AdapterEvent`]s and applies the load/seek/volume
//! contract on top of it.

use crate::error::{FailureReason, PlaybackError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Raw signal reported by a media element
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSignal {
    /// Fetching of the source began
    LoadStart,
    /// Enough data is buffered to start playback
    CanPlay,
    /// Duration became known
    LoadedMetadata { duration: f64 },
    /// Playback position moved
    TimeUpdate { current_time: f64 },
    /// Playback reached the end of the source
    Ended,
    /// The element reported a media error code
    Error { code: u16 },
    /// A play request was refused asynchronously
    PlayRejected { reason: String },
}

impl MediaSignal {
    /// Signal for a failed play request, keyed by the DOM exception name
    ///
    /// Only `NotAllowedError` means the environment refused playback. An
    /// `AbortError` is raised when a pause or a new source interrupts the
    /// request, and yields no signal.
    pub fn from_play_error(name: &str, reason: String) -> Option<Self> {
        (name == "NotAllowedError").then_some(MediaSignal::PlayRejected { reason })
    }
}

/// Where a media element reports its signals
///
/// Every signal is tagged with the source URI it belongs to, so late signals
/// from a replaced source can be told apart.
#[derive(Debug, Clone)]
pub struct SignalSink {
    tx: Sender<(String, MediaSignal)>,
}

impl SignalSink {
    pub fn new(tx: Sender<(String, MediaSignal)>) -> Self {
        Self { tx }
    }

    pub fn emit(&self, source: &str, signal: MediaSignal) {
        if self.tx.send((source.to_string(), signal)).is_err() {
            trace!(source, "Media signal dropped, adapter is gone");
        }
    }
}

/// Platform audio primitive driven by the adapter
///
/// Implementations must not block: `play` only requests playback, and any
/// later outcome is reported through the attached sink.
pub trait MediaElement {
    /// Replace the current source and start loading it
    fn set_source(&mut self, uri: &str);

    /// Drop the current source and release buffered data
    fn clear_source(&mut self);

    /// Request playback start
    ///
    /// # Errors
    /// `PlaybackError::PlaybackRejected` when the request is refused
    /// synchronously.
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn set_current_time(&mut self, seconds: f64);

    /// Set output volume in `[0, 1]`
    fn set_volume(&mut self, volume: f64);

    fn set_muted(&mut self, muted: bool);

    /// Start reporting signals to `sink`
    fn attach(&mut self, sink: SignalSink);

    /// Stop reporting signals and remove all listeners
    fn detach(&mut self);
}

/// Typed adapter event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterEvent {
    /// Source URI the event belongs to
    pub source: String,
    pub kind: AdapterEventKind,
}

impl AdapterEvent {
    pub fn new(source: impl Into<String>, kind: AdapterEventKind) -> Self {
        Self {
            source: source.into(),
            kind,
        }
    }
}

/// What happened to the media resource
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdapterEventKind {
    LoadStarted,
    ReadyToPlay,
    /// Duration in seconds
    MetadataLoaded(f64),
    /// Position in seconds
    TimeUpdated(f64),
    EndedNaturally,
    Failed(FailureReason),
    PlaybackRejected,
}

/// Owns one media element and translates its lifecycle
pub struct MediaAdapter<E: MediaElement> {
    element: E,
    signals: Receiver<(String, MediaSignal)>,
    source: Option<String>,
    failed: bool,
    duration: f64,
    current_time: f64,
    volume: f64,
    last_audible_volume: f64,
    muted: bool,
}

impl<E: MediaElement> MediaAdapter<E> {
    /// Take ownership of `element` and attach to its signals
    pub fn new(mut element: E) -> Self {
        let (tx, rx) = unbounded();
        element.attach(SignalSink::new(tx));

        Self {
            element,
            signals: rx,
            source: None,
            failed: false,
            duration: 0.0,
            current_time: 0.0,
            volume: 1.0,
            last_audible_volume: 1.0,
            muted: false,
        }
    }

    /// Load `uri`
    ///
    /// Reloading the current source is a no-op unless that source failed.
    /// Returns whether a new load was started.
    pub fn load(&mut self, uri: &str) -> bool {
        if self.source.as_deref() == Some(uri) && !self.failed {
            trace!(uri, "Source already loaded");
            return false;
        }

        debug!(uri, "Loading source");
        self.element.set_source(uri);
        self.source = Some(uri.to_string());
        self.failed = false;
        self.duration = 0.0;
        self.current_time = 0.0;
        true
    }

    /// Request playback of the loaded source
    pub fn play(&mut self) -> Result<()> {
        if self.source.is_none() {
            return Err(PlaybackError::NoSourceLoaded);
        }

        self.element.play().map_err(|err| {
            warn!(source = ?self.source, error = %err, "Play request refused");
            err
        })
    }

    pub fn pause(&mut self) {
        if self.source.is_some() {
            self.element.pause();
        }
    }

    /// Seek within the loaded source, clamped to `[0, duration]`
    ///
    /// Returns the position actually applied.
    pub fn seek(&mut self, seconds: f64) -> f64 {
        let target = clamp_position(seconds, self.duration);
        if self.source.is_some() {
            self.element.set_current_time(target);
            self.current_time = target;
        }
        target
    }

    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_nan() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        if volume > 0.0 {
            self.last_audible_volume = volume;
        }
        self.volume = volume;
        self.element.set_volume(volume);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.element.set_muted(muted);
    }

    /// Release the current source
    pub fn unload(&mut self) {
        if self.source.take().is_some() {
            debug!("Unloading source");
            self.element.pause();
            self.element.clear_source();
        }
        self.failed = false;
        self.duration = 0.0;
        self.current_time = 0.0;
    }

    /// Translate every pending signal into adapter events
    pub fn drain(&mut self) -> Vec<AdapterEvent> {
        let mut events = Vec::new();

        while let Ok((source, signal)) = self.signals.try_recv() {
            let kind = self.translate(&source, signal);
            trace!(source = %source, ?kind, "Media event");
            events.push(AdapterEvent { source, kind });
        }

        events
    }

    fn translate(&mut self, source: &str, signal: MediaSignal) -> AdapterEventKind {
        let current = self.source.as_deref() == Some(source);

        match signal {
            MediaSignal::LoadStart => AdapterEventKind::LoadStarted,
            MediaSignal::CanPlay => AdapterEventKind::ReadyToPlay,
            MediaSignal::LoadedMetadata { duration } => {
                let duration = finite_or_zero(duration);
                if current {
                    self.duration = duration;
                }
                AdapterEventKind::MetadataLoaded(duration)
            }
            MediaSignal::TimeUpdate { current_time } => {
                let time = clamp_position(current_time, self.duration);
                if current {
                    self.current_time = time;
                }
                AdapterEventKind::TimeUpdated(time)
            }
            MediaSignal::Ended => AdapterEventKind::EndedNaturally,
            MediaSignal::Error { code } => {
                if current {
                    self.failed = true;
                }
                AdapterEventKind::Failed(FailureReason::from_code(code))
            }
            MediaSignal::PlayRejected { reason } => {
                warn!(source, reason = %reason, "Playback rejected");
                AdapterEventKind::PlaybackRejected
            }
        }
    }

    /// Currently loaded source URI
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Last volume set above zero
    pub fn last_audible_volume(&self) -> f64 {
        self.last_audible_volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn element(&self) -> &E {
        &self.element
    }
}

impl<E: MediaElement> Drop for MediaAdapter<E> {
    fn drop(&mut self) {
        debug!("Releasing media element");
        self.element.pause();
        self.element.clear_source();
        self.element.detach();
    }
}

fn finite_or_zero(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// Clamp a position into `[0, duration]`; 0 while the duration is unknown
pub(crate) fn clamp_position(seconds: f64, duration: f64) -> f64 {
    if !seconds.is_finite() || duration <= 0.0 {
        return 0.0;
    }
    seconds.clamp(0.0, duration)
}
