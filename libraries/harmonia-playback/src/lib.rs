//! Harmonia - Playback Management
//!
//! Playback core for a browser music player built on a single native audio
//! element.
//!
//! This crate provides:
//! - Media adapter over a platform audio element (load, play, seek, volume)
//! - Playlist navigation (normal, repeat-all, repeat-one, shuffle)
//! - A state machine driven by user intents and media events
//! - A playback context that serializes transitions and publishes events
//! - Volume control with mute that preserves the level
//! - Volume fades with selectable curves
//! - Recently-played history (configurable size)
//! - Browser bindings behind the `wasm` feature
//!
//! # Architecture
//!
//! The UI dispatches [`Intent`]s to a [`PlaybackContext`]. The context
//! feeds them to the [`PlaybackMachine`], runs the returned
//! [`MediaCommand`]s on the [`MediaAdapter`], and feeds the adapter's
//! events back into the machine. Only the machine mutates state; the UI
//! reads [`PlaybackSnapshot`]s and subscribes to [`PlaybackEvent`]s.
//!
//! # Example: Navigating a playlist
//!
//! ```rust
//! use harmonia_core::{AlbumId, Catalog};
//! use harmonia_playback::{Intent, MediaCommand, PlaybackConfig, PlaybackMachine, Playlist};
//!
//! let catalog = Catalog::from_json(r#"[{
//!     "id": 1, "title": "Forest Melody", "artist": "Natural Sounds",
//!     "tracks": [
//!         { "id": 1, "number": 1, "title": "Morning Dew", "duration": "4:32", "audioFile": "/audio/1.mp3" },
//!         { "id": 2, "number": 2, "title": "Birdsong", "duration": "3:45", "audioFile": "/audio/2.mp3" }
//!     ]
//! }]"#).unwrap();
//! let album = catalog.get_album_by_id(AlbumId(1)).unwrap();
//!
//! let mut machine = PlaybackMachine::new(&PlaybackConfig::default());
//! let commands = machine.apply(Intent::SetPlaylist {
//!     playlist: Playlist::from_album(album),
//!     start_index: 0,
//!     autoplay: true,
//! });
//! assert_eq!(commands, vec![MediaCommand::Load("/audio/1.mp3".to_string())]);
//!
//! let commands = machine.apply(Intent::Next);
//! assert_eq!(commands, vec![MediaCommand::Load("/audio/2.mp3".to_string())]);
//! assert_eq!(machine.state().current_index, Some(1));
//! ```
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use harmonia_playback::{Intent, MediaElement, PlaybackConfig, PlaybackContext, Result, SignalSink};
//!
//! // Implement MediaElement for your platform
//! struct MyAudioElement {
//!     sink: Option<SignalSink>,
//! }
//!
//! impl MediaElement for MyAudioElement {
//!     fn set_source(&mut self, uri: &str) { /* start loading */ }
//!     fn clear_source(&mut self) {}
//!     fn play(&mut self) -> Result<()> { Ok(()) }
//!     fn pause(&mut self) {}
//!     fn set_current_time(&mut self, seconds: f64) {}
//!     fn set_volume(&mut self, volume: f64) {}
//!     fn set_muted(&mut self, muted: bool) {}
//!     fn attach(&mut self, sink: SignalSink) { self.sink = Some(sink); }
//!     fn detach(&mut self) { self.sink = None; }
//! }
//!
//! let context = PlaybackContext::new(&PlaybackConfig::default(), MyAudioElement { sink: None });
//! let events = context.subscribe();
//! context.dispatch(Intent::Play);
//!
//! // Call after the element reports signals
//! context.pump();
//! for event in events.try_iter() {
//!     println!("{event:?}");
//! }
//! ```

mod config;
mod context;
mod error;
mod events;
mod fade;
mod history;
mod machine;
mod media;
pub mod navigation;
mod playlist;
mod snapshot;
pub mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use config::PlaybackConfig;
pub use context::PlaybackContext;
pub use error::{FailureReason, PlaybackError, PlaybackErrorKind, Result};
pub use events::PlaybackEvent;
pub use fade::{Fade, FadeCurve, FadeDirection};
pub use history::History;
pub use machine::{Input, Intent, MediaCommand, PlaybackMachine};
pub use media::{AdapterEvent, AdapterEventKind, MediaAdapter, MediaElement, MediaSignal, SignalSink};
pub use navigation::ShuffleHistory;
pub use playlist::Playlist;
pub use snapshot::PlaybackSnapshot;
pub use types::{PlayMode, PlaybackState, PlayerStatus, RepeatMode};
pub use volume::Volume;
