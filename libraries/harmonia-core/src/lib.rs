//! Harmonia Core
//!
//! Catalog types and helpers shared by the Harmonia player.
//!
//! This crate provides:
//! - **Domain Types**: `Track`, `Album`, `TrackId`, `AlbumId`, `AudioFormat`
//! - **Catalog**: album list and lookups loaded from a JSON document
//! - **Time utilities**: `M:SS` / `H:MM:SS` formatting and parsing
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use harmonia_core::{Catalog, TrackId};
//! use harmonia_core::time::format_time;
//!
//! let catalog = Catalog::from_json(r#"[{
//!     "id": 1, "title": "Forest Melody", "artist": "Natural Sounds",
//!     "tracks": [{ "id": 101, "number": 1, "title": "Morning Dew",
//!                  "duration": "4:32", "audioFile": "/audio/morning-dew.mp3" }]
//! }]"#).unwrap();
//!
//! let (track, album) = catalog.get_track_by_id(TrackId(101)).unwrap();
//! assert_eq!(album.title, "Forest Melody");
//! assert_eq!(format_time(track.duration_seconds), "4:32");
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod time;
pub mod types;

pub use catalog::Catalog;
pub use error::{CoreError, Result};
pub use types::{Album, AlbumId, AudioFormat, Track, TrackId};
