//! WASM bindings for harmonia-playback
//!
//! `HtmlAudioMedia` drives an `<audio>` element, and `WasmPlayer` exposes
//! the playback context to JavaScript.

pub mod catalog;
pub mod media;
pub mod player;

pub use catalog::WasmCatalog;
pub use media::HtmlAudioMedia;
pub use player::WasmPlayer;
