mod album;
mod audio;
mod ids;
mod track;

pub use album::{Album, AlbumRecord, TrackRecord};
pub use audio::AudioFormat;
pub use ids::{AlbumId, TrackId};
pub use track::Track;
