//! Static album catalog
//!
//! Loaded once from a JSON document and queried read-only afterwards. The
//! playback crate only consumes `Arc<Track>` handles from here.

use crate::error::{CoreError, Result};
use crate::time::{format_detailed_time, parse_time};
use crate::types::{Album, AlbumId, AlbumRecord, Track, TrackId};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory album catalog with id indexes
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    albums: Vec<Album>,
    album_index: HashMap<AlbumId, usize>,
    /// track id -> (album position, track position)
    track_index: HashMap<TrackId, (usize, usize)>,
}

impl Catalog {
    /// Parse a catalog document (a JSON array of albums)
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<AlbumRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Build a catalog from parsed album records
    ///
    /// Fills in each track's album id and, when missing, its artist.
    ///
    /// # Errors
    /// Fails on malformed track durations or on a track id used twice.
    pub fn from_records(records: Vec<AlbumRecord>) -> Result<Self> {
        let mut catalog = Self::default();

        for record in records {
            let mut tracks = Vec::with_capacity(record.tracks.len());
            for track in record.tracks {
                let seconds = parse_time(&track.duration)?;
                tracks.push(Arc::new(Track {
                    id: track.id,
                    number: track.number,
                    title: track.title,
                    artist: track.artist.unwrap_or_else(|| record.artist.clone()),
                    duration_seconds: f64::from(seconds),
                    source_uri: track.audio_file,
                    album_id: record.id,
                }));
            }

            catalog.insert(Album {
                id: record.id,
                title: record.title,
                artist: record.artist,
                cover_image: record.cover_image,
                release_year: record.release_year,
                genre: record.genre,
                description: record.description,
                tracks,
            })?;
        }

        Ok(catalog)
    }

    fn insert(&mut self, album: Album) -> Result<()> {
        let album_pos = self.albums.len();
        for (track_pos, track) in album.tracks.iter().enumerate() {
            if self
                .track_index
                .insert(track.id, (album_pos, track_pos))
                .is_some()
            {
                return Err(CoreError::DuplicateTrack(track.id));
            }
        }
        // A repeated album id resolves to the later album.
        self.album_index.insert(album.id, album_pos);
        self.albums.push(album);
        Ok(())
    }

    /// All albums in document order
    pub fn list_albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn get_album_by_id(&self, id: AlbumId) -> Option<&Album> {
        self.album_index.get(&id).map(|&pos| &self.albums[pos])
    }

    /// Like `get_album_by_id`, as a `Result`
    pub fn album(&self, id: AlbumId) -> Result<&Album> {
        self.get_album_by_id(id).ok_or(CoreError::AlbumNotFound(id))
    }

    /// Find a track and the album that contains it
    pub fn get_track_by_id(&self, id: TrackId) -> Option<(&Arc<Track>, &Album)> {
        self.track_index.get(&id).map(|&(album_pos, track_pos)| {
            let album = &self.albums[album_pos];
            (&album.tracks[track_pos], album)
        })
    }

    /// Like `get_track_by_id`, as a `Result`
    pub fn track(&self, id: TrackId) -> Result<(&Arc<Track>, &Album)> {
        self.get_track_by_id(id).ok_or(CoreError::TrackNotFound(id))
    }

    pub fn albums_by_genre(&self, genre: &str) -> Vec<&Album> {
        self.albums
            .iter()
            .filter(|album| album.genre.as_deref() == Some(genre))
            .collect()
    }

    /// Distinct genres in order of first appearance
    pub fn genres(&self) -> Vec<&str> {
        let mut genres: Vec<&str> = Vec::new();
        for genre in self.albums.iter().filter_map(|album| album.genre.as_deref()) {
            if !genres.contains(&genre) {
                genres.push(genre);
            }
        }
        genres
    }

    /// Case-insensitive substring match on the album artist
    pub fn albums_by_artist(&self, artist: &str) -> Vec<&Album> {
        let needle = artist.to_lowercase();
        self.albums
            .iter()
            .filter(|album| album.artist.to_lowercase().contains(&needle))
            .collect()
    }

    /// Case-insensitive substring match on album title or artist
    pub fn search_albums(&self, term: &str) -> Vec<&Album> {
        let needle = term.to_lowercase();
        self.albums
            .iter()
            .filter(|album| {
                album.title.to_lowercase().contains(&needle)
                    || album.artist.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn random_album<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Album> {
        if self.albums.is_empty() {
            return None;
        }
        Some(&self.albums[rng.gen_range(0..self.albums.len())])
    }

    /// Number of tracks on an album, 0 for unknown albums
    pub fn total_track_count(&self, id: AlbumId) -> usize {
        self.get_album_by_id(id).map_or(0, |album| album.tracks.len())
    }

    /// Total album length formatted as `H:MM:SS` / `M:SS`
    pub fn album_duration(&self, id: AlbumId) -> String {
        let seconds = self
            .get_album_by_id(id)
            .map_or(0.0, Album::total_duration_seconds);
        format_detailed_time(seconds)
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }
}
