//! Active playlist

use harmonia_core::{Album, AlbumId, Track};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;

/// Ordered tracks being navigated
///
/// Holds shared handles into the catalog. Replaced wholesale whenever the
/// user starts an album or a single track, and edited in place by
/// add/remove/shuffle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    tracks: Vec<Arc<Track>>,
    source_album_id: Option<AlbumId>,
}

impl Playlist {
    pub fn new(tracks: Vec<Arc<Track>>, source_album_id: Option<AlbumId>) -> Self {
        Self {
            tracks,
            source_album_id,
        }
    }

    /// Every track of an album, in album order
    pub fn from_album(album: &Album) -> Self {
        Self::new(album.tracks.clone(), Some(album.id))
    }

    /// A one-track playlist
    pub fn single(track: Arc<Track>) -> Self {
        Self::new(vec![track], None)
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Track>> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    pub fn source_album_id(&self) -> Option<AlbumId> {
        self.source_album_id
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Append a track
    pub fn push(&mut self, track: Arc<Track>) {
        self.tracks.push(track);
    }

    /// Remove the track at `index`, shifting later tracks down
    pub fn remove(&mut self, index: usize) -> Option<Arc<Track>> {
        (index < self.tracks.len()).then(|| self.tracks.remove(index))
    }

    /// Reorder the tracks uniformly at random (Fisher-Yates)
    ///
    /// Returns the new position of the track that was at `current`.
    pub fn shuffle<R: Rng + ?Sized>(
        &mut self,
        current: Option<usize>,
        rng: &mut R,
    ) -> Option<usize> {
        let mut order: Vec<usize> = (0..self.tracks.len()).collect();
        order.shuffle(rng);

        let tracks = order
            .iter()
            .map(|&index| Arc::clone(&self.tracks[index]))
            .collect();
        self.tracks = tracks;

        current.and_then(|current| order.iter().position(|&index| index == current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmonia_core::TrackId;

    fn track(id: i64) -> Arc<Track> {
        Arc::new(Track {
            id: TrackId(id),
            number: 1,
            title: format!("Track {id}"),
            artist: "Artist".to_string(),
            duration_seconds: 60.0,
            source_uri: format!("/audio/{id}.mp3"),
            album_id: AlbumId(1),
        })
    }

    #[test]
    fn album_playlist_shares_tracks() {
        let album = Album {
            id: AlbumId(1),
            title: "Album".to_string(),
            artist: "Artist".to_string(),
            cover_image: None,
            release_year: None,
            genre: None,
            description: None,
            tracks: vec![track(1), track(2)],
        };

        let playlist = Playlist::from_album(&album);
        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist.source_album_id(), Some(AlbumId(1)));
        assert!(Arc::ptr_eq(playlist.get(0).unwrap(), &album.tracks[0]));
    }

    #[test]
    fn push_and_remove() {
        let mut playlist = Playlist::single(track(1));
        playlist.push(track(2));
        playlist.push(track(3));
        assert_eq!(playlist.len(), 3);

        let removed = playlist.remove(1).unwrap();
        assert_eq!(removed.id, TrackId(2));
        assert_eq!(playlist.get(1).unwrap().id, TrackId(3));
        assert!(playlist.remove(5).is_none());
        assert_eq!(playlist.len(), 2);
    }

    #[test]
    fn shuffle_keeps_tracks_and_follows_current() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut playlist = Playlist::new((1..=10).map(track).collect(), Some(AlbumId(1)));
        let mut rng = StdRng::seed_from_u64(3);

        let position = playlist.shuffle(Some(4), &mut rng).unwrap();
        assert_eq!(playlist.get(position).unwrap().id, TrackId(5));

        let mut ids: Vec<i64> = playlist.tracks().iter().map(|t| t.id.get()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert_eq!(playlist.source_album_id(), Some(AlbumId(1)));

        let mut empty = Playlist::default();
        assert_eq!(empty.shuffle(None, &mut rng), None);
    }

    #[test]
    fn single_track_playlist() {
        let playlist = Playlist::single(track(9));
        assert_eq!(playlist.len(), 1);
        assert!(playlist.source_album_id().is_none());
        assert!(playlist.get(1).is_none());
    }
}
