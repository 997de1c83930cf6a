//! Playback state machine
//!
//! All playback state changes go through [`PlaybackMachine::apply`]. It takes
//! either a user [`Intent`] or an [`AdapterEvent`], updates the state, and
//! returns the [`MediaCommand`]s the caller must run against the media
//! adapter. Commands never complete synchronously; their outcome comes back
//! later as further adapter events.

use crate::{
    config::PlaybackConfig,
    error::PlaybackErrorKind,
    events::PlaybackEvent,
    fade::{Fade, FadeCurve, FadeDirection},
    history::History,
    media::{clamp_position, AdapterEvent, AdapterEventKind},
    navigation::{self, ShuffleHistory},
    playlist::Playlist,
    snapshot::PlaybackSnapshot,
    types::{PlayMode, PlaybackState, PlayerStatus, RepeatMode},
    volume::Volume,
};
use harmonia_core::time::progress_percent;
use harmonia_core::{Track, TrackId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// User intent
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Play,
    Pause,
    TogglePlayPause,
    /// Jump to a playlist index and start playing it
    SelectTrack(usize),
    Next,
    Previous,
    /// Seek to a position in seconds
    Seek(f64),
    /// Set volume in `[0, 1]`
    SetVolume(f64),
    ToggleMute,
    SetPlayMode(PlayMode),
    /// Cycle repeat `Off -> All -> One -> Off`, keeping shuffle
    ToggleRepeatCycle,
    ToggleShuffle,
    /// Replace the playlist and load `start_index`
    SetPlaylist {
        playlist: Playlist,
        start_index: usize,
        autoplay: bool,
    },
    ClearPlaylist,
    /// Append a track; an empty playlist makes it current without playing
    AddToPlaylist(Arc<Track>),
    /// Remove the track at an index, keeping the current track when possible
    RemoveFromPlaylist(usize),
    /// Reorder the playlist at random, keeping the current track
    ShufflePlaylist,
    ClearHistory,
    /// Pause and rewind to the start of the current track
    Stop,
    ClearError,
    /// Start playing from silence and ramp up to the volume
    FadeIn(Duration),
    /// Ramp down to silence, then pause
    FadeOut(Duration),
    /// Advance the running fade by the time elapsed since the last tick
    FadeTick(Duration),
}

/// Input to the transition function
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Intent(Intent),
    Media(AdapterEvent),
}

impl From<Intent> for Input {
    fn from(intent: Intent) -> Self {
        Input::Intent(intent)
    }
}

impl From<AdapterEvent> for Input {
    fn from(event: AdapterEvent) -> Self {
        Input::Media(event)
    }
}

/// Side effect requested from the media adapter
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
    SetMuted(bool),
    Unload,
}

/// Playback state machine
///
/// Generic over the random source used for shuffle, so tests can pass a
/// seeded generator.
pub struct PlaybackMachine<R: Rng = StdRng> {
    state: PlaybackState,
    volume: Volume,
    playlist: Playlist,
    shuffle_history: ShuffleHistory,
    recently_played: History<TrackId>,
    rng: R,

    fade: Option<Fade>,
    fade_curve: FadeCurve,

    /// Source URI of the last `Load` command; adapter events for any other
    /// source are stale
    requested_source: Option<String>,

    /// Start playback once the requested source is ready
    pending_play: bool,

    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackMachine<StdRng> {
    /// Create a machine from configuration
    ///
    /// Uses `shuffle_seed` when set, entropy otherwise.
    pub fn new(config: &PlaybackConfig) -> Self {
        let rng = config
            .shuffle_seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self::with_rng(config, rng)
    }
}

impl Default for PlaybackMachine<StdRng> {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}

impl<R: Rng> PlaybackMachine<R> {
    /// Create a machine with an explicit random source
    pub fn with_rng(config: &PlaybackConfig, rng: R) -> Self {
        let volume = Volume::new(config.volume);
        let state = PlaybackState {
            volume: volume.level(),
            is_muted: volume.is_muted(),
            repeat: config.repeat,
            shuffle: config.shuffle,
            ..PlaybackState::default()
        };

        Self {
            state,
            volume,
            playlist: Playlist::default(),
            shuffle_history: ShuffleHistory::new(),
            recently_played: History::new(config.history_size),
            rng,
            fade: None,
            fade_curve: config.fade_curve,
            requested_source: None,
            pending_play: false,
            pending_events: Vec::new(),
        }
    }

    /// Commands that bring a fresh media element in line with the state
    pub fn initial_commands(&self) -> Vec<MediaCommand> {
        vec![
            MediaCommand::SetVolume(self.volume.level()),
            MediaCommand::SetMuted(self.volume.is_muted()),
        ]
    }

    /// Apply one input and return the media commands it requires
    pub fn apply(&mut self, input: impl Into<Input>) -> Vec<MediaCommand> {
        let mut commands = Vec::new();
        match input.into() {
            Input::Intent(intent) => self.apply_intent(intent, &mut commands),
            Input::Media(event) => self.apply_media(event, &mut commands),
        }
        commands
    }

    // ===== Intents =====

    fn apply_intent(&mut self, intent: Intent, commands: &mut Vec<MediaCommand>) {
        debug!(?intent, status = ?self.state.status, "Applying intent");

        match intent {
            Intent::Play => self.play(commands),
            Intent::Pause => {
                self.cancel_fade(commands);
                self.pause(commands);
            }
            Intent::TogglePlayPause => {
                if self.wants_playback() {
                    self.cancel_fade(commands);
                    self.pause(commands);
                } else {
                    self.play(commands);
                }
            }
            Intent::SelectTrack(index) => self.select_track(index, commands),
            Intent::Next => self.navigate(true, commands),
            Intent::Previous => self.navigate(false, commands),
            Intent::Seek(seconds) => self.seek(seconds, commands),
            Intent::SetVolume(level) => {
                self.cancel_fade(commands);
                self.set_volume(level, commands);
            }
            Intent::ToggleMute => {
                self.volume.toggle_mute();
                commands.push(MediaCommand::SetMuted(self.volume.is_muted()));
                self.sync_volume();
            }
            Intent::SetPlayMode(mode) => {
                let (repeat, shuffle) = mode.to_axes();
                self.set_mode(repeat, shuffle);
            }
            Intent::ToggleRepeatCycle => self.set_mode(self.state.repeat.cycle(), self.state.shuffle),
            Intent::ToggleShuffle => self.set_mode(self.state.repeat, !self.state.shuffle),
            Intent::SetPlaylist {
                playlist,
                start_index,
                autoplay,
            } => self.set_playlist(playlist, start_index, autoplay, commands),
            Intent::ClearPlaylist => self.clear_playlist(commands),
            Intent::AddToPlaylist(track) => self.add_to_playlist(track, commands),
            Intent::RemoveFromPlaylist(index) => self.remove_from_playlist(index, commands),
            Intent::ShufflePlaylist => self.shuffle_playlist(),
            Intent::ClearHistory => self.recently_played.clear(),
            Intent::Stop => self.stop(commands),
            Intent::ClearError => self.state.last_error = None,
            Intent::FadeIn(duration) => self.fade_in(duration, commands),
            Intent::FadeOut(duration) => self.fade_out(duration, commands),
            Intent::FadeTick(elapsed) => self.advance_fade(elapsed, commands),
        }
    }

    fn play(&mut self, commands: &mut Vec<MediaCommand>) {
        let Some(index) = self.state.current_index else {
            self.record_error(PlaybackErrorKind::EmptyPlaylist);
            return;
        };

        match self.state.status {
            PlayerStatus::Playing => {}
            PlayerStatus::Loading => self.pending_play = true,
            PlayerStatus::Paused => {
                commands.push(MediaCommand::Play);
                self.set_status(PlayerStatus::Playing);
            }
            // Failed sources are reloaded from scratch
            PlayerStatus::Idle | PlayerStatus::Failed => self.load_index(index, true, commands),
        }
    }

    fn pause(&mut self, commands: &mut Vec<MediaCommand>) {
        self.pending_play = false;
        if self.state.status == PlayerStatus::Playing {
            commands.push(MediaCommand::Pause);
            self.set_status(PlayerStatus::Paused);
        }
    }

    fn stop(&mut self, commands: &mut Vec<MediaCommand>) {
        if self.state.current_index.is_none() {
            return;
        }
        self.cancel_fade(commands);
        self.pending_play = false;

        if matches!(
            self.state.status,
            PlayerStatus::Playing | PlayerStatus::Paused
        ) {
            commands.push(MediaCommand::Pause);
            commands.push(MediaCommand::Seek(0.0));
            self.set_status(PlayerStatus::Paused);
        }
        self.set_time(0.0);
    }

    fn select_track(&mut self, index: usize, commands: &mut Vec<MediaCommand>) {
        let len = self.playlist.len();
        if index >= len {
            self.record_error(PlaybackErrorKind::InvalidIndex { index, len });
            return;
        }

        self.shuffle_history.clear();
        self.load_index(index, true, commands);
    }

    fn navigate(&mut self, forward: bool, commands: &mut Vec<MediaCommand>) {
        let Some(current) = self.state.current_index else {
            self.record_error(PlaybackErrorKind::EmptyPlaylist);
            return;
        };

        let len = self.playlist.len();
        let mode = self.state.play_mode();
        let target = if forward {
            navigation::next_index(current, len, mode, &mut self.shuffle_history, &mut self.rng)
        } else {
            navigation::previous_index(current, len, mode, &mut self.shuffle_history, &mut self.rng)
        };

        match target {
            Some(index) => {
                let autoplay = self.wants_playback();
                self.load_index(index, autoplay, commands);
            }
            None => {
                debug!(current, forward, "No track in that direction, stopping");
                self.pause(commands);
            }
        }
    }

    fn seek(&mut self, seconds: f64, commands: &mut Vec<MediaCommand>) {
        if self.requested_source.is_none() || seconds.is_nan() {
            return;
        }
        let target = clamp_position(seconds, self.state.duration);
        commands.push(MediaCommand::Seek(target));
        self.set_time(target);
    }

    fn set_volume(&mut self, level: f64, commands: &mut Vec<MediaCommand>) {
        let was_muted = self.volume.is_muted();
        if !self.volume.set_level(level) {
            return;
        }

        commands.push(MediaCommand::SetVolume(self.volume.level()));
        if was_muted != self.volume.is_muted() {
            commands.push(MediaCommand::SetMuted(self.volume.is_muted()));
        }
        self.sync_volume();
    }

    fn set_mode(&mut self, repeat: RepeatMode, shuffle: bool) {
        if (repeat, shuffle) == (self.state.repeat, self.state.shuffle) {
            return;
        }
        if shuffle && !self.state.shuffle {
            self.shuffle_history.clear();
        }

        self.state.repeat = repeat;
        self.state.shuffle = shuffle;
        debug!(?repeat, shuffle, "Play mode changed");
        self.pending_events.push(PlaybackEvent::ModeChanged {
            mode: self.state.play_mode(),
        });
    }

    fn set_playlist(
        &mut self,
        playlist: Playlist,
        start_index: usize,
        autoplay: bool,
        commands: &mut Vec<MediaCommand>,
    ) {
        if playlist.is_empty() {
            self.clear_playlist(commands);
            return;
        }
        if start_index >= playlist.len() {
            self.record_error(PlaybackErrorKind::InvalidIndex {
                index: start_index,
                len: playlist.len(),
            });
            return;
        }

        debug!(
            len = playlist.len(),
            album = ?playlist.source_album_id(),
            start_index,
            "Replacing playlist"
        );
        self.playlist = playlist;
        self.shuffle_history.clear();
        self.pending_events.push(PlaybackEvent::PlaylistChanged {
            length: self.playlist.len(),
        });
        self.load_index(start_index, autoplay, commands);
    }

    fn clear_playlist(&mut self, commands: &mut Vec<MediaCommand>) {
        let previous = self.current_track().map(|track| track.id);

        self.cancel_fade(commands);
        self.playlist = Playlist::default();
        self.shuffle_history.clear();
        self.pending_play = false;
        self.state.current_index = None;
        self.state.duration = 0.0;
        self.set_time(0.0);

        if self.requested_source.take().is_some() {
            commands.push(MediaCommand::Unload);
        }
        self.set_status(PlayerStatus::Idle);
        self.pending_events.push(PlaybackEvent::PlaylistChanged { length: 0 });
        if previous.is_some() {
            self.pending_events.push(PlaybackEvent::TrackChanged {
                index: None,
                track_id: None,
                previous_track_id: previous,
            });
        }
    }

    fn add_to_playlist(&mut self, track: Arc<Track>, commands: &mut Vec<MediaCommand>) {
        debug!(track = %track.id, position = self.playlist.len(), "Adding track");
        self.playlist.push(track);
        self.pending_events.push(PlaybackEvent::PlaylistChanged {
            length: self.playlist.len(),
        });

        if self.state.current_index.is_none() {
            self.load_index(0, false, commands);
        }
    }

    fn remove_from_playlist(&mut self, index: usize, commands: &mut Vec<MediaCommand>) {
        let len = self.playlist.len();
        if index >= len {
            self.record_error(PlaybackErrorKind::InvalidIndex { index, len });
            return;
        }
        if len == 1 {
            self.clear_playlist(commands);
            return;
        }
        let Some(current) = self.state.current_index else {
            return;
        };

        let previous = self.current_track().map(|track| (current, track.id));
        let Some(removed) = self.playlist.remove(index) else {
            return;
        };
        debug!(index, track = %removed.id, current, "Removed track");
        self.shuffle_history.clear();
        self.pending_events.push(PlaybackEvent::PlaylistChanged {
            length: self.playlist.len(),
        });

        if index < current {
            // Same track, one position earlier
            self.state.current_index = Some(current - 1);
            self.pending_events.push(PlaybackEvent::TrackChanged {
                index: Some(current - 1),
                track_id: previous.map(|(_, id)| id),
                previous_track_id: previous.map(|(_, id)| id),
            });
        } else if index == current {
            // The track that slid into its place takes over
            let target = index.min(self.playlist.len() - 1);
            let autoplay = self.wants_playback();
            self.switch_to(target, previous, autoplay, commands);
        }
    }

    fn shuffle_playlist(&mut self) {
        if self.playlist.len() < 2 {
            return;
        }

        let current = self.state.current_index;
        let position = self.playlist.shuffle(current, &mut self.rng);
        self.state.current_index = position;
        self.shuffle_history.clear();
        debug!(?current, ?position, "Shuffled playlist");

        self.pending_events.push(PlaybackEvent::PlaylistChanged {
            length: self.playlist.len(),
        });
        if position != current {
            let track_id = self.current_track().map(|track| track.id);
            self.pending_events.push(PlaybackEvent::TrackChanged {
                index: position,
                track_id,
                previous_track_id: track_id,
            });
        }
    }

    // ===== Fades =====

    fn fade_in(&mut self, duration: Duration, commands: &mut Vec<MediaCommand>) {
        if self.state.current_index.is_none() {
            self.record_error(PlaybackErrorKind::EmptyPlaylist);
            return;
        }

        let fade = Fade::fade_in(self.volume.level(), duration, self.fade_curve);
        debug!(?duration, curve = ?self.fade_curve, "Fading in");
        commands.push(MediaCommand::SetVolume(fade.volume()));
        self.fade = Some(fade);
        self.play(commands);
        self.finish_fade(commands);
    }

    fn fade_out(&mut self, duration: Duration, commands: &mut Vec<MediaCommand>) {
        if !self.wants_playback() {
            return;
        }

        debug!(?duration, curve = ?self.fade_curve, "Fading out");
        self.fade = Some(Fade::fade_out(self.volume.level(), duration, self.fade_curve));
        self.finish_fade(commands);
    }

    fn advance_fade(&mut self, elapsed: Duration, commands: &mut Vec<MediaCommand>) {
        // The ramp waits for the source to start
        if self.state.status == PlayerStatus::Loading {
            return;
        }
        let Some(fade) = self.fade.as_mut() else {
            return;
        };
        commands.push(MediaCommand::SetVolume(fade.advance(elapsed)));
        self.finish_fade(commands);
    }

    /// Drop a fade that has run its course; a finished fade-out pauses
    fn finish_fade(&mut self, commands: &mut Vec<MediaCommand>) {
        let Some(direction) = self
            .fade
            .as_ref()
            .filter(|fade| fade.is_finished())
            .map(Fade::direction)
        else {
            return;
        };
        self.fade = None;
        trace!(?direction, "Fade finished");

        if direction == FadeDirection::Out {
            self.pause(commands);
            commands.push(MediaCommand::SetVolume(self.volume.level()));
        }
    }

    /// Stop a running fade and put the element back at the volume
    fn cancel_fade(&mut self, commands: &mut Vec<MediaCommand>) {
        if self.fade.take().is_some() {
            trace!("Fade cancelled");
            commands.push(MediaCommand::SetVolume(self.volume.level()));
        }
    }

    // ===== Adapter Events =====

    fn apply_media(&mut self, event: AdapterEvent, commands: &mut Vec<MediaCommand>) {
        if self.requested_source.as_deref() != Some(event.source.as_str()) {
            trace!(source = %event.source, kind = ?event.kind, "Ignoring stale media event");
            return;
        }

        match event.kind {
            AdapterEventKind::LoadStarted => {
                trace!(source = %event.source, "Load started");
            }
            AdapterEventKind::ReadyToPlay => {
                if self.state.status == PlayerStatus::Loading {
                    self.finish_loading(commands);
                }
            }
            AdapterEventKind::MetadataLoaded(duration) => {
                self.state.duration = if duration.is_finite() && duration > 0.0 {
                    duration
                } else {
                    0.0
                };
                self.set_time(self.state.current_time);
                // Without autoplay there is nothing left to wait for
                if self.state.status == PlayerStatus::Loading && !self.pending_play {
                    self.set_status(PlayerStatus::Paused);
                }
            }
            AdapterEventKind::TimeUpdated(seconds) => {
                if seconds.is_finite() {
                    self.set_time(seconds);
                }
            }
            AdapterEventKind::EndedNaturally => self.track_ended(commands),
            AdapterEventKind::Failed(reason) => {
                self.cancel_fade(commands);
                self.pending_play = false;
                self.set_status(PlayerStatus::Failed);
                self.record_error(PlaybackErrorKind::DecodeFailed(reason));
            }
            AdapterEventKind::PlaybackRejected => {
                self.cancel_fade(commands);
                self.pending_play = false;
                if matches!(
                    self.state.status,
                    PlayerStatus::Playing | PlayerStatus::Loading
                ) {
                    self.set_status(PlayerStatus::Paused);
                }
                self.record_error(PlaybackErrorKind::PlaybackRejected);
            }
        }
    }

    fn finish_loading(&mut self, commands: &mut Vec<MediaCommand>) {
        if std::mem::take(&mut self.pending_play) {
            commands.push(MediaCommand::Play);
            self.set_status(PlayerStatus::Playing);
        } else {
            self.set_status(PlayerStatus::Paused);
        }
    }

    fn track_ended(&mut self, commands: &mut Vec<MediaCommand>) {
        let Some(current) = self.state.current_index else {
            return;
        };

        if self.state.play_mode() == PlayMode::RepeatOne {
            self.restart(true, commands);
            return;
        }

        let next = navigation::next_index(
            current,
            self.playlist.len(),
            self.state.play_mode(),
            &mut self.shuffle_history,
            &mut self.rng,
        );

        if let Some(index) = next {
            self.load_index(index, true, commands);
        } else {
            // End of playlist: keep the last track, rewound and paused
            debug!(current, "Playlist finished");
            self.cancel_fade(commands);
            self.pending_play = false;
            commands.push(MediaCommand::Seek(0.0));
            self.set_status(PlayerStatus::Paused);
            self.set_time(0.0);
        }
    }

    // ===== Loading =====

    /// Make `index` current and request its source
    fn load_index(&mut self, index: usize, autoplay: bool, commands: &mut Vec<MediaCommand>) {
        let previous = self
            .state
            .current_index
            .zip(self.current_track().map(|track| track.id));
        self.switch_to(index, previous, autoplay, commands);
    }

    /// Like `load_index`, with the position and track that were current
    /// before given explicitly
    fn switch_to(
        &mut self,
        index: usize,
        previous: Option<(usize, TrackId)>,
        autoplay: bool,
        commands: &mut Vec<MediaCommand>,
    ) {
        let Some(track) = self.playlist.get(index).cloned() else {
            return;
        };
        self.state.current_index = Some(index);

        if previous != Some((index, track.id)) {
            self.pending_events.push(PlaybackEvent::TrackChanged {
                index: Some(index),
                track_id: Some(track.id),
                previous_track_id: previous.map(|(_, id)| id),
            });
        }

        let same_source = self.requested_source.as_deref() == Some(track.source_uri.as_str());
        let reusable = !matches!(self.state.status, PlayerStatus::Idle | PlayerStatus::Failed);

        if same_source && reusable {
            // The adapter would ignore a reload of its current source
            self.restart(autoplay, commands);
            return;
        }

        debug!(index, track = %track.id, uri = %track.source_uri, autoplay, "Loading track");
        self.requested_source = Some(track.source_uri.clone());
        self.pending_play = autoplay;
        self.state.duration = 0.0;
        self.state.last_error = None;
        self.set_time(0.0);
        self.recently_played.push(track.id);
        commands.push(MediaCommand::Load(track.source_uri.clone()));
        self.set_status(PlayerStatus::Loading);
    }

    /// Rewind the loaded source, then play or pause it
    fn restart(&mut self, autoplay: bool, commands: &mut Vec<MediaCommand>) {
        self.set_time(0.0);

        if self.state.status == PlayerStatus::Loading {
            self.pending_play = autoplay;
            return;
        }

        commands.push(MediaCommand::Seek(0.0));
        if autoplay {
            commands.push(MediaCommand::Play);
            self.set_status(PlayerStatus::Playing);
        } else {
            if self.state.status == PlayerStatus::Playing {
                commands.push(MediaCommand::Pause);
            }
            self.set_status(PlayerStatus::Paused);
        }
    }

    // ===== State Helpers =====

    /// Playing, or about to play once loading finishes
    fn wants_playback(&self) -> bool {
        match self.state.status {
            PlayerStatus::Playing => true,
            PlayerStatus::Loading => self.pending_play,
            PlayerStatus::Idle | PlayerStatus::Paused | PlayerStatus::Failed => false,
        }
    }

    fn set_status(&mut self, status: PlayerStatus) {
        if self.state.status != status {
            trace!(from = ?self.state.status, to = ?status, "Status changed");
            self.state.status = status;
            self.pending_events.push(PlaybackEvent::StateChanged { status });
        }
    }

    fn set_time(&mut self, seconds: f64) {
        let time = clamp_position(seconds, self.state.duration);
        self.state.current_time = time;
        self.pending_events.push(PlaybackEvent::PositionUpdate {
            position: time,
            duration: self.state.duration,
        });
    }

    fn sync_volume(&mut self) {
        self.state.volume = self.volume.level();
        self.state.is_muted = self.volume.is_muted();
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            volume: self.state.volume,
            is_muted: self.state.is_muted,
        });
    }

    fn record_error(&mut self, error: PlaybackErrorKind) {
        warn!(%error, "Playback error");
        self.state.last_error = Some(error);
        self.pending_events.push(PlaybackEvent::error(error));
    }

    // ===== State Queries =====

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_track(&self) -> Option<&Arc<Track>> {
        self.state
            .current_index
            .and_then(|index| self.playlist.get(index))
    }

    /// Source URI the machine is waiting on or playing
    pub fn requested_source(&self) -> Option<&str> {
        self.requested_source.as_deref()
    }

    pub fn shuffle_history(&self) -> &ShuffleHistory {
        &self.shuffle_history
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Track ids loaded recently, oldest first
    pub fn recently_played(&self) -> Vec<TrackId> {
        self.recently_played.to_vec()
    }

    pub fn has_next(&self) -> bool {
        navigation::has_next(
            self.state.current_index,
            self.playlist.len(),
            self.state.play_mode(),
        )
    }

    pub fn has_previous(&self) -> bool {
        navigation::has_previous(
            self.state.current_index,
            self.playlist.len(),
            self.state.play_mode(),
        )
    }

    /// Read-only view for the UI
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            is_playing: self.state.is_playing(),
            is_loading: self.state.is_loading(),
            play_mode: self.state.play_mode(),
            current_track: self.current_track().cloned(),
            progress: progress_percent(self.state.current_time, self.state.duration),
            has_next_track: self.has_next(),
            has_previous_track: self.has_previous(),
            playlist_length: self.playlist.len(),
            source_album_id: self.playlist.source_album_id(),
            recently_played: self.recently_played(),
            is_fading: self.is_fading(),
            state: self.state.clone(),
        }
    }

    /// Take the notifications produced since the last call
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmonia_core::AlbumId;

    fn track(id: i64, seconds: f64) -> Arc<Track> {
        Arc::new(Track {
            id: TrackId(id),
            number: u32::try_from(id).unwrap(),
            title: format!("Track {id}"),
            artist: "Artist".to_string(),
            duration_seconds: seconds,
            source_uri: format!("/audio/{id}.mp3"),
            album_id: AlbumId(1),
        })
    }

    fn machine_with(len: i64) -> PlaybackMachine<StdRng> {
        let config = PlaybackConfig {
            shuffle_seed: Some(11),
            ..PlaybackConfig::default()
        };
        let mut machine = PlaybackMachine::new(&config);
        let tracks = (1..=len).map(|id| track(id, 60.0)).collect();
        machine.apply(Intent::SetPlaylist {
            playlist: Playlist::new(tracks, Some(AlbumId(1))),
            start_index: 0,
            autoplay: false,
        });
        machine
    }

    fn media(uri: &str, kind: AdapterEventKind) -> AdapterEvent {
        AdapterEvent::new(uri, kind)
    }

    #[test]
    fn set_playlist_requests_load() {
        let mut machine = PlaybackMachine::default();
        let commands = machine.apply(Intent::SetPlaylist {
            playlist: Playlist::new(vec![track(1, 3.0)], None),
            start_index: 0,
            autoplay: true,
        });

        assert_eq!(commands, vec![MediaCommand::Load("/audio/1.mp3".into())]);
        assert_eq!(machine.state().current_index, Some(0));
        assert!(machine.state().is_loading());
        assert_eq!(machine.recently_played(), vec![TrackId(1)]);
    }

    #[test]
    fn ready_without_autoplay_pauses() {
        let mut machine = machine_with(2);
        let commands = machine.apply(media("/audio/1.mp3", AdapterEventKind::ReadyToPlay));
        assert!(commands.is_empty());
        assert_eq!(machine.state().status, PlayerStatus::Paused);
    }

    #[test]
    fn play_while_loading_defers_until_ready() {
        let mut machine = machine_with(2);
        assert!(machine.apply(Intent::Play).is_empty());
        assert!(machine.state().is_loading());

        let commands = machine.apply(media("/audio/1.mp3", AdapterEventKind::ReadyToPlay));
        assert_eq!(commands, vec![MediaCommand::Play]);
        assert!(machine.state().is_playing());
    }

    #[test]
    fn toggle_play_pause() {
        let mut machine = machine_with(1);
        machine.apply(media("/audio/1.mp3", AdapterEventKind::ReadyToPlay));

        assert_eq!(machine.apply(Intent::TogglePlayPause), vec![MediaCommand::Play]);
        assert!(machine.state().is_playing());
        assert_eq!(machine.apply(Intent::TogglePlayPause), vec![MediaCommand::Pause]);
        assert_eq!(machine.state().status, PlayerStatus::Paused);
    }

    #[test]
    fn select_same_track_restarts() {
        let mut machine = machine_with(2);
        machine.apply(media("/audio/1.mp3", AdapterEventKind::MetadataLoaded(60.0)));
        machine.apply(media("/audio/1.mp3", AdapterEventKind::TimeUpdated(30.0)));

        let commands = machine.apply(Intent::SelectTrack(0));
        assert_eq!(commands, vec![MediaCommand::Seek(0.0), MediaCommand::Play]);
        assert_eq!(machine.state().current_time, 0.0);
        assert!(machine.state().is_playing());
    }

    #[test]
    fn select_out_of_range_is_reported() {
        let mut machine = machine_with(2);
        let before = machine.state().clone();

        assert!(machine.apply(Intent::SelectTrack(5)).is_empty());
        assert_eq!(
            machine.state().last_error,
            Some(PlaybackErrorKind::InvalidIndex { index: 5, len: 2 })
        );
        assert_eq!(machine.state().current_index, before.current_index);
        assert_eq!(machine.state().status, before.status);
    }

    #[test]
    fn seek_clamps_to_known_duration() {
        let mut machine = machine_with(1);
        machine.apply(media("/audio/1.mp3", AdapterEventKind::MetadataLoaded(60.0)));

        assert_eq!(machine.apply(Intent::Seek(90.0)), vec![MediaCommand::Seek(60.0)]);
        assert_eq!(machine.state().current_time, 60.0);
        assert!(machine.apply(Intent::Seek(f64::NAN)).is_empty());
    }

    #[test]
    fn repeat_one_restarts_on_end() {
        let mut machine = machine_with(2);
        machine.apply(Intent::SetPlayMode(PlayMode::RepeatOne));
        machine.apply(Intent::Play);
        machine.apply(media("/audio/1.mp3", AdapterEventKind::ReadyToPlay));

        let commands = machine.apply(media("/audio/1.mp3", AdapterEventKind::EndedNaturally));
        assert_eq!(commands, vec![MediaCommand::Seek(0.0), MediaCommand::Play]);
        assert_eq!(machine.state().current_index, Some(0));
    }

    #[test]
    fn failure_then_recovery() {
        let mut machine = machine_with(2);
        machine.apply(media(
            "/audio/1.mp3",
            AdapterEventKind::Failed(crate::error::FailureReason::Network),
        ));
        assert_eq!(machine.state().status, PlayerStatus::Failed);
        assert!(!machine.state().is_playing());

        // Play reloads the failed source
        let commands = machine.apply(Intent::Play);
        assert_eq!(commands, vec![MediaCommand::Load("/audio/1.mp3".into())]);
        assert!(machine.state().last_error.is_none());
    }

    #[test]
    fn shuffle_on_clears_history() {
        let mut machine = machine_with(5);
        machine.apply(Intent::ToggleShuffle);
        machine.apply(Intent::Next);
        assert_eq!(machine.shuffle_history().len(), 1);

        machine.apply(Intent::ToggleShuffle);
        machine.apply(Intent::ToggleShuffle);
        assert!(machine.shuffle_history().is_empty());
    }

    #[test]
    fn repeat_cycle_keeps_shuffle() {
        let mut machine = machine_with(2);
        machine.apply(Intent::ToggleShuffle);

        machine.apply(Intent::ToggleRepeatCycle);
        assert_eq!(machine.state().repeat, RepeatMode::All);
        assert_eq!(machine.state().play_mode(), PlayMode::Shuffle);

        machine.apply(Intent::ToggleRepeatCycle);
        assert_eq!(machine.state().play_mode(), PlayMode::RepeatOne);
        assert!(machine.state().shuffle);

        machine.apply(Intent::ToggleRepeatCycle);
        assert_eq!(machine.state().repeat, RepeatMode::Off);
        assert_eq!(machine.state().play_mode(), PlayMode::Shuffle);
    }

    #[test]
    fn clear_playlist_unloads() {
        let mut machine = machine_with(2);
        let commands = machine.apply(Intent::ClearPlaylist);

        assert_eq!(commands, vec![MediaCommand::Unload]);
        assert_eq!(machine.state().current_index, None);
        assert_eq!(machine.state().status, PlayerStatus::Idle);
        assert!(machine.requested_source().is_none());
    }

    fn ready(machine: &mut PlaybackMachine<StdRng>) {
        let uri = machine.requested_source().unwrap().to_string();
        machine.apply(media(&uri, AdapterEventKind::ReadyToPlay));
    }

    #[test]
    fn add_to_empty_playlist_makes_track_current() {
        let mut machine = PlaybackMachine::default();
        let commands = machine.apply(Intent::AddToPlaylist(track(7, 30.0)));

        assert_eq!(commands, vec![MediaCommand::Load("/audio/7.mp3".into())]);
        assert_eq!(machine.state().current_index, Some(0));
        ready(&mut machine);
        assert_eq!(machine.state().status, PlayerStatus::Paused);

        // Appending to a non-empty playlist leaves playback alone
        assert!(machine.apply(Intent::AddToPlaylist(track(8, 30.0))).is_empty());
        assert_eq!(machine.playlist().len(), 2);
        assert_eq!(machine.state().current_index, Some(0));
    }

    #[test]
    fn remove_before_current_shifts_index() {
        let mut machine = machine_with(4);
        machine.apply(Intent::SelectTrack(2));
        ready(&mut machine);
        machine.drain_events();

        assert!(machine.apply(Intent::RemoveFromPlaylist(0)).is_empty());
        assert_eq!(machine.state().current_index, Some(1));
        assert_eq!(machine.current_track().map(|t| t.id), Some(TrackId(3)));
        assert!(machine.state().is_playing());
        assert!(machine.drain_events().contains(&PlaybackEvent::TrackChanged {
            index: Some(1),
            track_id: Some(TrackId(3)),
            previous_track_id: Some(TrackId(3)),
        }));
    }

    #[test]
    fn remove_after_current_keeps_index() {
        let mut machine = machine_with(4);
        assert!(machine.apply(Intent::RemoveFromPlaylist(3)).is_empty());
        assert_eq!(machine.state().current_index, Some(0));
        assert_eq!(machine.playlist().len(), 3);
    }

    #[test]
    fn remove_current_loads_its_successor() {
        let mut machine = machine_with(3);
        machine.apply(Intent::SelectTrack(1));
        ready(&mut machine);
        machine.drain_events();

        let commands = machine.apply(Intent::RemoveFromPlaylist(1));
        assert_eq!(commands, vec![MediaCommand::Load("/audio/3.mp3".into())]);
        assert_eq!(machine.state().current_index, Some(1));
        assert!(machine.drain_events().contains(&PlaybackEvent::TrackChanged {
            index: Some(1),
            track_id: Some(TrackId(3)),
            previous_track_id: Some(TrackId(2)),
        }));

        // Still playing once the successor is ready
        ready(&mut machine);
        assert!(machine.state().is_playing());
    }

    #[test]
    fn remove_current_last_track_steps_back() {
        let mut machine = machine_with(3);
        machine.apply(Intent::SelectTrack(2));
        machine.apply(Intent::Pause);

        let commands = machine.apply(Intent::RemoveFromPlaylist(2));
        assert_eq!(commands, vec![MediaCommand::Load("/audio/2.mp3".into())]);
        assert_eq!(machine.state().current_index, Some(1));
        ready(&mut machine);
        assert_eq!(machine.state().status, PlayerStatus::Paused);
    }

    #[test]
    fn remove_only_track_clears_playlist() {
        let mut machine = machine_with(1);
        let commands = machine.apply(Intent::RemoveFromPlaylist(0));

        assert_eq!(commands, vec![MediaCommand::Unload]);
        assert_eq!(machine.state().current_index, None);
        assert_eq!(machine.state().status, PlayerStatus::Idle);
        assert!(machine.playlist().is_empty());
    }

    #[test]
    fn remove_out_of_range_is_reported() {
        let mut machine = machine_with(2);
        assert!(machine.apply(Intent::RemoveFromPlaylist(2)).is_empty());
        assert_eq!(
            machine.state().last_error,
            Some(PlaybackErrorKind::InvalidIndex { index: 2, len: 2 })
        );
        assert_eq!(machine.playlist().len(), 2);
    }

    #[test]
    fn shuffle_playlist_keeps_current_track() {
        let mut machine = machine_with(8);
        machine.apply(Intent::SelectTrack(3));
        ready(&mut machine);
        machine.apply(Intent::ToggleShuffle);
        machine.apply(Intent::Next);
        let playing = machine.current_track().map(|t| t.id);

        assert!(machine.apply(Intent::ShufflePlaylist).is_empty());
        assert_eq!(machine.current_track().map(|t| t.id), playing);
        assert_eq!(machine.playlist().len(), 8);
        assert!(machine.shuffle_history().is_empty());
        assert_eq!(
            machine.requested_source().map(str::to_string),
            machine.current_track().map(|t| t.source_uri.clone())
        );
    }

    #[test]
    fn clear_history_keeps_playback() {
        let mut machine = machine_with(3);
        machine.apply(Intent::Next);
        assert_eq!(machine.recently_played().len(), 2);

        assert!(machine.apply(Intent::ClearHistory).is_empty());
        assert!(machine.recently_played().is_empty());
        assert_eq!(machine.state().current_index, Some(1));
    }

    #[test]
    fn fade_in_starts_silent_and_ramps_up() {
        let mut machine = machine_with(1);
        ready(&mut machine);
        machine.apply(Intent::SetVolume(0.8));

        let commands = machine.apply(Intent::FadeIn(Duration::from_millis(400)));
        assert_eq!(commands, vec![MediaCommand::SetVolume(0.0), MediaCommand::Play]);
        assert!(machine.is_fading());

        let commands = machine.apply(Intent::FadeTick(Duration::from_millis(100)));
        assert_eq!(commands.len(), 1);
        let MediaCommand::SetVolume(level) = commands[0] else {
            panic!("expected a volume command, got {commands:?}");
        };
        assert!((level - 0.2).abs() < 1e-9);

        let commands = machine.apply(Intent::FadeTick(Duration::from_millis(500)));
        assert_eq!(commands, vec![MediaCommand::SetVolume(0.8)]);
        assert!(!machine.is_fading());
        assert!(machine.state().is_playing());
        assert_eq!(machine.state().volume, 0.8);
    }

    #[test]
    fn fade_in_waits_for_loading() {
        let mut machine = machine_with(1);
        machine.apply(Intent::FadeIn(Duration::from_millis(200)));
        assert!(machine.state().is_loading());

        assert!(machine.apply(Intent::FadeTick(Duration::from_millis(300))).is_empty());
        assert!(machine.is_fading());

        ready(&mut machine);
        assert!(machine.state().is_playing());
        let commands = machine.apply(Intent::FadeTick(Duration::from_millis(300)));
        assert_eq!(commands, vec![MediaCommand::SetVolume(1.0)]);
    }

    #[test]
    fn fade_out_pauses_and_restores_volume() {
        let mut machine = machine_with(1);
        machine.apply(Intent::Play);
        ready(&mut machine);

        assert!(machine.apply(Intent::FadeOut(Duration::from_secs(1))).is_empty());
        assert_eq!(
            machine.apply(Intent::FadeTick(Duration::from_millis(500))),
            vec![MediaCommand::SetVolume(0.5)]
        );
        assert!(machine.state().is_playing());

        let commands = machine.apply(Intent::FadeTick(Duration::from_millis(500)));
        assert_eq!(
            commands,
            vec![
                MediaCommand::SetVolume(0.0),
                MediaCommand::Pause,
                MediaCommand::SetVolume(1.0),
            ]
        );
        assert_eq!(machine.state().status, PlayerStatus::Paused);
        assert!(!machine.is_fading());
    }

    #[test]
    fn fade_out_needs_playback() {
        let mut machine = machine_with(1);
        ready(&mut machine);
        assert!(machine.apply(Intent::FadeOut(Duration::from_secs(1))).is_empty());
        assert!(!machine.is_fading());

        let mut empty = PlaybackMachine::default();
        assert!(empty.apply(Intent::FadeIn(Duration::from_secs(1))).is_empty());
        assert_eq!(empty.state().last_error, Some(PlaybackErrorKind::EmptyPlaylist));
    }

    #[test]
    fn pause_cancels_fade() {
        let mut machine = machine_with(1);
        machine.apply(Intent::Play);
        ready(&mut machine);
        machine.apply(Intent::FadeOut(Duration::from_secs(2)));
        machine.apply(Intent::FadeTick(Duration::from_secs(1)));

        let commands = machine.apply(Intent::Pause);
        assert_eq!(commands, vec![MediaCommand::SetVolume(1.0), MediaCommand::Pause]);
        assert!(!machine.is_fading());
        assert!(!machine.snapshot().is_fading);
        assert!(machine.apply(Intent::FadeTick(Duration::from_secs(1))).is_empty());
    }

    #[test]
    fn events_are_drained_once() {
        let mut machine = machine_with(2);
        let events = machine.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, PlaybackEvent::PlaylistChanged { length: 2 })));
        assert!(machine.drain_events().is_empty());
    }
}
