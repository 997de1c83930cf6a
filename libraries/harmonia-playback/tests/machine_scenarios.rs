//! Scenario tests for the playback state machine
//!
//! Each test drives the machine with the exact sequence of intents and media
//! events a browser would produce, then checks the commands and state.
//! No shallow tests - every test follows a complete user-visible flow.

use harmonia_core::{AlbumId, Catalog, Track, TrackId};
use harmonia_playback::{
    AdapterEvent, AdapterEventKind, FailureReason, Intent, MediaCommand, PlayMode,
    PlaybackConfig, PlaybackErrorKind, PlaybackEvent, PlaybackMachine, PlayerStatus, Playlist,
};
use std::sync::{Arc, Once};

// ===== Test Helpers =====

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .try_init();
    });
}

const A: &str = "/audio/a.mp3";
const B: &str = "/audio/b.mp3";
const C: &str = "/audio/c.mp3";

fn track(id: i64, uri: &str, seconds: f64) -> Arc<Track> {
    Arc::new(Track {
        id: TrackId(id),
        number: id as u32,
        title: format!("Track {id}"),
        artist: "Test Artist".to_string(),
        duration_seconds: seconds,
        source_uri: uri.to_string(),
        album_id: AlbumId(1),
    })
}

fn two_tracks() -> Playlist {
    Playlist::new(vec![track(1, A, 3.0), track(2, B, 5.0)], Some(AlbumId(1)))
}

fn three_tracks() -> Playlist {
    Playlist::new(
        vec![track(1, A, 3.0), track(2, B, 5.0), track(3, C, 4.0)],
        Some(AlbumId(1)),
    )
}

fn new_machine() -> PlaybackMachine {
    init_tracing();
    PlaybackMachine::new(&PlaybackConfig {
        shuffle_seed: Some(42),
        ..PlaybackConfig::default()
    })
}

fn event(source: &str, kind: AdapterEventKind) -> AdapterEvent {
    AdapterEvent::new(source, kind)
}

/// Report what a browser reports once a source is playable
fn become_ready(machine: &mut PlaybackMachine, source: &str, duration: f64) -> Vec<MediaCommand> {
    let mut commands = machine.apply(event(source, AdapterEventKind::LoadStarted));
    commands.extend(machine.apply(event(source, AdapterEventKind::MetadataLoaded(duration))));
    commands.extend(machine.apply(event(source, AdapterEventKind::ReadyToPlay)));
    commands
}

/// Start `playlist` at `start` with autoplay and get it playing
fn playing(playlist: Playlist, start: usize, duration: f64) -> PlaybackMachine {
    let mut machine = new_machine();
    let source = playlist
        .get(start)
        .map(|track| track.source_uri.clone())
        .expect("start index in range");
    machine.apply(Intent::SetPlaylist {
        playlist,
        start_index: start,
        autoplay: true,
    });
    become_ready(&mut machine, &source, duration);
    assert!(machine.state().is_playing());
    machine
}

// ===== Natural Advance =====

#[test]
fn playlist_plays_through_and_stops_on_last_track() {
    let mut machine = new_machine();

    let commands = machine.apply(Intent::SetPlaylist {
        playlist: two_tracks(),
        start_index: 0,
        autoplay: true,
    });
    assert_eq!(commands, vec![MediaCommand::Load(A.to_string())]);
    assert_eq!(machine.state().status, PlayerStatus::Loading);

    // Metadata alone must not start playback
    assert!(machine
        .apply(event(A, AdapterEventKind::MetadataLoaded(3.0)))
        .is_empty());
    assert_eq!(machine.state().status, PlayerStatus::Loading);
    assert_eq!(machine.state().duration, 3.0);

    assert_eq!(
        machine.apply(event(A, AdapterEventKind::ReadyToPlay)),
        vec![MediaCommand::Play]
    );
    assert!(machine.state().is_playing());

    machine.apply(event(A, AdapterEventKind::TimeUpdated(3.0)));
    assert_eq!(machine.state().current_time, 3.0);

    // A ends: B becomes current and loads from the start
    let commands = machine.apply(event(A, AdapterEventKind::EndedNaturally));
    assert_eq!(commands, vec![MediaCommand::Load(B.to_string())]);
    assert_eq!(machine.state().current_index, Some(1));
    assert_eq!(machine.state().current_time, 0.0);
    assert_eq!(machine.state().duration, 0.0);

    assert_eq!(become_ready(&mut machine, B, 5.0), vec![MediaCommand::Play]);
    assert!(machine.state().is_playing());

    // B ends: nothing left, stay on B rewound and paused
    let commands = machine.apply(event(B, AdapterEventKind::EndedNaturally));
    assert_eq!(commands, vec![MediaCommand::Seek(0.0)]);
    assert!(!machine.state().is_playing());
    assert_eq!(machine.state().status, PlayerStatus::Paused);
    assert_eq!(machine.state().current_index, Some(1));
    assert_eq!(machine.state().current_time, 0.0);
    assert_eq!(machine.recently_played(), vec![TrackId(1), TrackId(2)]);
}

#[test]
fn track_change_events_name_previous_track() {
    let mut machine = playing(two_tracks(), 0, 3.0);
    machine.drain_events();

    machine.apply(event(A, AdapterEventKind::EndedNaturally));
    let events = machine.drain_events();

    assert!(events.contains(&PlaybackEvent::TrackChanged {
        index: Some(1),
        track_id: Some(TrackId(2)),
        previous_track_id: Some(TrackId(1)),
    }));
    assert!(events.contains(&PlaybackEvent::StateChanged {
        status: PlayerStatus::Loading
    }));
}

#[test]
fn repeat_all_wraps_to_first_track() {
    let mut machine = playing(two_tracks(), 1, 5.0);
    machine.apply(Intent::SetPlayMode(PlayMode::RepeatAll));

    let commands = machine.apply(event(B, AdapterEventKind::EndedNaturally));
    assert_eq!(commands, vec![MediaCommand::Load(A.to_string())]);
    assert_eq!(machine.state().current_index, Some(0));

    // Autoplay carries over to the wrapped track
    assert_eq!(become_ready(&mut machine, A, 3.0), vec![MediaCommand::Play]);
}

#[test]
fn repeat_one_replays_without_reloading() {
    let mut machine = playing(two_tracks(), 0, 3.0);
    machine.apply(Intent::SetPlayMode(PlayMode::RepeatOne));
    machine.apply(event(A, AdapterEventKind::TimeUpdated(2.9)));

    let commands = machine.apply(event(A, AdapterEventKind::EndedNaturally));
    assert_eq!(commands, vec![MediaCommand::Seek(0.0), MediaCommand::Play]);
    assert_eq!(machine.state().current_index, Some(0));
    assert_eq!(machine.state().current_time, 0.0);
    assert!(machine.state().is_playing());
}

#[test]
fn shuffle_advance_never_replays_current() {
    let mut machine = playing(three_tracks(), 0, 3.0);
    machine.apply(Intent::SetPlayMode(PlayMode::Shuffle));

    let commands = machine.apply(event(A, AdapterEventKind::EndedNaturally));
    let index = machine.state().current_index.expect("a track is current");
    assert_ne!(index, 0);
    assert_eq!(commands.len(), 1);
    assert!(matches!(&commands[0], MediaCommand::Load(uri) if uri != A));
    assert_eq!(machine.shuffle_history().as_slice(), &[index]);
}

// ===== Empty And Invalid Input =====

#[test]
fn play_on_empty_playlist_reports_error() {
    let mut machine = new_machine();

    assert!(machine.apply(Intent::Play).is_empty());
    assert_eq!(
        machine.state().last_error,
        Some(PlaybackErrorKind::EmptyPlaylist)
    );
    assert_eq!(machine.state().status, PlayerStatus::Idle);

    assert!(machine.apply(Intent::Next).is_empty());
    assert!(machine.apply(Intent::Previous).is_empty());
    assert!(machine.apply(Intent::Seek(10.0)).is_empty());
    assert!(machine.state().current_index.is_none());

    let events = machine.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        PlaybackEvent::Error {
            error: PlaybackErrorKind::EmptyPlaylist,
            ..
        }
    )));
}

#[test]
fn invalid_start_index_keeps_existing_playlist() {
    let mut machine = playing(two_tracks(), 0, 3.0);
    let before = machine.state().clone();

    let commands = machine.apply(Intent::SetPlaylist {
        playlist: three_tracks(),
        start_index: 7,
        autoplay: true,
    });

    assert!(commands.is_empty());
    assert_eq!(machine.playlist().len(), 2);
    assert_eq!(machine.state().current_index, before.current_index);
    assert_eq!(machine.state().status, before.status);
    assert_eq!(
        machine.state().last_error,
        Some(PlaybackErrorKind::InvalidIndex { index: 7, len: 3 })
    );
}

#[test]
fn empty_playlist_clears_player() {
    let mut machine = playing(two_tracks(), 0, 3.0);

    let commands = machine.apply(Intent::SetPlaylist {
        playlist: Playlist::default(),
        start_index: 0,
        autoplay: true,
    });

    assert_eq!(commands, vec![MediaCommand::Unload]);
    assert_eq!(machine.state().status, PlayerStatus::Idle);
    assert!(machine.state().current_index.is_none());
    assert!(machine.current_track().is_none());
}

// ===== Stale Events =====

#[test]
fn events_from_replaced_source_are_ignored() {
    let mut machine = playing(two_tracks(), 0, 3.0);
    machine.apply(event(A, AdapterEventKind::TimeUpdated(1.0)));

    // Switch to B before A's late events arrive
    assert_eq!(
        machine.apply(Intent::SelectTrack(1)),
        vec![MediaCommand::Load(B.to_string())]
    );
    machine.drain_events();
    let before = machine.state().clone();

    for kind in [
        AdapterEventKind::ReadyToPlay,
        AdapterEventKind::MetadataLoaded(3.0),
        AdapterEventKind::TimeUpdated(2.0),
        AdapterEventKind::EndedNaturally,
        AdapterEventKind::Failed(FailureReason::Network),
        AdapterEventKind::PlaybackRejected,
    ] {
        assert!(machine.apply(event(A, kind)).is_empty());
    }

    assert_eq!(machine.state(), &before);
    assert!(machine.drain_events().is_empty());
    assert_eq!(machine.requested_source(), Some(B));
}

// ===== Rejection And Failure =====

#[test]
fn rejected_playback_pauses_and_recovers() {
    let mut machine = playing(two_tracks(), 0, 3.0);

    assert!(machine
        .apply(event(A, AdapterEventKind::PlaybackRejected))
        .is_empty());
    assert_eq!(machine.state().status, PlayerStatus::Paused);
    assert_eq!(
        machine.state().last_error,
        Some(PlaybackErrorKind::PlaybackRejected)
    );

    // The user retries after a gesture
    assert_eq!(machine.apply(Intent::Play), vec![MediaCommand::Play]);
    assert!(machine.state().is_playing());

    machine.apply(Intent::ClearError);
    assert!(machine.state().last_error.is_none());
}

#[test]
fn rejection_while_loading_cancels_autoplay() {
    let mut machine = new_machine();
    machine.apply(Intent::SetPlaylist {
        playlist: two_tracks(),
        start_index: 0,
        autoplay: true,
    });

    machine.apply(event(A, AdapterEventKind::PlaybackRejected));
    assert_eq!(machine.state().status, PlayerStatus::Paused);

    // A late ready signal must not start playback on its own
    assert!(machine
        .apply(event(A, AdapterEventKind::ReadyToPlay))
        .is_empty());
    assert!(!machine.state().is_playing());
}

#[test]
fn failed_track_can_be_skipped() {
    let mut machine = new_machine();
    machine.apply(Intent::SetPlaylist {
        playlist: two_tracks(),
        start_index: 0,
        autoplay: true,
    });

    machine.apply(event(
        A,
        AdapterEventKind::Failed(FailureReason::SourceNotSupported),
    ));
    assert_eq!(machine.state().status, PlayerStatus::Failed);
    assert_eq!(
        machine.state().last_error,
        Some(PlaybackErrorKind::DecodeFailed(
            FailureReason::SourceNotSupported
        ))
    );

    assert_eq!(
        machine.apply(Intent::Next),
        vec![MediaCommand::Load(B.to_string())]
    );
    assert_eq!(machine.state().current_index, Some(1));
    assert!(machine.state().last_error.is_none());
}

// ===== Transport =====

#[test]
fn stop_rewinds_and_pauses() {
    let mut machine = playing(two_tracks(), 0, 3.0);
    machine.apply(event(A, AdapterEventKind::TimeUpdated(2.0)));

    let commands = machine.apply(Intent::Stop);
    assert_eq!(commands, vec![MediaCommand::Pause, MediaCommand::Seek(0.0)]);
    assert_eq!(machine.state().status, PlayerStatus::Paused);
    assert_eq!(machine.state().current_time, 0.0);
    assert_eq!(machine.state().current_index, Some(0));
}

#[test]
fn previous_in_normal_mode_at_start_pauses() {
    let mut machine = playing(two_tracks(), 0, 3.0);

    assert_eq!(machine.apply(Intent::Previous), vec![MediaCommand::Pause]);
    assert_eq!(machine.state().current_index, Some(0));
    assert_eq!(machine.state().status, PlayerStatus::Paused);
}

#[test]
fn next_while_paused_loads_without_autoplay() {
    let mut machine = playing(two_tracks(), 0, 3.0);
    machine.apply(Intent::Pause);

    assert_eq!(
        machine.apply(Intent::Next),
        vec![MediaCommand::Load(B.to_string())]
    );
    assert!(become_ready(&mut machine, B, 5.0).is_empty());
    assert_eq!(machine.state().status, PlayerStatus::Paused);
}

#[test]
fn snapshot_reflects_progress_and_neighbours() {
    let mut machine = playing(two_tracks(), 0, 3.0);
    machine.apply(event(A, AdapterEventKind::TimeUpdated(1.5)));

    let snapshot = machine.snapshot();
    assert!(snapshot.is_playing);
    assert_eq!(snapshot.progress, 50.0);
    assert!(snapshot.has_next_track);
    assert!(!snapshot.has_previous_track);
    assert_eq!(snapshot.playlist_length, 2);
    assert_eq!(snapshot.source_album_id, Some(AlbumId(1)));
    assert_eq!(
        snapshot.current_track.map(|track| track.id),
        Some(TrackId(1))
    );
}

// ===== Catalog Integration =====

#[test]
fn album_from_catalog_plays_in_order() {
    let catalog = Catalog::from_json(
        r#"[{
            "id": 7,
            "title": "Night Drive",
            "artist": "Synth Collective",
            "genre": "Electronic",
            "tracks": [
                { "id": 70, "number": 1, "title": "Ignition", "duration": "0:03", "audioFile": "/audio/70.mp3" },
                { "id": 71, "number": 2, "title": "Highway", "duration": "0:05", "audioFile": "/audio/71.mp3" }
            ]
        }]"#,
    )
    .expect("valid catalog");
    let album = catalog.album(AlbumId(7)).expect("album exists");

    let mut machine = new_machine();
    machine.apply(Intent::SetPlaylist {
        playlist: Playlist::from_album(album),
        start_index: 0,
        autoplay: true,
    });
    become_ready(&mut machine, "/audio/70.mp3", 3.0);

    let commands = machine.apply(event("/audio/70.mp3", AdapterEventKind::EndedNaturally));
    assert_eq!(commands, vec![MediaCommand::Load("/audio/71.mp3".to_string())]);
    assert_eq!(machine.snapshot().source_album_id, Some(AlbumId(7)));
    assert_eq!(
        machine.current_track().map(|track| track.artist.as_str()),
        Some("Synth Collective")
    );
}
