//! WASM-compatible playback context wrapper

use super::catalog::WasmCatalog;
use super::media::HtmlAudioMedia;
use crate::{
    Intent, PlayMode, PlaybackConfig, PlaybackContext, PlaybackEvent, Playlist,
};
use crossbeam_channel::Receiver;
use harmonia_core::{AlbumId, Track};
use js_sys::Function;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlAudioElement;

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

#[derive(Clone, Default)]
struct Callbacks {
    on_state_change: Option<Function>,
    on_track_change: Option<Function>,
    on_time_update: Option<Function>,
    on_error: Option<Function>,
}

struct Shared {
    context: PlaybackContext<HtmlAudioMedia>,
    events: Receiver<PlaybackEvent>,
    callbacks: RefCell<Callbacks>,
    /// An animation frame loop is ticking the fade
    fading: Cell<bool>,
}

impl Shared {
    fn dispatch(&self, intent: Intent) {
        self.context.dispatch(intent);
        self.flush();
    }

    /// Forward queued playback events to the registered callbacks
    fn flush(&self) {
        while let Ok(event) = self.events.try_recv() {
            // Clone so callbacks may re-register themselves
            let callbacks = self.callbacks.borrow().clone();

            match event {
                PlaybackEvent::StateChanged { status } => {
                    call(&callbacks.on_state_change, &to_js(&status));
                }
                PlaybackEvent::TrackChanged { .. } => {
                    let track = self.context.snapshot().current_track;
                    call(&callbacks.on_track_change, &to_js(&track));
                }
                PlaybackEvent::PositionUpdate { position, duration } => {
                    if let Some(cb) = &callbacks.on_time_update {
                        cb.call2(&JsValue::NULL, &position.into(), &duration.into())
                            .ok();
                    }
                }
                PlaybackEvent::Error { message, .. } => {
                    call(&callbacks.on_error, &JsValue::from_str(&message));
                }
                PlaybackEvent::VolumeChanged { .. }
                | PlaybackEvent::ModeChanged { .. }
                | PlaybackEvent::PlaylistChanged { .. } => {}
            }
        }
    }
}

/// Tick the running fade on every animation frame until it ends
fn drive_fade(shared: &Rc<Shared>) {
    if !shared.context.snapshot().is_fading || shared.fading.replace(true) {
        return;
    }
    let Some(window) = web_sys::window() else {
        shared.fading.set(false);
        return;
    };

    let slot: FrameSlot = Rc::new(RefCell::new(None));
    let frame = Rc::clone(&slot);
    let weak: Weak<Shared> = Rc::downgrade(shared);
    let last = Cell::new(None::<f64>);
    let frame_window = window.clone();

    *slot.borrow_mut() = Some(Closure::new(move |now: f64| {
        let Some(shared) = weak.upgrade() else {
            frame.borrow_mut().take();
            return;
        };

        let millis = last.replace(Some(now)).map_or(0.0, |previous| now - previous);
        let elapsed = Duration::try_from_secs_f64(millis / 1000.0).unwrap_or_default();
        shared.dispatch(Intent::FadeTick(elapsed));

        let next = shared.context.snapshot().is_fading
            && frame.borrow().as_ref().is_some_and(|callback| {
                frame_window
                    .request_animation_frame(callback.as_ref().unchecked_ref())
                    .is_ok()
            });
        if !next {
            shared.fading.set(false);
            frame.borrow_mut().take();
        }
    }));

    let requested = slot.borrow().as_ref().is_some_and(|callback| {
        window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .is_ok()
    });
    if !requested {
        shared.fading.set(false);
        slot.borrow_mut().take();
    }
}

/// Fade length from milliseconds; invalid lengths fade instantly
fn fade_duration(millis: f64) -> Duration {
    Duration::try_from_secs_f64(millis / 1000.0).unwrap_or_default()
}

fn call(callback: &Option<Function>, arg: &JsValue) {
    if let Some(cb) = callback {
        cb.call1(&JsValue::NULL, arg).ok();
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

/// Browser music player
///
/// Owns an `<audio>` element and the playback context driving it.
#[wasm_bindgen]
pub struct WasmPlayer {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Create a player; `config` is an optional `PlaybackConfig` object
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmPlayer, JsValue> {
        // Enable panic hooks for better error messages in console
        console_error_panic_hook::set_once();

        let config: PlaybackConfig = if config.is_undefined() || config.is_null() {
            PlaybackConfig::default()
        } else {
            serde_wasm_bindgen::from_value::<PlaybackConfig>(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?
                .normalized()
        };
        let audio = HtmlAudioElement::new()?;

        let shared = Rc::new_cyclic(|weak: &std::rc::Weak<Shared>| {
            let weak = weak.clone();
            let element = HtmlAudioMedia::new(audio, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.context.pump();
                    shared.flush();
                }
            });
            let context = PlaybackContext::new(&config, element);
            let events = context.subscribe();

            Shared {
                context,
                events,
                callbacks: RefCell::new(Callbacks::default()),
                fading: Cell::new(false),
            }
        });

        Ok(Self { shared })
    }

    fn dispatch(&self, intent: Intent) {
        self.shared.dispatch(intent);
    }

    // ===== Playback Control =====

    pub fn play(&self) {
        self.dispatch(Intent::Play);
    }

    pub fn pause(&self) {
        self.dispatch(Intent::Pause);
    }

    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&self) {
        self.dispatch(Intent::TogglePlayPause);
    }

    pub fn stop(&self) {
        self.dispatch(Intent::Stop);
    }

    pub fn next(&self) {
        self.dispatch(Intent::Next);
    }

    pub fn previous(&self) {
        self.dispatch(Intent::Previous);
    }

    #[wasm_bindgen(js_name = selectTrack)]
    pub fn select_track(&self, index: usize) {
        self.dispatch(Intent::SelectTrack(index));
    }

    /// Seek to position in seconds
    #[wasm_bindgen(js_name = seekTo)]
    pub fn seek_to(&self, seconds: f64) {
        self.dispatch(Intent::Seek(seconds));
    }

    // ===== Volume Control =====

    /// Set volume (0.0 - 1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f64) {
        self.dispatch(Intent::SetVolume(volume));
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        self.dispatch(Intent::ToggleMute);
    }

    /// Start playing from silence, reaching the volume after `millis`
    #[wasm_bindgen(js_name = fadeIn)]
    pub fn fade_in(&self, millis: f64) {
        self.dispatch(Intent::FadeIn(fade_duration(millis)));
        drive_fade(&self.shared);
    }

    /// Fade to silence over `millis`, then pause
    #[wasm_bindgen(js_name = fadeOut)]
    pub fn fade_out(&self, millis: f64) {
        self.dispatch(Intent::FadeOut(fade_duration(millis)));
        drive_fade(&self.shared);
    }

    // ===== Play Mode =====

    /// Set play mode ("normal" | "repeatAll" | "repeatOne" | "shuffle")
    #[wasm_bindgen(js_name = setPlayMode)]
    pub fn set_play_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode = match mode {
            "normal" => PlayMode::Normal,
            "repeatAll" => PlayMode::RepeatAll,
            "repeatOne" => PlayMode::RepeatOne,
            "shuffle" => PlayMode::Shuffle,
            _ => {
                return Err(JsValue::from_str(
                    "Invalid play mode. Use 'normal', 'repeatAll', 'repeatOne' or 'shuffle'",
                ))
            }
        };
        self.dispatch(Intent::SetPlayMode(mode));
        Ok(())
    }

    #[wasm_bindgen(js_name = toggleRepeat)]
    pub fn toggle_repeat(&self) {
        self.dispatch(Intent::ToggleRepeatCycle);
    }

    #[wasm_bindgen(js_name = toggleShuffle)]
    pub fn toggle_shuffle(&self) {
        self.dispatch(Intent::ToggleShuffle);
    }

    // ===== Playlist =====

    /// Play an album from the catalog, starting at `start_index`
    #[wasm_bindgen(js_name = playAlbum)]
    pub fn play_album(
        &self,
        catalog: &WasmCatalog,
        album_id: i64,
        start_index: usize,
    ) -> Result<(), JsValue> {
        let album = catalog
            .catalog()
            .album(AlbumId(album_id))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        self.dispatch(Intent::SetPlaylist {
            playlist: Playlist::from_album(album),
            start_index,
            autoplay: true,
        });
        Ok(())
    }

    /// Replace the playlist with an array of track objects
    #[wasm_bindgen(js_name = setPlaylist)]
    pub fn set_playlist(
        &self,
        tracks: JsValue,
        start_index: usize,
        autoplay: bool,
    ) -> Result<(), JsValue> {
        let tracks: Vec<Track> = serde_wasm_bindgen::from_value(tracks)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse tracks: {e}")))?;

        self.dispatch(Intent::SetPlaylist {
            playlist: Playlist::new(tracks.into_iter().map(Arc::new).collect(), None),
            start_index,
            autoplay,
        });
        Ok(())
    }

    #[wasm_bindgen(js_name = clearPlaylist)]
    pub fn clear_playlist(&self) {
        self.dispatch(Intent::ClearPlaylist);
    }

    /// Append a track object to the playlist
    #[wasm_bindgen(js_name = addToPlaylist)]
    pub fn add_to_playlist(&self, track: JsValue) -> Result<(), JsValue> {
        let track: Track = serde_wasm_bindgen::from_value(track)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse track: {e}")))?;
        self.dispatch(Intent::AddToPlaylist(Arc::new(track)));
        Ok(())
    }

    #[wasm_bindgen(js_name = removeFromPlaylist)]
    pub fn remove_from_playlist(&self, index: usize) {
        self.dispatch(Intent::RemoveFromPlaylist(index));
    }

    #[wasm_bindgen(js_name = shufflePlaylist)]
    pub fn shuffle_playlist(&self) {
        self.dispatch(Intent::ShufflePlaylist);
    }

    /// Forget the recently played tracks
    #[wasm_bindgen(js_name = clearHistory)]
    pub fn clear_history(&self) {
        self.dispatch(Intent::ClearHistory);
    }

    #[wasm_bindgen(js_name = clearError)]
    pub fn clear_error(&self) {
        self.dispatch(Intent::ClearError);
    }

    // ===== State Queries =====

    /// Current playback snapshot as a plain object
    pub fn snapshot(&self) -> JsValue {
        to_js(&self.shared.context.snapshot())
    }

    // ===== Event Listeners =====

    /// Register state change callback, called with the new status string
    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&self, callback: Function) {
        self.shared.callbacks.borrow_mut().on_state_change = Some(callback);
    }

    /// Register track change callback, called with the track or null
    #[wasm_bindgen(js_name = onTrackChange)]
    pub fn on_track_change(&self, callback: Function) {
        self.shared.callbacks.borrow_mut().on_track_change = Some(callback);
    }

    /// Register position callback, called with `(position, duration)`
    #[wasm_bindgen(js_name = onTimeUpdate)]
    pub fn on_time_update(&self, callback: Function) {
        self.shared.callbacks.borrow_mut().on_time_update = Some(callback);
    }

    /// Register error callback, called with a message string
    #[wasm_bindgen(js_name = onError)]
    pub fn on_error(&self, callback: Function) {
        self.shared.callbacks.borrow_mut().on_error = Some(callback);
    }

    /// Release the audio element; the player is inert afterwards
    pub fn dispose(&self) {
        self.shared.context.shutdown();
    }
}
