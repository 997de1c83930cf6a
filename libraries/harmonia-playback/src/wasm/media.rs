//! `MediaElement` over the browser's `HTMLAudioElement`

use crate::error::{PlaybackError, Result};
use crate::media::{MediaElement, MediaSignal, SignalSink};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

type SignalFn = fn(&HtmlAudioElement) -> MediaSignal;

/// DOM events translated into media signals
const LISTENERS: [(&str, SignalFn); 6] = [
    ("loadstart", |_| MediaSignal::LoadStart),
    ("canplay", |_| MediaSignal::CanPlay),
    ("loadedmetadata", |audio| MediaSignal::LoadedMetadata {
        duration: audio.duration(),
    }),
    ("timeupdate", |audio| MediaSignal::TimeUpdate {
        current_time: audio.current_time(),
    }),
    ("ended", |_| MediaSignal::Ended),
    ("error", |audio| MediaSignal::Error {
        code: audio.error().map_or(0, |error| error.code()),
    }),
];

/// The URI we set, and the absolute URL the browser resolved it to
#[derive(Debug, Clone)]
struct SourceTag {
    requested: String,
    resolved: String,
}

type SharedTag = Rc<RefCell<Option<SourceTag>>>;

/// Audio element owned by a `MediaAdapter`
///
/// `notify` runs after every signal so the owner can pump the context.
pub struct HtmlAudioMedia {
    audio: HtmlAudioElement,
    tag: SharedTag,
    sink: Option<SignalSink>,
    listeners: Vec<(&'static str, Closure<dyn FnMut()>)>,
    notify: Rc<dyn Fn()>,
}

impl HtmlAudioMedia {
    pub fn new(audio: HtmlAudioElement, notify: impl Fn() + 'static) -> Self {
        audio.set_preload("auto");
        Self {
            audio,
            tag: Rc::new(RefCell::new(None)),
            sink: None,
            listeners: Vec::new(),
            notify: Rc::new(notify),
        }
    }

    pub fn audio(&self) -> &HtmlAudioElement {
        &self.audio
    }
}

/// Source URI to tag a signal with
///
/// Signals for the source we set carry the URI we were given; anything else
/// carries the browser's URL and will be treated as stale.
fn source_of(audio: &HtmlAudioElement, tag: &SharedTag) -> String {
    let current = audio.current_src();
    let current = if current.is_empty() { audio.src() } else { current };

    match tag.borrow().as_ref() {
        Some(tag) if tag.resolved == current => tag.requested.clone(),
        _ => current,
    }
}

fn js_error_name(error: &JsValue) -> String {
    error
        .dyn_ref::<js_sys::Error>()
        .map(|error| String::from(error.name()))
        .unwrap_or_default()
}

fn js_error_message(error: &JsValue) -> String {
    error
        .dyn_ref::<js_sys::Error>()
        .map(|error| String::from(error.message()))
        .or_else(|| error.as_string())
        .unwrap_or_else(|| "unknown error".to_string())
}

impl MediaElement for HtmlAudioMedia {
    fn set_source(&mut self, uri: &str) {
        self.audio.set_src(uri);
        *self.tag.borrow_mut() = Some(SourceTag {
            requested: uri.to_string(),
            resolved: self.audio.src(),
        });
    }

    fn clear_source(&mut self) {
        self.tag.borrow_mut().take();
        self.audio.remove_attribute("src").ok();
        self.audio.load();
    }

    fn play(&mut self) -> Result<()> {
        let promise = self
            .audio
            .play()
            .map_err(|error| PlaybackError::PlaybackRejected(js_error_message(&error)))?;

        // Autoplay policy rejections arrive through the promise
        let Some(sink) = self.sink.clone() else {
            return Ok(());
        };
        let source = source_of(&self.audio, &self.tag);
        let notify = Rc::clone(&self.notify);
        wasm_bindgen_futures::spawn_local(async move {
            let Err(error) = JsFuture::from(promise).await else {
                return;
            };
            let name = js_error_name(&error);
            match MediaSignal::from_play_error(&name, js_error_message(&error)) {
                Some(signal) => {
                    sink.emit(&source, signal);
                    notify();
                }
                None => debug!(source = %source, name = %name, "Play request interrupted"),
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        self.audio.pause().ok();
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.audio.set_current_time(seconds);
    }

    fn set_volume(&mut self, volume: f64) {
        self.audio.set_volume(volume);
    }

    fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    fn attach(&mut self, sink: SignalSink) {
        self.detach();

        for (name, signal) in LISTENERS {
            let audio = self.audio.clone();
            let tag = Rc::clone(&self.tag);
            let sink = sink.clone();
            let notify = Rc::clone(&self.notify);

            let handler = Closure::<dyn FnMut()>::new(move || {
                sink.emit(&source_of(&audio, &tag), signal(&audio));
                notify();
            });

            if self
                .audio
                .add_event_listener_with_callback(name, handler.as_ref().unchecked_ref())
                .is_ok()
            {
                self.listeners.push((name, handler));
            }
        }

        self.sink = Some(sink);
    }

    fn detach(&mut self) {
        for (name, handler) in self.listeners.drain(..) {
            self.audio
                .remove_event_listener_with_callback(name, handler.as_ref().unchecked_ref())
                .ok();
        }
        self.sink = None;
    }
}
