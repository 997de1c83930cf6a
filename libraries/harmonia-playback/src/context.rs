//! Global playback context
//!
//! One [`PlaybackContext`] is built by the application entry point and
//! handed to every consumer by reference. It owns the state machine and the
//! media adapter, runs every transition under a single lock, and fans out
//! [`PlaybackEvent`]s to subscribers.

use crate::{
    config::PlaybackConfig,
    events::PlaybackEvent,
    machine::{Input, Intent, MediaCommand, PlaybackMachine},
    media::{AdapterEvent, AdapterEventKind, MediaAdapter, MediaElement},
    snapshot::PlaybackSnapshot,
    types::PlaybackState,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use tracing::{debug, trace, warn};

struct Inner<E: MediaElement> {
    machine: PlaybackMachine,
    adapter: Option<MediaAdapter<E>>,
}

impl<E: MediaElement> Inner<E> {
    /// Apply `inputs` in order, run their commands, then feed back whatever
    /// the adapter reported until nothing is pending
    ///
    /// Signals raised by these commands are queued behind the given inputs.
    fn run(&mut self, inputs: impl IntoIterator<Item = Input>) {
        let mut queue: VecDeque<Input> = inputs.into_iter().collect();

        while let Some(input) = queue.pop_front() {
            for command in self.machine.apply(input) {
                if let Some(event) = self.execute(command) {
                    queue.push_back(event.into());
                }
            }

            if queue.is_empty() {
                if let Some(adapter) = self.adapter.as_mut() {
                    queue.extend(adapter.drain().into_iter().map(Input::Media));
                }
            }
        }
    }

    /// Run one command; a refused play comes back as an adapter event
    fn execute(&mut self, command: MediaCommand) -> Option<AdapterEvent> {
        let Some(adapter) = self.adapter.as_mut() else {
            trace!(?command, "Adapter released, dropping command");
            return None;
        };

        match command {
            MediaCommand::Load(uri) => {
                adapter.load(&uri);
            }
            MediaCommand::Play => {
                if let Err(err) = adapter.play() {
                    warn!(error = %err, "Play command failed");
                    let source = adapter.source().unwrap_or_default().to_string();
                    return Some(AdapterEvent::new(source, AdapterEventKind::PlaybackRejected));
                }
            }
            MediaCommand::Pause => adapter.pause(),
            MediaCommand::Seek(seconds) => {
                adapter.seek(seconds);
            }
            MediaCommand::SetVolume(volume) => adapter.set_volume(volume),
            MediaCommand::SetMuted(muted) => adapter.set_muted(muted),
            MediaCommand::Unload => adapter.unload(),
        }
        None
    }
}

/// Single owner of playback state and the media element
pub struct PlaybackContext<E: MediaElement> {
    inner: Mutex<Inner<E>>,
    subscribers: Mutex<Vec<Sender<PlaybackEvent>>>,
}

impl<E: MediaElement> PlaybackContext<E> {
    /// Build the context and bring `element` in line with the configured
    /// volume
    pub fn new(config: &PlaybackConfig, element: E) -> Self {
        Self::with_machine(PlaybackMachine::new(config), element)
    }

    pub fn with_machine(machine: PlaybackMachine, element: E) -> Self {
        let mut inner = Inner {
            machine,
            adapter: Some(MediaAdapter::new(element)),
        };
        for command in inner.machine.initial_commands() {
            inner.execute(command);
        }
        inner.machine.drain_events();

        Self {
            inner: Mutex::new(inner),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Apply a user intent
    ///
    /// Blocks until any transition in flight has finished, so transitions
    /// never interleave. Subscribers are notified after the lock is
    /// released.
    pub fn dispatch(&self, intent: Intent) {
        let events = {
            let mut inner = self.lock();
            if inner.adapter.is_none() {
                debug!(?intent, "Context shut down, ignoring intent");
                return;
            }
            inner.run([Input::Intent(intent)]);
            inner.machine.drain_events()
        };
        self.publish(events);
    }

    /// Process pending media signals without blocking
    ///
    /// Returns `false` if a transition was in flight; its own drain picks the
    /// signals up.
    pub fn pump(&self) -> bool {
        let events = {
            let mut inner = match self.inner.try_lock() {
                Ok(inner) => inner,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return false,
            };
            let Some(adapter) = inner.adapter.as_mut() else {
                return true;
            };
            let pending = adapter.drain();
            inner.run(pending.into_iter().map(Input::Media));
            inner.machine.drain_events()
        };
        self.publish(events);
        true
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.lock().machine.snapshot()
    }

    pub fn state(&self) -> PlaybackState {
        self.lock().machine.state().clone()
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Release the media element; later intents are ignored
    pub fn shutdown(&self) {
        let adapter = self.lock().adapter.take();
        if adapter.is_some() {
            debug!("Shutting down playback context");
        }
        drop(adapter);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().adapter.is_none()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, events: Vec<PlaybackEvent>) {
        if events.is_empty() {
            return;
        }
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| events.iter().all(|event| tx.send(event.clone()).is_ok()));
    }
}
