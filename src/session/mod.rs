// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Playback session state machine.
//!
//! The [`PlaybackSession`] owns everything about the one live playback
//! context: the track list snapshot, the current track, the transport state
//! and the derived position. It drives the [`AudioDevice`] and broadcasts a
//! [`Snapshot`] as an [`AppEvent`] after every change.
//!
//! # Concurrency
//!
//! All session fields, the device included, live behind a single mutex. The
//! command layer and the progress monitor both go through it, so a
//! transition is fully applied (state and device command) before anything
//! else observes the session.
//!
//! Each `load`, `resume`, `pause` and `stop` retires the running progress
//! monitor by bumping the session generation and cancelling the monitor's
//! wake-up channel. A retired monitor is joined once the lock is released,
//! so when a transition returns at most one monitor is running.

mod monitor;

use std::{
    mem,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
        mpsc::Sender,
    },
    thread::JoinHandle,
    time::Duration,
};

use log::{debug, error, warn};
use thiserror::Error;

use crate::{
    actions::events::AppEvent,
    metadata::DurationResolver,
    model::{Track, TrackList},
    player::{AudioDevice, DeviceError, PlayerState},
    util::format::track_name,
};

use monitor::MonitorHandle;

const STATUS_IDLE: &str = "No playback";
const STATUS_PAUSED: &str = "Paused";
const STATUS_STOPPED: &str = "Stopped";

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: PlayerState,
    },

    #[error("track {index} does not exist in a list of {len}")]
    InvalidIndex { index: usize, len: usize },

    #[error("unable to play {path}: {reason}")]
    TrackUnplayable { path: String, reason: String },

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// What the UI needs to render the session.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Snapshot {
    pub(crate) state: PlayerState,
    pub(crate) current_index: Option<usize>,
    pub(crate) track_name: Option<String>,
    pub(crate) position_seconds: f64,
    pub(crate) duration_seconds: u64,
    pub(crate) status_message: String,
}

/// The track currently loaded, and where it sits in the track list.
#[derive(Debug)]
struct Cursor {
    index: usize,
    track: Track,
}

struct Inner {
    device: Box<dyn AudioDevice>,
    resolver: Arc<dyn DurationResolver>,
    event_tx: Sender<AppEvent>,

    track_list: TrackList,
    current: Option<Cursor>,
    state: PlayerState,
    position_seconds: f64,
    status_message: String,

    generation: u64,
    monitor: Option<MonitorHandle>,
    retired: Vec<JoinHandle<()>>,
}

struct Shared {
    inner: Mutex<Inner>,
    active_monitors: Arc<AtomicUsize>,
    poll_interval: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A handle to the playback session.
///
/// Cloning the handle shares the same session.
#[derive(Clone)]
pub(crate) struct PlaybackSession {
    shared: Arc<Shared>,
}

impl PlaybackSession {
    /// Creates a stopped session with no track loaded.
    ///
    /// # Arguments
    ///
    /// * `device` - The audio device the session drives exclusively.
    /// * `resolver` - Resolves track durations before playback.
    /// * `event_tx` - Receives a [`Snapshot`] after every change.
    /// * `poll_interval` - The progress monitor period.
    pub(crate) fn new(
        device: Box<dyn AudioDevice>,
        resolver: Arc<dyn DurationResolver>,
        event_tx: Sender<AppEvent>,
        poll_interval: Duration,
    ) -> Self {
        let inner = Inner {
            device,
            resolver,
            event_tx,
            track_list: TrackList::new(Vec::new()),
            current: None,
            state: PlayerState::Stopped,
            position_seconds: 0.0,
            status_message: STATUS_IDLE.to_string(),
            generation: 0,
            monitor: None,
            retired: Vec::new(),
        };

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                active_monitors: Arc::new(AtomicUsize::new(0)),
                poll_interval,
            }),
        }
    }

    /// Loads track `index` of `tracks` and starts playing it from the start.
    ///
    /// The session keeps `tracks` as its own snapshot for auto-advance.
    ///
    /// # Errors
    ///
    /// * [`SessionError::InvalidIndex`] if `index` is outside `tracks`.
    /// * [`SessionError::TrackUnplayable`] if the duration cannot be resolved
    ///   or is zero, the session is left unchanged.
    /// * [`SessionError::Device`] if the device fails, the session is stopped.
    pub(crate) fn load(&self, tracks: TrackList, index: usize) -> Result<(), SessionError> {
        self.transition(|shared, inner| inner.load(shared, tracks, index))
    }

    pub(crate) fn pause(&self) -> Result<(), SessionError> {
        self.transition(|_, inner| inner.pause())
    }

    pub(crate) fn resume(&self) -> Result<(), SessionError> {
        self.transition(|shared, inner| inner.resume(shared))
    }

    /// Stops playback and rewinds, keeping the last loaded track and list.
    pub(crate) fn stop(&self) -> Result<(), SessionError> {
        self.transition(|_, inner| inner.stop())
    }

    /// Moves on to the next track of the list, or stops after the last one.
    pub(crate) fn advance(&self) -> Result<(), SessionError> {
        self.transition(|shared, inner| inner.advance(shared))
    }

    /// Pauses when playing, resumes when paused.
    pub(crate) fn toggle_pause(&self) -> Result<(), SessionError> {
        self.transition(|shared, inner| match inner.state {
            PlayerState::Playing => inner.pause(),
            PlayerState::Paused => inner.resume(shared),
            PlayerState::Stopped => Err(SessionError::InvalidTransition {
                operation: "toggle pause",
                state: inner.state,
            }),
        })
    }

    /// Plays without an explicit track.
    ///
    /// A paused session resumes. Otherwise the last loaded track is played
    /// again from its own list, and if nothing was ever loaded the first
    /// track of `fallback` is played.
    pub(crate) fn replay(&self, fallback: TrackList) -> Result<(), SessionError> {
        self.transition(|shared, inner| {
            if inner.state == PlayerState::Paused {
                return inner.resume(shared);
            }

            match inner.current.as_ref().map(|cursor| cursor.index) {
                Some(index) => {
                    let tracks = inner.track_list.clone();
                    inner.load(shared, tracks, index)
                }
                None => inner.load(shared, fallback, 0),
            }
        })
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        self.shared.lock().snapshot()
    }

    /// The number of progress monitors currently running.
    pub(crate) fn active_monitors(&self) -> usize {
        self.shared.active_monitors.load(Ordering::SeqCst)
    }

    /// Applies a transition under the session lock, then joins any monitor
    /// it retired.
    fn transition<T>(
        &self,
        apply: impl FnOnce(&Arc<Shared>, &mut Inner) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let (result, retired) = {
            let mut inner = self.shared.lock();
            let result = apply(&self.shared, &mut inner);
            (result, mem::take(&mut inner.retired))
        };

        // A retired monitor either wakes on its cancelled channel or finds a
        // stale generation once it gets the lock, both exit immediately.
        for handle in retired {
            if handle.join().is_err() {
                error!("Progress monitor panicked");
            }
        }

        result
    }
}

impl Inner {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            current_index: self.current.as_ref().map(|cursor| cursor.index),
            track_name: self
                .current
                .as_ref()
                .map(|cursor| track_name(&cursor.track.path)),
            position_seconds: self.position_seconds,
            duration_seconds: self.duration_seconds(),
            status_message: self.status_message.clone(),
        }
    }

    fn notify(&self) {
        let _ = self.event_tx.send(AppEvent::SessionChanged(self.snapshot()));
    }

    fn duration_seconds(&self) -> u64 {
        self.current
            .as_ref()
            .map_or(0, |cursor| cursor.track.duration_seconds)
    }

    fn playing_status(&self) -> String {
        match &self.current {
            Some(cursor) => format!("Playing: {}", track_name(&cursor.track.path)),
            None => STATUS_IDLE.to_string(),
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            state: self.state,
        }
    }

    /// Cancels the running monitor, if any, and invalidates its generation.
    fn retire_monitor(&mut self) {
        self.generation += 1;
        if let Some(monitor) = self.monitor.take() {
            self.retired.push(monitor.cancel());
        }
    }

    fn start_monitor(&mut self, shared: &Arc<Shared>) {
        self.retire_monitor();
        match monitor::spawn(shared, self.generation) {
            Ok(monitor) => self.monitor = Some(monitor),
            Err(e) => error!("Failed to start progress monitor: {}", e),
        }
    }

    /// Puts the session in a safe stopped state after a device failure.
    fn device_failed(&mut self, e: DeviceError) -> SessionError {
        error!("Audio device failure: {}", e);

        self.retire_monitor();
        if let Err(stop_error) = self.device.stop() {
            debug!("Device stop after failure also failed: {}", stop_error);
        }
        self.state = PlayerState::Stopped;
        self.position_seconds = 0.0;
        self.status_message = format!("Playback error: {}", e);
        self.notify();

        SessionError::Device(e)
    }

    /// Reports a track that cannot be played without touching the session.
    fn unplayable(&mut self, path: &str, reason: String) -> SessionError {
        warn!("Refusing to play {}: {}", path, reason);

        self.status_message = format!("Unable to play {}: {}", track_name(path), reason);
        self.notify();

        SessionError::TrackUnplayable {
            path: path.to_string(),
            reason,
        }
    }

    fn load(&mut self, shared: &Arc<Shared>, tracks: TrackList, index: usize) -> Result<(), SessionError> {
        let path = tracks
            .get(index)
            .ok_or(SessionError::InvalidIndex {
                index,
                len: tracks.len(),
            })?
            .to_string();

        let duration_seconds = match self.resolver.duration(&path) {
            Ok(0) => return Err(self.unplayable(&path, "track has no duration".to_string())),
            Ok(duration) => duration,
            Err(e) => return Err(self.unplayable(&path, e.to_string())),
        };

        self.retire_monitor();

        let started = self.device.load(&path).and_then(|()| self.device.play());
        if let Err(e) = started {
            return Err(self.device_failed(e));
        }

        debug!("Loaded track {} of {}: {} ({}s)", index, tracks.len(), path, duration_seconds);

        self.track_list = tracks;
        self.current = Some(Cursor {
            index,
            track: Track {
                path,
                duration_seconds,
            },
        });
        self.state = PlayerState::Playing;
        self.position_seconds = 0.0;
        self.status_message = self.playing_status();

        self.start_monitor(shared);
        self.notify();

        Ok(())
    }

    fn pause(&mut self) -> Result<(), SessionError> {
        if self.state != PlayerState::Playing {
            return Err(self.invalid("pause"));
        }

        self.retire_monitor();

        if let Err(e) = self.device.pause() {
            return Err(self.device_failed(e));
        }

        if let Ok(elapsed) = self.device.elapsed_seconds() {
            self.position_seconds = elapsed.clamp(0.0, self.duration_seconds() as f64);
        }

        debug!("Paused at {:.1}s", self.position_seconds);

        self.state = PlayerState::Paused;
        self.status_message = STATUS_PAUSED.to_string();
        self.notify();

        Ok(())
    }

    fn resume(&mut self, shared: &Arc<Shared>) -> Result<(), SessionError> {
        if self.state != PlayerState::Paused {
            return Err(self.invalid("resume"));
        }

        if let Err(e) = self.device.resume() {
            return Err(self.device_failed(e));
        }

        debug!("Resumed at {:.1}s", self.position_seconds);

        self.state = PlayerState::Playing;
        self.status_message = self.playing_status();

        self.start_monitor(shared);
        self.notify();

        Ok(())
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        if self.state == PlayerState::Stopped {
            return Err(self.invalid("stop"));
        }

        self.retire_monitor();

        let stopped = self.device.stop();

        self.state = PlayerState::Stopped;
        self.position_seconds = 0.0;

        if let Err(e) = stopped {
            return Err(self.device_failed(e));
        }

        debug!("Stopped");

        self.status_message = STATUS_STOPPED.to_string();
        self.notify();

        Ok(())
    }

    fn advance(&mut self, shared: &Arc<Shared>) -> Result<(), SessionError> {
        if self.state != PlayerState::Playing {
            return Err(self.invalid("advance"));
        }

        let Some(index) = self.current.as_ref().map(|cursor| cursor.index) else {
            return Err(self.invalid("advance"));
        };

        let next = index + 1;
        if next >= self.track_list.len() {
            debug!("End of track list reached");
            return self.stop();
        }

        let tracks = self.track_list.clone();
        match self.load(shared, tracks, next) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Unable to continue with track {}: {}", next, e);
                if self.state != PlayerState::Stopped {
                    // Errors here are already reported by the stop itself.
                    let _ = self.stop();
                }
                self.status_message = format!("Stopped: {}", e);
                self.notify();
                Err(e)
            }
        }
    }

    /// One progress monitor tick.
    ///
    /// Returns `false` when the monitor for `generation` should exit.
    fn tick(&mut self, shared: &Arc<Shared>, generation: u64) -> bool {
        if self.generation != generation || self.state != PlayerState::Playing {
            return false;
        }

        let Some(duration) = self
            .current
            .as_ref()
            .map(|cursor| cursor.track.duration_seconds as f64)
        else {
            return false;
        };

        let elapsed = match self.device.elapsed_seconds() {
            Ok(elapsed) => elapsed,
            Err(e) if self.device.is_active() => {
                warn!("Skipping progress update: {}", e);
                return true;
            }
            Err(e) => {
                debug!("Device went idle ({}), treating track as finished", e);
                duration
            }
        };

        if elapsed < duration {
            self.position_seconds = elapsed.max(0.0);
            self.notify();
            return true;
        }

        self.position_seconds = duration;
        if let Err(e) = self.advance(shared) {
            debug!("Auto-advance ended playback: {}", e);
        }

        // This monitor was retired by the advance, it must not join itself.
        self.retired.clear();

        false
    }
}
