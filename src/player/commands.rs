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

//! MPV-backed audio device.
//!
//! This module provides real audio output through `libmpv`. The MPV context
//! is not shareable between threads, so it lives in a dedicated worker thread
//! and [`MpvDevice`] is a proxy that sends [`DeviceRequest`]s to that worker
//! and waits for each reply.
//!
//! # Architecture
//!
//! The worker uses a dual-channel communication pattern:
//! 1. **Request Channel**: Receives [`DeviceRequest`]s from the session, each
//!    carrying its own reply channel.
//! 2. **MPV Events**: Drained between requests so the MPV event queue never
//!    fills up.

use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use log::{debug, error};

use crate::player::{AudioDevice, DeviceError};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(50);

type Reply<T> = Sender<Result<T, DeviceError>>;

#[derive(Debug)]
enum DeviceRequest {
    Load(String, Reply<()>),
    Play(Reply<()>),
    Pause(Reply<()>),
    Resume(Reply<()>),
    Stop(Reply<()>),
    Elapsed(Reply<f64>),
    IsActive(Reply<bool>),
}

/// A handle to the MPV worker thread.
pub(crate) struct MpvDevice {
    request_tx: Sender<DeviceRequest>,
}

impl MpvDevice {
    /// Spawns the MPV worker thread and returns a device handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the MPV context cannot be created, the worker
    /// reports the failure back before this function returns.
    pub(crate) fn new() -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        thread::Builder::new()
            .name("mpv-worker".to_string())
            .spawn(move || {
                let handler = match create_handler() {
                    Ok(handler) => {
                        let _ = ready_tx.send(Ok(()));
                        handler
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(format!("{:#}", e)));
                        return;
                    }
                };

                device_worker(handler, request_rx);
            })
            .context("Failed to spawn MPV worker")?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { request_tx }),
            Ok(Err(e)) => anyhow::bail!("MPV initialisation failed: {}", e),
            Err(_) => anyhow::bail!("MPV worker exited during initialisation"),
        }
    }

    fn request<T>(&self, build: impl FnOnce(Reply<T>) -> DeviceRequest) -> Result<T, DeviceError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.request_tx
            .send(build(reply_tx))
            .map_err(|_| DeviceError::Disconnected)?;
        reply_rx.recv().map_err(|_| DeviceError::Disconnected)?
    }
}

impl AudioDevice for MpvDevice {
    fn load(&mut self, path: &str) -> Result<(), DeviceError> {
        self.request(|reply| DeviceRequest::Load(path.to_string(), reply))
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        self.request(DeviceRequest::Play)
    }

    fn pause(&mut self) -> Result<(), DeviceError> {
        self.request(DeviceRequest::Pause)
    }

    fn resume(&mut self) -> Result<(), DeviceError> {
        self.request(DeviceRequest::Resume)
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.request(DeviceRequest::Stop)
    }

    fn elapsed_seconds(&mut self) -> Result<f64, DeviceError> {
        self.request(DeviceRequest::Elapsed)
    }

    fn is_active(&mut self) -> bool {
        self.request(DeviceRequest::IsActive).unwrap_or(false)
    }
}

fn create_handler() -> Result<mpv::MpvHandler> {
    let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
    builder
        .set_option("vo", "null")
        .context("Failed to set no video output")?;
    builder.build().context("Failed to build MPV handler")
}

/// The execution loop for the MPV backend.
///
/// Serves requests until every [`MpvDevice`] handle has been dropped.
fn device_worker(mut handler: mpv::MpvHandler, request_rx: Receiver<DeviceRequest>) {
    loop {
        match request_rx.recv_timeout(EVENT_POLL_INTERVAL) {
            Ok(request) => handle_request(&mut handler, request),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        while handler.wait_event(0.0).is_some() {}
    }

    debug!("MPV worker exiting");
}

fn handle_request(handler: &mut mpv::MpvHandler, request: DeviceRequest) {
    match request {
        DeviceRequest::Load(path, reply) => {
            // Loaded paused so that `play` decides when sound starts.
            let result = handler
                .set_property("pause", true)
                .and_then(|_| handler.command(&["loadfile", &path, "replace"]))
                .map_err(|e| DeviceError::Load {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            let _ = reply.send(result);
        }
        DeviceRequest::Play(reply) | DeviceRequest::Resume(reply) => {
            let _ = reply.send(backend(handler.set_property("pause", false)));
        }
        DeviceRequest::Pause(reply) => {
            let _ = reply.send(backend(handler.set_property("pause", true)));
        }
        DeviceRequest::Stop(reply) => {
            let _ = reply.send(backend(handler.command(&["stop"])));
        }
        DeviceRequest::Elapsed(reply) => {
            let result = handler
                .get_property::<f64>("time-pos")
                .map_err(|_| DeviceError::PositionUnavailable);
            let _ = reply.send(result);
        }
        DeviceRequest::IsActive(reply) => {
            let idle = handler.get_property::<bool>("idle-active").unwrap_or(true);
            let paused = handler.get_property::<bool>("pause").unwrap_or(true);
            let _ = reply.send(Ok(!idle && !paused));
        }
    }
}

fn backend(result: Result<(), mpv::Error>) -> Result<(), DeviceError> {
    result.map_err(|e| {
        error!("MPV command failed: {}", e);
        DeviceError::Backend(e.to_string())
    })
}
