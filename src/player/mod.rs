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

//! Audio output capability and playback state.
//!
//! This module defines the [`AudioDevice`] capability the playback session
//! drives. The session never decodes or mixes audio itself, it only issues
//! load and transport commands to a device and polls the elapsed time.
//!
//! Two backends are provided:
//!
//! * [`ClockDevice`] - a silent device driven by the wall clock, always
//!   available.
//! * `MpvDevice` - real output through `libmpv`, compiled with the `mpv`
//!   feature.

mod clock;
#[cfg(feature = "mpv")]
mod commands;

use std::fmt;

use thiserror::Error;

pub(crate) use clock::ClockDevice;
#[cfg(feature = "mpv")]
pub(crate) use commands::MpvDevice;

/// Represents the current playback status of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayerState {
    Playing,
    Paused,
    Stopped,
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Failures reported by an audio device.
#[derive(Debug, Error)]
pub(crate) enum DeviceError {
    #[error("failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("no track loaded")]
    NotLoaded,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("audio backend failure: {0}")]
    Backend(String),

    #[error("audio worker is not running")]
    Disconnected,
}

/// An audio output device.
///
/// Implementations are owned by the playback session and only ever called
/// while the session lock is held, so calls never overlap.
pub(crate) trait AudioDevice: Send {
    /// Loads a track, replacing whatever was loaded before. Does not start
    /// playback.
    fn load(&mut self, path: &str) -> Result<(), DeviceError>;

    /// Starts playback of the loaded track from the beginning.
    fn play(&mut self) -> Result<(), DeviceError>;

    fn pause(&mut self) -> Result<(), DeviceError>;

    fn resume(&mut self) -> Result<(), DeviceError>;

    fn stop(&mut self) -> Result<(), DeviceError>;

    /// Seconds of the current track played so far.
    fn elapsed_seconds(&mut self) -> Result<f64, DeviceError>;

    /// Whether the device is currently producing sound.
    fn is_active(&mut self) -> bool;
}
