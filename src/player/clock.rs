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

//! Silent, clock-driven audio device.
//!
//! Used when no audio backend is compiled in. It behaves like a real device
//! as far as the session can tell: tracks must exist to be loaded, and the
//! elapsed time advances in real time while playing and holds while paused.

use std::{
    path::Path,
    time::{Duration, Instant},
};

use log::debug;

use crate::player::{AudioDevice, DeviceError};

#[derive(Debug, Default)]
pub(crate) struct ClockDevice {
    loaded: Option<String>,
    started_at: Option<Instant>,
    played: Duration,
}

impl ClockDevice {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn ensure_loaded(&self) -> Result<(), DeviceError> {
        match self.loaded {
            Some(_) => Ok(()),
            None => Err(DeviceError::NotLoaded),
        }
    }
}

impl AudioDevice for ClockDevice {
    fn load(&mut self, path: &str) -> Result<(), DeviceError> {
        if !Path::new(path).is_file() {
            return Err(DeviceError::Load {
                path: path.to_string(),
                reason: "no such file".to_string(),
            });
        }

        debug!("Clock device loaded {}", path);
        self.loaded = Some(path.to_string());
        self.started_at = None;
        self.played = Duration::ZERO;
        Ok(())
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        self.ensure_loaded()?;
        self.played = Duration::ZERO;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn pause(&mut self) -> Result<(), DeviceError> {
        self.ensure_loaded()?;
        if let Some(started_at) = self.started_at.take() {
            self.played += started_at.elapsed();
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<(), DeviceError> {
        self.ensure_loaded()?;
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.loaded = None;
        self.started_at = None;
        self.played = Duration::ZERO;
        Ok(())
    }

    fn elapsed_seconds(&mut self) -> Result<f64, DeviceError> {
        self.ensure_loaded()?;
        let running = self.started_at.map(|t| t.elapsed()).unwrap_or_default();
        Ok((self.played + running).as_secs_f64())
    }

    fn is_active(&mut self) -> bool {
        self.loaded.is_some() && self.started_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, thread};

    use super::*;

    #[test]
    fn load_requires_an_existing_file() {
        let mut device = ClockDevice::new();
        let err = device.load("/definitely/not/here.mp3").unwrap_err();
        assert!(matches!(err, DeviceError::Load { .. }));
        assert!(matches!(device.elapsed_seconds(), Err(DeviceError::NotLoaded)));
    }

    #[test]
    fn elapsed_time_holds_while_paused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        fs::write(&path, b"not really audio").unwrap();

        let mut device = ClockDevice::new();
        device.load(path.to_str().unwrap()).unwrap();
        device.play().unwrap();
        assert!(device.is_active());

        thread::sleep(Duration::from_millis(30));
        device.pause().unwrap();
        assert!(!device.is_active());

        let paused_at = device.elapsed_seconds().unwrap();
        assert!(paused_at >= 0.03);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(device.elapsed_seconds().unwrap(), paused_at);

        device.resume().unwrap();
        thread::sleep(Duration::from_millis(10));
        assert!(device.elapsed_seconds().unwrap() > paused_at);

        device.stop().unwrap();
        assert!(!device.is_active());
    }
}
