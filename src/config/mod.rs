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

//! Application configuration.
//!
//! This module manages the application configuration file.

use std::time::Duration;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "potify";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub database_file: String,
    pub audio_extensions: Vec<String>,
    pub poll_interval_ms: u64,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            database_file: "potify.db".to_string(),
            audio_extensions: ["mp3", "flac", "ogg", "wav", "m4a", "opus"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            poll_interval_ms: 500,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// The progress monitor period, never shorter than 10ms.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

/// Loads the configuration file, creating it with defaults if missing.
///
/// The caller decides how to report a failure, since this runs before
/// logging is set up.
pub fn load_config() -> Result<AppConfig, confy::ConfyError> {
    confy::load(CONFIG_NAME, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_poll_twice_a_second() {
        let config = AppConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.log_level(), LevelFilter::Info);
        assert!(config.audio_extensions.iter().any(|ext| ext == "mp3"));
    }

    #[test]
    fn silly_values_are_tamed() {
        let config = AppConfig {
            poll_interval_ms: 0,
            log_level: "chatty".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.log_level(), LevelFilter::Info);
    }
}
