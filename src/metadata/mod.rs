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

//! Track metadata resolution.
//!
//! The playback session needs the duration of a track before it will play
//! it. This module provides the [`DurationResolver`] capability and its
//! `Lofty` implementation, which reads the audio properties of any container
//! format `Lofty` can probe.

use std::path::Path;

use lofty::prelude::*;
use lofty::probe::Probe;
use thiserror::Error;

/// Failures resolving track metadata.
#[derive(Debug, Error)]
pub(crate) enum MetadataError {
    #[error("no such file: {0}")]
    Missing(String),

    #[error("unreadable audio file: {0}")]
    Unreadable(#[from] lofty::error::LoftyError),
}

/// Resolves the duration of a track.
pub(crate) trait DurationResolver: Send + Sync {
    /// Returns the duration of the track at `path` in whole seconds.
    ///
    /// A result of zero means the file was readable but reports no length.
    fn duration(&self, path: &str) -> Result<u64, MetadataError>;
}

/// Reads durations from audio file properties using `Lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoftyResolver;

impl DurationResolver for LoftyResolver {
    fn duration(&self, path: &str) -> Result<u64, MetadataError> {
        let path_ref = Path::new(path);
        if !path_ref.is_file() {
            return Err(MetadataError::Missing(path.to_string()));
        }

        let tagged_file = Probe::open(path_ref).and_then(|p| p.read())?;

        // Truncated to whole seconds
        Ok(tagged_file.properties().duration().as_secs())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let err = LoftyResolver.duration("/no/such/track.mp3").unwrap_err();
        assert!(matches!(err, MetadataError::Missing(_)));
    }

    #[test]
    fn non_audio_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.wav");
        fs::write(&path, b"these are not the frames you are looking for").unwrap();

        let err = LoftyResolver.duration(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, MetadataError::Unreadable(_)));
    }
}
