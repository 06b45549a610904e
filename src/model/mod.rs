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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the application, tracks,
//! track lists and persisted playlists, shared between the playback session,
//! the playlist store and the command layer.

use std::sync::Arc;

/// A single playable audio file with its resolved duration.
///
/// A duration of zero means the duration is unknown or could not be
/// resolved, such a track is never played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Track {
    pub(crate) path: String,
    pub(crate) duration_seconds: u64,
}

/// An immutable, ordered snapshot of track paths.
///
/// Insertion order is playback order and duplicates are permitted. The
/// session keeps its own snapshot, so later changes to the list a snapshot
/// was taken from never affect playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TrackList(Arc<[String]>);

impl TrackList {
    pub(crate) fn new(paths: Vec<String>) -> Self {
        Self(paths.into())
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

impl From<&[String]> for TrackList {
    fn from(paths: &[String]) -> Self {
        Self(paths.into())
    }
}

/// A persisted, named playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Playlist {
    pub(crate) id: i64,
    pub(crate) name: String,
}
