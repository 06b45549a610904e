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

//! Console rendering.
//!
//! Turns session snapshots, track lists and playlists into the text shown by
//! the console front-end.

mod icons;

use std::fmt::Write;

use crate::{
    model::Playlist,
    player::PlayerState,
    render::icons::{ICON_PAUSE, ICON_PLAY, ICON_STOP},
    session::Snapshot,
    util::format::{format_time, track_name},
};

/// Renders the one-line player status.
///
/// The format is `<icon> <track> MM:SS / MM:SS | <status message>`.
pub(crate) fn status_line(snapshot: &Snapshot) -> String {
    let icon = match snapshot.state {
        PlayerState::Playing => ICON_PLAY,
        PlayerState::Paused => ICON_PAUSE,
        PlayerState::Stopped => ICON_STOP,
    };

    format!(
        "{} {} {} / {} | {}",
        icon,
        snapshot.track_name.as_deref().unwrap_or("-"),
        format_time(snapshot.position_seconds as u64),
        format_time(snapshot.duration_seconds),
        snapshot.status_message
    )
}

/// Renders a numbered track list, numbering from 1.
pub(crate) fn track_table(title: &str, tracks: &[String]) -> String {
    let mut out = format!("{} ({} tracks)", title, tracks.len());
    for (i, path) in tracks.iter().enumerate() {
        let _ = write!(out, "\n{:>4}  {}", i + 1, track_name(path));
    }
    out
}

pub(crate) fn playlist_table(playlists: &[Playlist]) -> String {
    if playlists.is_empty() {
        return "No playlists".to_string();
    }

    let mut out = String::from("  id  name");
    for playlist in playlists {
        let _ = write!(out, "\n{:>4}  {}", playlist.id, playlist.name);
    }
    out
}
