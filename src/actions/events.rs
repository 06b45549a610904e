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

//! Application event distribution and orchestration.
//!
//! The main thread consumes [`AppEvent`]s from a single channel:
//!
//! 1. **Input**: lines typed at the console, parsed by the commander and
//!    dispatched to the command handlers.
//! 2. **Session changes**: snapshots published by the playback session,
//!    only the latest one matters.
//! 3. **Exit**: the end of input, or an explicit quit.

use std::io::Write;

use anyhow::Result;
use log::{debug, warn};

use crate::{
    App,
    actions::commands::{AppCommand, handle_command},
    commander, render,
    session::Snapshot,
};

#[derive(Debug)]
pub(crate) enum AppEvent {
    Input(String),

    SessionChanged(Snapshot),

    ExitApplication,
}

/// Runs the main application loop, writing command output and status
/// changes to `out`.
///
/// This function loops until an exit event is received or the event channel
/// is closed, then stops any playback.
pub(crate) fn process_events(app: &mut App, out: &mut impl Write) -> Result<()> {
    while let Ok(event) = app.event_rx.recv() {
        match event {
            AppEvent::Input(line) => {
                if !process_input(app, &line, out)? {
                    break;
                }
            }

            AppEvent::SessionChanged(snapshot) => {
                if is_notable(app.last_snapshot.as_ref(), &snapshot) {
                    writeln!(out, "{}", render::status_line(&snapshot))?;
                }
                app.last_snapshot = Some(snapshot);
            }

            AppEvent::ExitApplication => break,
        }

        out.flush()?;
    }

    if let Err(e) = app.context.session.stop() {
        debug!("Nothing to stop on exit: {}", e);
    }

    Ok(())
}

/// Returns `false` when the input asks to exit.
fn process_input(app: &mut App, line: &str, out: &mut impl Write) -> Result<bool> {
    let command = match commander::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Ok(true),
        Err(e) => {
            writeln!(out, "error: {}", e)?;
            return Ok(true);
        }
    };

    if command == AppCommand::ExitApplication {
        return Ok(false);
    }

    debug!("Command: {:?}", command);

    match handle_command(&mut app.context, command) {
        Ok(text) if text.is_empty() => {}
        Ok(text) => writeln!(out, "{}", text)?,
        Err(e) => {
            warn!("Command failed: {}", e);
            writeln!(out, "error: {}", e)?;
        }
    }

    Ok(true)
}

/// Position-only updates are not worth a line of output.
fn is_notable(previous: Option<&Snapshot>, next: &Snapshot) -> bool {
    match previous {
        None => true,
        Some(previous) => {
            previous.state != next.state
                || previous.track_name != next.track_name
                || previous.status_message != next.status_message
        }
    }
}
