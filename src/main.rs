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

//! # Potify.
//!
//! A local audio playback controller.
//!
//! Tracks are uploaded by path or loaded from a folder, played one after
//! another through an audio device, and can be collected into playlists
//! stored in SQLite.
//!
//! ## Architecture
//!
//! * The **Main Thread** runs the event loop, executing console commands and
//!   printing session status changes.
//! * An **Input Thread** reads console lines and forwards them as events.
//! * The **Playback Session** owns the audio device, and runs a progress
//!   monitor thread while a track plays to follow its position and move on
//!   to the next track when it ends.
//!
//! Communication between the threads is handled via `std::sync::mpsc`
//! channels.

mod actions;
mod commander;
mod config;
mod db;
mod library;
mod metadata;
mod model;
mod player;
mod render;
mod session;
mod util;

use anyhow::{Context, Result};
use log::warn;
use std::{
    io::{self, BufRead},
    path::Path,
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread,
};

use crate::{
    actions::{
        commands::CommandContext,
        events::{AppEvent, process_events},
    },
    config::AppConfig,
    db::PlaylistStore,
    metadata::LoftyResolver,
    player::AudioDevice,
    session::{PlaybackSession, Snapshot},
};

/// Application state.
struct App {
    pub context: CommandContext,

    pub event_rx: Receiver<AppEvent>,

    /// The most recent session snapshot received.
    pub last_snapshot: Option<Snapshot>,
}

impl App {
    /// Create a new instance of application state.
    pub fn new(config: &AppConfig, event_tx: Sender<AppEvent>, event_rx: Receiver<AppEvent>) -> Result<Self> {
        let store = PlaylistStore::open(Path::new(&config.database_file))
            .with_context(|| format!("Failed to open database {}", config.database_file))?;

        let session = PlaybackSession::new(
            create_device()?,
            Arc::new(LoftyResolver),
            event_tx,
            config.poll_interval(),
        );

        Ok(Self {
            context: CommandContext {
                session,
                store,
                uploads: Vec::new(),
                folder: Vec::new(),
                audio_extensions: config.audio_extensions.clone(),
            },
            event_rx,
            last_snapshot: None,
        })
    }
}

/// The entry point of the application.
///
/// Sets up logging and the communication channels, initializes the
/// application state and runs the event loop until the user quits.
fn main() -> Result<()> {
    let config = config::load_config();

    let log_level = config.as_ref().map_or(log::LevelFilter::Info, AppConfig::log_level);
    let mut clog = colog::default_builder();
    clog.filter(None, log_level);
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    let config = config.unwrap_or_else(|e| {
        warn!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });

    let (event_tx, event_rx) = mpsc::channel();

    let mut app = App::new(&config, event_tx.clone(), event_rx).context("Failed to initialise application")?;

    run(&mut app, event_tx).context("Application error occurred")
}

#[cfg(feature = "mpv")]
fn create_device() -> Result<Box<dyn AudioDevice>> {
    let device = player::MpvDevice::new()?;
    log::info!("Using MPV audio output");
    Ok(Box::new(device))
}

#[cfg(not(feature = "mpv"))]
fn create_device() -> Result<Box<dyn AudioDevice>> {
    warn!("Built without MPV support, playback is silent");
    Ok(Box::new(player::ClockDevice::new()))
}

/// Starts the input thread and enters the main event loop.
///
/// End of input is treated the same as a quit command.
fn run(app: &mut App, event_tx: Sender<AppEvent>) -> Result<()> {
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if event_tx.send(AppEvent::Input(line)).is_err() {
                    return;
                }
            }
            let _ = event_tx.send(AppEvent::ExitApplication);
        })
        .context("Failed to spawn input thread")?;

    println!("Type 'help' for a list of commands.");

    // Application event loop, process events until the user quits
    process_events(app, &mut io::stdout())
}
