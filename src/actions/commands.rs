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

//! Application command processing.
//!
//! This module implements the command surface shared by every front-end. An
//! [`AppCommand`] is translated into playback session transitions and
//! playlist store operations, and the result is returned as text to show.
//!
//! Commands never leave the session or the store in a partial state: errors
//! are returned as [`CommandError`]s for the caller to report.

use log::info;
use thiserror::Error;

use crate::{
    db::{PlaylistStore, StoreError},
    library::{self, LibraryError},
    model::TrackList,
    render,
    session::{PlaybackSession, SessionError},
};

const HELP: &str = "\
Commands:
  upload <file>...          add files to the uploads list
  folder <dir>              load the audio files of a folder
  list [uploads|folder]     show a track list
  play                      resume, replay the last track, or play upload 1
  play <n> [uploads|folder] play track n of a list
  pause                     pause or resume
  stop                      stop playback
  playlists                 list saved playlists
  new <name>                create a playlist
  add <id> <file>           add a file to a playlist
  show <id>                 show the tracks of a playlist
  playlist <id>             play a playlist from the start
  status                    show the player status
  quit                      exit
Use double quotes around paths containing spaces.";

/// Which in-memory track list a command refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListSource {
    Uploads,
    Folder,
}

#[derive(Debug, PartialEq)]
pub(crate) enum AppCommand {
    UploadFiles(Vec<String>),
    UploadFolder(String),
    ShowList(ListSource),

    Play,
    PlayTrack { index: usize, source: ListSource },
    TogglePause,
    Stop,

    ListPlaylists,
    CreatePlaylist(String),
    AddSongToPlaylist { playlist_id: i64, path: String },
    ShowPlaylist(i64),
    PlayPlaylist(i64),

    Status,
    Help,
    ExitApplication,
}

#[derive(Debug, Error)]
pub(crate) enum CommandError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} has no tracks")]
    NoTracks(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// Bundles the resources command handlers work on.
pub(crate) struct CommandContext {
    pub(crate) session: PlaybackSession,
    pub(crate) store: PlaylistStore,
    pub(crate) uploads: Vec<String>,
    pub(crate) folder: Vec<String>,
    pub(crate) audio_extensions: Vec<String>,
}

impl CommandContext {
    fn list(&self, source: ListSource) -> (&'static str, &[String]) {
        match source {
            ListSource::Uploads => ("Uploads", self.uploads.as_slice()),
            ListSource::Folder => ("Folder", self.folder.as_slice()),
        }
    }
}

/// Orchestrates the execution of a single command.
///
/// Returns the text to show the user, which may be empty.
pub(crate) fn handle_command(
    ctx: &mut CommandContext,
    command: AppCommand,
) -> Result<String, CommandError> {
    match command {
        AppCommand::UploadFiles(paths) => upload_files(ctx, paths),
        AppCommand::UploadFolder(dir) => upload_folder(ctx, &dir),
        AppCommand::ShowList(source) => {
            let (title, tracks) = ctx.list(source);
            Ok(render::track_table(title, tracks))
        }

        AppCommand::Play => {
            ctx.session.replay(TrackList::from(ctx.uploads.as_slice()))?;
            Ok(String::new())
        }
        AppCommand::PlayTrack { index, source } => play_track(ctx, index, source),
        AppCommand::TogglePause => {
            ctx.session.toggle_pause()?;
            Ok(String::new())
        }
        AppCommand::Stop => {
            ctx.session.stop()?;
            Ok(String::new())
        }

        AppCommand::ListPlaylists => {
            let playlists = ctx.store.list_playlists()?;
            Ok(render::playlist_table(&playlists))
        }
        AppCommand::CreatePlaylist(name) => {
            let id = ctx.store.create_playlist(&name)?;
            info!("Created playlist {}", id);
            Ok(format!("Created playlist {} '{}'", id, name.trim()))
        }
        AppCommand::AddSongToPlaylist { playlist_id, path } => {
            ctx.store.add_song(playlist_id, &path)?;
            Ok(format!("Added to playlist {}", playlist_id))
        }
        AppCommand::ShowPlaylist(playlist_id) => show_playlist(ctx, playlist_id),
        AppCommand::PlayPlaylist(playlist_id) => play_playlist(ctx, playlist_id),

        AppCommand::Status => Ok(render::status_line(&ctx.session.snapshot())),
        AppCommand::Help => Ok(HELP.to_string()),

        // The event loop owns the application lifetime
        AppCommand::ExitApplication => Ok(String::new()),
    }
}

fn upload_files(ctx: &mut CommandContext, paths: Vec<String>) -> Result<String, CommandError> {
    let upload = library::check_files(paths);
    let added = upload.accepted.len();
    ctx.uploads.extend(upload.accepted);

    let mut message = format!("Added {} track(s), {} uploaded", added, ctx.uploads.len());
    if !upload.rejected.is_empty() {
        message.push_str(&format!("\nSkipped missing: {}", upload.rejected.join(", ")));
    }

    Ok(message)
}

fn upload_folder(ctx: &mut CommandContext, dir: &str) -> Result<String, CommandError> {
    let tracks = library::scan_folder(dir, &ctx.audio_extensions)?;
    info!("Loaded {} tracks from {}", tracks.len(), dir);

    ctx.folder = tracks;
    Ok(render::track_table("Folder", &ctx.folder))
}

fn play_track(ctx: &mut CommandContext, index: usize, source: ListSource) -> Result<String, CommandError> {
    let (title, tracks) = ctx.list(source);
    if tracks.is_empty() {
        return Err(CommandError::NoTracks(title.to_string()));
    }

    ctx.session.load(TrackList::from(tracks), index)?;
    Ok(String::new())
}

fn show_playlist(ctx: &mut CommandContext, playlist_id: i64) -> Result<String, CommandError> {
    let playlist = ctx
        .store
        .playlist(playlist_id)?
        .ok_or(StoreError::NotFound(playlist_id))?;
    let tracks = ctx.store.load_playlist_tracks(playlist_id)?;

    Ok(render::track_table(&playlist.name, &tracks))
}

fn play_playlist(ctx: &mut CommandContext, playlist_id: i64) -> Result<String, CommandError> {
    let tracks = ctx.store.load_playlist_tracks(playlist_id)?;
    if tracks.is_empty() {
        return match ctx.store.playlist(playlist_id)? {
            Some(playlist) => Err(CommandError::NoTracks(format!("playlist '{}'", playlist.name))),
            None => Err(StoreError::NotFound(playlist_id).into()),
        };
    }

    ctx.session.load(TrackList::new(tracks), 0)?;
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::{Arc, mpsc},
        time::Duration,
    };

    use tempfile::TempDir;

    use super::*;
    use crate::{
        metadata::{DurationResolver, MetadataError},
        player::{ClockDevice, PlayerState},
    };

    /// Every existing file lasts a minute.
    struct MinuteResolver;

    impl DurationResolver for MinuteResolver {
        fn duration(&self, path: &str) -> Result<u64, MetadataError> {
            if std::path::Path::new(path).is_file() {
                Ok(60)
            } else {
                Err(MetadataError::Missing(path.to_string()))
            }
        }
    }

    fn context() -> (TempDir, CommandContext) {
        let dir = tempfile::tempdir().unwrap();
        let (event_tx, _) = mpsc::channel();
        let session = PlaybackSession::new(
            Box::new(ClockDevice::new()),
            Arc::new(MinuteResolver),
            event_tx,
            Duration::from_secs(60),
        );
        let store = PlaylistStore::open(&dir.path().join("test.db")).unwrap();

        let ctx = CommandContext {
            session,
            store,
            uploads: Vec::new(),
            folder: Vec::new(),
            audio_extensions: vec!["mp3".to_string()],
        };
        (dir, ctx)
    }

    fn touch(dir: &TempDir, name: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, b"").unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn uploads_accumulate_and_play() {
        let (dir, mut ctx) = context();
        let a = touch(&dir, "a.mp3");
        let b = touch(&dir, "b.mp3");

        handle_command(&mut ctx, AppCommand::UploadFiles(vec![a])).unwrap();
        let message =
            handle_command(&mut ctx, AppCommand::UploadFiles(vec![b, "/gone.mp3".to_string()]))
                .unwrap();
        assert!(message.contains("Skipped missing: /gone.mp3"));
        assert_eq!(ctx.uploads.len(), 2);

        handle_command(
            &mut ctx,
            AppCommand::PlayTrack {
                index: 1,
                source: ListSource::Uploads,
            },
        )
        .unwrap();
        let snapshot = ctx.session.snapshot();
        assert_eq!(snapshot.state, PlayerState::Playing);
        assert_eq!(snapshot.track_name.as_deref(), Some("b.mp3"));

        handle_command(&mut ctx, AppCommand::TogglePause).unwrap();
        assert_eq!(ctx.session.snapshot().state, PlayerState::Paused);
        handle_command(&mut ctx, AppCommand::Stop).unwrap();
        assert_eq!(ctx.session.snapshot().state, PlayerState::Stopped);
    }

    #[test]
    fn playing_an_empty_list_is_reported() {
        let (_dir, mut ctx) = context();

        let err = handle_command(
            &mut ctx,
            AppCommand::PlayTrack {
                index: 0,
                source: ListSource::Folder,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CommandError::NoTracks(_)));

        let err = handle_command(&mut ctx, AppCommand::Play).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Session(SessionError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn folder_uploads_replace_the_folder_list() {
        let (dir, mut ctx) = context();
        let music = dir.path().join("music");
        fs::create_dir(&music).unwrap();
        fs::write(music.join("one.mp3"), b"").unwrap();
        fs::write(music.join("cover.jpg"), b"").unwrap();

        let music = music.to_str().unwrap().to_string();
        handle_command(&mut ctx, AppCommand::UploadFolder(music.clone())).unwrap();
        handle_command(&mut ctx, AppCommand::UploadFolder(music)).unwrap();
        assert_eq!(ctx.folder.len(), 1);

        let err = handle_command(&mut ctx, AppCommand::UploadFolder("/no/such/dir".to_string()))
            .unwrap_err();
        assert!(matches!(err, CommandError::Library(LibraryError::NotAFolder(_))));
    }

    #[test]
    fn playlists_are_created_filled_and_played() {
        let (dir, mut ctx) = context();
        let a = touch(&dir, "a.mp3");

        let message =
            handle_command(&mut ctx, AppCommand::CreatePlaylist("Road Trip".to_string())).unwrap();
        assert_eq!(message, "Created playlist 1 'Road Trip'");

        let err = handle_command(&mut ctx, AppCommand::PlayPlaylist(1)).unwrap_err();
        assert!(matches!(err, CommandError::NoTracks(_)));

        handle_command(
            &mut ctx,
            AppCommand::AddSongToPlaylist {
                playlist_id: 1,
                path: a,
            },
        )
        .unwrap();

        let listing = handle_command(&mut ctx, AppCommand::ShowPlaylist(1)).unwrap();
        assert!(listing.starts_with("Road Trip (1 tracks)"));

        handle_command(&mut ctx, AppCommand::PlayPlaylist(1)).unwrap();
        assert_eq!(
            ctx.session.snapshot().track_name.as_deref(),
            Some("a.mp3")
        );
    }

    #[test]
    fn unknown_playlists_are_not_found() {
        let (_dir, mut ctx) = context();

        for command in [AppCommand::PlayPlaylist(9), AppCommand::ShowPlaylist(9)] {
            let err = handle_command(&mut ctx, command).unwrap_err();
            assert!(matches!(err, CommandError::Store(StoreError::NotFound(9))));
        }

        let err = handle_command(&mut ctx, AppCommand::CreatePlaylist(String::new())).unwrap_err();
        assert!(matches!(err, CommandError::Store(StoreError::Validation(_))));
    }
}
