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

//! Durable playlist storage.
//!
//! [`PlaylistStore`] is the single writer of playlist rows. Every operation
//! runs in exactly one transaction on a shared connection, so concurrent
//! callers never observe or produce partial writes.

use std::{
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use log::debug;
use rusqlite::{Connection, TransactionBehavior};
use thiserror::Error;

use crate::{db, model::Playlist};

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("playlist {0} does not exist")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub(crate) struct PlaylistStore {
    conn: Mutex<Connection>,
}

impl PlaylistStore {
    /// Opens (creating if needed) the playlist database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created, see [`db::init_db`].
    pub(crate) fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = db::init_db(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a new playlist, returning its generated id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the name is empty or blank.
    pub(crate) fn create_playlist(&self, name: &str) -> Result<i64, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation(
                "playlist name must not be empty".to_string(),
            ));
        }

        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id = db::insert_playlist(&tx, name)?;
        tx.commit()?;

        debug!("Created playlist {} '{}'", id, name);
        Ok(id)
    }

    /// Appends a track path to a playlist.
    ///
    /// # Errors
    ///
    /// * [`StoreError::Validation`] if `path` is not an existing file.
    /// * [`StoreError::NotFound`] if there is no playlist with the given id.
    pub(crate) fn add_song(&self, playlist_id: i64, path: &str) -> Result<(), StoreError> {
        if path.is_empty() || !Path::new(path).is_file() {
            return Err(StoreError::Validation(format!("no such file: {}", path)));
        }

        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if db::fetch_playlist(&tx, playlist_id)?.is_none() {
            return Err(StoreError::NotFound(playlist_id));
        }
        db::insert_playlist_song(&tx, playlist_id, path)?;
        tx.commit()?;

        debug!("Added {} to playlist {}", path, playlist_id);
        Ok(())
    }

    /// Lists all playlists in creation order.
    pub(crate) fn list_playlists(&self) -> Result<Vec<Playlist>, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let playlists = db::fetch_playlists(&tx)?;
        tx.commit()?;

        Ok(playlists)
    }

    /// Fetches a single playlist, `None` if it does not exist.
    pub(crate) fn playlist(&self, playlist_id: i64) -> Result<Option<Playlist>, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let playlist = db::fetch_playlist(&tx, playlist_id)?;
        tx.commit()?;

        Ok(playlist)
    }

    /// Loads the track paths of a playlist in insertion order.
    ///
    /// An empty or unknown playlist yields an empty list.
    pub(crate) fn load_playlist_tracks(&self, playlist_id: i64) -> Result<Vec<String>, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let tracks = db::fetch_playlist_songs(&tx, playlist_id)?;
        tx.commit()?;

        Ok(tracks)
    }
}
