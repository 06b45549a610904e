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

//! Data access layer.
//!
//! This module handles all interactions with the SQLite database, including
//! schema creation and the playlist queries used by [`PlaylistStore`]. It
//! uses cached statements to optimize frequently executed queries.
//!
//! # Tables
//!
//! * `playlists` - Named playlists, ids are generated by SQLite.
//! * `playlist_songs` - Track paths belonging to a playlist, in insertion
//!   order.
//!
//! # Performance
//!
//! Most functions in this module use [`rusqlite::Connection::prepare_cached`]
//! to reduce SQL parsing overhead.

mod model;
mod store;

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::model::Playlist;

pub(crate) use store::{PlaylistStore, StoreError};


/// Opens a connection to the SQLite database and configures performance settings.
///
/// This function performs the following setup:
/// * **WAL Mode**: Enables Write-Ahead Logging for better concurrency.
/// * **Performance Tuning**: Sets synchronous mode to `NORMAL`.
/// * **Constraints**: Enforces foreign key integrity.
/// * **Schema**: Executes [`create_schema`] to ensure all tables and indices exist.
///
/// # Arguments
///
/// * `path` - The file system path to the SQLite database file.
///
/// # Errors
///
/// Returns an error if:
/// * The database file cannot be opened.
/// * The initial PRAGMA configurations fail.
/// * The schema initialization fails.
pub(crate) fn init_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
    if journal_mode != "wal" {
        anyhow::bail!(
            "Failed to switch to WAL mode. Current mode: {}",
            journal_mode
        );
    }

    conn.execute_batch(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;

    conn.set_prepared_statement_cache_capacity(16);

    create_schema(&conn)?;

    Ok(conn)
}

/// Create the database schema.
///
/// This function creates the `playlists` and `playlist_songs` tables if they
/// do not already exist, along with an index on the playlist foreign key.
///
/// This operation is wrapped in a single SQL transaction to ensure the schema
/// is updated atomically.
///
/// # Errors
///
/// Returns an error if the transaction fails, if there are permission issues
/// with the database file, or if the SQL syntax is invalid.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS playlists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS playlist_songs (
            playlist_id INTEGER NOT NULL,
            song_path TEXT NOT NULL,
            FOREIGN KEY (playlist_id) REFERENCES playlists (id)
        );

        CREATE INDEX IF NOT EXISTS idx_playlist_songs_playlist_id ON playlist_songs (playlist_id);

        COMMIT;",
    )
    .context("Failed to create schema")
}

/// Inserts a new playlist and returns its generated id.
pub(crate) fn insert_playlist(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    let mut stmt = conn.prepare_cached("INSERT INTO playlists (name) VALUES (?1)")?;
    stmt.execute(params![name])?;

    Ok(conn.last_insert_rowid())
}

/// Fetches a single playlist by id.
///
/// Returns `None` if there is no playlist with the given id.
pub(crate) fn fetch_playlist(conn: &Connection, playlist_id: i64) -> rusqlite::Result<Option<Playlist>> {
    let mut stmt = conn.prepare_cached("SELECT id, name FROM playlists WHERE id = ?1")?;
    stmt.query_row(params![playlist_id], Playlist::from_row)
        .optional()
}

/// Fetches all playlists in creation order.
///
/// # Errors
///
/// Returns an error if the SQL query fails or if there is a type mismatch
/// when mapping the database rows to the [`Playlist`] struct.
pub(crate) fn fetch_playlists(conn: &Connection) -> rusqlite::Result<Vec<Playlist>> {
    let mut stmt = conn.prepare_cached("SELECT id, name FROM playlists ORDER BY id")?;
    let results = stmt
        .query_map([], Playlist::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(results)
}

pub(crate) fn insert_playlist_song(
    conn: &Connection,
    playlist_id: i64,
    song_path: &str,
) -> rusqlite::Result<()> {
    let mut stmt =
        conn.prepare_cached("INSERT INTO playlist_songs (playlist_id, song_path) VALUES (?1, ?2)")?;
    stmt.execute(params![playlist_id, song_path])?;

    Ok(())
}

/// Fetches the track paths of a playlist in the order they were added.
///
/// An unknown playlist id simply yields no rows.
pub(crate) fn fetch_playlist_songs(conn: &Connection, playlist_id: i64) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT song_path
         FROM playlist_songs
         WHERE playlist_id = ?1
         ORDER BY rowid
    ",
    )?;

    let mut results = Vec::new();
    for row in stmt.query_map(params![playlist_id], |row| row.get::<_, String>(0))? {
        results.push(row?);
    }

    Ok(results)
}
