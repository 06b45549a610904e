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

//! Command-line input parsing.
//!
//! This module turns a line typed at the console into an [`AppCommand`].
//! Arguments are separated by whitespace, double quotes group an argument
//! containing spaces.

use crate::actions::commands::{AppCommand, CommandError, ListSource};

/// Parses one line of console input.
///
/// Returns `None` for a blank line.
///
/// # Errors
///
/// Returns [`CommandError::Validation`] for unknown commands, malformed
/// arguments and unterminated quotes.
pub(crate) fn parse(line: &str) -> Result<Option<AppCommand>, CommandError> {
    let args = split_args(line)?;
    let parts: Vec<&str> = args.iter().map(String::as_str).collect();

    let command = match parts.as_slice() {
        [] => return Ok(None),

        ["q" | "quit" | "exit"] => AppCommand::ExitApplication,
        ["h" | "help" | "?"] => AppCommand::Help,
        ["status"] => AppCommand::Status,

        ["upload"] => return Err(usage("upload <file>...")),
        ["upload", paths @ ..] => {
            AppCommand::UploadFiles(paths.iter().map(|p| p.to_string()).collect())
        }
        ["folder", dir @ ..] if !dir.is_empty() => AppCommand::UploadFolder(dir.join(" ")),
        ["list"] => AppCommand::ShowList(ListSource::Uploads),
        ["list", source] => AppCommand::ShowList(parse_source(source)?),

        ["play"] => AppCommand::Play,
        ["play", number] => AppCommand::PlayTrack {
            index: parse_track_number(number)?,
            source: ListSource::Uploads,
        },
        ["play", number, source] => AppCommand::PlayTrack {
            index: parse_track_number(number)?,
            source: parse_source(source)?,
        },
        ["p" | "pause"] => AppCommand::TogglePause,
        ["s" | "stop"] => AppCommand::Stop,

        ["playlists"] => AppCommand::ListPlaylists,
        ["new", name @ ..] => AppCommand::CreatePlaylist(name.join(" ")),
        ["add", id, path @ ..] if !path.is_empty() => AppCommand::AddSongToPlaylist {
            playlist_id: parse_playlist_id(id)?,
            path: path.join(" "),
        },
        ["show", id] => AppCommand::ShowPlaylist(parse_playlist_id(id)?),
        ["playlist", id] => AppCommand::PlayPlaylist(parse_playlist_id(id)?),

        ["folder", ..] => return Err(usage("folder <dir>")),
        ["add", ..] => return Err(usage("add <id> <file>")),

        [cmd, ..] => {
            return Err(CommandError::Validation(format!(
                "unknown command '{}', try 'help'",
                cmd
            )));
        }
    };

    Ok(Some(command))
}

fn usage(text: &str) -> CommandError {
    CommandError::Validation(format!("usage: {}", text))
}

fn parse_source(source: &str) -> Result<ListSource, CommandError> {
    match source {
        "uploads" | "u" => Ok(ListSource::Uploads),
        "folder" | "f" => Ok(ListSource::Folder),
        _ => Err(CommandError::Validation(format!(
            "unknown list '{}', expected 'uploads' or 'folder'",
            source
        ))),
    }
}

/// Track numbers are shown from 1, indices start at 0.
fn parse_track_number(number: &str) -> Result<usize, CommandError> {
    match number.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CommandError::Validation(format!(
            "invalid track number '{}'",
            number
        ))),
    }
}

fn parse_playlist_id(id: &str) -> Result<i64, CommandError> {
    id.parse()
        .map_err(|_| CommandError::Validation(format!("invalid playlist id '{}'", id)))
}

fn split_args(line: &str) -> Result<Vec<String>, CommandError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_arg = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if in_quotes {
        return Err(CommandError::Validation("unterminated quote".to_string()));
    }
    if in_arg {
        args.push(current);
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(line: &str) -> AppCommand {
        parse(line).unwrap().unwrap()
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert!(parse("").unwrap().is_none());
        assert!(parse("   \t").unwrap().is_none());
    }

    #[test]
    fn playback_commands() {
        assert_eq!(parsed("play"), AppCommand::Play);
        assert_eq!(
            parsed("play 2"),
            AppCommand::PlayTrack {
                index: 1,
                source: ListSource::Uploads
            }
        );
        assert_eq!(
            parsed("play 1 folder"),
            AppCommand::PlayTrack {
                index: 0,
                source: ListSource::Folder
            }
        );
        assert_eq!(parsed("pause"), AppCommand::TogglePause);
        assert_eq!(parsed("s"), AppCommand::Stop);
    }

    #[test]
    fn track_numbers_start_at_one() {
        assert!(matches!(parse("play 0"), Err(CommandError::Validation(_))));
        assert!(matches!(parse("play -1"), Err(CommandError::Validation(_))));
        assert!(matches!(parse("play 1 queue"), Err(CommandError::Validation(_))));
    }

    #[test]
    fn quoted_paths_keep_their_spaces() {
        assert_eq!(
            parsed(r#"upload "/music/01 - Intro.mp3" /music/b.mp3"#),
            AppCommand::UploadFiles(vec![
                "/music/01 - Intro.mp3".to_string(),
                "/music/b.mp3".to_string()
            ])
        );
        assert_eq!(
            parsed(r#"folder "/music/Road Trip""#),
            AppCommand::UploadFolder("/music/Road Trip".to_string())
        );
        assert!(matches!(
            parse(r#"upload "/music/a.mp3"#),
            Err(CommandError::Validation(_))
        ));
    }

    #[test]
    fn playlist_commands() {
        assert_eq!(
            parsed("new Road Trip"),
            AppCommand::CreatePlaylist("Road Trip".to_string())
        );
        assert_eq!(parsed("new"), AppCommand::CreatePlaylist(String::new()));
        assert_eq!(
            parsed("add 3 /music/a.mp3"),
            AppCommand::AddSongToPlaylist {
                playlist_id: 3,
                path: "/music/a.mp3".to_string()
            }
        );
        assert_eq!(parsed("show 3"), AppCommand::ShowPlaylist(3));
        assert_eq!(parsed("playlist 3"), AppCommand::PlayPlaylist(3));
        assert_eq!(parsed("playlists"), AppCommand::ListPlaylists);
    }

    #[test]
    fn invalid_ids_and_usage_are_reported() {
        assert!(matches!(parse("playlist three"), Err(CommandError::Validation(_))));
        assert!(matches!(parse("add 3"), Err(CommandError::Validation(_))));
        assert!(matches!(parse("upload"), Err(CommandError::Validation(_))));
        assert!(matches!(parse("dance"), Err(CommandError::Validation(_))));
    }
}
