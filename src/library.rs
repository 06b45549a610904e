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

//! Track intake from files and folders.
//!
//! Turns user supplied file and folder paths into track lists. Folders are
//! read one level deep using `WalkDir` and filtered by audio file extension.

use std::path::Path;

use log::warn;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub(crate) enum LibraryError {
    #[error("not a folder: {0}")]
    NotAFolder(String),

    #[error("path contains invalid UTF-8: {0}")]
    InvalidPath(String),
}

/// The result of checking a batch of uploaded files.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Upload {
    pub(crate) accepted: Vec<String>,
    pub(crate) rejected: Vec<String>,
}

/// Splits uploaded paths into existing files and everything else.
pub(crate) fn check_files(paths: Vec<String>) -> Upload {
    let mut upload = Upload::default();
    for path in paths {
        if Path::new(&path).is_file() {
            upload.accepted.push(path);
        } else {
            warn!("Ignoring upload of missing file {}", path);
            upload.rejected.push(path);
        }
    }
    upload
}

fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Collects the audio files directly inside `dir`, sorted by file name.
///
/// Sub-folders are not descended into. Entries that cannot be read are
/// skipped.
///
/// # Errors
///
/// Returns an error if `dir` is not a folder, or if a matching file path is
/// not valid UTF-8.
pub(crate) fn scan_folder(dir: &str, extensions: &[String]) -> Result<Vec<String>, LibraryError> {
    if !Path::new(dir).is_dir() {
        return Err(LibraryError::NotAFolder(dir.to_string()));
    }

    let mut tracks = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_audio_file(e.path(), extensions))
    {
        let path = entry
            .path()
            .to_str()
            .ok_or_else(|| LibraryError::InvalidPath(entry.path().display().to_string()))?;
        tracks.push(path.to_string());
    }

    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn extensions() -> Vec<String> {
        vec!["mp3".to_string(), ".flac".to_string()]
    }

    #[test]
    fn scan_folder_filters_and_sorts_audio_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mp3", "a.FLAC", "cover.jpg", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.mp3")).unwrap();
        fs::write(dir.path().join("nested.mp3").join("c.mp3"), b"").unwrap();

        let tracks = scan_folder(dir.path().to_str().unwrap(), &extensions()).unwrap();
        let names: Vec<String> = tracks
            .iter()
            .map(|t| crate::util::format::track_name(t))
            .collect();

        assert_eq!(names, vec!["a.FLAC", "b.mp3"]);
    }

    #[test]
    fn scan_folder_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.mp3");
        fs::write(&file, b"").unwrap();

        let err = scan_folder(file.to_str().unwrap(), &extensions()).unwrap_err();
        assert!(matches!(err, LibraryError::NotAFolder(_)));
    }

    #[test]
    fn check_files_separates_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.mp3");
        fs::write(&file, b"").unwrap();
        let file = file.to_str().unwrap().to_string();

        let upload = check_files(vec![file.clone(), "/missing.mp3".to_string()]);
        assert_eq!(upload.accepted, vec![file]);
        assert_eq!(upload.rejected, vec!["/missing.mp3"]);
    }
}
