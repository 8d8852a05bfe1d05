//! MIDI file scanner
//!
//! Recursive discovery of BiMMuDa full-arrangement MIDI files. Two-phase:
//! sequential traversal with symlink-loop detection, then parallel magic-byte
//! verification so a renamed text file never reaches the MIDI parser.
//!
//! The dataset lays songs out as `<year>/<position>/<year>_<position>_full.mid`
//! (e.g. `1955/01/1955_01_full.mid`), and the year and chart position are
//! recovered from the filename.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// MIDI scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Cannot access file
    #[error("File access error {0}: {1}")]
    FileAccessError(PathBuf, String),
}

/// One discovered full-arrangement MIDI file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiFile {
    pub path: PathBuf,
    pub year: i64,
    pub position: i64,
}

/// BiMMuDa MIDI file scanner
pub struct MidiScanner {
    ignore_patterns: Vec<String>,
    max_depth: Option<usize>,
}

impl Default for MidiScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiScanner {
    /// Create new scanner with default ignore patterns
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
            ],
            max_depth: None,
        }
    }

    /// Scan the dataset tree for `*_full.mid` files.
    pub fn scan(&self, root_path: &Path) -> Result<Vec<MidiFile>, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }
        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        // Phase 1: sequential traversal, symlink_visited is mutable
        let mut candidates = Vec::new();
        let mut symlink_visited = HashSet::new();

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .max_depth(self.max_depth.unwrap_or(usize::MAX))
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, &mut symlink_visited));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_full_arrangement(entry.path()) {
                        candidates.push(entry.path().to_path_buf());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        tracing::debug!(
            "Phase 1 complete: {} candidate MIDI files discovered",
            candidates.len()
        );

        // Phase 2: parallel magic byte verification
        let mut midi_files: Vec<MidiFile> = candidates
            .par_iter()
            .filter_map(|path| match verify_midi_magic(path) {
                Ok(true) => match parse_year_position(path) {
                    Some((year, position)) => Some(MidiFile {
                        path: path.clone(),
                        year,
                        position,
                    }),
                    None => {
                        tracing::warn!("Cannot derive year/position: {}", path.display());
                        None
                    }
                },
                Ok(false) => {
                    tracing::warn!("Not a MIDI file (bad magic): {}", path.display());
                    None
                }
                Err(e) => {
                    tracing::warn!("Error verifying {}: {}", path.display(), e);
                    None
                }
            })
            .collect();

        midi_files.sort_by_key(|f| (f.year, f.position));

        tracing::debug!(
            "Phase 2 complete: {} MIDI files verified from {} candidates",
            midi_files.len(),
            candidates.len()
        );

        Ok(midi_files)
    }

    fn should_process_entry(
        &self,
        entry: &DirEntry,
        symlink_visited: &mut HashSet<PathBuf>,
    ) -> bool {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();

        for pattern in &self.ignore_patterns {
            if file_name.contains(pattern) {
                return false;
            }
        }

        // Detect symlink loops
        if entry.file_type().is_symlink() {
            if let Ok(canonical) = path.canonicalize() {
                if !symlink_visited.insert(canonical) {
                    tracing::warn!("Symlink loop detected: {}", path.display());
                    return false;
                }
            }
        }

        true
    }
}

fn is_full_arrangement(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_lowercase().ends_with("_full.mid"))
        .unwrap_or(false)
}

/// Verify the SMF header magic `MThd`.
fn verify_midi_magic(path: &Path) -> Result<bool, ScanError> {
    let mut file = File::open(path)
        .map_err(|e| ScanError::FileAccessError(path.to_path_buf(), e.to_string()))?;

    let mut buffer = [0u8; 4];
    let bytes_read = file
        .read(&mut buffer)
        .map_err(|e| ScanError::FileAccessError(path.to_path_buf(), e.to_string()))?;

    Ok(bytes_read == 4 && &buffer == b"MThd")
}

/// Derive `(year, position)` from `<year>_<position>_full.mid`, falling back
/// to the `<year>/<position>` parent directories when the filename deviates.
fn parse_year_position(path: &Path) -> Option<(i64, i64)> {
    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        let mut parts = stem.split('_');
        if let (Some(year), Some(position)) = (parts.next(), parts.next()) {
            if let (Ok(year), Ok(position)) = (year.parse(), leading_int(position)) {
                return Some((year, position));
            }
        }
    }

    let position_dir = path.parent()?.file_name()?.to_str()?;
    let year_dir = path.parent()?.parent()?.file_name()?.to_str()?;
    match (year_dir.parse(), leading_int(position_dir)) {
        (Ok(year), Ok(position)) => Some((year, position)),
        _ => None,
    }
}

/// Parse the leading integer of a string like `"2a"` or `"01"`.
fn leading_int(s: &str) -> Result<i64, std::num::ParseIntError> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(path: &Path, contents: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn finds_full_arrangement_files_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        write_file(&root.join("1955/01/1955_01_full.mid"), b"MThd\x00\x00\x00\x06");
        write_file(&root.join("1955/01/1955_01_1.mid"), b"MThd\x00\x00\x00\x06");
        write_file(&root.join("1955/01/notes.txt"), b"not midi");

        let files = MidiScanner::new().scan(root).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].year, 1955);
        assert_eq!(files[0].position, 1);
    }

    #[test]
    fn rejects_bad_magic() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        write_file(&root.join("1960/02/1960_02_full.mid"), b"RIFF....");

        let files = MidiScanner::new().scan(root).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn results_sorted_by_year_then_position() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        write_file(&root.join("1970/03/1970_03_full.mid"), b"MThd\x00\x00\x00\x06");
        write_file(&root.join("1960/05/1960_05_full.mid"), b"MThd\x00\x00\x00\x06");
        write_file(&root.join("1960/01/1960_01_full.mid"), b"MThd\x00\x00\x00\x06");

        let files = MidiScanner::new().scan(root).unwrap();
        let keys: Vec<(i64, i64)> = files.iter().map(|f| (f.year, f.position)).collect();
        assert_eq!(keys, vec![(1960, 1), (1960, 5), (1970, 3)]);
    }

    #[test]
    fn position_suffix_letters_take_leading_integer() {
        assert_eq!(
            parse_year_position(Path::new("/data/1969/2a/1969_2a_full.mid")),
            Some((1969, 2))
        );
    }

    #[test]
    fn missing_path_is_an_error() {
        let result = MidiScanner::new().scan(Path::new("/nonexistent/dataset"));
        assert!(matches!(result, Err(ScanError::PathNotFound(_))));
    }
}
