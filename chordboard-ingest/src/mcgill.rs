//! McGill Billboard chord annotations
//!
//! Parses `.lab` files (one `start end label` annotation per line) from the
//! McGill Billboard corpus. Malformed lines and inverted time ranges are
//! skipped with a warning, never fatal.

use std::path::{Path, PathBuf};

use chordboard_common::Result;
use tracing::warn;
use walkdir::WalkDir;

/// Number of distinct chords kept in a progression summary.
const SUMMARY_CHORDS: usize = 8;

/// One annotation line from a `.lab` file.
#[derive(Debug, Clone, PartialEq)]
pub struct LabChord {
    pub start_time: f64,
    pub end_time: f64,
    pub chord_label: String,
    pub chord_simplified: String,
}

impl LabChord {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// A parsed annotation file with its song identifier.
#[derive(Debug, Clone)]
pub struct LabFile {
    pub song_filename: String,
    pub path: PathBuf,
    pub chords: Vec<LabChord>,
}

/// Find and parse every `.lab` file under `root`.
///
/// Files that fail to read are skipped with a warning so one bad annotation
/// never aborts the run.
pub fn load_lab_files(root: &Path) -> Result<Vec<LabFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Error accessing entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("lab") {
            continue;
        }

        match parse_lab_file(path) {
            Ok(chords) if !chords.is_empty() => files.push(LabFile {
                song_filename: song_filename(path),
                path: path.to_path_buf(),
                chords,
            }),
            Ok(_) => warn!("No chord data in {}", path.display()),
            Err(e) => warn!("Failed to parse {}: {}", path.display(), e),
        }
    }

    files.sort_by(|a, b| a.song_filename.cmp(&b.song_filename));
    Ok(files)
}

/// Parse one `.lab` annotation file.
pub fn parse_lab_file(path: &Path) -> Result<Vec<LabChord>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_lab_contents(&contents, &path.display().to_string()))
}

fn parse_lab_contents(contents: &str, source: &str) -> Vec<LabChord> {
    let mut chords = Vec::new();

    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 {
            warn!(
                "Line {} in {} has {} fields, expected 3",
                line_num + 1,
                source,
                parts.len()
            );
            continue;
        }

        let (start, end) = match (parts[0].parse::<f64>(), parts[1].parse::<f64>()) {
            (Ok(s), Ok(e)) => (s, e),
            _ => {
                warn!("Unparseable times on line {} in {}", line_num + 1, source);
                continue;
            }
        };
        if end <= start {
            warn!("Invalid time range on line {} in {}", line_num + 1, source);
            continue;
        }

        let chord_label = parts[2].to_string();
        let chord_simplified = simplify_chord_label(&chord_label);
        chords.push(LabChord {
            start_time: start,
            end_time: end,
            chord_label,
            chord_simplified,
        });
    }

    chords
}

/// Simplify a McGill chord label for display.
///
/// `C:maj` becomes `C`, `F#:min` becomes `F#m`, `G:7` becomes `G7`. Labels
/// with qualities outside that set (sus, dim, inversions) degrade to their
/// root note. `N` is the corpus no-chord marker and passes through unchanged.
pub fn simplify_chord_label(label: &str) -> String {
    if label == "N" {
        return "N".to_string();
    }

    let simplified = label
        .replace(":maj", "")
        .replace(":min", "m")
        .replace(":7", "7");

    if !simplified.contains(':') {
        return simplified;
    }

    // Unhandled quality: keep the root note only
    root_note(label).unwrap_or_else(|| label.to_string())
}

fn root_note(label: &str) -> Option<String> {
    let mut chars = label.chars();
    let first = chars.next()?;
    if !('A'..='G').contains(&first) {
        return None;
    }
    match chars.next() {
        Some(accidental @ ('#' | 'b')) => Some(format!("{}{}", first, accidental)),
        _ => Some(first.to_string()),
    }
}

/// Summarize an annotation file as its first distinct chords.
///
/// Takes the first [`SUMMARY_CHORDS`] distinct simplified labels in time
/// order, excluding the `N` no-chord marker, joined with `" - "`. Returns
/// `None` when no real chord remains.
pub fn progression_summary(chords: &[LabChord]) -> Option<String> {
    summarize_labels(chords.iter().map(|c| c.chord_simplified.as_str()))
}

/// Same summary over bare simplified labels, for rows pulled back out of the
/// database.
pub fn summarize_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut seen: Vec<&str> = Vec::new();

    for label in labels {
        if label == "N" || seen.contains(&label) {
            continue;
        }
        seen.push(label);
        if seen.len() >= SUMMARY_CHORDS {
            break;
        }
    }

    if seen.is_empty() {
        None
    } else {
        Some(seen.join(" - "))
    }
}

/// Song identifier for a `.lab` path.
///
/// The corpus ships one directory per song holding `majmin.lab`, so a generic
/// stem like `majmin` or `full` defers to the directory name.
fn song_filename(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    if matches!(stem, "majmin" | "full" | "salami_chords") {
        if let Some(dir) = path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()) {
            return dir.to_string();
        }
    }
    stem.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_well_formed_lines() {
        let contents = "0.000000 2.090000 N\n2.090000 4.180000 C:maj\n4.180000 6.0 A:min\n";
        let chords = parse_lab_contents(contents, "test");

        assert_eq!(chords.len(), 3);
        assert_eq!(chords[0].chord_simplified, "N");
        assert_eq!(chords[1].chord_simplified, "C");
        assert_eq!(chords[2].chord_simplified, "Am");
        assert!((chords[1].duration() - 2.09).abs() < 1e-9);
    }

    #[test]
    fn skips_malformed_and_inverted_lines() {
        let contents = "garbage line here extra\n1.0 0.5 C:maj\nnot numbers at all\n\n2.0 3.0 G:maj\n";
        let chords = parse_lab_contents(contents, "test");

        assert_eq!(chords.len(), 1);
        assert_eq!(chords[0].chord_simplified, "G");
    }

    #[test]
    fn simplifies_common_qualities() {
        assert_eq!(simplify_chord_label("C:maj"), "C");
        assert_eq!(simplify_chord_label("F#:min"), "F#m");
        assert_eq!(simplify_chord_label("G:7"), "G7");
        assert_eq!(simplify_chord_label("N"), "N");
    }

    #[test]
    fn unknown_qualities_degrade_to_root() {
        assert_eq!(simplify_chord_label("A:sus4"), "A");
        assert_eq!(simplify_chord_label("Eb:dim"), "Eb");
    }

    #[test]
    fn summary_takes_distinct_non_silence_chords() {
        let contents = "\
0.0 1.0 N
1.0 2.0 C:maj
2.0 3.0 G:maj
3.0 4.0 C:maj
4.0 5.0 A:min
";
        let chords = parse_lab_contents(contents, "test");
        assert_eq!(progression_summary(&chords).as_deref(), Some("C - G - Am"));
    }

    #[test]
    fn summary_caps_at_eight_chords() {
        let labels = ["C", "D", "E", "F", "G", "A", "B", "C#", "D#", "F#"];
        let contents: String = labels
            .iter()
            .enumerate()
            .map(|(i, l)| format!("{}.0 {}.0 {}:maj\n", i, i + 1, l))
            .collect();
        let chords = parse_lab_contents(&contents, "test");

        let summary = progression_summary(&chords).unwrap();
        assert_eq!(summary.split(" - ").count(), 8);
    }

    #[test]
    fn silence_only_file_has_no_summary() {
        let chords = parse_lab_contents("0.0 10.0 N\n", "test");
        assert_eq!(progression_summary(&chords), None);
    }

    #[test]
    fn majmin_files_take_directory_name() {
        let dir = TempDir::new().unwrap();
        let song_dir = dir.path().join("0004");
        fs::create_dir_all(&song_dir).unwrap();
        fs::write(song_dir.join("majmin.lab"), "0.0 1.0 C:maj\n").unwrap();

        let files = load_lab_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].song_filename, "0004");
    }
}
