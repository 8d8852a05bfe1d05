//! Guitar tablature rendering
//!
//! Fixed fingering shapes for the common open and barre chords, rendered as
//! ASCII tab for a chord progression. Chords without a known shape are
//! reported as missing instead of failing the page.

/// Frets are listed low E to high e; `x` mutes a string.
#[derive(Debug, Clone, Copy)]
pub struct ChordShape {
    pub name: &'static str,
    pub frets: [&'static str; 6],
    pub difficulty: Difficulty,
    pub barre: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
        }
    }

    fn score(&self) -> f64 {
        match self {
            Difficulty::Beginner => 1.0,
            Difficulty::Intermediate => 2.0,
        }
    }
}

/// The fourteen supported shapes: open-position majors and minors plus the
/// common barre forms.
const SHAPES: &[ChordShape] = &[
    shape("C", ["x", "3", "2", "0", "1", "0"], Difficulty::Beginner, false),
    shape("D", ["x", "x", "0", "2", "3", "2"], Difficulty::Beginner, false),
    shape("E", ["0", "2", "2", "1", "0", "0"], Difficulty::Beginner, false),
    shape("F", ["1", "3", "3", "2", "1", "1"], Difficulty::Intermediate, true),
    shape("G", ["3", "2", "0", "0", "3", "3"], Difficulty::Beginner, false),
    shape("A", ["x", "0", "2", "2", "2", "0"], Difficulty::Beginner, false),
    shape("B", ["x", "2", "4", "4", "4", "2"], Difficulty::Intermediate, true),
    shape("Am", ["x", "0", "2", "2", "1", "0"], Difficulty::Beginner, false),
    shape("Bm", ["x", "2", "4", "4", "3", "2"], Difficulty::Intermediate, true),
    shape("Cm", ["x", "3", "5", "5", "4", "3"], Difficulty::Intermediate, true),
    shape("Dm", ["x", "x", "0", "2", "3", "1"], Difficulty::Beginner, false),
    shape("Em", ["0", "2", "2", "0", "0", "0"], Difficulty::Beginner, false),
    shape("Fm", ["1", "3", "3", "1", "1", "1"], Difficulty::Intermediate, true),
    shape("Gm", ["3", "5", "5", "3", "3", "3"], Difficulty::Intermediate, true),
];

const fn shape(
    name: &'static str,
    frets: [&'static str; 6],
    difficulty: Difficulty,
    barre: bool,
) -> ChordShape {
    ChordShape {
        name,
        frets,
        difficulty,
        barre,
    }
}

/// Default strumming pattern shown under every tab.
pub const STRUM_PATTERN: &str = "D-D-U-U-D-U";

/// At most this many chords appear in one rendered tab.
const DISPLAY_CHORDS: usize = 6;

/// Look up the fingering shape for a chord name.
pub fn shape_for(name: &str) -> Option<&'static ChordShape> {
    SHAPES.iter().find(|s| s.name == name)
}

/// A rendered tablature for one progression.
#[derive(Debug, Clone)]
pub struct Tablature {
    /// Chords that had a known shape, in progression order
    pub chords: Vec<String>,
    /// Chords with no fingering on file
    pub missing: Vec<String>,
    pub difficulty: &'static str,
    pub strum_pattern: &'static str,
    /// ASCII tab lines, empty when no chord had a shape
    pub lines: Vec<String>,
}

/// Render a `" - "`-separated chord progression as ASCII tab.
///
/// Returns `None` for an empty progression. A progression where no chord has
/// a fingering still returns a `Tablature`, with every chord in `missing`.
pub fn render_progression(progression: &str) -> Option<Tablature> {
    let chords: Vec<&str> = progression
        .split(" - ")
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    if chords.is_empty() {
        return None;
    }

    let mut available: Vec<&'static ChordShape> = Vec::new();
    let mut missing: Vec<String> = Vec::new();
    for chord in &chords {
        match shape_for(chord) {
            Some(shape) => available.push(shape),
            None => missing.push(chord.to_string()),
        }
    }

    if available.is_empty() {
        return Some(Tablature {
            chords: Vec::new(),
            missing,
            difficulty: "Unknown",
            strum_pattern: STRUM_PATTERN,
            lines: Vec::new(),
        });
    }

    let shown = &available[..available.len().min(DISPLAY_CHORDS)];
    let mut lines = Vec::new();

    let names: Vec<&str> = shown.iter().map(|s| s.name).collect();
    lines.push(format!("CHORDS: {}", names.join(" -> ")));
    lines.push(format!("STRUM:  {}", STRUM_PATTERN));
    lines.push(String::new());

    // Chord name row, each cell 4 wide to line up with the fret cells
    let mut header = String::from("   ");
    for shape in shown {
        header.push_str(&format!(" {:<3}", shape.name));
    }
    lines.push(header);

    // Six string rows, high e down to low E; fret arrays are stored low to
    // high so the index is reversed
    let labels = ["e", "B", "G", "D", "A", "E"];
    for (row, label) in labels.iter().enumerate() {
        let mut line = format!("{}|-", label);
        for shape in shown {
            let fret = shape.frets[5 - row];
            let marker = if fret == "x" { "X" } else { fret };
            line.push_str(&format!("-{}--", marker));
        }
        line.push('|');
        lines.push(line);
    }

    lines.push(String::new());
    lines.push("D = down strum   U = up strum   X = muted string".to_string());

    Some(Tablature {
        chords: names.iter().map(|n| n.to_string()).collect(),
        missing,
        difficulty: assess_difficulty(shown),
        strum_pattern: STRUM_PATTERN,
        lines,
    })
}

/// Beginner when the mean shape difficulty stays at or below 1.2.
fn assess_difficulty(shapes: &[&'static ChordShape]) -> &'static str {
    if shapes.is_empty() {
        return "Unknown";
    }
    let total: f64 = shapes.iter().map(|s| s.difficulty.score()).sum();
    if total / shapes.len() as f64 <= 1.2 {
        "Beginner"
    } else {
        "Intermediate"
    }
}
