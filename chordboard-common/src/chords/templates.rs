//! Chord template table
//!
//! Maps pitch-class sets to chord names for all 12 roots: major and minor
//! triads plus major-7th and dominant-7th chords (48 entries). Built once at
//! first use and immutable afterwards, so it is safe to share across threads.

use super::note::NOTE_NAMES;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Interval patterns paired with their name suffix, sevenths first so the
/// 4-note lookup in `resolve` has something to hit.
const QUALITIES: [(&[u8], &str); 4] = [
    (&[0, 4, 7, 11], "maj7"),
    (&[0, 4, 7, 10], "7"),
    (&[0, 4, 7], ""),
    (&[0, 3, 7], "m"),
];

/// Pack a collection of pitch classes into a 12-bit set.
///
/// Duplicate classes collapse into one bit, so the mask represents the set of
/// distinct pitch classes regardless of input order.
pub fn pitch_class_set(classes: &[u8]) -> u16 {
    classes
        .iter()
        .fold(0u16, |mask, &pc| mask | (1 << (pc % 12)))
}

static TEMPLATES: Lazy<HashMap<u16, String>> = Lazy::new(|| {
    let mut table = HashMap::with_capacity(48);

    for root in 0u8..12 {
        for (intervals, suffix) in QUALITIES {
            let classes: Vec<u8> = intervals.iter().map(|i| (root + i) % 12).collect();
            let mask = pitch_class_set(&classes);
            let name = format!("{}{}", NOTE_NAMES[root as usize], suffix);

            // First insertion wins on collision; template sets are distinct in
            // practice but the table must not silently reorder on rebuild.
            table.entry(mask).or_insert(name);
        }
    }

    table
});

/// Look up the chord name for a set of pitch classes.
///
/// Returns `None` when the set matches no template. Input order and duplicate
/// classes are irrelevant; only the distinct-set membership matters.
pub fn lookup(classes: &[u8]) -> Option<&'static str> {
    TEMPLATES
        .get(&pitch_class_set(classes))
        .map(|name| name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_one_entry_per_root_and_quality() {
        // 12 roots times 4 qualities, and no two sets collide
        assert_eq!(TEMPLATES.len(), 48);
    }

    #[test]
    fn major_triads_for_all_roots() {
        assert_eq!(lookup(&[0, 4, 7]), Some("C"));
        assert_eq!(lookup(&[7, 11, 2]), Some("G"));
        assert_eq!(lookup(&[9, 1, 4]), Some("A"));
        assert_eq!(lookup(&[11, 3, 6]), Some("B"));
    }

    #[test]
    fn minor_triads() {
        assert_eq!(lookup(&[9, 0, 4]), Some("Am"));
        assert_eq!(lookup(&[4, 7, 11]), Some("Em"));
        assert_eq!(lookup(&[2, 5, 9]), Some("Dm"));
    }

    #[test]
    fn seventh_chords() {
        assert_eq!(lookup(&[0, 4, 7, 11]), Some("Cmaj7"));
        assert_eq!(lookup(&[2, 6, 9, 1]), Some("Dmaj7"));
        assert_eq!(lookup(&[7, 11, 2, 5]), Some("G7"));
        assert_eq!(lookup(&[9, 1, 4, 7]), Some("A7"));
    }

    #[test]
    fn lookup_ignores_order_and_duplicates() {
        assert_eq!(lookup(&[7, 0, 4]), Some("C"));
        assert_eq!(lookup(&[4, 0, 7, 0, 4]), Some("C"));
    }

    #[test]
    fn unknown_sets_miss() {
        assert_eq!(lookup(&[0, 1, 2]), None);
        assert_eq!(lookup(&[0, 1, 2, 3]), None);
        assert_eq!(lookup(&[]), None);
    }

    #[test]
    fn mask_packs_distinct_classes() {
        assert_eq!(pitch_class_set(&[0, 4, 7]), 0b0000_1001_0001);
        assert_eq!(pitch_class_set(&[0, 0, 0]), 1);
        assert_eq!(pitch_class_set(&[]), 0);
    }
}
