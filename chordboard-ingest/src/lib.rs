//! # Chordboard Ingest
//!
//! Batch pipeline that populates the chordboard database from a local copy of
//! the BiMMuDa dataset and the McGill Billboard annotations:
//!
//! 1. Song metadata from the per-song CSV
//! 2. MIDI file discovery under the dataset tree
//! 3. Chord inference over each song's full MIDI arrangement
//! 4. McGill `.lab` chord annotations
//! 5. Billboard chart entries, linked to songs by exact then fuzzy matching
//!
//! Each phase logs progress and skips individual bad files with a warning
//! rather than aborting the run.

pub mod billboard;
pub mod extract;
pub mod matcher;
pub mod mcgill;
pub mod metadata;
pub mod midi;
pub mod scanner;
pub mod store;
pub mod workflow;
