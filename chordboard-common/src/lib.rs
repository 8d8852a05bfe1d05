//! # Chordboard Common Library
//!
//! Shared code for the Chordboard tools including:
//! - Database schema, initialization, and models
//! - Chord inference core (note events, templates, windowed engine)
//! - Configuration loading and root folder resolution
//! - Common error types

pub mod chords;
pub mod config;
pub mod db;
pub mod error;

pub use chords::{ChordEngineConfig, NoteEvent};
pub use error::{Error, Result};
