//! HTTP handlers for chordboard-web

pub mod health;
pub mod pages;
pub mod search;
