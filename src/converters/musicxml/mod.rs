//! MusicXML importer
//!
//! # Architecture
//!
//! ```text
//! MusicXML String
//!   ↓ [Parse with roxmltree]
//! XML DOM
//!   ↓ [Walk measures, track divisions and position]
//! Score (parts of MusicalElement streams)
//! ```
//!
//! Chord symbols (`<harmony>`) are realized into concrete pitches by
//! [`harmony`]. Only `score-partwise` documents are accepted.

pub mod harmony;
pub mod parser;

pub use parser::{parse_musicxml, pitch_to_midi};

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
