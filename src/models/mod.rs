//! Score data model
//!
//! This module contains the value types shared by the importers and the
//! tokenizer pipeline:
//!
//! - **element**: positioned musical elements (notes, rests, chords, chord
//!   symbols, key/time signatures, tempo marks, barlines)
//! - **key**: key signatures, modes and transposition distances
//! - **tonic**: spelled tonic names
//! - **score**: parts and scores as produced by the importers

pub mod element;
pub mod key;
pub mod score;
pub mod tonic;

// Re-export commonly used types
pub use element::{ElementKind, MusicalElement, Position, TimeSignature, ZERO};
pub use key::{KeySignature, Mode};
pub use score::{Part, Score};
pub use tonic::Tonic;
