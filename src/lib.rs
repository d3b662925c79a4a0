//! Lead-sheet tokenizer
//!
//! Turns lead sheets (a melody plus chord symbols) into fixed-vocabulary
//! integer streams for sequence-model training.
//!
//! # Pipeline
//!
//! ```text
//! MusicXML / MXL / MIDI file
//!   ↓ [converters]       import into a Score of element streams
//! lead part elements
//!   ↓ [segment]          split at key changes, rebase offsets
//! segments
//!   ↓ [transposition]    move the tonal center to C
//!   ↓ [lead_sheet]       separate melody from sustained chords
//!   ↓ [tokenize]         melody + beat streams, rhythm + chord vectors
//! TokenCorpus
//! ```
//!
//! All timing is exact (rational quarter notes) until [`quantize`] snaps it
//! to the sixteenth-note grid inside the tokenizers.

pub mod beat_profile;
pub mod config;
pub mod converters;
pub mod error;
pub mod lead_sheet;
pub mod models;
pub mod pipeline;
pub mod quantize;
pub mod segment;
pub mod tokenize;
pub mod transposition;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use converters::{load_score, ImportError, ImportOptions};
pub use error::{ConversionError, ConversionResult};
pub use models::{ElementKind, KeySignature, Mode, MusicalElement, Part, Position, Score, TimeSignature, Tonic};
pub use pipeline::{tokenize_score, tokenize_segment, Pipeline, PipelineError, SegmentTokens, TokenCorpus};
