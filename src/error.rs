//! Segment-level conversion errors
//!
//! Every error here is expected in real corpora and is non-fatal: the
//! driver logs it, drops the offending segment and moves on.

use crate::models::{Position, TimeSignature};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The segment carries melody but no chord symbols
    #[error("no chord symbols found in segment")]
    NoChords,
    /// A chord (or "no chord" symbol) without any pitches reached the vectorizer
    #[error("chord at offset {offset} has no pitches")]
    EmptyChord { offset: Position },
    /// Only chords, rests and notes have a chord-vector encoding
    #[error("element at offset {offset} is not a chord or rest")]
    NotHarmonic { offset: Position },
    /// The meter's beat is not a whole number of sixteenth-note steps
    #[error("time signature {0} cannot be profiled on a sixteenth-note grid")]
    UnsupportedTimeSignature(TimeSignature),
}

pub type ConversionResult<T> = std::result::Result<T, ConversionError>;
