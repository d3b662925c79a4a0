//! Chord vectorization
//!
//! Each harmonic event becomes four small integers: the bass pitch class
//! followed by up to three intervals above the bass, all shifted by one so
//! that 0 can pad short vectors. Rests get the reserved value 13 in every
//! slot.
//!
//! ```text
//! C major  (C3 E3 G3)      -> [1, 5, 8, 0]
//! G7       (G2 B2 D3 F3)   -> [8, 5, 8, 11]
//! rest                     -> [13, 13, 13, 13]
//! ```
//!
//! Only the bass and the next three tones are considered, and tones an
//! octave or more above the bass are dropped, so extended voicings (ninths,
//! wide spreads, five-plus-note chords) lose their upper tones.

use crate::error::{ConversionError, ConversionResult};
use crate::models::{ElementKind, MusicalElement};

/// Fixed-length chord encoding
pub type ChordVector = [u8; 4];

/// Encoding of a rest
pub const REST_VECTOR: ChordVector = [13; 4];

/// Encode a chord or rest
///
/// A lone note is encoded as a one-tone chord. A chord with no pitches is
/// [`ConversionError::EmptyChord`]; non-sounding kinds are
/// [`ConversionError::NotHarmonic`].
pub fn vectorize(element: &MusicalElement) -> ConversionResult<ChordVector> {
    let offset = element.offset;
    match &element.kind {
        ElementKind::Rest => Ok(REST_VECTOR),
        ElementKind::Chord { pitches } | ElementKind::ChordSymbol { pitches } => {
            vectorize_pitches(pitches).ok_or(ConversionError::EmptyChord { offset })
        }
        ElementKind::Note { pitch } => {
            vectorize_pitches(&[*pitch]).ok_or(ConversionError::EmptyChord { offset })
        }
        ElementKind::KeySignature(_)
        | ElementKind::TimeSignature(_)
        | ElementKind::TempoMark { .. }
        | ElementKind::Barline => Err(ConversionError::NotHarmonic { offset }),
    }
}

/// Encode a pitch set; `None` when it is empty
pub fn vectorize_pitches(pitches: &[u8]) -> Option<ChordVector> {
    let mut sorted = pitches.to_vec();
    sorted.sort_unstable();
    let (&base, upper) = sorted.split_first()?;

    let raw = std::iter::once(base % 12).chain(upper.iter().map(|&pitch| pitch - base));

    let mut vector = [0u8; 4];
    let mut slot = 0;
    for value in raw.take(4) {
        if value < 12 {
            vector[slot] = value + 1;
            slot += 1;
        }
    }
    Some(vector)
}
