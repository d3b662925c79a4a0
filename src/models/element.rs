//! Musical elements: the flat event stream every pipeline stage consumes
//!
//! An element is an immutable value record: a position, a length, and a
//! closed set of kinds. Stages never edit elements in place; they produce
//! transformed copies (`rebased`, `transposed`, `with_duration`) and thread
//! those forward.
//!
//! Time is exact. Offsets and durations are rationals measured in quarter
//! notes (a quarter note is 1, a sixteenth is 1/4, an eighth-note triplet is
//! 1/3), so no rounding happens until the quantizer snaps values to the
//! sixteenth-note grid.

use super::key::KeySignature;
use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position or length in quarter-note units
pub type Position = Rational64;

/// The zero position (segment start)
pub const ZERO: Position = Position::new_raw(0, 1);

/// Meter as numerator over denominator (e.g., 6/8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    /// Common time, the meter assumed before any time signature is seen
    pub const COMMON: TimeSignature = TimeSignature { numerator: 4, denominator: 4 };

    pub fn new(numerator: u8, denominator: u8) -> Self {
        TimeSignature { numerator, denominator }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// What an element is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// Single pitched note (MIDI 0-127)
    Note { pitch: u8 },
    Rest,
    /// Sounding chord with a real duration
    Chord { pitches: Vec<u8> },
    /// Chord annotation; marks an onset only, its duration is always zero.
    /// An empty pitch list is a "no chord" (N.C.) marking.
    ChordSymbol { pitches: Vec<u8> },
    KeySignature(KeySignature),
    TimeSignature(TimeSignature),
    TempoMark { bpm: f64 },
    /// Measure boundary
    Barline,
}

/// A positioned element of a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicalElement {
    /// Start position in quarter notes
    pub offset: Position,
    /// Length in quarter notes (quarterLength)
    pub duration: Position,
    pub kind: ElementKind,
}

impl MusicalElement {
    pub fn new(offset: Position, duration: Position, kind: ElementKind) -> Self {
        MusicalElement { offset, duration, kind }
    }

    pub fn note(offset: Position, duration: Position, pitch: u8) -> Self {
        Self::new(offset, duration, ElementKind::Note { pitch })
    }

    pub fn rest(offset: Position, duration: Position) -> Self {
        Self::new(offset, duration, ElementKind::Rest)
    }

    pub fn chord(offset: Position, duration: Position, pitches: Vec<u8>) -> Self {
        Self::new(offset, duration, ElementKind::Chord { pitches })
    }

    pub fn chord_symbol(offset: Position, pitches: Vec<u8>) -> Self {
        Self::new(offset, ZERO, ElementKind::ChordSymbol { pitches })
    }

    pub fn key_signature(offset: Position, key: KeySignature) -> Self {
        Self::new(offset, ZERO, ElementKind::KeySignature(key))
    }

    pub fn time_signature(offset: Position, time: TimeSignature) -> Self {
        Self::new(offset, ZERO, ElementKind::TimeSignature(time))
    }

    pub fn tempo(offset: Position, bpm: f64) -> Self {
        Self::new(offset, ZERO, ElementKind::TempoMark { bpm })
    }

    pub fn barline(offset: Position) -> Self {
        Self::new(offset, ZERO, ElementKind::Barline)
    }

    /// End position (offset + duration)
    pub fn end(&self) -> Position {
        self.offset + self.duration
    }

    /// Copy placed at a new offset
    pub fn with_offset(&self, offset: Position) -> Self {
        MusicalElement { offset, ..self.clone() }
    }

    /// Copy with a new duration
    pub fn with_duration(&self, duration: Position) -> Self {
        MusicalElement { duration, ..self.clone() }
    }

    /// Copy with its offset measured from `base` instead of zero
    pub fn rebased(&self, base: Position) -> Self {
        self.with_offset(self.offset - base)
    }

    /// Copy with every pitch shifted by `semitones`
    ///
    /// Pitches are clamped to the MIDI range. Key signatures are re-spelled
    /// for the shifted key; unpitched kinds are returned unchanged.
    pub fn transposed(&self, semitones: i8) -> Self {
        let kind = match &self.kind {
            ElementKind::Note { pitch } => ElementKind::Note {
                pitch: shift_pitch(*pitch, semitones),
            },
            ElementKind::Chord { pitches } => ElementKind::Chord {
                pitches: pitches.iter().map(|&p| shift_pitch(p, semitones)).collect(),
            },
            ElementKind::ChordSymbol { pitches } => ElementKind::ChordSymbol {
                pitches: pitches.iter().map(|&p| shift_pitch(p, semitones)).collect(),
            },
            ElementKind::KeySignature(key) => ElementKind::KeySignature(key.transposed(semitones)),
            ElementKind::Rest
            | ElementKind::TimeSignature(_)
            | ElementKind::TempoMark { .. }
            | ElementKind::Barline => self.kind.clone(),
        };
        MusicalElement { kind, ..self.clone() }
    }
}

fn shift_pitch(pitch: u8, semitones: i8) -> u8 {
    (i16::from(pitch) + i16::from(semitones)).clamp(0, 127) as u8
}
