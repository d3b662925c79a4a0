//! Key signatures and their tonal centers
//!
//! A key signature is stored the way MusicXML and Standard MIDI Files carry
//! it: a position on the circle of fifths (negative = flats, positive =
//! sharps) plus a mode. Tonic, relative-major tonic and the transposition
//! distance to C are all derived from those two fields.

use super::tonic::Tonic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Major or minor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

/// Key signature as circle-of-fifths position and mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeySignature {
    /// Sharps (positive) or flats (negative)
    pub fifths: i8,
    pub mode: Mode,
}

impl Default for KeySignature {
    fn default() -> Self {
        KeySignature::C_MAJOR
    }
}

impl KeySignature {
    /// C major, no accidentals
    pub const C_MAJOR: KeySignature = KeySignature { fifths: 0, mode: Mode::Major };

    pub fn new(fifths: i8, mode: Mode) -> Self {
        KeySignature { fifths, mode }
    }

    pub fn major(fifths: i8) -> Self {
        KeySignature::new(fifths, Mode::Major)
    }

    pub fn minor(fifths: i8) -> Self {
        KeySignature::new(fifths, Mode::Minor)
    }

    /// Spelled tonic of this key
    pub fn tonic(&self) -> Tonic {
        Tonic::from_fifths(self.fifths, self.mode == Mode::Minor)
    }

    /// Pitch class of the major key sharing this signature
    ///
    /// For a major key this is the tonic itself; for a minor key it is the
    /// relative major (a minor third above the minor tonic).
    pub fn relative_major_pitch_class(&self) -> u8 {
        (i32::from(self.fifths) * 7).rem_euclid(12) as u8
    }

    /// Signed semitone shift that moves the relative-major tonic to C
    ///
    /// Always the shortest motion: the result lies in `-5..=6`.
    pub fn interval_to_c(&self) -> i8 {
        let up = (12 - i16::from(self.relative_major_pitch_class())) % 12;
        if up > 6 {
            (up - 12) as i8
        } else {
            up as i8
        }
    }

    /// The same mode, re-spelled after shifting every pitch by `semitones`
    ///
    /// The shifted key is spelled with at most six flats or six sharps.
    pub fn transposed(&self, semitones: i8) -> Self {
        let pc = (i32::from(self.relative_major_pitch_class()) + i32::from(semitones)).rem_euclid(12);
        let fifths = (pc * 7).rem_euclid(12);
        let fifths = if fifths > 6 { fifths - 12 } else { fifths };
        KeySignature::new(fifths as i8, self.mode)
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic(), self.mode.as_str())
    }
}
