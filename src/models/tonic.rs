//! Spelled tonic pitches (key centers)
//!
//! Covers every tonic reachable from a key signature of up to seven
//! sharps or flats, in both modes:
//! - 7 natural tonics (C, D, E, F, G, A, B)
//! - 5 sharp tonics (C#, D#, F#, G#, A#)
//! - 6 flat tonics (Cb, Db, Eb, Gb, Ab, Bb)
//!
//! Enharmonic equivalents are listed separately (e.g., C# and Db)
//! because they come from different key signatures.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tonic {
    Cb,
    C,
    #[serde(rename = "C#")]
    Cs,
    Db,
    D,
    #[serde(rename = "D#")]
    Ds,
    Eb,
    E,
    F,
    #[serde(rename = "F#")]
    Fs,
    Gb,
    G,
    #[serde(rename = "G#")]
    Gs,
    Ab,
    A,
    #[serde(rename = "A#")]
    As,
    Bb,
    B,
}

/// Major-mode tonics indexed by `fifths + 7`
const MAJOR_BY_FIFTHS: [Tonic; 15] = [
    Tonic::Cb, Tonic::Gb, Tonic::Db, Tonic::Ab, Tonic::Eb, Tonic::Bb, Tonic::F,
    Tonic::C,
    Tonic::G, Tonic::D, Tonic::A, Tonic::E, Tonic::B, Tonic::Fs, Tonic::Cs,
];

/// Minor-mode tonics indexed by `fifths + 7`
const MINOR_BY_FIFTHS: [Tonic; 15] = [
    Tonic::Ab, Tonic::Eb, Tonic::Bb, Tonic::F, Tonic::C, Tonic::G, Tonic::D,
    Tonic::A,
    Tonic::E, Tonic::B, Tonic::Fs, Tonic::Cs, Tonic::Gs, Tonic::Ds, Tonic::As,
];

/// Sharp spellings by pitch class, used when a signature is out of range
const SHARP_BY_PITCH_CLASS: [Tonic; 12] = [
    Tonic::C, Tonic::Cs, Tonic::D, Tonic::Ds, Tonic::E, Tonic::F,
    Tonic::Fs, Tonic::G, Tonic::Gs, Tonic::A, Tonic::As, Tonic::B,
];

impl Tonic {
    /// Tonic of a key signature given as circle-of-fifths position
    ///
    /// Signatures beyond seven accidentals fall back to a sharp spelling
    /// of the tonic's pitch class.
    pub fn from_fifths(fifths: i8, minor: bool) -> Self {
        let table = if minor { &MINOR_BY_FIFTHS } else { &MAJOR_BY_FIFTHS };
        match usize::try_from(i16::from(fifths) + 7) {
            Ok(index) if index < table.len() => table[index],
            _ => {
                let major_pc = (i32::from(fifths) * 7).rem_euclid(12);
                let pc = if minor { (major_pc + 9) % 12 } else { major_pc };
                SHARP_BY_PITCH_CLASS[pc as usize]
            }
        }
    }

    /// Convert tonic to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Tonic::Cb => "Cb",
            Tonic::C => "C",
            Tonic::Cs => "C#",
            Tonic::Db => "Db",
            Tonic::D => "D",
            Tonic::Ds => "D#",
            Tonic::Eb => "Eb",
            Tonic::E => "E",
            Tonic::F => "F",
            Tonic::Fs => "F#",
            Tonic::Gb => "Gb",
            Tonic::G => "G",
            Tonic::Gs => "G#",
            Tonic::Ab => "Ab",
            Tonic::A => "A",
            Tonic::As => "A#",
            Tonic::Bb => "Bb",
            Tonic::B => "B",
        }
    }
}

impl fmt::Display for Tonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_tonics_from_fifths() {
        assert_eq!(Tonic::from_fifths(0, false), Tonic::C);
        assert_eq!(Tonic::from_fifths(1, false), Tonic::G);
        assert_eq!(Tonic::from_fifths(-1, false), Tonic::F);
        assert_eq!(Tonic::from_fifths(-3, false), Tonic::Eb);
        assert_eq!(Tonic::from_fifths(6, false), Tonic::Fs);
        assert_eq!(Tonic::from_fifths(-7, false), Tonic::Cb);
    }

    #[test]
    fn test_minor_tonics_from_fifths() {
        assert_eq!(Tonic::from_fifths(0, true), Tonic::A);
        assert_eq!(Tonic::from_fifths(1, true), Tonic::E);
        assert_eq!(Tonic::from_fifths(-2, true), Tonic::G);
        assert_eq!(Tonic::from_fifths(7, true), Tonic::As);
    }

    #[test]
    fn test_out_of_range_fifths_use_sharp_spelling() {
        // 8 sharps: G# major
        assert_eq!(Tonic::from_fifths(8, false), Tonic::Gs);
        assert_eq!(Tonic::from_fifths(-8, false), Tonic::E);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Tonic::C), "C");
        assert_eq!(format!("{}", Tonic::Fs), "F#");
        assert_eq!(format!("{}", Tonic::Db), "Db");
    }

    #[test]
    fn test_serde_roundtrip() {
        let tonic = Tonic::Fs;
        let json = serde_json::to_string(&tonic).unwrap();
        assert_eq!(json, "\"F#\"");

        let parsed: Tonic = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Tonic::Fs);
    }
}
