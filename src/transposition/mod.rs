//! Tonal-center normalization
//!
//! Transposes a segment so that the major key sharing its key signature
//! lands on C (C major for major keys, A minor for minor keys). Only the
//! first key signature of the segment governs; the scan stops as soon as
//! that key is found, or as soon as a sounding element shows up before any
//! key signature, in which case the segment is left in place.
//!
//! Tempo marks met before the governing key are reported for bookkeeping.

use crate::models::{ElementKind, KeySignature};
use crate::segment::Segment;

/// Tempo assumed when no tempo mark precedes the key
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// A segment moved to C, plus what was found on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Transposition {
    pub segment: Segment,
    /// Semitones every pitch was shifted by
    pub interval: i8,
    /// The governing key before transposition (C major when none was found)
    pub key: KeySignature,
    pub tempo: f64,
}

/// Transpose `segment` so its tonal center is C
pub fn transpose_to_c(segment: Segment) -> Transposition {
    let mut tempo = DEFAULT_TEMPO_BPM;
    let mut governing: Option<KeySignature> = None;

    for element in &segment {
        match &element.kind {
            ElementKind::KeySignature(key) => {
                governing = Some(*key);
                break;
            }
            ElementKind::TempoMark { bpm } => tempo = *bpm,
            ElementKind::Note { .. }
            | ElementKind::Rest
            | ElementKind::Chord { .. }
            | ElementKind::ChordSymbol { .. } => break,
            ElementKind::TimeSignature(_) | ElementKind::Barline => {}
        }
    }

    let Some(key) = governing else {
        return Transposition {
            segment,
            interval: 0,
            key: KeySignature::C_MAJOR,
            tempo,
        };
    };

    let interval = key.interval_to_c();
    let segment = if interval == 0 {
        segment
    } else {
        log::debug!("transposing segment in {} by {} semitones", key, interval);
        segment.iter().map(|element| element.transposed(interval)).collect()
    };

    Transposition {
        segment,
        interval,
        key,
        tempo,
    }
}
