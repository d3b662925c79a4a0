//! Harmonic-rhythm tokenization
//!
//! The chord stream becomes one rhythm token per sixteenth step
//! ([`RHYTHM_REST`] or [`RHYTHM_ONSET`] on the first step of an event,
//! [`RHYTHM_HOLD`] after that) and one chord vector per event.
//!
//! Very short events are folded into the event before them: anything
//! lasting at most an eighth of its predecessor is treated as a passing
//! chord and only extends the predecessor.

use super::vectorize::{vectorize, ChordVector};
use crate::error::ConversionResult;
use crate::models::{ElementKind, MusicalElement, Position, ZERO};
use crate::quantize::{quantize, steps};

pub const RHYTHM_REST: u8 = 0;
pub const RHYTHM_ONSET: u8 = 1;
pub const RHYTHM_HOLD: u8 = 2;

/// Rhythm tokens (one per step) and chord vectors (one per event)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChordTokens {
    pub rhythm: Vec<u8>,
    pub vectors: Vec<ChordVector>,
}

/// Tokenize a chord stream of sustained chords and rests
///
/// Fails when an accepted chord has no pitches.
pub fn tokenize_chords(chords: &[MusicalElement]) -> ConversionResult<ChordTokens> {
    let mut events: Vec<(&MusicalElement, Position)> = Vec::new();

    for element in chords {
        match element.kind {
            ElementKind::Chord { .. } | ElementKind::Rest => {}
            ElementKind::Note { .. }
            | ElementKind::ChordSymbol { .. }
            | ElementKind::KeySignature(_)
            | ElementKind::TimeSignature(_)
            | ElementKind::TempoMark { .. }
            | ElementKind::Barline => continue,
        }

        let duration = quantize(element.duration);
        if duration == ZERO {
            continue;
        }

        if let Some((_, previous)) = events.last_mut() {
            if duration * 8 <= *previous {
                *previous += duration;
                continue;
            }
        }
        events.push((element, duration));
    }

    let mut tokens = ChordTokens::default();
    for (element, duration) in events {
        tokens.vectors.push(vectorize(element)?);

        let onset = if matches!(element.kind, ElementKind::Rest) {
            RHYTHM_REST
        } else {
            RHYTHM_ONSET
        };
        tokens.rhythm.push(onset);
        tokens
            .rhythm
            .extend(std::iter::repeat(RHYTHM_HOLD).take(steps(duration) - 1));
    }

    Ok(tokens)
}
