//! Melody tokenization
//!
//! The melody becomes one token per sixteenth step:
//!
//! - `pitch + 1` (1..=128) on a note onset
//! - [`REST_ONSET`] on the first step of a run of rests
//! - [`HOLD`] on every other step (note continuation or rest continuation)
//!
//! Alongside it runs a beat stream of the same length, holding the metrical
//! weight of each step under the time signature in force.

use crate::beat_profile::BeatProfile;
use crate::error::ConversionResult;
use crate::models::{ElementKind, MusicalElement, Position, TimeSignature};
use crate::quantize::steps;

/// Highest MIDI pitch; anything above is clamped
const MAX_PITCH: u8 = 127;

pub const REST_ONSET: u8 = 129;
pub const HOLD: u8 = 130;

/// A time signature and where it takes effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSignatureEvent {
    pub offset: Position,
    pub signature: TimeSignature,
}

/// Melody pitch tokens and their beat weights, index aligned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MelodyTokens {
    pub pitches: Vec<u8>,
    pub beats: Vec<u8>,
    pub time_signatures: Vec<TimeSignatureEvent>,
}

/// Tokenize a melody stream
///
/// Elements are visited in offset order (ties keep their stream order).
/// Fails only when a time signature cannot be profiled.
pub fn tokenize_melody(melody: &[MusicalElement]) -> ConversionResult<MelodyTokens> {
    let mut ordered: Vec<&MusicalElement> = melody.iter().collect();
    ordered.sort_by_key(|element| element.offset);

    let mut pitches = Vec::new();
    let mut time_signatures = Vec::new();
    let mut in_rest = false;

    for element in ordered {
        let onset = match &element.kind {
            ElementKind::Note { pitch } => Some(*pitch),
            // Top voice carries the tune; an empty chord reads as a rest
            ElementKind::Chord { pitches } => pitches.iter().max().copied(),
            ElementKind::Rest => None,
            ElementKind::TimeSignature(signature) => {
                time_signatures.push(TimeSignatureEvent {
                    offset: element.offset,
                    signature: *signature,
                });
                continue;
            }
            ElementKind::ChordSymbol { .. }
            | ElementKind::KeySignature(_)
            | ElementKind::TempoMark { .. }
            | ElementKind::Barline => continue,
        };

        let count = steps(element.duration);
        if count == 0 {
            continue;
        }

        let first = match onset {
            Some(pitch) => {
                in_rest = false;
                pitch.min(MAX_PITCH) + 1
            }
            None if in_rest => HOLD,
            None => {
                in_rest = true;
                REST_ONSET
            }
        };
        pitches.push(first);
        pitches.extend(std::iter::repeat(HOLD).take(count - 1));
    }

    let beats = synchronize_beats(&time_signatures, pitches.len())?;

    Ok(MelodyTokens {
        pitches,
        beats,
        time_signatures,
    })
}

/// Beat weights for `total` steps, switching profile at each time signature
///
/// Starts in 4/4. Each profile restarts from its downbeat when it takes
/// effect.
pub fn synchronize_beats(changes: &[TimeSignatureEvent], total: usize) -> ConversionResult<Vec<u8>> {
    let mut beats = Vec::with_capacity(total);
    let mut profile = BeatProfile::new(TimeSignature::COMMON)?;
    let mut previous = 0usize;

    for change in changes {
        let current = steps(change.offset);
        profile.fill(&mut beats, current.saturating_sub(previous));
        profile = BeatProfile::new(change.signature)?;
        previous = current;
    }

    let remaining = total.saturating_sub(beats.len());
    profile.fill(&mut beats, remaining);
    beats.truncate(total);
    Ok(beats)
}
