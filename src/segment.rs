//! Key-change segmentation
//!
//! Splits a part's element stream into segments that each sit under a
//! single key signature. Every key change after the first closes the running
//! segment and opens a new one whose offsets restart at zero. The new
//! segment is seeded with the key signature itself followed by the time
//! signature in force at that point, so each segment can be tokenized on
//! its own.

use crate::models::{ElementKind, KeySignature, MusicalElement, Position, TimeSignature, ZERO};

/// Contiguous run of elements under one key; offsets are segment-relative
pub type Segment = Vec<MusicalElement>;

/// Split `elements` at every key-signature change
///
/// A stream without key signatures comes back as a single segment with
/// offsets untouched. The final segment is always emitted, even if empty.
pub fn split_by_key(elements: &[MusicalElement]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Segment = Vec::new();
    let mut current_key: Option<KeySignature> = None;
    let mut current_time: Option<TimeSignature> = None;
    let mut base: Position = ZERO;

    for element in elements {
        match &element.kind {
            ElementKind::KeySignature(key) => {
                if current_key.is_some() {
                    segments.push(std::mem::take(&mut current));
                    base = element.offset;
                    current.push(element.with_offset(ZERO));
                    if let Some(time) = current_time {
                        current.push(MusicalElement::time_signature(ZERO, time));
                    }
                } else {
                    current.push(element.rebased(base));
                }
                current_key = Some(*key);
            }
            ElementKind::TimeSignature(time) => {
                current_time = Some(*time);
                current.push(element.rebased(base));
            }
            ElementKind::Note { .. }
            | ElementKind::Rest
            | ElementKind::Chord { .. }
            | ElementKind::ChordSymbol { .. }
            | ElementKind::TempoMark { .. }
            | ElementKind::Barline => current.push(element.rebased(base)),
        }
    }

    segments.push(current);
    segments
}
