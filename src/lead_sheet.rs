//! Melody / harmony separation
//!
//! A lead sheet interleaves its melody with chord symbols. Chord symbols
//! only mark where a harmony starts, so the splitter turns them into
//! sounding chords: each symbol lasts until the next one, and the last one
//! lasts until the final melody element (normally the closing barline).
//! When the first symbol does not sit on the downbeat, the gap before it is
//! filled with a rest so both streams start at zero.

use crate::error::{ConversionError, ConversionResult};
use crate::models::{ElementKind, MusicalElement, Position, ZERO};

/// A segment split into its two streams
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadSheet {
    /// Everything that is not a chord symbol, in source order
    pub melody: Vec<MusicalElement>,
    /// Sustained chords (and a leading rest when needed)
    pub chords: Vec<MusicalElement>,
}

/// Separate `segment` into melody and sustained chords
///
/// Fails with [`ConversionError::NoChords`] when the segment has no chord
/// symbols at all.
pub fn split_lead_sheet(segment: &[MusicalElement]) -> ConversionResult<LeadSheet> {
    let mut melody = Vec::new();
    let mut symbols: Vec<(Position, &[u8])> = Vec::new();

    for element in segment {
        match &element.kind {
            ElementKind::ChordSymbol { pitches } => symbols.push((element.offset, pitches.as_slice())),
            ElementKind::Note { .. }
            | ElementKind::Rest
            | ElementKind::Chord { .. }
            | ElementKind::KeySignature(_)
            | ElementKind::TimeSignature(_)
            | ElementKind::TempoMark { .. }
            | ElementKind::Barline => melody.push(element.clone()),
        }
    }

    let (first_offset, _) = *symbols.first().ok_or(ConversionError::NoChords)?;
    let mut chords = Vec::with_capacity(symbols.len() + 1);

    if first_offset != ZERO {
        chords.push(MusicalElement::rest(ZERO, first_offset));
    }

    for pair in symbols.windows(2) {
        let (offset, pitches) = pair[0];
        let (next_offset, _) = pair[1];
        chords.push(MusicalElement::chord(offset, next_offset - offset, pitches.to_vec()));
    }

    if let Some(&(offset, pitches)) = symbols.last() {
        let end = melody.last().map(|element| element.offset).unwrap_or(offset);
        let duration = if end > offset { end - offset } else { ZERO };
        chords.push(MusicalElement::chord(offset, duration, pitches.to_vec()));
    }

    Ok(LeadSheet { melody, chords })
}
