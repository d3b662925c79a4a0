//! Chord-symbol realization
//!
//! A MusicXML `<harmony>` names a root, a chord kind and optionally a bass
//! note. Realizing it means picking concrete MIDI pitches:
//!
//! - root in octave 3 (C3 = 48) with the kind's intervals stacked on top
//! - with a different bass: bass in octave 2, chord tones folded into the
//!   octave above it (closest voicing over the bass)
//! - kind `none` (N.C.): no pitches

/// Intervals above the root for a MusicXML `<kind>` value
///
/// Unknown kinds fall back to a major triad.
pub fn kind_intervals(kind: &str) -> &'static [u8] {
    match kind {
        "none" => &[],
        "major" | "Neapolitan" => &[0, 4, 7],
        "minor" => &[0, 3, 7],
        "augmented" => &[0, 4, 8],
        "diminished" => &[0, 3, 6],
        "dominant" | "German" => &[0, 4, 7, 10],
        "major-seventh" => &[0, 4, 7, 11],
        "minor-seventh" => &[0, 3, 7, 10],
        "diminished-seventh" => &[0, 3, 6, 9],
        "augmented-seventh" => &[0, 4, 8, 10],
        "half-diminished" | "Tristan" => &[0, 3, 6, 10],
        "major-minor" => &[0, 3, 7, 11],
        "major-sixth" => &[0, 4, 7, 9],
        "minor-sixth" => &[0, 3, 7, 9],
        "dominant-ninth" => &[0, 4, 7, 10, 14],
        "major-ninth" => &[0, 4, 7, 11, 14],
        "minor-ninth" => &[0, 3, 7, 10, 14],
        "dominant-11th" => &[0, 4, 7, 10, 14, 17],
        "major-11th" => &[0, 4, 7, 11, 14, 17],
        "minor-11th" => &[0, 3, 7, 10, 14, 17],
        "dominant-13th" => &[0, 4, 7, 10, 14, 17, 21],
        "major-13th" => &[0, 4, 7, 11, 14, 17, 21],
        "minor-13th" => &[0, 3, 7, 10, 14, 17, 21],
        "suspended-second" => &[0, 2, 7],
        "suspended-fourth" => &[0, 5, 7],
        "Italian" => &[0, 4, 10],
        "French" => &[0, 4, 6, 10],
        "power" => &[0, 7],
        "pedal" => &[0],
        _ => &[0, 4, 7],
    }
}

const ROOT_OCTAVE_BASE: u8 = 48;
const BASS_OCTAVE_BASE: u8 = 36;

/// MIDI pitches of a chord symbol, ascending
pub fn realize(root: u8, kind: &str, bass: Option<u8>) -> Vec<u8> {
    let root = root % 12;
    let intervals = kind_intervals(kind);
    if intervals.is_empty() {
        return Vec::new();
    }

    match bass.map(|b| b % 12) {
        Some(bass) if bass != root => {
            let bass_pitch = BASS_OCTAVE_BASE + bass;
            let mut pitches = vec![bass_pitch];
            for interval in intervals {
                let pitch_class = (root + interval) % 12;
                let pitch = bass_pitch + (pitch_class + 12 - bass) % 12;
                if !pitches.contains(&pitch) {
                    pitches.push(pitch);
                }
            }
            pitches.sort_unstable();
            pitches
        }
        _ => intervals.iter().map(|interval| ROOT_OCTAVE_BASE + root + interval).collect(),
    }
}
