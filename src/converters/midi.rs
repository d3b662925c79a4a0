//! Standard MIDI File importer
//!
//! MIDI carries no chord symbols, so a MIDI score is melody only:
//!
//! - key, time and tempo meta events are gathered from every track
//! - notes come from the first track that has any; notes starting on the
//!   same tick become one chord, silences become rests, and a note that
//!   overlaps the next onset is cut at that onset
//! - a barline closes the stream at the end of the last note
//!
//! Only metrical (ticks per quarter) timing is supported.

use super::{sort_elements, ImportError, ImportResult, MAX_SCORE_LENGTH};
use crate::models::{KeySignature, Mode, MusicalElement, Part, Position, Score, TimeSignature};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::collections::{BTreeMap, HashMap};

/// A paired note-on/note-off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimedNote {
    onset: u64,
    end: u64,
    pitch: u8,
}

/// Parse SMF bytes into a single-part score
pub fn parse_midi(bytes: &[u8]) -> ImportResult<Score> {
    let smf = Smf::parse(bytes).map_err(|e| ImportError::Midi(e.to_string()))?;

    let tpq = match smf.header.timing {
        Timing::Metrical(ticks) => i64::from(ticks.as_int()),
        Timing::Timecode(_, _) => {
            return Err(ImportError::UnsupportedFeature("SMPTE timecode timing".to_string()));
        }
    };
    if tpq == 0 {
        return Err(ImportError::InvalidValue {
            element: "header".to_string(),
            value: "0".to_string(),
            reason: "Expected positive ticks per quarter".to_string(),
        });
    }
    let at = |tick: u64| Position::new(tick as i64, tpq);

    let mut elements = conductor_elements(&smf, at);

    let lead = smf
        .tracks
        .iter()
        .enumerate()
        .map(|(index, track)| (index, track_notes(track)))
        .find(|(_, notes)| !notes.is_empty());

    let (id, name) = match &lead {
        Some((index, _)) => (
            format!("track-{}", index),
            track_name(&smf.tracks[*index]).unwrap_or_else(|| format!("Track {}", index + 1)),
        ),
        None => ("track-0".to_string(), "Track 1".to_string()),
    };

    if let Some((_, notes)) = lead {
        elements.extend(sounding_elements(&notes, at));
    }
    sort_elements(&mut elements);

    if let Some(last) = elements.last() {
        if last.offset > Position::from_integer(MAX_SCORE_LENGTH) {
            return Err(ImportError::InvalidValue {
                element: "track".to_string(),
                value: last.offset.to_string(),
                reason: format!("Position exceeds {} quarter notes", MAX_SCORE_LENGTH),
            });
        }
    }

    Ok(Score::new(vec![Part::new(id, name, elements)]))
}

/// Key, time and tempo changes from all tracks, in tick order
fn conductor_elements(smf: &Smf, at: impl Fn(u64) -> Position) -> Vec<MusicalElement> {
    let mut events: Vec<(u64, MetaMessage)> = Vec::new();
    for track in &smf.tracks {
        let mut tick = 0u64;
        for event in track {
            tick += u64::from(event.delta.as_int());
            if let TrackEventKind::Meta(meta) = event.kind {
                events.push((tick, meta));
            }
        }
    }
    events.sort_by_key(|(tick, _)| *tick);

    let mut elements = Vec::new();
    let mut key: Option<KeySignature> = None;
    let mut time: Option<TimeSignature> = None;
    for (tick, meta) in events {
        match meta {
            MetaMessage::KeySignature(fifths, minor) => {
                let mode = if minor { Mode::Minor } else { Mode::Major };
                let next = KeySignature::new(fifths, mode);
                if key != Some(next) {
                    key = Some(next);
                    elements.push(MusicalElement::key_signature(at(tick), next));
                }
            }
            MetaMessage::TimeSignature(numerator, denominator_pow, _, _) => {
                let Some(denominator) = 1u8.checked_shl(u32::from(denominator_pow)) else {
                    log::debug!("ignoring time signature with denominator 2^{}", denominator_pow);
                    continue;
                };
                let next = TimeSignature::new(numerator, denominator);
                if time != Some(next) {
                    time = Some(next);
                    elements.push(MusicalElement::time_signature(at(tick), next));
                }
            }
            MetaMessage::Tempo(tempo) => {
                let usec = tempo.as_int();
                if usec > 0 {
                    elements.push(MusicalElement::tempo(at(tick), 60_000_000.0 / f64::from(usec)));
                }
            }
            _ => {}
        }
    }
    elements
}

fn track_name(track: &[midly::TrackEvent]) -> Option<String> {
    track.iter().find_map(|event| match event.kind {
        TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
            let name = String::from_utf8_lossy(name).trim().to_string();
            (!name.is_empty()).then_some(name)
        }
        _ => None,
    })
}

/// Pair note-on/note-off events of one track
fn track_notes(track: &[midly::TrackEvent]) -> Vec<TimedNote> {
    let mut notes = Vec::new();
    // (channel, pitch) -> onset ticks still sounding
    let mut pending: HashMap<(u8, u8), Vec<u64>> = HashMap::new();
    let mut tick = 0u64;

    for event in track {
        tick += u64::from(event.delta.as_int());
        let TrackEventKind::Midi { channel, message } = event.kind else {
            continue;
        };
        let channel = channel.as_int();
        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                pending.entry((channel, key.as_int())).or_default().push(tick);
            }
            // vel=0 NoteOn is NoteOff
            MidiMessage::NoteOff { key, .. } | MidiMessage::NoteOn { key, .. } => {
                let pitch = key.as_int();
                if let Some(onset) = pending.get_mut(&(channel, pitch)).and_then(|stack| stack.pop()) {
                    notes.push(TimedNote { onset, end: tick, pitch });
                }
            }
            _ => {}
        }
    }

    // Close any unclosed notes at the track's final tick
    for ((_, pitch), onsets) in pending {
        for onset in onsets {
            notes.push(TimedNote { onset, end: tick, pitch });
        }
    }

    notes.sort_by_key(|note| (note.onset, note.pitch));
    notes
}

/// Notes grouped by onset into notes, chords and the rests between them
fn sounding_elements(notes: &[TimedNote], at: impl Fn(u64) -> Position) -> Vec<MusicalElement> {
    let mut groups: BTreeMap<u64, (u64, Vec<u8>)> = BTreeMap::new();
    for note in notes {
        let group = groups.entry(note.onset).or_insert((note.end, Vec::new()));
        group.0 = group.0.max(note.end);
        if !group.1.contains(&note.pitch) {
            group.1.push(note.pitch);
        }
    }

    let onsets: Vec<u64> = groups.keys().copied().collect();
    let mut elements = Vec::new();
    let mut cursor = 0u64;

    for (index, (onset, (end, mut pitches))) in groups.into_iter().enumerate() {
        let end = match onsets.get(index + 1) {
            Some(&next) => end.min(next),
            None => end,
        };
        if end <= onset {
            continue;
        }
        if onset > cursor {
            elements.push(MusicalElement::rest(at(cursor), at(onset - cursor)));
        }

        let duration = at(end - onset);
        pitches.sort_unstable();
        let element = match pitches.as_slice() {
            [pitch] => MusicalElement::note(at(onset), duration, *pitch),
            _ => MusicalElement::chord(at(onset), duration, pitches),
        };
        elements.push(element);
        cursor = end;
    }

    elements.push(MusicalElement::barline(at(cursor)));
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ElementKind;
    use midly::{Format, Header, TrackEvent};

    fn q(n: i64) -> Position {
        Position::from_integer(n)
    }

    fn event(delta: u32, kind: TrackEventKind<'static>) -> TrackEvent<'static> {
        TrackEvent { delta: delta.into(), kind }
    }

    fn on(delta: u32, key: u8) -> TrackEvent<'static> {
        event(
            delta,
            TrackEventKind::Midi {
                channel: 0.into(),
                message: MidiMessage::NoteOn { key: key.into(), vel: 80.into() },
            },
        )
    }

    fn off(delta: u32, key: u8) -> TrackEvent<'static> {
        event(
            delta,
            TrackEventKind::Midi {
                channel: 0.into(),
                message: MidiMessage::NoteOff { key: key.into(), vel: 0.into() },
            },
        )
    }

    fn end() -> TrackEvent<'static> {
        event(0, TrackEventKind::Meta(MetaMessage::EndOfTrack))
    }

    fn smf_bytes(tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
        let smf = Smf {
            header: Header {
                format: Format::Parallel,
                timing: Timing::Metrical(480.into()),
            },
            tracks,
        };
        let mut out = Vec::new();
        smf.write(&mut out).unwrap();
        out
    }

    #[test]
    fn test_conductor_and_melody_tracks() {
        let conductor = vec![
            event(0, TrackEventKind::Meta(MetaMessage::TimeSignature(3, 2, 24, 8))),
            event(0, TrackEventKind::Meta(MetaMessage::KeySignature(-2, false))),
            event(0, TrackEventKind::Meta(MetaMessage::Tempo(500_000.into()))),
            end(),
        ];
        let melody = vec![
            event(0, TrackEventKind::Meta(MetaMessage::TrackName(b"Melody"))),
            on(0, 70),
            off(480, 70),
            // quarter rest
            on(480, 72),
            off(960, 72),
            end(),
        ];
        let score = parse_midi(&smf_bytes(vec![conductor, melody])).unwrap();
        let part = &score.parts[0];
        assert_eq!(part.id, "track-1");
        assert_eq!(part.name, "Melody");
        assert_eq!(
            part.elements,
            vec![
                MusicalElement::tempo(q(0), 120.0),
                MusicalElement::time_signature(q(0), TimeSignature::new(3, 4)),
                MusicalElement::key_signature(q(0), KeySignature::major(-2)),
                MusicalElement::note(q(0), q(1), 70),
                MusicalElement::rest(q(1), q(1)),
                MusicalElement::note(q(2), q(2), 72),
                MusicalElement::barline(q(4)),
            ]
        );
    }

    #[test]
    fn test_simultaneous_onsets_become_chord_and_overlaps_are_cut() {
        let track = vec![
            on(0, 64),
            on(0, 60),
            on(0, 67),
            // next onset before the chord is released
            on(480, 62),
            off(240, 60),
            off(0, 64),
            off(0, 67),
            off(240, 62),
            end(),
        ];
        let score = parse_midi(&smf_bytes(vec![track])).unwrap();
        let elements = &score.parts[0].elements;
        assert_eq!(elements[0], MusicalElement::chord(q(0), q(1), vec![60, 64, 67]));
        assert_eq!(elements[1].kind, ElementKind::Note { pitch: 62 });
        assert_eq!(elements[1].duration, q(1));
        assert_eq!(elements[2], MusicalElement::barline(q(2)));
    }

    #[test]
    fn test_zero_velocity_note_on_ends_note() {
        let track = vec![
            on(0, 60),
            event(
                240,
                TrackEventKind::Midi {
                    channel: 0.into(),
                    message: MidiMessage::NoteOn { key: 60.into(), vel: 0.into() },
                },
            ),
            end(),
        ];
        let score = parse_midi(&smf_bytes(vec![track])).unwrap();
        assert_eq!(
            score.parts[0].elements[0],
            MusicalElement::note(q(0), Position::new(1, 2), 60)
        );
    }

    #[test]
    fn test_overlong_track_is_invalid() {
        // 2^16 quarters plus one at 480 ticks per quarter
        let ticks = 480 * ((1u32 << 16) + 1);
        let track = vec![on(0, 60), off(ticks, 60), end()];
        assert!(matches!(
            parse_midi(&smf_bytes(vec![track])),
            Err(ImportError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_invalid_bytes() {
        assert!(matches!(parse_midi(b"not midi"), Err(ImportError::Midi(_))));
    }
}
