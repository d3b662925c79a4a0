//! MusicXML parser implementation
//!
//! Converts a `<score-partwise>` document into a [`Score`] using roxmltree.
//! Each part is walked measure by measure while tracking the running
//! position (in quarter notes), the furthest position reached in the
//! measure, and the attributes in force.

use super::harmony;
use crate::converters::{shift, sort_elements, ImportError, ImportOptions, ImportResult};
use crate::models::{
    ElementKind, KeySignature, Mode, MusicalElement, Part, Position, Score, TimeSignature, ZERO,
};
use num_traits::{CheckedAdd, CheckedDiv, CheckedSub};
use roxmltree::{Document as XmlDocument, Node, ParsingOptions};
use std::collections::HashMap;

/// Parse a MusicXML document
pub fn parse_musicxml(xml: &str, options: &ImportOptions) -> ImportResult<Score> {
    // MusicXML files normally carry a DOCTYPE
    let parsing = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = XmlDocument::parse_with_options(xml, parsing).map_err(|e| ImportError::Xml(e.to_string()))?;

    let root = doc.root_element();
    match root.tag_name().name() {
        "score-partwise" => parse_score_partwise(root, options),
        "score-timewise" => Err(ImportError::UnsupportedFeature(
            "score-timewise format (use score-partwise instead)".to_string(),
        )),
        other => Err(ImportError::InvalidValue {
            element: "root".to_string(),
            value: other.to_string(),
            reason: "Expected <score-partwise>".to_string(),
        }),
    }
}

fn parse_score_partwise(root: Node, options: &ImportOptions) -> ImportResult<Score> {
    let part_list = child(root, "part-list").ok_or_else(|| ImportError::MissingElement("part-list".to_string()))?;
    let names = parse_part_list(part_list);

    let mut parts = Vec::new();
    for part_node in root.children().filter(|n| n.has_tag_name("part")) {
        let id = part_node
            .attribute("id")
            .ok_or_else(|| ImportError::MissingElement("part id attribute".to_string()))?;
        let name = names
            .get(id)
            .cloned()
            .unwrap_or_else(|| format!("Part {}", parts.len() + 1));

        let elements = PartParser::new(options).parse(part_node)?;
        parts.push(Part::new(id, name, elements));
    }

    Ok(Score::new(parts))
}

/// Part ids mapped to their `<part-name>`
fn parse_part_list(part_list: Node) -> HashMap<String, String> {
    part_list
        .children()
        .filter(|n| n.has_tag_name("score-part"))
        .filter_map(|score_part| {
            let id = score_part.attribute("id")?;
            let name = child_text(score_part, "part-name").unwrap_or("Unnamed Part");
            Some((id.to_string(), name.trim().to_string()))
        })
        .collect()
}

/// Running state while walking one `<part>`
struct PartParser {
    merge_ties: bool,
    divisions: i64,
    position: Position,
    furthest: Position,
    key: Option<KeySignature>,
    time: Option<TimeSignature>,
    /// Voice whose notes are kept; fixed by the first note of the part
    voice: Option<String>,
    /// Index of the last note, chord or rest emitted for the kept voice
    last_sounding: Option<usize>,
    elements: Vec<MusicalElement>,
}

impl PartParser {
    fn new(options: &ImportOptions) -> Self {
        PartParser {
            merge_ties: options.merge_ties,
            divisions: 1,
            position: ZERO,
            furthest: ZERO,
            key: None,
            time: None,
            voice: None,
            last_sounding: None,
            elements: Vec::new(),
        }
    }

    fn parse(mut self, part_node: Node) -> ImportResult<Vec<MusicalElement>> {
        for measure in part_node.children().filter(|n| n.has_tag_name("measure")) {
            self.parse_measure(measure)?;
        }
        sort_elements(&mut self.elements);
        Ok(self.elements)
    }

    fn parse_measure(&mut self, measure: Node) -> ImportResult<()> {
        let start = self.furthest;
        self.position = start;

        for node in measure.children().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "attributes" => self.parse_attributes(node)?,
                "direction" => self.parse_direction(node)?,
                "sound" => {
                    self.parse_sound(node, self.position);
                }
                "harmony" => self.parse_harmony(node)?,
                "note" => self.parse_note(node)?,
                "backup" => {
                    let duration = self.duration_of(node)?;
                    self.position = self
                        .position
                        .checked_sub(&duration)
                        .filter(|position| *position > start)
                        .unwrap_or(start);
                }
                "forward" => {
                    let duration = self.duration_of(node)?;
                    self.advance(duration)?;
                }
                _ => {
                    // print, barline, figured-bass, ...
                }
            }
        }

        self.elements.push(MusicalElement::barline(self.furthest));
        Ok(())
    }

    fn advance(&mut self, duration: Position) -> ImportResult<()> {
        self.position = shift("duration", self.position, duration)?;
        if self.position > self.furthest {
            self.furthest = self.position;
        }
        Ok(())
    }

    /// Parse <attributes>
    fn parse_attributes(&mut self, node: Node) -> ImportResult<()> {
        for attr in node.children().filter(|n| n.is_element()) {
            match attr.tag_name().name() {
                "divisions" => {
                    let text = attr.text().unwrap_or("").trim();
                    self.divisions = text
                        .parse::<i64>()
                        .ok()
                        .filter(|&d| d > 0)
                        .ok_or_else(|| ImportError::InvalidValue {
                            element: "divisions".to_string(),
                            value: text.to_string(),
                            reason: "Expected positive integer".to_string(),
                        })?;
                }
                "key" => {
                    if let Some(key) = parse_key(attr)? {
                        if self.key != Some(key) {
                            self.key = Some(key);
                            self.elements.push(MusicalElement::key_signature(self.position, key));
                        }
                    }
                }
                "time" => {
                    if let Some(time) = parse_time(attr)? {
                        if self.time != Some(time) {
                            self.time = Some(time);
                            self.elements.push(MusicalElement::time_signature(self.position, time));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Parse <direction>: tempo from <sound> or <metronome>
    fn parse_direction(&mut self, node: Node) -> ImportResult<()> {
        let offset = match child(node, "offset") {
            Some(offset) => self.divisions_to_position(offset)?,
            None => ZERO,
        };
        let at = shift("offset", self.position, offset)?;

        if let Some(sound) = child(node, "sound") {
            if self.parse_sound(sound, at) {
                return Ok(());
            }
        }

        let metronome = node
            .children()
            .filter(|n| n.has_tag_name("direction-type"))
            .find_map(|direction_type| child(direction_type, "metronome"));
        if let Some(bpm) = metronome.and_then(metronome_bpm) {
            self.elements.push(MusicalElement::tempo(at, bpm));
        }
        Ok(())
    }

    /// Emit a tempo mark for `<sound tempo="...">`; true if one was found
    fn parse_sound(&mut self, sound: Node, at: Position) -> bool {
        let tempo = sound
            .attribute("tempo")
            .and_then(|t| t.trim().parse::<f64>().ok())
            .filter(|bpm| *bpm > 0.0);
        match tempo {
            Some(bpm) => {
                self.elements.push(MusicalElement::tempo(at, bpm));
                true
            }
            None => false,
        }
    }

    /// Parse <harmony> into a chord symbol
    fn parse_harmony(&mut self, node: Node) -> ImportResult<()> {
        let offset = match child(node, "offset") {
            Some(offset) => self.divisions_to_position(offset)?,
            None => ZERO,
        };
        let at = shift("offset", self.position, offset)?;
        let at = if at < ZERO { ZERO } else { at };

        let kind = child_text(node, "kind").map(str::trim).unwrap_or("major");
        if kind == "none" {
            self.elements.push(MusicalElement::chord_symbol(at, Vec::new()));
            return Ok(());
        }

        // Roman-numeral <function> harmonies carry no root
        let Some(root) = child(node, "root") else {
            log::debug!("skipping harmony without <root> at {}", at);
            return Ok(());
        };
        let root_class = parse_step_alter(root, "root-step", "root-alter")?;
        let bass_class = child(node, "bass")
            .map(|bass| parse_step_alter(bass, "bass-step", "bass-alter"))
            .transpose()?;

        let pitches = harmony::realize(root_class, kind, bass_class);
        self.elements.push(MusicalElement::chord_symbol(at, pitches));
        Ok(())
    }

    /// Parse a <note> element
    fn parse_note(&mut self, node: Node) -> ImportResult<()> {
        // Grace notes take no time
        if has_child(node, "grace") {
            return Ok(());
        }

        let duration = self.duration_of(node)?;
        let is_chord = has_child(node, "chord");
        let voice = child_text(node, "voice").map(str::trim).unwrap_or("1");
        let kept_voice = self.voice.get_or_insert_with(|| voice.to_string());
        let kept = voice == kept_voice.as_str() && !has_child(node, "cue");

        if is_chord {
            if kept {
                let pitch = parse_note_pitch(node)?;
                self.fold_into_chord(pitch, duration);
            }
            return Ok(());
        }

        let onset = self.position;
        self.advance(duration)?;
        if !kept {
            return Ok(());
        }

        let pitch = parse_note_pitch(node)?;
        let Some(pitch) = pitch else {
            self.last_sounding = Some(self.elements.len());
            self.elements.push(MusicalElement::rest(onset, duration));
            return Ok(());
        };

        let tie_stop = node
            .children()
            .filter(|n| n.has_tag_name("tie"))
            .any(|tie| tie.attribute("type") == Some("stop"));
        if self.merge_ties && tie_stop && self.extend_tied(pitch, onset, duration)? {
            return Ok(());
        }

        self.last_sounding = Some(self.elements.len());
        self.elements.push(MusicalElement::note(onset, duration, pitch));
        Ok(())
    }

    /// Add a `<chord/>` note to the sounding element before it
    fn fold_into_chord(&mut self, pitch: Option<u8>, duration: Position) {
        let Some(pitch) = pitch else {
            return;
        };
        let Some(index) = self.last_sounding else {
            return;
        };
        let previous = &self.elements[index];
        let kind = match &previous.kind {
            ElementKind::Note { pitch: first } => ElementKind::Chord {
                pitches: vec![*first, pitch],
            },
            ElementKind::Chord { pitches } => {
                let mut pitches = pitches.clone();
                pitches.push(pitch);
                ElementKind::Chord { pitches }
            }
            ElementKind::Rest
            | ElementKind::ChordSymbol { .. }
            | ElementKind::KeySignature(_)
            | ElementKind::TimeSignature(_)
            | ElementKind::TempoMark { .. }
            | ElementKind::Barline => return,
        };
        let folded = MusicalElement::new(previous.offset, duration.max(previous.duration), kind);
        self.elements[index] = folded;
    }

    /// Lengthen the note a tie-stop continues; false when there is none
    fn extend_tied(&mut self, pitch: u8, onset: Position, duration: Position) -> ImportResult<bool> {
        let Some(index) = self.last_sounding else {
            return Ok(false);
        };
        let previous = &self.elements[index];
        let continues = matches!(previous.kind, ElementKind::Note { pitch: p } if p == pitch)
            && previous.offset.checked_add(&previous.duration) == Some(onset);
        if continues {
            let extended = previous.with_duration(shift("duration", previous.duration, duration)?);
            self.elements[index] = extended;
        }
        Ok(continues)
    }

    /// `<duration>` of a note, backup or forward
    fn duration_of(&self, node: Node) -> ImportResult<Position> {
        let duration = child(node, "duration").ok_or_else(|| ImportError::MissingElement("duration".to_string()))?;
        let value = self.divisions_to_position(duration)?;
        if value < ZERO {
            return Err(ImportError::InvalidValue {
                element: "duration".to_string(),
                value: value.to_string(),
                reason: "Expected non-negative duration".to_string(),
            });
        }
        Ok(value)
    }

    /// Convert an element's text from divisions to quarter notes
    fn divisions_to_position(&self, node: Node) -> ImportResult<Position> {
        let text = node.text().unwrap_or("").trim();
        text.parse::<i64>()
            .ok()
            .map(Position::from_integer)
            .or_else(|| text.parse::<f64>().ok().and_then(Position::approximate_float))
            .and_then(|divs| divs.checked_div(&Position::from_integer(self.divisions)))
            .ok_or_else(|| ImportError::InvalidValue {
                element: node.tag_name().name().to_string(),
                value: text.to_string(),
                reason: "Expected a number of divisions".to_string(),
            })
    }
}

/// Parse <key>; `None` for non-traditional keys
fn parse_key(node: Node) -> ImportResult<Option<KeySignature>> {
    let Some(text) = child_text(node, "fifths") else {
        return Ok(None);
    };
    let fifths: i8 = text.trim().parse().map_err(|_| ImportError::InvalidValue {
        element: "fifths".to_string(),
        value: text.to_string(),
        reason: "Expected integer".to_string(),
    })?;
    let mode = match child_text(node, "mode").map(str::trim) {
        Some("minor") | Some("aeolian") => Mode::Minor,
        _ => Mode::Major,
    };
    Ok(Some(KeySignature::new(fifths, mode)))
}

/// Parse <time>; composite beats like "3+2" are summed
fn parse_time(node: Node) -> ImportResult<Option<TimeSignature>> {
    if has_child(node, "senza-misura") {
        return Ok(None);
    }
    let (Some(beats), Some(beat_type)) = (child_text(node, "beats"), child_text(node, "beat-type")) else {
        return Ok(None);
    };

    let invalid = |element: &str, value: &str| ImportError::InvalidValue {
        element: element.to_string(),
        value: value.to_string(),
        reason: "Expected positive integer".to_string(),
    };
    let mut numerator: u8 = 0;
    for part in beats.split('+') {
        let value: u8 = part.trim().parse().map_err(|_| invalid("beats", beats))?;
        numerator = numerator.checked_add(value).ok_or_else(|| invalid("beats", beats))?;
    }
    let denominator: u8 = beat_type.trim().parse().map_err(|_| invalid("beat-type", beat_type))?;

    Ok(Some(TimeSignature::new(numerator, denominator)))
}

/// Quarter-note tempo of a <metronome> mark
fn metronome_bpm(metronome: Node) -> Option<f64> {
    let per_minute = child_text(metronome, "per-minute")?;
    // Allow "c. 120" and "120-132"
    let digits: String = per_minute
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let per_minute: f64 = digits.parse().ok()?;

    let mut beat = match child_text(metronome, "beat-unit")?.trim() {
        "whole" => 4.0,
        "half" => 2.0,
        "quarter" => 1.0,
        "eighth" => 0.5,
        "16th" => 0.25,
        "32nd" => 0.125,
        _ => return None,
    };
    let dots = metronome.children().filter(|n| n.has_tag_name("beat-unit-dot")).count();
    let mut dot_value = beat / 2.0;
    for _ in 0..dots {
        beat += dot_value;
        dot_value /= 2.0;
    }

    Some(per_minute * beat).filter(|bpm| *bpm > 0.0)
}

/// MIDI pitch of a note; `None` for rests
fn parse_note_pitch(node: Node) -> ImportResult<Option<u8>> {
    if has_child(node, "rest") {
        return Ok(None);
    }

    // Parse <pitch>, or the display position of an <unpitched> note
    let (pitch_node, step_tag, octave_tag) = if let Some(pitch) = child(node, "pitch") {
        (pitch, "step", "octave")
    } else if let Some(unpitched) = child(node, "unpitched") {
        (unpitched, "display-step", "display-octave")
    } else {
        return Err(ImportError::MissingElement("pitch".to_string()));
    };

    let (natural, alter) = step_and_alter(pitch_node, step_tag, "alter")?;
    let octave_text =
        child_text(pitch_node, octave_tag).ok_or_else(|| ImportError::MissingElement(octave_tag.to_string()))?;
    let octave: i32 = octave_text
        .trim()
        .parse()
        .ok()
        .filter(|octave| (0..=9).contains(octave))
        .ok_or_else(|| ImportError::InvalidValue {
            element: octave_tag.to_string(),
            value: octave_text.to_string(),
            reason: "Expected octave 0-9".to_string(),
        })?;

    Ok(Some(pitch_to_midi(natural + alter, octave)))
}

/// Pitch class from a step element plus optional alter element
fn parse_step_alter(node: Node, step_tag: &str, alter_tag: &str) -> ImportResult<u8> {
    let (natural, alter) = step_and_alter(node, step_tag, alter_tag)?;
    Ok((natural + alter).rem_euclid(12) as u8)
}

/// Natural semitone of the step and the signed alteration
fn step_and_alter(node: Node, step_tag: &str, alter_tag: &str) -> ImportResult<(i32, i32)> {
    let step = child_text(node, step_tag).ok_or_else(|| ImportError::MissingElement(step_tag.to_string()))?;
    let natural = step_pitch_class(step.trim()).ok_or_else(|| ImportError::InvalidValue {
        element: step_tag.to_string(),
        value: step.to_string(),
        reason: "Expected A-G".to_string(),
    })?;

    // Microtonal alters round to the nearest semitone
    let alter = match child_text(node, alter_tag).and_then(|t| t.trim().parse::<f64>().ok()) {
        Some(alter) if alter.abs() <= 12.0 => alter.round() as i32,
        Some(alter) => {
            return Err(ImportError::InvalidValue {
                element: alter_tag.to_string(),
                value: alter.to_string(),
                reason: "Expected alteration within an octave".to_string(),
            })
        }
        None => 0,
    };

    Ok((i32::from(natural), alter))
}

fn step_pitch_class(step: &str) -> Option<u8> {
    match step {
        "C" => Some(0),
        "D" => Some(2),
        "E" => Some(4),
        "F" => Some(5),
        "G" => Some(7),
        "A" => Some(9),
        "B" => Some(11),
        _ => None,
    }
}

/// MIDI note number from a semitone offset above C and an octave (C4 = 60)
///
/// Clamped to 0-127.
pub fn pitch_to_midi(semitone: i32, octave: i32) -> u8 {
    ((i64::from(octave) + 1) * 12 + i64::from(semitone)).clamp(0, 127) as u8
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).and_then(|n| n.text())
}

fn has_child(node: Node, name: &str) -> bool {
    node.children().any(|n| n.has_tag_name(name))
}
