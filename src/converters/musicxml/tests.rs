//! Unit tests for the MusicXML importer

use super::*;
use crate::converters::{ImportError, ImportOptions};
use crate::models::{ElementKind, KeySignature, MusicalElement, Position, TimeSignature};

fn q(n: i64) -> Position {
    Position::from_integer(n)
}

fn frac(n: i64, d: i64) -> Position {
    Position::new(n, d)
}

/// Wrap measures in a single-part score
fn score(measures: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise version="3.1">
  <part-list>
    <score-part id="P1"><part-name>Lead</part-name></score-part>
  </part-list>
  <part id="P1">
{}
  </part>
</score-partwise>"#,
        measures
    )
}

fn parse(measures: &str) -> Vec<MusicalElement> {
    let score = parse_musicxml(&score(measures), &ImportOptions::default()).unwrap();
    score.parts[0].elements.clone()
}

fn kinds(elements: &[MusicalElement]) -> Vec<&ElementKind> {
    elements.iter().map(|e| &e.kind).collect()
}

#[test]
fn test_parse_lead_sheet_measure() {
    let elements = parse(
        r#"
    <measure number="1">
      <attributes>
        <divisions>2</divisions>
        <key><fifths>0</fifths><mode>major</mode></key>
        <time><beats>4</beats><beat-type>4</beat-type></time>
      </attributes>
      <harmony><root><root-step>C</root-step></root><kind>major</kind></harmony>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>2</duration><voice>1</voice></note>
      <note><pitch><step>D</step><octave>4</octave></pitch><duration>2</duration><voice>1</voice></note>
      <harmony><root><root-step>G</root-step></root><kind>major</kind></harmony>
      <forward><duration>4</duration></forward>
    </measure>"#,
    );

    assert_eq!(
        elements,
        vec![
            MusicalElement::key_signature(q(0), KeySignature::C_MAJOR),
            MusicalElement::time_signature(q(0), TimeSignature::COMMON),
            MusicalElement::chord_symbol(q(0), vec![48, 52, 55]),
            MusicalElement::note(q(0), q(1), 60),
            MusicalElement::note(q(1), q(1), 62),
            MusicalElement::chord_symbol(q(2), vec![55, 59, 62]),
            MusicalElement::barline(q(4)),
        ]
    );
}

#[test]
fn test_part_names_and_ids() {
    let xml = r#"<?xml version="1.0"?>
<score-partwise version="3.1">
  <part-list>
    <score-part id="P1"><part-name>Voice</part-name></score-part>
    <score-part id="P2"><part-name>Piano</part-name></score-part>
  </part-list>
  <part id="P1"><measure number="1"/></part>
  <part id="P2"><measure number="1"/></part>
</score-partwise>"#;
    let score = parse_musicxml(xml, &ImportOptions::default()).unwrap();
    assert_eq!(score.parts.len(), 2);
    assert_eq!(score.parts[0].name, "Voice");
    assert_eq!(score.parts[1].id, "P2");
    assert_eq!(score.parts[1].elements, vec![MusicalElement::barline(q(0))]);
}

#[test]
fn test_accidentals_and_octave_crossing() {
    let elements = parse(
        r#"
    <measure number="1">
      <attributes><divisions>1</divisions></attributes>
      <note><pitch><step>F</step><alter>1</alter><octave>4</octave></pitch><duration>1</duration></note>
      <note><pitch><step>B</step><alter>-1</alter><octave>3</octave></pitch><duration>1</duration></note>
      <note><pitch><step>C</step><alter>-1</alter><octave>4</octave></pitch><duration>1</duration></note>
      <note><pitch><step>B</step><alter>1</alter><octave>3</octave></pitch><duration>1</duration></note>
    </measure>"#,
    );
    assert_eq!(
        kinds(&elements[..4]),
        vec![
            &ElementKind::Note { pitch: 66 },
            &ElementKind::Note { pitch: 58 },
            &ElementKind::Note { pitch: 59 },
            &ElementKind::Note { pitch: 60 },
        ]
    );
}

#[test]
fn test_chord_notes_fold_into_one_chord() {
    let elements = parse(
        r#"
    <measure number="1">
      <attributes><divisions>1</divisions></attributes>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>2</duration></note>
      <note><chord/><pitch><step>E</step><octave>4</octave></pitch><duration>2</duration></note>
      <note><chord/><pitch><step>G</step><octave>4</octave></pitch><duration>2</duration></note>
      <note><rest/><duration>2</duration></note>
    </measure>"#,
    );
    assert_eq!(
        elements,
        vec![
            MusicalElement::chord(q(0), q(2), vec![60, 64, 67]),
            MusicalElement::rest(q(2), q(2)),
            MusicalElement::barline(q(4)),
        ]
    );
}

const TIED: &str = r#"
    <measure number="1">
      <attributes><divisions>1</divisions></attributes>
      <note><pitch><step>E</step><octave>4</octave></pitch><duration>2</duration><tie type="start"/></note>
      <note><pitch><step>E</step><octave>4</octave></pitch><duration>2</duration><tie type="stop"/></note>
    </measure>"#;

#[test]
fn test_ties_merge_by_default() {
    let elements = parse(TIED);
    assert_eq!(
        elements,
        vec![MusicalElement::note(q(0), q(4), 64), MusicalElement::barline(q(4))]
    );
}

#[test]
fn test_ties_kept_when_merging_disabled() {
    let options = ImportOptions { merge_ties: false };
    let score = parse_musicxml(&score(TIED), &options).unwrap();
    assert_eq!(
        score.parts[0].elements,
        vec![
            MusicalElement::note(q(0), q(2), 64),
            MusicalElement::note(q(2), q(2), 64),
            MusicalElement::barline(q(4)),
        ]
    );
}

#[test]
fn test_tie_across_barline() {
    let elements = parse(
        r#"
    <measure number="1">
      <attributes><divisions>1</divisions><time><beats>2</beats><beat-type>4</beat-type></time></attributes>
      <note><pitch><step>G</step><octave>4</octave></pitch><duration>2</duration><tie type="start"/></note>
    </measure>
    <measure number="2">
      <note><pitch><step>G</step><octave>4</octave></pitch><duration>1</duration><tie type="stop"/></note>
      <note><pitch><step>A</step><octave>4</octave></pitch><duration>1</duration></note>
    </measure>"#,
    );
    let notes: Vec<_> = elements
        .iter()
        .filter(|e| matches!(e.kind, ElementKind::Note { .. }))
        .collect();
    assert_eq!(notes.len(), 2);
    assert_eq!(*notes[0], MusicalElement::note(q(0), q(3), 67));
    assert_eq!(*notes[1], MusicalElement::note(q(3), q(1), 69));
}

#[test]
fn test_only_first_voice_is_kept() {
    let elements = parse(
        r#"
    <measure number="1">
      <attributes><divisions>1</divisions></attributes>
      <note><pitch><step>C</step><octave>5</octave></pitch><duration>4</duration><voice>1</voice></note>
      <backup><duration>4</duration></backup>
      <note><pitch><step>C</step><octave>3</octave></pitch><duration>2</duration><voice>2</voice></note>
      <note><pitch><step>G</step><octave>2</octave></pitch><duration>2</duration><voice>2</voice></note>
    </measure>"#,
    );
    assert_eq!(
        elements,
        vec![MusicalElement::note(q(0), q(4), 72), MusicalElement::barline(q(4))]
    );
}

#[test]
fn test_grace_notes_are_ignored() {
    let elements = parse(
        r#"
    <measure number="1">
      <attributes><divisions>1</divisions></attributes>
      <note><grace/><pitch><step>D</step><octave>4</octave></pitch></note>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>1</duration></note>
    </measure>"#,
    );
    assert_eq!(elements[0], MusicalElement::note(q(0), q(1), 60));
}

#[test]
fn test_triplets_stay_exact() {
    let elements = parse(
        r#"
    <measure number="1">
      <attributes><divisions>3</divisions></attributes>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>1</duration></note>
      <note><pitch><step>D</step><octave>4</octave></pitch><duration>1</duration></note>
      <note><pitch><step>E</step><octave>4</octave></pitch><duration>1</duration></note>
    </measure>"#,
    );
    assert_eq!(elements[1], MusicalElement::note(frac(1, 3), frac(1, 3), 62));
    assert_eq!(elements[3], MusicalElement::barline(q(1)));
}

#[test]
fn test_key_and_time_emitted_only_on_change() {
    let elements = parse(
        r#"
    <measure number="1">
      <attributes>
        <divisions>1</divisions>
        <key><fifths>-3</fifths><mode>minor</mode></key>
        <time><beats>3+2</beats><beat-type>8</beat-type></time>
      </attributes>
      <note><rest/><duration>2</duration></note>
    </measure>
    <measure number="2">
      <attributes>
        <key><fifths>-3</fifths><mode>minor</mode></key>
        <time><beats>3+2</beats><beat-type>8</beat-type></time>
      </attributes>
      <note><rest/><duration>2</duration></note>
    </measure>
    <measure number="3">
      <attributes><key><fifths>2</fifths></key></attributes>
      <note><rest/><duration>2</duration></note>
    </measure>"#,
    );
    let keys: Vec<_> = elements
        .iter()
        .filter_map(|e| match e.kind {
            ElementKind::KeySignature(key) => Some((e.offset, key)),
            _ => None,
        })
        .collect();
    assert_eq!(keys, vec![(q(0), KeySignature::minor(-3)), (q(4), KeySignature::major(2))]);

    let times: Vec<_> = elements
        .iter()
        .filter(|e| matches!(e.kind, ElementKind::TimeSignature(_)))
        .collect();
    assert_eq!(times.len(), 1);
    assert_eq!(times[0].kind, ElementKind::TimeSignature(TimeSignature::new(5, 8)));
}

#[test]
fn test_tempo_marks() {
    let elements = parse(
        r#"
    <measure number="1">
      <attributes><divisions>1</divisions></attributes>
      <direction>
        <direction-type><metronome><beat-unit>quarter</beat-unit><beat-unit-dot/><per-minute>60</per-minute></metronome></direction-type>
      </direction>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>2</duration></note>
      <direction><sound tempo="132"/></direction>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>2</duration></note>
    </measure>"#,
    );
    let tempos: Vec<_> = elements
        .iter()
        .filter_map(|e| match e.kind {
            ElementKind::TempoMark { bpm } => Some((e.offset, bpm)),
            _ => None,
        })
        .collect();
    assert_eq!(tempos, vec![(q(0), 90.0), (q(2), 132.0)]);
}

#[test]
fn test_harmony_variants() {
    let elements = parse(
        r#"
    <measure number="1">
      <attributes><divisions>2</divisions></attributes>
      <harmony>
        <root><root-step>B</root-step><root-alter>-1</root-alter></root>
        <kind text="7">dominant</kind>
      </harmony>
      <harmony>
        <root><root-step>C</root-step></root>
        <kind>major</kind>
        <bass><bass-step>E</bass-step></bass>
        <offset>4</offset>
      </harmony>
      <harmony><root><root-step>C</root-step></root><kind>none</kind><offset>6</offset></harmony>
      <note><rest/><duration>8</duration></note>
    </measure>"#,
    );
    assert_eq!(
        kinds(&elements[..3]),
        vec![
            &ElementKind::ChordSymbol { pitches: vec![58, 62, 65, 68] },
            &ElementKind::Rest,
            &ElementKind::ChordSymbol { pitches: vec![40, 43, 48] },
        ]
    );
    assert_eq!(elements[2].offset, q(2));
    assert_eq!(elements[3], MusicalElement::chord_symbol(q(3), vec![]));
}

#[test]
fn test_doctype_is_accepted_and_errors_reported() {
    assert!(parse_musicxml(&score(""), &ImportOptions::default()).is_ok());

    let timewise = r#"<?xml version="1.0"?><score-timewise version="3.1"/>"#;
    assert!(matches!(
        parse_musicxml(timewise, &ImportOptions::default()),
        Err(ImportError::UnsupportedFeature(_))
    ));

    assert!(matches!(
        parse_musicxml("<score-partwise>", &ImportOptions::default()),
        Err(ImportError::Xml(_))
    ));

    let no_duration = score(
        r#"<measure number="1"><note><pitch><step>C</step><octave>4</octave></pitch></note></measure>"#,
    );
    assert!(matches!(
        parse_musicxml(&no_duration, &ImportOptions::default()),
        Err(ImportError::MissingElement(_))
    ));
}

#[test]
fn test_pitch_to_midi() {
    assert_eq!(pitch_to_midi(0, 4), 60);
    assert_eq!(pitch_to_midi(9, 4), 69);
    assert_eq!(pitch_to_midi(-1, 4), 59);
    assert_eq!(pitch_to_midi(0, -2), 0);
    assert_eq!(pitch_to_midi(11, 10), 127);
    assert_eq!(pitch_to_midi(0, i32::MAX), 127);
    assert_eq!(pitch_to_midi(i32::MIN, 0), 0);
}

fn parse_error(measures: &str) -> ImportError {
    match parse_musicxml(&score(measures), &ImportOptions::default()) {
        Ok(score) => panic!("expected an error, parsed {:?}", score.parts[0].elements),
        Err(error) => error,
    }
}

#[test]
fn test_out_of_range_pitch_is_invalid() {
    let error = parse_error(
        r#"<measure number="1">
      <note><pitch><step>C</step><octave>2147483647</octave></pitch><duration>1</duration></note>
    </measure>"#,
    );
    assert!(matches!(error, ImportError::InvalidValue { ref element, .. } if element == "octave"));

    let error = parse_error(
        r#"<measure number="1">
      <note><pitch><step>C</step><alter>2147483647</alter><octave>4</octave></pitch><duration>1</duration></note>
    </measure>"#,
    );
    assert!(matches!(error, ImportError::InvalidValue { ref element, .. } if element == "alter"));
}

#[test]
fn test_oversized_durations_are_invalid() {
    let error = parse_error(
        r#"<measure number="1">
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>9223372036854775807</duration></note>
      <note><pitch><step>D</step><octave>4</octave></pitch><duration>9223372036854775807</duration></note>
    </measure>"#,
    );
    assert!(matches!(error, ImportError::InvalidValue { ref element, .. } if element == "duration"));

    let error = parse_error(
        r#"<measure number="1"><forward><duration>-4</duration></forward></measure>"#,
    );
    assert!(matches!(error, ImportError::InvalidValue { .. }));
}
