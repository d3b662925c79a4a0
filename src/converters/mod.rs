//! Score importers
//!
//! Each supported file format is read into the same [`Score`] graph: parts
//! holding flat, offset-ordered element streams.
//!
//! - MusicXML (`.xml`, `.musicxml`)
//! - compressed MusicXML (`.mxl`)
//! - Standard MIDI Files (`.mid`, `.midi`)

pub mod midi;
pub mod musicxml;
pub mod mxl;

use crate::models::{ElementKind, MusicalElement, Position, Score};
use num_traits::CheckedAdd;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a score file
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("xml parse error: {0}")]
    Xml(String),
    #[error("missing required element: {0}")]
    MissingElement(String),
    #[error("invalid value '{value}' for element '{element}': {reason}")]
    InvalidValue {
        element: String,
        value: String,
        reason: String,
    },
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("archive error: {0}")]
    Archive(String),
    #[error("midi parse error: {0}")]
    Midi(String),
    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),
}

pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// Options shared by all importers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Fold a tie-stop note into the note it continues
    pub merge_ties: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions { merge_ties: true }
    }
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFormat {
    MusicXml,
    CompressedMusicXml,
    Midi,
}

impl ScoreFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<ScoreFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xml" | "musicxml" => Some(ScoreFormat::MusicXml),
            "mxl" => Some(ScoreFormat::CompressedMusicXml),
            "mid" | "midi" => Some(ScoreFormat::Midi),
            _ => None,
        }
    }
}

/// Longest part accepted from any importer, in quarter notes
pub const MAX_SCORE_LENGTH: i64 = 1 << 16;

/// `position + delta`, or `InvalidValue` when the sum overflows or lands
/// past [`MAX_SCORE_LENGTH`]
pub(crate) fn shift(element: &str, position: Position, delta: Position) -> ImportResult<Position> {
    position
        .checked_add(&delta)
        .filter(|sum| *sum <= Position::from_integer(MAX_SCORE_LENGTH))
        .ok_or_else(|| ImportError::InvalidValue {
            element: element.to_string(),
            value: delta.to_string(),
            reason: format!("Position exceeds {} quarter notes", MAX_SCORE_LENGTH),
        })
}

/// Order a part's elements by offset
///
/// At equal offsets the barline closing the previous measure comes first,
/// then tempo marks, then everything else in source order. Tempo therefore
/// precedes a key signature at the same position.
pub(crate) fn sort_elements(elements: &mut [MusicalElement]) {
    elements.sort_by_key(|element| (element.offset, stream_rank(&element.kind)));
}

fn stream_rank(kind: &ElementKind) -> u8 {
    match kind {
        ElementKind::Barline => 0,
        ElementKind::TempoMark { .. } => 1,
        ElementKind::Note { .. }
        | ElementKind::Rest
        | ElementKind::Chord { .. }
        | ElementKind::ChordSymbol { .. }
        | ElementKind::KeySignature(_)
        | ElementKind::TimeSignature(_) => 2,
    }
}

/// Read and parse the score at `path`
pub fn load_score(path: &Path, options: &ImportOptions) -> ImportResult<Score> {
    let format = ScoreFormat::from_path(path)
        .ok_or_else(|| ImportError::UnsupportedExtension(path.display().to_string()))?;

    let bytes = fs::read(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("loading {} as {:?}", path.display(), format);
    match format {
        ScoreFormat::MusicXml => {
            let xml = std::str::from_utf8(&bytes).map_err(|e| ImportError::Xml(e.to_string()))?;
            musicxml::parse_musicxml(xml, options)
        }
        ScoreFormat::CompressedMusicXml => mxl::parse_mxl(&bytes, options),
        ScoreFormat::Midi => midi::parse_midi(&bytes),
    }
}
