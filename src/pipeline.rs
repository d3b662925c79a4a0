//! Batch driver
//!
//! Walks a dataset directory, imports every allow-listed score and pushes
//! each of its key segments through
//! transpose → split → tokenize. Segments are all-or-nothing: a segment is
//! only added to the corpus once every stage has succeeded, and a failing
//! segment is logged and dropped without affecting the rest of the file.

use crate::config::Config;
use crate::converters::{load_score, ImportError};
use crate::error::ConversionResult;
use crate::lead_sheet::split_lead_sheet;
use crate::models::{KeySignature, Score, Tonic};
use crate::segment::{split_by_key, Segment};
use crate::tokenize::{tokenize_chords, tokenize_melody, ChordVector};
use crate::transposition::{transpose_to_c, Transposition};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to import {path}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: ImportError,
    },
    #[error("failed to walk dataset: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Every token stream of one segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTokens {
    pub melody: Vec<u8>,
    pub beats: Vec<u8>,
    pub rhythm: Vec<u8>,
    pub chords: Vec<ChordVector>,
    /// Semitones the segment was shifted to reach C
    pub interval: i8,
    /// Key before transposition
    pub key: KeySignature,
    pub tempo: f64,
}

/// Run one segment through transposition, splitting and tokenization
pub fn tokenize_segment(segment: Segment) -> ConversionResult<SegmentTokens> {
    let Transposition {
        segment,
        interval,
        key,
        tempo,
    } = transpose_to_c(segment);

    let sheet = split_lead_sheet(&segment)?;
    let melody = tokenize_melody(&sheet.melody)?;
    let chords = tokenize_chords(&sheet.chords)?;

    Ok(SegmentTokens {
        melody: melody.pitches,
        beats: melody.beats,
        rhythm: chords.rhythm,
        chords: chords.vectors,
        interval,
        key,
        tempo,
    })
}

/// Where a corpus entry came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetadata {
    pub source: String,
    /// Index of the segment within its file
    pub segment: usize,
    pub interval: i8,
    pub key: KeySignature,
    pub tonic: Tonic,
    pub tempo: f64,
}

/// Parallel token collections, one entry per accepted segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenCorpus {
    pub melody: Vec<Vec<u8>>,
    pub beats: Vec<Vec<u8>>,
    pub rhythm: Vec<Vec<u8>>,
    pub chords: Vec<Vec<ChordVector>>,
    pub metadata: Vec<SegmentMetadata>,
}

impl TokenCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tokens: SegmentTokens, source: &str, segment: usize) {
        self.metadata.push(SegmentMetadata {
            source: source.to_string(),
            segment,
            interval: tokens.interval,
            key: tokens.key,
            tonic: tokens.key.tonic(),
            tempo: tokens.tempo,
        });
        self.melody.push(tokens.melody);
        self.beats.push(tokens.beats);
        self.rhythm.push(tokens.rhythm);
        self.chords.push(tokens.chords);
    }

    /// Number of accepted segments
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Pipeline { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Tokenize every allow-listed score under `root`
    pub fn run(&self, root: &Path) -> Result<TokenCorpus> {
        let files = self.collect_files(root)?;
        log::info!("found {} score files under {}", files.len(), root.display());

        let mut corpus = TokenCorpus::new();
        let mut skipped_files = 0usize;
        for path in &files {
            match self.process_file(path, &mut corpus)? {
                Some(_) => {}
                None => skipped_files += 1,
            }
        }

        log::info!(
            "tokenized {} segments from {} files ({} files skipped)",
            corpus.len(),
            files.len() - skipped_files,
            skipped_files
        );
        Ok(corpus)
    }

    /// Allow-listed files under `root`, in file-name order
    pub fn collect_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && self.config.accepts(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Import and tokenize one file into `corpus`
    ///
    /// Returns the number of accepted segments, or `None` when the file was
    /// skipped.
    pub fn process_file(&self, path: &Path, corpus: &mut TokenCorpus) -> Result<Option<usize>> {
        log::debug!("processing {}", path.display());

        let score = match load_score(path, &self.config.import_options()) {
            Ok(score) => score,
            Err(ImportError::UnsupportedExtension(_)) => {
                log::debug!("no importer for {}", path.display());
                return Ok(None);
            }
            Err(source) if self.config.skip_unparsable => {
                log::warn!("skipping unparsable {}: {}", path.display(), source);
                return Ok(None);
            }
            Err(source) => {
                return Err(PipelineError::Import {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Ok(Some(tokenize_score(&score, &path.display().to_string(), corpus)))
    }
}

/// Tokenize the lead part of an in-memory score into `corpus`
///
/// Returns the number of accepted segments.
pub fn tokenize_score(score: &Score, source: &str, corpus: &mut TokenCorpus) -> usize {
    let mut accepted = 0;
    for (index, segment) in split_by_key(score.lead_elements()).into_iter().enumerate() {
        match tokenize_segment(segment) {
            Ok(tokens) => {
                log::debug!(
                    "{} segment {}: {} melody steps, {} chords",
                    source,
                    index,
                    tokens.melody.len(),
                    tokens.chords.len()
                );
                corpus.push(tokens, source, index);
                accepted += 1;
            }
            Err(e) => log::warn!("skipping segment {} of {}: {}", index, source, e),
        }
    }
    accepted
}
