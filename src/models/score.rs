//! Imported scores
//!
//! A score is a list of parts; each part is a flat, offset-ordered stream of
//! [`MusicalElement`]s. Only the first part of a multi-part score is fed to
//! the tokenizer.

use super::element::MusicalElement;
use serde::{Deserialize, Serialize};

/// One staff/instrument of a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Source identifier (e.g., MusicXML "P1" or "track-2")
    pub id: String,
    pub name: String,
    pub elements: Vec<MusicalElement>,
}

impl Part {
    pub fn new(id: impl Into<String>, name: impl Into<String>, elements: Vec<MusicalElement>) -> Self {
        Part {
            id: id.into(),
            name: name.into(),
            elements,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub parts: Vec<Part>,
}

impl Score {
    pub fn new(parts: Vec<Part>) -> Self {
        Score { parts }
    }

    /// Elements of the lead (first) part; empty for a score with no parts
    pub fn lead_elements(&self) -> &[MusicalElement] {
        self.parts.first().map(|part| part.elements.as_slice()).unwrap_or(&[])
    }
}
