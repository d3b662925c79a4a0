//! Metrical accent profiles
//!
//! A beat profile assigns every sixteenth-note step of one bar an accent
//! weight:
//!
//! ```text
//! 4/4  3 0 0 0 1 0 0 0 2 0 0 0 1 0 0 0
//! 3/4  3 0 0 0 1 0 0 0 1 0 0 0
//! 6/8  3 0 1 0 1 0 2 0 1 0 1 0
//! ```
//!
//! The downbeat always gets one point, every beat onset one more, and the
//! medium-level grouping (every third beat in triple meters, otherwise every
//! second beat in duple meters) a third.

use crate::error::{ConversionError, ConversionResult};
use crate::models::TimeSignature;

/// Per-step accent weights for one bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatProfile {
    weights: Vec<u8>,
}

impl BeatProfile {
    /// Build the profile of a time signature
    ///
    /// Fails when the beat is not a whole number of sixteenth steps
    /// (denominator above 16 or not a power of two) or the bar is empty.
    pub fn new(time: TimeSignature) -> ConversionResult<Self> {
        let denominator = usize::from(time.denominator);
        if time.numerator == 0 || denominator == 0 || 16 % denominator != 0 {
            return Err(ConversionError::UnsupportedTimeSignature(time));
        }

        let numerator = usize::from(time.numerator);
        let steps_per_beat = 16 / denominator;
        let mut weights = vec![0u8; numerator * steps_per_beat];

        weights[0] += 1;
        for (index, weight) in weights.iter_mut().enumerate() {
            if index % steps_per_beat == 0 {
                *weight += 1;
            }
        }

        let group = if numerator % 3 == 0 {
            Some(3 * steps_per_beat)
        } else if numerator % 2 == 0 {
            Some(2 * steps_per_beat)
        } else {
            None
        };
        if let Some(group) = group {
            for index in (0..weights.len()).step_by(group) {
                weights[index] += 1;
            }
        }

        Ok(BeatProfile { weights })
    }

    pub fn weights(&self) -> &[u8] {
        &self.weights
    }

    /// Append exactly `count` weights, repeating the bar from its downbeat
    pub fn fill(&self, out: &mut Vec<u8>, count: usize) {
        out.extend(self.weights.iter().copied().cycle().take(count));
    }
}
