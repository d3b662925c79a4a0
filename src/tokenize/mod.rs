//! Token streams for the melody and harmony of a lead sheet

pub mod chord;
pub mod melody;
pub mod vectorize;

pub use chord::{tokenize_chords, ChordTokens, RHYTHM_HOLD, RHYTHM_ONSET, RHYTHM_REST};
pub use melody::{synchronize_beats, tokenize_melody, MelodyTokens, TimeSignatureEvent, HOLD, REST_ONSET};
pub use vectorize::{vectorize, vectorize_pitches, ChordVector, REST_VECTOR};
