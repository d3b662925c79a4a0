//! Sixteenth-note grid quantization
//!
//! All timing is snapped to a fixed grid of 1/4 quarter note. Values that
//! fall between grid lines are rounded up to the next line, so a note never
//! loses its last partial step.

use crate::models::{Position, ZERO};

/// Grid resolution: one sixteenth note, in quarter-note units
pub const GRID: Position = Position::new_raw(1, 4);

/// Round `pos` up to the next multiple of [`GRID`]
///
/// Positions already on the grid are returned unchanged.
pub fn quantize(pos: Position) -> Position {
    let remainder = pos % GRID;
    if remainder > ZERO {
        pos - remainder + GRID
    } else {
        pos
    }
}

/// Number of grid steps covered by `duration` after quantization
pub fn steps(duration: Position) -> usize {
    usize::try_from((quantize(duration) / GRID).to_integer()).unwrap_or(0)
}
