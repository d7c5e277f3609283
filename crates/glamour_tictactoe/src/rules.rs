//! Win and draw detection.
//!
//! Pure functions over a [`Board`]. The session state machine re-runs
//! [`evaluate`] after every placement rather than tracking the outcome
//! incrementally.

use crate::types::{Board, Cell, Outcome};

/// The eight winning triples, in scan order: rows, then columns, then
/// diagonals.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Computes the outcome of `board`.
///
/// The first complete line in [`LINES`] order decides the winner, so a board
/// with lines for both sides (unreachable through legal play) still has a
/// deterministic answer.
pub fn evaluate(board: &Board) -> Outcome {
    let cells = board.cells();
    for [a, b, c] in LINES {
        if let Cell::Occupied(mark) = cells[a]
            && cells[b] == cells[a]
            && cells[c] == cells[a]
        {
            return Outcome::won_by(mark);
        }
    }

    if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
