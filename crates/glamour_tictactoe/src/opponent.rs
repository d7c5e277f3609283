//! Heuristic opponent.
//!
//! A fixed priority policy, intentionally beatable: win if possible, else
//! block, else take the center, else play a random empty cell.

use crate::rules::evaluate;
use crate::types::{Board, CENTER, Mark, Outcome};
use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Which rule of the policy produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Reason {
    /// Completes an opponent line.
    #[display("win")]
    WinNow,
    /// Occupies the cell the player would win on.
    #[display("block")]
    Block,
    /// Takes the free center.
    #[display("center")]
    Center,
    /// No rule applied; uniform pick among empty cells.
    #[display("random")]
    Random,
}

/// A chosen cell plus the rule that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Board index (0-8).
    pub cell: usize,
    /// Rule that fired.
    pub reason: Reason,
}

/// Internal invariant violations in the opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LogicError {
    /// The opponent was asked to move on a board with no empty cell.
    #[display("opponent asked to move on a full board")]
    NoEmptyCell,
}

impl std::error::Error for LogicError {}

/// Picks the opponent's next cell.
///
/// # Errors
///
/// Returns [`LogicError::NoEmptyCell`] if the board is full. The session
/// never asks for a move in that state.
pub fn select_move<R: Rng>(board: &Board, rng: &mut R) -> Result<usize, LogicError> {
    choose(board, rng).map(|choice| choice.cell)
}

/// Like [`select_move`], also reporting which rule fired.
#[instrument(skip(board, rng))]
pub fn choose<R: Rng>(board: &Board, rng: &mut R) -> Result<Choice, LogicError> {
    let empty = board.empty_cells();
    if empty.is_empty() {
        return Err(LogicError::NoEmptyCell);
    }

    let choice = if let Some(cell) = first_completing(board, &empty, Mark::Opponent) {
        Choice { cell, reason: Reason::WinNow }
    } else if let Some(cell) = first_completing(board, &empty, Mark::Player) {
        Choice { cell, reason: Reason::Block }
    } else if board.is_empty(CENTER) {
        Choice { cell: CENTER, reason: Reason::Center }
    } else {
        let cell = empty[rng.random_range(0..empty.len())];
        Choice { cell, reason: Reason::Random }
    };

    debug!(cell = choice.cell, reason = %choice.reason, "Opponent chose cell");
    Ok(choice)
}

/// Lowest empty index where `mark` would complete a line.
fn first_completing(board: &Board, empty: &[usize], mark: Mark) -> Option<usize> {
    let target = Outcome::won_by(mark);
    empty
        .iter()
        .copied()
        .find(|&cell| evaluate(&board.with_mark(cell, mark)) == target)
}
