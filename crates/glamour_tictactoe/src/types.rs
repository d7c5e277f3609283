//! Core domain types for the promo tic-tac-toe board.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// Index of the center cell.
pub const CENTER: usize = 4;

/// The side that placed a mark.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
pub enum Mark {
    /// The human player (X, always moves first).
    #[strum(to_string = "X")]
    Player,
    /// The heuristic AI (O).
    #[strum(to_string = "O")]
    Opponent,
}

impl Mark {
    /// Returns the other side.
    pub fn other(self) -> Self {
        match self {
            Mark::Player => Mark::Opponent,
            Mark::Opponent => Mark::Player,
        }
    }
}

/// A single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nobody has played here yet.
    #[default]
    Empty,
    /// Cell holds a mark.
    Occupied(Mark),
}

/// Result of evaluating a board.
///
/// Never stored on its own: it can always be recomputed from the board with
/// [`crate::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Outcome {
    /// No line complete and at least one empty cell.
    #[display("in progress")]
    InProgress,
    /// The player completed a line.
    #[display("player wins")]
    PlayerWin,
    /// The opponent completed a line.
    #[display("opponent wins")]
    OpponentWin,
    /// Full board, no line.
    #[display("draw")]
    Draw,
}

impl Outcome {
    /// Win outcome for the given mark.
    pub fn won_by(mark: Mark) -> Self {
        match mark {
            Mark::Player => Outcome::PlayerWin,
            Mark::Opponent => Outcome::OpponentWin,
        }
    }

    /// True for every outcome except [`Outcome::InProgress`].
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }
}

/// 3x3 board, cells in row-major order (0-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from explicit cells.
    pub fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        Self { cells }
    }

    /// Returns the cell at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// True if `index` is on the board and nobody has played there.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// True when no cell is empty.
    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    /// All cells as a slice.
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Indices of empty cells, ascending.
    pub fn empty_cells(&self) -> Vec<usize> {
        (0..CELL_COUNT).filter(|&i| self.is_empty(i)).collect()
    }

    /// Copy of this board with `mark` placed at `index`.
    ///
    /// Used by the opponent to look one move ahead without touching the live
    /// board.
    pub fn with_mark(&self, index: usize, mark: Mark) -> Self {
        let mut next = *self;
        next.place(index, mark);
        next
    }

    /// Places a mark on an empty cell. Returns false and leaves the board
    /// untouched when the cell is occupied or out of range.
    pub(crate) fn place(&mut self, index: usize, mark: Mark) -> bool {
        if !self.is_empty(index) {
            return false;
        }
        self.cells[index] = Cell::Occupied(mark);
        true
    }

    /// Formats the board for a terminal, empty cells showing their index.
    #[instrument(skip(self))]
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let index = row * 3 + col;
                let symbol = match self.cells[index] {
                    Cell::Empty => index.to_string(),
                    Cell::Occupied(mark) => mark.to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

/// Error parsing a board from its compact text form.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum BoardParseError {
    /// Wrong number of cells.
    #[display("expected {} cells, found {}", CELL_COUNT, _0)]
    WrongLength(usize),
    /// A character outside `X`, `O`, `_`, `.`.
    #[display("invalid cell character {:?}", _0)]
    InvalidCell(char),
}

impl std::error::Error for BoardParseError {}

impl FromStr for Board {
    type Err = BoardParseError;

    /// Parses nine characters: `X` for the player, `O` for the opponent and
    /// `_` or `.` for empty. Whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() != CELL_COUNT {
            return Err(BoardParseError::WrongLength(chars.len()));
        }

        let mut cells = [Cell::Empty; CELL_COUNT];
        for (cell, ch) in cells.iter_mut().zip(chars) {
            *cell = match ch {
                'X' | 'x' => Cell::Occupied(Mark::Player),
                'O' | 'o' => Cell::Occupied(Mark::Opponent),
                '_' | '.' => Cell::Empty,
                other => return Err(BoardParseError::InvalidCell(other)),
            };
        }
        Ok(Self { cells })
    }
}
