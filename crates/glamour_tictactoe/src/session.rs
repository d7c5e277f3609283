//! Client-side game session state machine.
//!
//! The session owns the board exclusively. Invalid input (occupied cell,
//! wrong turn, finished game) is ignored without touching any state, so a
//! racy click on a disabled control is harmless.

use crate::opponent::{self, LogicError};
use crate::rules::evaluate;
use crate::types::{Board, Mark, Outcome};
use derive_getters::Getters;
use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Board version token.
///
/// Bumped on every placement and every reset. A deferred opponent turn
/// remembers the generation it was scheduled against and does nothing if it
/// no longer matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, Display)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Observable phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the player.
    PlayerTurn,
    /// Waiting for the opponent.
    OpponentTurn,
    /// Game over. Absorbing until [`GameSession::reset`].
    Terminal(Outcome),
}

/// Emitted once when a session reaches a terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct OutcomeEvent {
    /// Final outcome, never [`Outcome::InProgress`].
    outcome: Outcome,
    /// Board at the moment the game ended.
    board: Board,
    /// Generation after the final placement.
    generation: Generation,
}

/// Result of feeding one action to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Action was not valid in the current state; nothing changed.
    Ignored,
    /// Mark placed, game continues with the other side.
    Placed {
        /// Cell that was filled.
        cell: usize,
    },
    /// Mark placed and the game ended.
    Finished {
        /// Cell that was filled.
        cell: usize,
        /// Terminal outcome event.
        event: OutcomeEvent,
    },
}

impl Transition {
    /// The outcome event, if this transition ended the game.
    pub fn event(&self) -> Option<&OutcomeEvent> {
        match self {
            Transition::Finished { event, .. } => Some(event),
            _ => None,
        }
    }
}

/// One game of player vs. heuristic opponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    board: Board,
    turn: Mark,
    outcome: Outcome,
    generation: Generation,
}

impl GameSession {
    /// Fresh session: empty board, player to move.
    #[instrument]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Mark::Player,
            outcome: Outcome::InProgress,
            generation: Generation::default(),
        }
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move. Meaningless once terminal.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Current outcome; always equal to `evaluate(self.board())`.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Current board generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Which state the machine is in.
    pub fn phase(&self) -> Phase {
        match (self.outcome, self.turn) {
            (Outcome::InProgress, Mark::Player) => Phase::PlayerTurn,
            (Outcome::InProgress, Mark::Opponent) => Phase::OpponentTurn,
            (outcome, _) => Phase::Terminal(outcome),
        }
    }

    /// Applies the player's move to `cell`.
    ///
    /// Returns [`Transition::Ignored`] without mutating anything when it is
    /// not the player's turn, the game is over, or the cell is occupied or
    /// off the board.
    #[instrument(skip(self), fields(generation = %self.generation))]
    pub fn apply_player_move(&mut self, cell: usize) -> Transition {
        if self.phase() != Phase::PlayerTurn || !self.board.is_empty(cell) {
            debug!(phase = ?self.phase(), "Ignoring player move");
            return Transition::Ignored;
        }
        self.place(cell, Mark::Player)
    }

    /// Lets the opponent pick and play a cell.
    ///
    /// Ignored unless it is the opponent's turn in a running game.
    ///
    /// # Errors
    ///
    /// Propagates [`LogicError`] from the move selector. Unreachable while
    /// the session keeps its own invariants.
    #[instrument(skip(self, rng), fields(generation = %self.generation))]
    pub fn run_opponent_turn<R: Rng>(&mut self, rng: &mut R) -> Result<Transition, LogicError> {
        if self.phase() != Phase::OpponentTurn {
            debug!(phase = ?self.phase(), "Ignoring opponent turn");
            return Ok(Transition::Ignored);
        }
        let cell = opponent::select_move(&self.board, rng)?;
        Ok(self.place(cell, Mark::Opponent))
    }

    /// Runs the opponent turn only if the board is still at `scheduled`.
    ///
    /// Entry point for deferred turns: a reset or any other placement since
    /// scheduling turns the call into [`Transition::Ignored`].
    ///
    /// # Errors
    ///
    /// Same as [`GameSession::run_opponent_turn`].
    #[instrument(skip(self, rng), fields(current = %self.generation))]
    pub fn run_opponent_turn_at<R: Rng>(
        &mut self,
        scheduled: Generation,
        rng: &mut R,
    ) -> Result<Transition, LogicError> {
        if scheduled != self.generation {
            debug!(%scheduled, "Stale opponent turn dropped");
            return Ok(Transition::Ignored);
        }
        self.run_opponent_turn(rng)
    }

    /// Discards the board and starts over with the player to move.
    #[instrument(skip(self), fields(generation = %self.generation))]
    pub fn reset(&mut self) {
        let generation = self.generation.next();
        *self = Self {
            generation,
            ..Self::new()
        };
        info!(%generation, "Session reset");
    }

    fn place(&mut self, cell: usize, mark: Mark) -> Transition {
        // Callers checked phase and emptiness.
        self.board.place(cell, mark);
        self.generation = self.generation.next();
        self.outcome = evaluate(&self.board);

        if self.outcome.is_terminal() {
            info!(cell, %mark, outcome = %self.outcome, "Game finished");
            return Transition::Finished {
                cell,
                event: OutcomeEvent {
                    outcome: self.outcome,
                    board: self.board,
                    generation: self.generation,
                },
            };
        }

        self.turn = mark.other();
        debug!(cell, %mark, "Mark placed");
        Transition::Placed { cell }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn test_initial_state() {
        let session = GameSession::new();
        assert_eq!(session.phase(), Phase::PlayerTurn);
        assert_eq!(session.board(), &Board::new());
        assert_eq!(session.outcome(), Outcome::InProgress);
    }

    #[test]
    fn test_player_move_passes_turn() {
        let mut session = GameSession::new();
        let before = session.generation();
        assert_eq!(session.apply_player_move(0), Transition::Placed { cell: 0 });
        assert_eq!(session.phase(), Phase::OpponentTurn);
        assert!(session.generation() > before);
    }

    #[test]
    fn test_occupied_cell_is_noop() {
        let mut session = GameSession::new();
        session.apply_player_move(0);
        session.run_opponent_turn(&mut rng()).expect("opponent moves");
        let snapshot = session.clone();

        assert_eq!(session.apply_player_move(0), Transition::Ignored);
        assert_eq!(session, snapshot);
        assert_eq!(session.apply_player_move(0), Transition::Ignored);
        assert_eq!(session, snapshot);
    }

    #[test]
    fn test_out_of_range_cell_is_noop() {
        let mut session = GameSession::new();
        let snapshot = session.clone();
        assert_eq!(session.apply_player_move(9), Transition::Ignored);
        assert_eq!(session, snapshot);
    }

    #[test]
    fn test_wrong_turn_is_noop() {
        let mut session = GameSession::new();
        let snapshot = session.clone();
        assert_eq!(session.run_opponent_turn(&mut rng()), Ok(Transition::Ignored));
        assert_eq!(session, snapshot);

        session.apply_player_move(0);
        let snapshot = session.clone();
        assert_eq!(session.apply_player_move(1), Transition::Ignored);
        assert_eq!(session, snapshot);
    }

    #[test]
    fn test_opponent_takes_center_then_blocks() {
        let mut session = GameSession::new();
        session.apply_player_move(0);
        assert_eq!(
            session.run_opponent_turn(&mut rng()),
            Ok(Transition::Placed { cell: 4 })
        );
        session.apply_player_move(1);
        assert_eq!(
            session.run_opponent_turn(&mut rng()),
            Ok(Transition::Placed { cell: 2 })
        );
    }

    #[test]
    fn test_stale_generation_is_dropped() {
        let mut session = GameSession::new();
        session.apply_player_move(0);
        let scheduled = session.generation();
        session.reset();

        let snapshot = session.clone();
        assert_eq!(
            session.run_opponent_turn_at(scheduled, &mut rng()),
            Ok(Transition::Ignored)
        );
        assert_eq!(session, snapshot);
        assert_eq!(session.board(), &Board::new());
    }

    #[test]
    fn test_reset_restores_initial_state_with_new_generation() {
        let mut session = GameSession::new();
        session.apply_player_move(3);
        let before = session.generation();
        session.reset();
        assert_eq!(session.phase(), Phase::PlayerTurn);
        assert_eq!(session.board(), &Board::new());
        assert!(session.generation() > before);
    }
}
