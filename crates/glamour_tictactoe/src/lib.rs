//! Glamour Tic-Tac-Toe game logic.
//!
//! Pure rules plus the client-side session that drives a single game between
//! the player and a heuristic opponent.
//!
//! # Architecture
//!
//! - **Rules**: [`evaluate`] turns a [`Board`] into an [`Outcome`]
//! - **Opponent**: [`select_move`] picks the AI's cell (win, block, center, random)
//! - **Session**: [`GameSession`] enforces turn order and terminal absorption
//! - **Scheduler**: [`OpponentTurnScheduler`] runs the opponent after a delay,
//!   cancellable by reset
//!
//! # Example
//!
//! ```
//! use glamour_tictactoe::{GameSession, Outcome, Transition};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::SmallRng::seed_from_u64(0);
//! let mut session = GameSession::new();
//!
//! assert_eq!(session.apply_player_move(0), Transition::Placed { cell: 0 });
//! // Center is open, so the opponent takes it.
//! assert_eq!(
//!     session.run_opponent_turn(&mut rng).unwrap(),
//!     Transition::Placed { cell: 4 }
//! );
//! assert_eq!(session.outcome(), Outcome::InProgress);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod opponent;
mod rules;
mod scheduler;
mod session;
mod types;

pub use opponent::{Choice, LogicError, Reason, choose, select_move};
pub use rules::{LINES, evaluate};
pub use scheduler::{OpponentTurnScheduler, SharedSession};
pub use session::{GameSession, Generation, OutcomeEvent, Phase, Transition};
pub use types::{Board, BoardParseError, CELL_COUNT, CENTER, Cell, Mark, Outcome};
