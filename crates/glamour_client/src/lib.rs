//! Glamour tic-tac-toe terminal client.
//!
//! Plays against the heuristic opponent from `glamour_tictactoe` and reports
//! results to the promo server under an anonymous, locally stored id.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
pub mod cli;
mod code;
mod error;
mod identity;
mod link;
mod play;

pub use api::{PlayerStatus, PromoApi};
pub use code::{CODE_RANGE, generate_candidate_code};
pub use error::ClientError;
pub use identity::{DEFAULT_ID_FILE, PlayerIdentity};
pub use link::{DEFAULT_POLL_INTERVAL, deep_link, wait_until_linked};
pub use play::{
    Report, RoundEnd, SessionSummary, outcome_message, play_round, report_outcome, run_session,
};
