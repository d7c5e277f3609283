//! Client error type.

use derive_more::{Display, Error, From};

/// Errors from talking to the promo server or the local filesystem.
#[derive(Debug, Display, Error, From)]
pub enum ClientError {
    /// Transport failure or an unreadable body.
    #[display("HTTP error: {}", _0)]
    Http(reqwest::Error),

    /// The server answered with an error.
    #[display("Server rejected request ({}): {}", status, message)]
    #[from(ignore)]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Reason the server gave.
        message: String,
    },

    /// Reading or writing a local file or the terminal failed.
    #[display("I/O error: {}", _0)]
    Io(std::io::Error),

    /// The opponent could not move.
    #[display("Game logic error: {}", _0)]
    Logic(glamour_tictactoe::LogicError),
}
