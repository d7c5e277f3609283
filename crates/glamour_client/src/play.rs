//! Terminal game loop.
//!
//! The player types cell numbers, the opponent answers through the
//! [`OpponentTurnScheduler`], and every finished game is reported to the
//! promo server. Server failures never end the session; they are shown and
//! logged.

use glamour_tictactoe::{
    GameSession, OpponentTurnScheduler, Outcome, OutcomeEvent, Phase, SharedSession, Transition,
};
use rand::Rng;
use std::io::Write;
use std::sync::{MutexGuard, PoisonError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, info, instrument, warn};

use crate::api::PromoApi;
use crate::code::generate_candidate_code;
use crate::error::ClientError;

/// How one round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEnd {
    /// The game reached a terminal outcome.
    Finished(OutcomeEvent),
    /// The player quit or input ended.
    Quit,
}

/// What the server was told about a finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Win reported. `code` is the server's final code.
    Won {
        /// Code the server kept for the player.
        code: String,
    },
    /// Loss reported.
    Lost,
    /// Nothing is sent for a draw.
    Unreported,
}

/// Tally of a whole session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Finished games.
    pub rounds: u32,
    /// Player wins.
    pub wins: u32,
    /// Opponent wins.
    pub losses: u32,
    /// Draws.
    pub draws: u32,
    /// Last code the server returned.
    pub promo_code: Option<String>,
}

fn lock(session: &SharedSession) -> MutexGuard<'_, GameSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn print_board<W: Write>(out: &mut W, session: &SharedSession) -> Result<(), ClientError> {
    let board = *lock(session).board();
    writeln!(out, "\n{}\n", board.display())?;
    Ok(())
}

/// Plays one game to its end, reading moves from `input`.
///
/// Assumes the session is fresh. Invalid or occupied cells are reported and
/// asked for again.
///
/// # Errors
///
/// Returns [`ClientError::Io`] if the terminal fails, or
/// [`ClientError::Logic`] if the opponent cannot move.
#[instrument(skip_all)]
pub async fn play_round<I, W>(
    input: &mut Lines<I>,
    out: &mut W,
    scheduler: &mut OpponentTurnScheduler,
) -> Result<RoundEnd, ClientError>
where
    I: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        let phase = lock(scheduler.session()).phase();
        match phase {
            Phase::Terminal(outcome) => {
                warn!(%outcome, "Round started on a finished board, resetting");
                scheduler.reset();
            }
            Phase::OpponentTurn => {
                scheduler.schedule();
                writeln!(out, "Opponent is thinking...")?;
                match scheduler.wait().await {
                    Some(Ok(Transition::Finished { event, .. })) => {
                        print_board(out, scheduler.session())?;
                        return Ok(RoundEnd::Finished(event));
                    }
                    Some(Ok(transition)) => debug!(?transition, "Opponent moved"),
                    Some(Err(e)) => return Err(e.into()),
                    None => debug!("Opponent turn cancelled"),
                }
            }
            Phase::PlayerTurn => {
                print_board(out, scheduler.session())?;
                write!(out, "Your move (0-8, q to quit): ")?;
                out.flush()?;

                let Some(line) = input.next_line().await? else {
                    return Ok(RoundEnd::Quit);
                };
                let line = line.trim();
                if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
                    return Ok(RoundEnd::Quit);
                }
                let Ok(cell) = line.parse::<usize>() else {
                    writeln!(out, "Enter a cell number from 0 to 8.")?;
                    continue;
                };

                let transition = lock(scheduler.session()).apply_player_move(cell);
                match transition {
                    Transition::Ignored => writeln!(out, "Cell {} is not available.", cell)?,
                    Transition::Placed { .. } => {}
                    Transition::Finished { event, .. } => {
                        print_board(out, scheduler.session())?;
                        return Ok(RoundEnd::Finished(event));
                    }
                }
            }
        }
    }
}

/// Tells the server how a game ended.
///
/// A win sends a fresh candidate code and returns the code the server kept.
///
/// # Errors
///
/// Returns [`ClientError`] if the request fails.
#[instrument(skip(api, rng))]
pub async fn report_outcome<R: Rng>(
    api: &PromoApi,
    player_id: &str,
    outcome: Outcome,
    rng: &mut R,
) -> Result<Report, ClientError> {
    match outcome {
        Outcome::PlayerWin => {
            let candidate = generate_candidate_code(rng);
            let code = api.report_win(player_id, &candidate).await?;
            Ok(Report::Won { code })
        }
        Outcome::OpponentWin => {
            api.report_loss(player_id).await?;
            Ok(Report::Lost)
        }
        Outcome::Draw | Outcome::InProgress => Ok(Report::Unreported),
    }
}

/// Line shown to the player after a game.
pub fn outcome_message(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::PlayerWin => "🎉 You won!",
        Outcome::OpponentWin => "💔 You lost. Try again, luck will smile on you soon.",
        Outcome::Draw => "🤝 It's a draw!",
        Outcome::InProgress => "Game unfinished.",
    }
}

/// Plays rounds until the player declines another or input ends.
///
/// # Errors
///
/// Returns [`ClientError::Io`] or [`ClientError::Logic`]. Server errors are
/// shown and the session continues.
#[instrument(skip_all, fields(player_id = %player_id))]
pub async fn run_session<I, W, R>(
    input: I,
    out: &mut W,
    api: &PromoApi,
    player_id: &str,
    scheduler: &mut OpponentTurnScheduler,
    rng: &mut R,
) -> Result<SessionSummary, ClientError>
where
    I: AsyncBufRead + Unpin,
    W: Write,
    R: Rng,
{
    let mut lines = input.lines();
    let mut summary = SessionSummary::default();

    loop {
        scheduler.reset();
        let event = match play_round(&mut lines, out, scheduler).await? {
            RoundEnd::Finished(event) => event,
            RoundEnd::Quit => break,
        };

        let outcome = *event.outcome();
        summary.rounds += 1;
        match outcome {
            Outcome::PlayerWin => summary.wins += 1,
            Outcome::OpponentWin => summary.losses += 1,
            Outcome::Draw | Outcome::InProgress => summary.draws += 1,
        }
        writeln!(out, "{}", outcome_message(outcome))?;
        info!(%outcome, "Round finished");

        match report_outcome(api, player_id, outcome, rng).await {
            Ok(Report::Won { code }) => {
                writeln!(out, "🎟 Your promo code: {}", code)?;
                summary.promo_code = Some(code);
            }
            Ok(Report::Lost | Report::Unreported) => {}
            Err(e) => {
                warn!(error = %e, "Reporting the result failed");
                writeln!(out, "Could not reach the promo server: {}", e)?;
            }
        }

        write!(out, "Play again? [y/N]: ")?;
        out.flush()?;
        match lines.next_line().await? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => continue,
            _ => break,
        }
    }

    scheduler.cancel();
    Ok(summary)
}
