//! Deferred opponent turn.
//!
//! The opponent "thinks" for a configurable delay before moving. The pending
//! turn is a tokio task holding the generation it was scheduled against, so
//! a reset while it sleeps either aborts it or turns it into a no-op.

use crate::opponent::LogicError;
use crate::session::{GameSession, Generation, Phase, Transition};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// Session shared between the input loop and the deferred opponent task.
pub type SharedSession = Arc<Mutex<GameSession>>;

/// Schedules and cancels deferred opponent turns for one session.
#[derive(Debug)]
pub struct OpponentTurnScheduler {
    session: SharedSession,
    delay: Duration,
    rng: Arc<Mutex<SmallRng>>,
    pending: Option<JoinHandle<Result<Transition, LogicError>>>,
}

impl OpponentTurnScheduler {
    /// Creates a scheduler with an OS-seeded random source.
    #[instrument(skip(session))]
    pub fn new(session: SharedSession, delay: Duration) -> Self {
        Self::with_rng(session, delay, SmallRng::from_os_rng())
    }

    /// Creates a scheduler with an explicit random source (tests, replays).
    #[instrument(skip(session, rng))]
    pub fn with_rng(session: SharedSession, delay: Duration, rng: SmallRng) -> Self {
        Self {
            session,
            delay,
            rng: Arc::new(Mutex::new(rng)),
            pending: None,
        }
    }

    /// The session this scheduler drives.
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Thinking delay before each opponent move.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// True while a deferred turn has been scheduled and not yet collected.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Schedules the opponent's move if it is the opponent's turn.
    ///
    /// Any turn still pending is cancelled first. Returns the generation the
    /// new turn is bound to, or `None` when there is nothing to schedule.
    #[instrument(skip(self))]
    pub fn schedule(&mut self) -> Option<Generation> {
        self.cancel();

        let generation = {
            let session = lock(&self.session);
            if session.phase() != Phase::OpponentTurn {
                debug!(phase = ?session.phase(), "No opponent turn to schedule");
                return None;
            }
            session.generation()
        };

        let session = Arc::clone(&self.session);
        let rng = Arc::clone(&self.rng);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let mut rng = lock(&rng);
            lock(&session).run_opponent_turn_at(generation, &mut *rng)
        }));

        debug!(%generation, delay_ms = delay.as_millis() as u64, "Opponent turn scheduled");
        Some(generation)
    }

    /// Aborts the pending turn, if any.
    #[instrument(skip(self))]
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            debug!("Pending opponent turn cancelled");
        }
    }

    /// Cancels any pending turn and resets the session.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.cancel();
        lock(&self.session).reset();
    }

    /// Waits for the pending turn to finish.
    ///
    /// Returns `None` if nothing was pending or the turn was cancelled.
    #[instrument(skip(self))]
    pub async fn wait(&mut self) -> Option<Result<Transition, LogicError>> {
        let handle = self.pending.take()?;
        match handle.await {
            Ok(result) => Some(result),
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                warn!(error = %e, "Opponent task failed");
                None
            }
        }
    }
}

impl Drop for OpponentTurnScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
