//! Promo code issuance.
//!
//! A win either stores the client's candidate as the player's code or, if a
//! code already exists, keeps the stored one. A player never receives a
//! second code. Wins and losses for one player are serialized through
//! [`KeyedLocks`] and every store backend claims codes with a
//! compare-and-set, so concurrent first wins still resolve to one code.
//!
//! Notifications go out on a spawned task after the record is committed.
//! Their failure is logged and never reaches the caller.

use derive_getters::Getters;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::ServerError;
use crate::locks::KeyedLocks;
use crate::messages;
use crate::notify::Notifier;
use crate::store::PlayerStore;
use crate::types::{PlayerId, PromoCode};

/// Outcome of a reported win.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct WinReceipt {
    /// The player's code after this win.
    code: PromoCode,
    /// True if this win issued the code.
    newly_issued: bool,
}

/// Coordinates the player store and the notification sink.
#[derive(Debug, Clone)]
pub struct PromoCoordinator {
    store: Arc<dyn PlayerStore>,
    notifier: Arc<dyn Notifier>,
    locks: Arc<KeyedLocks<PlayerId>>,
}

impl PromoCoordinator {
    /// Creates a coordinator over `store` that reports through `notifier`.
    pub fn new(store: Arc<dyn PlayerStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            locks: Arc::new(KeyedLocks::new()),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn PlayerStore> {
        &self.store
    }

    /// Records a win and returns the player's final code.
    ///
    /// `candidate` is stored only if the player has no code yet. Otherwise it
    /// is discarded and the stored code comes back.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Store`] if persistence fails. No notification
    /// is sent in that case.
    #[instrument(skip(self), fields(player_id = %player_id, candidate = %candidate))]
    pub async fn on_win(
        &self,
        player_id: &PlayerId,
        candidate: &PromoCode,
    ) -> Result<WinReceipt, ServerError> {
        let claim = {
            let _guard = self.locks.acquire(player_id).await;
            self.store.claim_promo_code(player_id, candidate).await?
        };

        let code = claim
            .code()
            .cloned()
            .ok_or_else(|| crate::store::StoreError::new("claim left no promo code"))?;
        let newly_issued = *claim.newly_issued();

        let message = if newly_issued {
            info!(code = %code, "Promo code issued");
            messages::first_win(&code)
        } else {
            info!(code = %code, "Repeat win, existing code kept");
            messages::repeat_win(&code)
        };
        self.dispatch(player_id.clone(), message);

        Ok(WinReceipt { code, newly_issued })
    }

    /// Records a loss.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Store`] if persistence fails.
    #[instrument(skip(self), fields(player_id = %player_id))]
    pub async fn on_loss(&self, player_id: &PlayerId) -> Result<(), ServerError> {
        {
            let _guard = self.locks.acquire(player_id).await;
            self.store.upsert(player_id).await?;
        }
        debug!("Loss recorded");
        self.dispatch(player_id.clone(), messages::loss());
        Ok(())
    }

    /// Sends `message` in the background. Delivery errors are only logged.
    pub(crate) fn dispatch(&self, player_id: PlayerId, message: String) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&player_id, &message).await {
                warn!(player_id = %player_id, error = %e, "Notification failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogNotifier;
    use crate::store::MemoryPlayerStore;

    fn coordinator() -> PromoCoordinator {
        PromoCoordinator::new(
            Arc::new(MemoryPlayerStore::new()),
            Arc::new(LogNotifier),
        )
    }

    #[tokio::test]
    async fn test_repeat_win_keeps_first_code() {
        let coordinator = coordinator();
        let player = PlayerId::parse("p1").expect("id");

        let first = coordinator
            .on_win(&player, &PromoCode::parse("11111").expect("code"))
            .await
            .expect("win");
        let second = coordinator
            .on_win(&player, &PromoCode::parse("22222").expect("code"))
            .await
            .expect("win");

        assert!(*first.newly_issued());
        assert!(!*second.newly_issued());
        assert_eq!(second.code().as_str(), "11111");
    }

    #[tokio::test]
    async fn test_loss_creates_record_without_code() {
        let coordinator = coordinator();
        let player = PlayerId::parse("p2").expect("id");
        coordinator.on_loss(&player).await.expect("loss");

        let record = coordinator
            .store()
            .get(&player)
            .await
            .expect("get")
            .expect("record");
        assert_eq!(record.last_promo_code(), &None);
    }
}
