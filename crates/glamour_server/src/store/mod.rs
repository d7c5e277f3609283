//! Player record persistence.
//!
//! The coordinator only sees the [`PlayerStore`] trait. Two backends ship:
//! an in-process map and a SQLite database through diesel.

mod error;
mod memory;
mod models;
mod schema; // Diesel generated schema - internal use only
mod sqlite;

pub use error::StoreError;
pub use memory::MemoryPlayerStore;
pub use sqlite::{PlayerRepository, SqlitePlayerStore};

use crate::types::{ChannelId, PlayerId, PromoCode};
use async_trait::async_trait;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Durable record of one anonymous player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct PlayerRecord {
    /// Anonymous identity (the key).
    player_id: PlayerId,
    /// Linked bot chat, set only by [`PlayerStore::link`].
    channel_id: Option<ChannelId>,
    /// Issued promo code. Write-once.
    last_promo_code: Option<PromoCode>,
    /// True once the bot link event committed.
    is_linked: bool,
}

impl PlayerRecord {
    /// A fresh record: no channel, no code, not linked.
    pub fn fresh(player_id: PlayerId) -> Self {
        Self {
            player_id,
            channel_id: None,
            last_promo_code: None,
            is_linked: false,
        }
    }

    pub(crate) fn from_parts(
        player_id: PlayerId,
        channel_id: Option<ChannelId>,
        last_promo_code: Option<PromoCode>,
        is_linked: bool,
    ) -> Self {
        Self {
            player_id,
            channel_id,
            last_promo_code,
            is_linked,
        }
    }
}

/// Result of [`PlayerStore::claim_promo_code`].
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PromoClaim {
    /// Record after the claim.
    record: PlayerRecord,
    /// True if this call stored the candidate; false if a code already existed.
    newly_issued: bool,
}

impl PromoClaim {
    pub(crate) fn new(record: PlayerRecord, newly_issued: bool) -> Self {
        Self {
            record,
            newly_issued,
        }
    }

    /// The code now associated with the player.
    ///
    /// Every successful claim leaves a code on the record, so this falls back
    /// to nothing only if a backend breaks that contract.
    pub fn code(&self) -> Option<&PromoCode> {
        self.record.last_promo_code.as_ref()
    }
}

/// Keyed store of [`PlayerRecord`]s.
///
/// Each method is atomic for its key. Implementations must make
/// [`claim_promo_code`](PlayerStore::claim_promo_code) a compare-and-set:
/// concurrent claims for one player leave exactly one code.
#[async_trait]
pub trait PlayerStore: Send + Sync + std::fmt::Debug {
    /// Looks up a record. Never creates one.
    async fn get(&self, player_id: &PlayerId) -> Result<Option<PlayerRecord>, StoreError>;

    /// Returns the record, creating a fresh one if absent.
    async fn upsert(&self, player_id: &PlayerId) -> Result<PlayerRecord, StoreError>;

    /// Stores `candidate` as the player's code unless one is already set.
    /// Creates the record if absent.
    async fn claim_promo_code(
        &self,
        player_id: &PlayerId,
        candidate: &PromoCode,
    ) -> Result<PromoClaim, StoreError>;

    /// Attaches a chat and marks the player linked. Creates the record if
    /// absent. The promo code is left untouched.
    async fn link(
        &self,
        player_id: &PlayerId,
        channel_id: &ChannelId,
    ) -> Result<PlayerRecord, StoreError>;
}
