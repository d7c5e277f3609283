//! In-process player store.

use super::{PlayerRecord, PlayerStore, PromoClaim, StoreError};
use crate::types::{ChannelId, PlayerId, PromoCode};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument};

/// Player records in a mutex-guarded map.
///
/// Every read-modify-write runs under the single map lock, which serializes
/// writers for each key. Data is lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryPlayerStore {
    players: Arc<Mutex<HashMap<PlayerId, PlayerRecord>>>,
}

impl MemoryPlayerStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory player store");
        Self::default()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.players().map(|map| map.len()).unwrap_or(0)
    }

    /// True when no record exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn players(&self) -> Result<MutexGuard<'_, HashMap<PlayerId, PlayerRecord>>, StoreError> {
        self.players
            .lock()
            .map_err(|_| StoreError::new("player map lock poisoned"))
    }
}

#[async_trait]
impl PlayerStore for MemoryPlayerStore {
    #[instrument(skip(self), fields(player_id = %player_id))]
    async fn get(&self, player_id: &PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
        Ok(self.players()?.get(player_id).cloned())
    }

    #[instrument(skip(self), fields(player_id = %player_id))]
    async fn upsert(&self, player_id: &PlayerId) -> Result<PlayerRecord, StoreError> {
        let mut players = self.players()?;
        let record = players
            .entry(player_id.clone())
            .or_insert_with(|| {
                debug!("Creating player record");
                PlayerRecord::fresh(player_id.clone())
            })
            .clone();
        Ok(record)
    }

    #[instrument(skip(self), fields(player_id = %player_id, candidate = %candidate))]
    async fn claim_promo_code(
        &self,
        player_id: &PlayerId,
        candidate: &PromoCode,
    ) -> Result<PromoClaim, StoreError> {
        let mut players = self.players()?;
        let record = players
            .entry(player_id.clone())
            .or_insert_with(|| PlayerRecord::fresh(player_id.clone()));

        let newly_issued = record.last_promo_code.is_none();
        if newly_issued {
            record.last_promo_code = Some(candidate.clone());
        }
        debug!(newly_issued, "Promo code claim resolved");
        Ok(PromoClaim::new(record.clone(), newly_issued))
    }

    #[instrument(skip(self), fields(player_id = %player_id, channel_id = %channel_id))]
    async fn link(
        &self,
        player_id: &PlayerId,
        channel_id: &ChannelId,
    ) -> Result<PlayerRecord, StoreError> {
        let mut players = self.players()?;
        let record = players
            .entry(player_id.clone())
            .or_insert_with(|| PlayerRecord::fresh(player_id.clone()));
        record.channel_id = Some(channel_id.clone());
        record.is_linked = true;
        info!("Player linked");
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> PlayerId {
        PlayerId::parse(raw).expect("non-empty id")
    }

    fn code(raw: &str) -> PromoCode {
        PromoCode::parse(raw).expect("non-empty code")
    }

    #[tokio::test]
    async fn test_get_does_not_create() {
        let store = MemoryPlayerStore::new();
        assert_eq!(store.get(&id("ghost")).await.expect("get"), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_claim_is_write_once() {
        let store = MemoryPlayerStore::new();
        let first = store
            .claim_promo_code(&id("p1"), &code("12345"))
            .await
            .expect("claim");
        assert!(*first.newly_issued());
        assert_eq!(first.code(), Some(&code("12345")));

        let second = store
            .claim_promo_code(&id("p1"), &code("99999"))
            .await
            .expect("claim");
        assert!(!*second.newly_issued());
        assert_eq!(second.code(), Some(&code("12345")));
    }

    #[tokio::test]
    async fn test_link_keeps_code() {
        let store = MemoryPlayerStore::new();
        store
            .claim_promo_code(&id("p1"), &code("55555"))
            .await
            .expect("claim");
        let record = store
            .link(&id("p1"), &ChannelId::new("777"))
            .await
            .expect("link");
        assert!(*record.is_linked());
        assert_eq!(record.channel_id(), &Some(ChannelId::new("777")));
        assert_eq!(record.last_promo_code(), &Some(code("55555")));
    }

    #[tokio::test]
    async fn test_link_creates_missing_record() {
        let store = MemoryPlayerStore::new();
        let record = store
            .link(&id("new"), &ChannelId::new("1"))
            .await
            .expect("link");
        assert!(*record.is_linked());
        assert_eq!(record.last_promo_code(), &None);
        assert_eq!(store.len(), 1);
    }
}
