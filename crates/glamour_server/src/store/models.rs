//! Database models for player records.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use super::{PlayerRecord, schema};
use crate::types::{ChannelId, PlayerId, PromoCode};

/// Player row as stored in SQLite.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::players)]
pub struct PlayerRow {
    player_id: String,
    channel_id: Option<String>,
    last_promo_code: Option<String>,
    is_linked: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl PlayerRow {
    /// Converts the row into the domain record.
    ///
    /// Blank codes or ids cannot be written through the store API. If one
    /// shows up anyway it is treated as absent.
    pub fn into_record(self) -> Option<PlayerRecord> {
        let player_id = PlayerId::parse(self.player_id)?;
        Some(PlayerRecord::from_parts(
            player_id,
            self.channel_id.map(ChannelId::new),
            self.last_promo_code.and_then(PromoCode::parse),
            self.is_linked,
        ))
    }
}

/// Insertable row for a fresh player.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::players)]
pub struct NewPlayerRow {
    player_id: String,
}
