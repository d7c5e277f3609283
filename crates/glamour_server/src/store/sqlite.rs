//! SQLite-backed player store.

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use super::models::{NewPlayerRow, PlayerRow};
use super::{PlayerRecord, PlayerStore, PromoClaim, StoreError, schema::players};
use crate::types::{ChannelId, PlayerId, PromoCode};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a writer waits for another connection's lock, in milliseconds.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Synchronous repository over the `players` table.
///
/// Opens one connection per operation. Every write runs inside an
/// `IMMEDIATE` transaction, so writers for the same database file are
/// serialized even across processes.
#[derive(Debug, Clone)]
pub struct PlayerRepository {
    db_path: String,
}

impl PlayerRepository {
    /// Opens the database at `db_path`, creating it and applying pending
    /// migrations as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StoreError> {
        info!(path = %db_path, "Opening player repository");
        let repository = Self { db_path };
        let mut conn = repository.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(format!("Migration failed: {}", e)))?;
        info!(applied = applied.len(), "Migrations up to date");
        Ok(repository)
    }

    /// Path of the database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            StoreError::new(format!("Failed to connect to '{}': {}", self.db_path, e))
        })?;
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))?;
        Ok(conn)
    }

    /// Gets a player by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get(&self, player_id: &str) -> Result<Option<PlayerRecord>, StoreError> {
        let mut conn = self.connection()?;
        players::table
            .find(player_id)
            .select(PlayerRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(to_record)
            .transpose()
    }

    /// Returns the player, inserting a fresh row if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn upsert(&self, player_id: &str) -> Result<PlayerRecord, StoreError> {
        let mut conn = self.connection()?;
        conn.immediate_transaction::<_, StoreError, _>(|conn| {
            ensure_row(conn, player_id)?;
            to_record(load_row(conn, player_id)?)
        })
    }

    /// Stores `candidate` unless the player already has a code.
    ///
    /// Returns the record after the claim and whether this call stored it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs. Nothing is written
    /// in that case.
    #[instrument(skip(self))]
    pub fn claim_promo_code(
        &self,
        player_id: &str,
        candidate: &str,
    ) -> Result<(PlayerRecord, bool), StoreError> {
        let mut conn = self.connection()?;
        conn.immediate_transaction::<_, StoreError, _>(|conn| {
            ensure_row(conn, player_id)?;
            let row = load_row(conn, player_id)?;
            if row.last_promo_code().is_some() {
                debug!("Existing code kept");
                return Ok((to_record(row)?, false));
            }

            diesel::update(players::table.find(player_id))
                .set((
                    players::last_promo_code.eq(Some(candidate)),
                    players::updated_at.eq(now()),
                ))
                .execute(conn)?;
            info!("Promo code stored");
            Ok((to_record(load_row(conn, player_id)?)?, true))
        })
    }

    /// Links a chat to the player and marks them connected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn link(&self, player_id: &str, channel_id: &str) -> Result<PlayerRecord, StoreError> {
        let mut conn = self.connection()?;
        conn.immediate_transaction::<_, StoreError, _>(|conn| {
            ensure_row(conn, player_id)?;
            diesel::update(players::table.find(player_id))
                .set((
                    players::channel_id.eq(Some(channel_id)),
                    players::is_linked.eq(true),
                    players::updated_at.eq(now()),
                ))
                .execute(conn)?;
            info!("Player linked");
            to_record(load_row(conn, player_id)?)
        })
    }
}

fn ensure_row(conn: &mut SqliteConnection, player_id: &str) -> QueryResult<usize> {
    diesel::insert_or_ignore_into(players::table)
        .values(&NewPlayerRow::new(player_id.to_string()))
        .execute(conn)
}

fn load_row(conn: &mut SqliteConnection, player_id: &str) -> QueryResult<PlayerRow> {
    players::table
        .find(player_id)
        .select(PlayerRow::as_select())
        .first(conn)
}

#[track_caller]
fn to_record(row: PlayerRow) -> Result<PlayerRecord, StoreError> {
    row.into_record()
        .ok_or_else(|| StoreError::new("Player row with blank id"))
}

fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Async [`PlayerStore`] over a [`PlayerRepository`].
///
/// Diesel's SQLite connection is blocking, so each call runs on tokio's
/// blocking pool.
#[derive(Debug, Clone)]
pub struct SqlitePlayerStore {
    repository: PlayerRepository,
}

impl SqlitePlayerStore {
    /// Opens (and migrates) the database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StoreError> {
        Ok(Self {
            repository: PlayerRepository::open(db_path)?,
        })
    }

    /// The underlying repository.
    pub fn repository(&self) -> &PlayerRepository {
        &self.repository
    }
}

#[async_trait]
impl PlayerStore for SqlitePlayerStore {
    #[instrument(skip(self), fields(player_id = %player_id))]
    async fn get(&self, player_id: &PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
        let repository = self.repository.clone();
        let id = player_id.as_str().to_string();
        tokio::task::spawn_blocking(move || repository.get(&id)).await?
    }

    #[instrument(skip(self), fields(player_id = %player_id))]
    async fn upsert(&self, player_id: &PlayerId) -> Result<PlayerRecord, StoreError> {
        let repository = self.repository.clone();
        let id = player_id.as_str().to_string();
        tokio::task::spawn_blocking(move || repository.upsert(&id)).await?
    }

    #[instrument(skip(self), fields(player_id = %player_id, candidate = %candidate))]
    async fn claim_promo_code(
        &self,
        player_id: &PlayerId,
        candidate: &PromoCode,
    ) -> Result<PromoClaim, StoreError> {
        let repository = self.repository.clone();
        let id = player_id.as_str().to_string();
        let code = candidate.as_str().to_string();
        let (record, newly_issued) =
            tokio::task::spawn_blocking(move || repository.claim_promo_code(&id, &code)).await??;
        Ok(PromoClaim::new(record, newly_issued))
    }

    #[instrument(skip(self), fields(player_id = %player_id, channel_id = %channel_id))]
    async fn link(
        &self,
        player_id: &PlayerId,
        channel_id: &ChannelId,
    ) -> Result<PlayerRecord, StoreError> {
        let repository = self.repository.clone();
        let id = player_id.as_str().to_string();
        let channel = channel_id.as_str().to_string();
        tokio::task::spawn_blocking(move || repository.link(&id, &channel)).await?
    }
}
