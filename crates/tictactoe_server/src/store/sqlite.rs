//! SQLite store using Diesel.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument};

use super::GameStore;
use super::codec::CorruptBoardPolicy;
use super::models::{GameRow, SpectatorRow};
use super::schema::{games, spectators};
use crate::error::StoreError;
use crate::session::{GameId, GameSession, GameStatus, PlayerId};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Game store backed by a SQLite file.
///
/// Opens a fresh connection per call. Use [`crate::store::MemoryStore`]
/// instead of `":memory:"`, which would give every call its own database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
    policy: CorruptBoardPolicy,
}

impl SqliteStore {
    /// Opens the database and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path))]
    pub fn open(
        db_path: impl Into<String>,
        policy: CorruptBoardPolicy,
    ) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.into(),
            policy,
        };

        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::backend(format!("Migrations failed: {}", e)))?;

        info!(path = %store.db_path, migrations = applied.len(), %policy, "Opened SqliteStore");
        Ok(store)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            StoreError::backend(format!("Failed to connect to '{}': {}", self.db_path, e))
        })?;
        conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Decodes rows, attaching their spectators. Undecodable rows are
    /// logged and left out.
    fn decode_rows(
        &self,
        conn: &mut SqliteConnection,
        rows: Vec<GameRow>,
    ) -> Result<Vec<GameSession>, StoreError> {
        let ids: Vec<String> = rows.iter().map(|r| r.id().to_string()).collect();
        let mut watchers: HashMap<String, Vec<SpectatorRow>> = HashMap::new();
        for row in spectators::table
            .filter(spectators::game_id.eq_any(ids))
            .select(SpectatorRow::as_select())
            .load(conn)?
        {
            watchers.entry(row.game_id().to_string()).or_default().push(row);
        }

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id().to_string();
            let spectators = watchers.remove(&id).unwrap_or_default();
            match row.into_session(spectators, self.policy) {
                Ok(session) => sessions.push(session),
                Err(e) => error!(game_id = %id, error = %e, "Skipping unreadable game"),
            }
        }
        Ok(sessions)
    }
}

impl GameStore for SqliteStore {
    #[instrument(skip(self), fields(session_id = %id))]
    fn load(&self, id: &GameId) -> Result<Option<GameSession>, StoreError> {
        let mut conn = self.connection()?;
        let key = id.to_string();

        let Some(row) = games::table
            .find(key.as_str())
            .select(GameRow::as_select())
            .first(&mut conn)
            .optional()?
        else {
            debug!("Game not found");
            return Ok(None);
        };

        let watchers = spectators::table
            .filter(spectators::game_id.eq(key.as_str()))
            .select(SpectatorRow::as_select())
            .load(&mut conn)?;

        let session = row.into_session(watchers, self.policy)?;
        debug!(status = %session.status(), "Game loaded");
        Ok(Some(session))
    }

    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    fn save(&self, session: &GameSession) -> Result<(), StoreError> {
        let row = GameRow::from_session(session)?;
        let watchers = GameRow::spectator_rows(session);
        let mut conn = self.connection()?;

        conn.immediate_transaction(|conn| {
            diesel::insert_into(games::table)
                .values(&row)
                .on_conflict(games::id)
                .do_update()
                .set(&row)
                .execute(conn)?;

            if !watchers.is_empty() {
                diesel::insert_or_ignore_into(spectators::table)
                    .values(&watchers)
                    .execute(conn)?;
            }
            Ok::<_, diesel::result::Error>(())
        })?;

        debug!(status = %session.status(), spectators = watchers.len(), "Game saved");
        Ok(())
    }

    #[instrument(skip(self))]
    fn list_waiting(&self) -> Result<Vec<GameSession>, StoreError> {
        let mut conn = self.connection()?;
        let rows = games::table
            .filter(games::status.eq(GameStatus::Waiting.to_string()))
            .order(games::created_at.desc())
            .select(GameRow::as_select())
            .load(&mut conn)?;

        let sessions = self.decode_rows(&mut conn, rows)?;
        debug!(count = sessions.len(), "Waiting games loaded");
        Ok(sessions)
    }

    #[instrument(skip(self), fields(player_id = %player))]
    fn list_active_for(&self, player: &PlayerId) -> Result<Vec<GameSession>, StoreError> {
        let mut conn = self.connection()?;
        let rows = games::table
            .filter(games::status.ne(GameStatus::Finished.to_string()))
            .filter(
                games::player_x
                    .eq(player.as_str())
                    .or(games::player_o.assume_not_null().eq(player.as_str())),
            )
            .order(games::updated_at.desc())
            .select(GameRow::as_select())
            .load(&mut conn)?;

        let sessions = self.decode_rows(&mut conn, rows)?;
        debug!(count = sessions.len(), "Active games loaded");
        Ok(sessions)
    }
}
