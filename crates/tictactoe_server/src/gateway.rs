//! Session gateway: the only way in to game state.
//!
//! Every mutation runs load, transition, save and notify while holding a
//! per-game lock, so two requests for the same game never interleave.
//! Requests for different games run concurrently. A store call that misses
//! its deadline keeps its game locked until the call resolves.

use crate::broadcast::BroadcastHub;
use crate::config::ServerConfig;
use crate::error::{GameError, GatewayError, StoreError};
use crate::session::{GameId, GameMode, GameSession, PlayerId};
use crate::store::{GameStore, MemoryStore, SqliteStore};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tictactoe_engine::Difficulty;
use tokio::sync::broadcast;
use tokio::task::JoinError;
use tracing::{debug, error, info, instrument, warn};

type GameLock = Arc<tokio::sync::Mutex<()>>;
type GameGuard = tokio::sync::OwnedMutexGuard<()>;

/// Coordinates sessions, storage and notifications.
pub struct SessionGateway {
    store: Arc<dyn GameStore>,
    hub: BroadcastHub,
    locks: Mutex<HashMap<GameId, GameLock>>,
    rng: Mutex<StdRng>,
    store_timeout: Duration,
    default_difficulty: Difficulty,
}

impl std::fmt::Debug for SessionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGateway")
            .field("store_timeout", &self.store_timeout)
            .field("default_difficulty", &self.default_difficulty)
            .finish_non_exhaustive()
    }
}

impl SessionGateway {
    /// Creates a gateway over the given store.
    pub fn new(store: Arc<dyn GameStore>, config: &ServerConfig) -> Self {
        let rng = match config.ai_seed() {
            Some(seed) => StdRng::seed_from_u64(*seed),
            None => StdRng::from_entropy(),
        };

        Self {
            store,
            hub: BroadcastHub::with_capacity(*config.channel_capacity()),
            locks: Mutex::new(HashMap::new()),
            rng: Mutex::new(rng),
            store_timeout: config.store_timeout(),
            default_difficulty: *config.default_difficulty(),
        }
    }

    /// Creates a gateway with the store the configuration selects.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the SQLite database cannot be opened.
    #[instrument(skip(config), fields(database_url = %config.database_url()))]
    pub fn from_config(config: &ServerConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn GameStore> = if config.uses_memory_store() {
            info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(SqliteStore::open(
                config.database_url().clone(),
                *config.corrupt_board_policy(),
            )?)
        };
        Ok(Self::new(store, config))
    }

    /// Difficulty for single-player games that name none.
    pub fn default_difficulty(&self) -> Difficulty {
        self.default_difficulty
    }

    /// Creates a game with `player_x` as X.
    #[instrument(skip(self), fields(player_id = %player_x))]
    pub async fn create(
        &self,
        player_x: PlayerId,
        mode: GameMode,
    ) -> Result<GameSession, GatewayError> {
        let session = GameSession::create(player_x, mode);
        let mut guard = self.acquire(*session.id()).await;

        self.save(&session, &mut guard).await?;
        self.hub.publish(&session).await;
        info!(session_id = %session.id(), status = %session.status(), "Game created");
        Ok(session)
    }

    /// Seats `player` as O.
    #[instrument(skip(self), fields(session_id = %id, player_id = %player))]
    pub async fn join(&self, id: GameId, player: PlayerId) -> Result<GameSession, GatewayError> {
        let mut guard = self.acquire(id).await;

        let mut session = self.load_existing(id, &mut guard).await?;
        session.join(player)?;
        self.save(&session, &mut guard).await?;
        self.hub.publish(&session).await;

        info!("Player joined");
        Ok(session)
    }

    /// Applies `player`'s move and, against the AI, the AI's reply.
    ///
    /// If the AI fails to find a move, the human's move is still saved and
    /// published before the error is returned.
    #[instrument(skip(self), fields(session_id = %id, player_id = %player))]
    pub async fn make_move(
        &self,
        id: GameId,
        player: PlayerId,
        row: i64,
        col: i64,
    ) -> Result<GameSession, GatewayError> {
        let mut guard = self.acquire(id).await;

        let mut session = self.load_existing(id, &mut guard).await?;
        let result = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            session.play_turn(&player, row, col, &mut *rng)
        };

        match result {
            Ok(report) => {
                self.save(&session, &mut guard).await?;
                self.hub.publish(&session).await;
                info!(
                    human = %report.human,
                    ai = ?report.ai,
                    status = %session.status(),
                    "Move committed"
                );
                Ok(session)
            }
            Err(GameError::AiNoMoveAvailable) => {
                error!(board = %session.board(), "AI found no move; keeping human move");
                self.save(&session, &mut guard).await?;
                self.hub.publish(&session).await;
                Err(GameError::AiNoMoveAvailable.into())
            }
            Err(e) => {
                debug!(error = %e, "Move rejected");
                Err(e.into())
            }
        }
    }

    /// Adds `player` to the game's spectators.
    #[instrument(skip(self), fields(session_id = %id, player_id = %player))]
    pub async fn spectate(
        &self,
        id: GameId,
        player: PlayerId,
    ) -> Result<GameSession, GatewayError> {
        let mut guard = self.acquire(id).await;

        let mut session = self.load_existing(id, &mut guard).await?;
        if session.add_spectator(player) {
            self.save(&session, &mut guard).await?;
            self.hub.publish(&session).await;
        }
        Ok(session)
    }

    /// Current state of a game.
    #[instrument(skip(self), fields(session_id = %id))]
    pub async fn get(&self, id: GameId) -> Result<GameSession, GatewayError> {
        self.load_existing(id, &mut None).await
    }

    /// Games waiting for a second player, newest first.
    #[instrument(skip(self))]
    pub async fn available_games(&self) -> Result<Vec<GameSession>, GatewayError> {
        Ok(self
            .with_store("list_waiting", &mut None, |s| s.list_waiting())
            .await?)
    }

    /// Unfinished games `player` takes part in, most recently updated first.
    #[instrument(skip(self), fields(player_id = %player))]
    pub async fn player_games(&self, player: PlayerId) -> Result<Vec<GameSession>, GatewayError> {
        Ok(self
            .with_store("list_active_for", &mut None, move |s| s.list_active_for(&player))
            .await?)
    }

    /// Subscribes to a game's changes.
    ///
    /// Returns the state at subscription time along with the receiver, so
    /// callers can render it before the first change arrives.
    #[instrument(skip(self), fields(session_id = %id))]
    pub async fn subscribe(
        &self,
        id: GameId,
    ) -> Result<(GameSession, broadcast::Receiver<GameSession>), GatewayError> {
        let rx = self.hub.subscribe(id).await;
        let session = self.load_existing(id, &mut None).await?;
        debug!("Subscriber attached");
        Ok((session, rx))
    }

    /// Waits for exclusive access to one game.
    async fn acquire(&self, id: GameId) -> Option<GameGuard> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|key, lock| *key == id || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(id).or_default())
        };
        Some(lock.lock_owned().await)
    }

    async fn load_existing(
        &self,
        id: GameId,
        guard: &mut Option<GameGuard>,
    ) -> Result<GameSession, GatewayError> {
        self.with_store("load", guard, move |s| s.load(&id))
            .await?
            .ok_or_else(|| {
                debug!(session_id = %id, "Game not found");
                GameError::GameNotFound(id).into()
            })
    }

    /// Saves a snapshot. A save that outlives the deadline still publishes
    /// once it lands.
    async fn save(
        &self,
        session: &GameSession,
        guard: &mut Option<GameGuard>,
    ) -> Result<(), StoreError> {
        let snapshot = session.clone();
        let landed = session.clone();
        let hub = self.hub.clone();
        self.with_store_then(
            "save",
            guard,
            move |s| s.save(&snapshot),
            move |()| async move { hub.publish(&landed).await },
        )
        .await
    }

    /// Runs a store call on the blocking pool under the configured deadline.
    async fn with_store<T, F>(
        &self,
        op: &'static str,
        guard: &mut Option<GameGuard>,
        f: F,
    ) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn GameStore) -> Result<T, StoreError> + Send + 'static,
    {
        self.with_store_then(op, guard, f, |_| async {}).await
    }

    /// Like [`Self::with_store`], with `landed` run on the result of a call
    /// that finishes after its deadline.
    ///
    /// A timed-out call keeps running on the blocking pool. The game guard,
    /// if any, moves into a task that waits for it, so the next transition
    /// for that game starts only after the late call has resolved.
    async fn with_store_then<T, F, L, Fut>(
        &self,
        op: &'static str,
        guard: &mut Option<GameGuard>,
        f: F,
        landed: L,
    ) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn GameStore) -> Result<T, StoreError> + Send + 'static,
        L: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let mut task = tokio::task::spawn_blocking(move || f(store.as_ref()));

        let finished = tokio::time::timeout(self.store_timeout, &mut task).await;
        match finished {
            Ok(joined) => settle(op, joined),
            Err(_) => {
                warn!(op, timeout = ?self.store_timeout, "Store call timed out");
                if let Some(held) = guard.take() {
                    tokio::spawn(async move {
                        match settle(op, task.await) {
                            Ok(value) => landed(value).await,
                            Err(e) => warn!(op, error = %e, "Late store call failed"),
                        }
                        debug!(op, "Late store call resolved; releasing game lock");
                        drop(held);
                    });
                }
                Err(StoreError::timeout(format!(
                    "Store {} exceeded {:?}",
                    op, self.store_timeout
                )))
            }
        }
    }
}

/// Flattens a joined blocking store call.
fn settle<T>(
    op: &'static str,
    joined: Result<Result<T, StoreError>, JoinError>,
) -> Result<T, StoreError> {
    joined.unwrap_or_else(|join_error| {
        error!(op, error = %join_error, "Store task failed");
        Err(StoreError::backend(format!("Store {} task failed: {}", op, join_error)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> SessionGateway {
        let config = ServerConfig::default().with_ai_seed(1);
        SessionGateway::new(Arc::new(MemoryStore::new()), &config)
    }

    #[tokio::test]
    async fn test_get_unknown_game() {
        let id = GameId::new();
        let err = gateway().get(id).await.unwrap_err();
        assert_eq!(err.as_game(), Some(&GameError::GameNotFound(id)));
    }

    #[tokio::test]
    async fn test_vs_ai_move_gets_reply() {
        let gateway = gateway();
        let alice = PlayerId::new("alice");
        let game = gateway
            .create(alice.clone(), GameMode::VsAi(Difficulty::Hard))
            .await
            .unwrap();

        let after = gateway.make_move(*game.id(), alice, 0, 0).await.unwrap();
        assert_eq!(after.board().empty_positions().len(), 7);
        assert_eq!(after.turn(), tictactoe_engine::Mark::X);
    }

    #[tokio::test]
    async fn test_lock_table_is_pruned() {
        let gateway = gateway();
        for _ in 0..10 {
            gateway
                .create(PlayerId::new("alice"), GameMode::TwoPlayer)
                .await
                .unwrap();
        }
        let held = gateway.locks.lock().unwrap().len();
        assert!(held <= 1, "stale locks kept: {held}");
    }
}
