//! Per-game change notifications.
//!
//! Each game id gets its own broadcast channel carrying full session
//! snapshots. Publishing to a game nobody watches is a no-op.

use crate::session::{GameId, GameSession};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, instrument};

/// Default number of buffered snapshots per game.
pub const DEFAULT_CAPACITY: usize = 64;

/// In-process pub/sub hub keyed by game id. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    channels: Arc<RwLock<HashMap<GameId, broadcast::Sender<GameSession>>>>,
    capacity: usize,
}

impl BroadcastHub {
    /// Creates a hub with the given per-game buffer size.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Sends a snapshot to the game's subscribers.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub async fn publish(&self, session: &GameSession) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(session.id()) {
            // Err only means every receiver is gone.
            let delivered = tx.send(session.clone()).unwrap_or(0);
            debug!(delivered, "Published game state");
        }
    }

    /// Subscribes to a game's changes. Creates the channel on first use.
    pub async fn subscribe(&self, id: GameId) -> broadcast::Receiver<GameSession> {
        let mut channels = self.channels.write().await;
        // Drop channels whose watchers all went away.
        channels.retain(|_, tx| tx.receiver_count() > 0);
        channels
            .entry(id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of live channels.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
