//! In-process store backed by a hash map.

use super::GameStore;
use crate::error::StoreError;
use crate::session::{GameId, GameSession, GameStatus, PlayerId};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, instrument};

/// Keeps sessions in memory. Contents are lost on shutdown.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: RwLock<HashMap<GameId, GameSession>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::backend("Memory store lock poisoned")
    }
}

impl GameStore for MemoryStore {
    #[instrument(skip(self), fields(session_id = %id))]
    fn load(&self, id: &GameId) -> Result<Option<GameSession>, StoreError> {
        let games = self.games.read().map_err(|_| Self::poisoned())?;
        let session = games.get(id).cloned();
        debug!(found = session.is_some(), "Loaded session");
        Ok(session)
    }

    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    fn save(&self, session: &GameSession) -> Result<(), StoreError> {
        let mut games = self.games.write().map_err(|_| Self::poisoned())?;
        games.insert(*session.id(), session.clone());
        debug!(status = %session.status(), "Saved session");
        Ok(())
    }

    #[instrument(skip(self))]
    fn list_waiting(&self) -> Result<Vec<GameSession>, StoreError> {
        let games = self.games.read().map_err(|_| Self::poisoned())?;
        let mut waiting: Vec<_> = games
            .values()
            .filter(|s| s.status() == GameStatus::Waiting)
            .cloned()
            .collect();
        waiting.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        debug!(count = waiting.len(), "Listed waiting games");
        Ok(waiting)
    }

    #[instrument(skip(self), fields(player_id = %player))]
    fn list_active_for(&self, player: &PlayerId) -> Result<Vec<GameSession>, StoreError> {
        let games = self.games.read().map_err(|_| Self::poisoned())?;
        let mut active: Vec<_> = games
            .values()
            .filter(|s| s.status() != GameStatus::Finished && s.is_participant(player))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.updated_at().cmp(a.updated_at()));
        debug!(count = active.len(), "Listed active games");
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GameMode;
    use tictactoe_engine::Difficulty;

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let session = GameSession::create(PlayerId::new("alice"), GameMode::TwoPlayer);
        store.save(&session).unwrap();
        assert_eq!(store.load(session.id()).unwrap(), Some(session));
        assert_eq!(store.load(&GameId::new()).unwrap(), None);
    }

    #[test]
    fn test_listings() {
        let store = MemoryStore::new();
        let alice = PlayerId::new("alice");
        let waiting = GameSession::create(alice.clone(), GameMode::TwoPlayer);
        let vs_ai = GameSession::create(alice.clone(), GameMode::VsAi(Difficulty::Easy));
        let other = GameSession::create(PlayerId::new("bob"), GameMode::VsAi(Difficulty::Hard));
        for s in [&waiting, &vs_ai, &other] {
            store.save(s).unwrap();
        }

        let listed = store.list_waiting().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id(), waiting.id());

        let mine = store.list_active_for(&alice).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|s| s.player_x() == &alice));
    }
}
