//! Session persistence.
//!
//! The gateway talks to storage only through [`GameStore`]. Calls are
//! synchronous; the gateway moves them onto the blocking pool.

mod codec;
mod memory;
mod models;
mod schema;
mod sqlite;

pub use codec::{CorruptBoardPolicy, DecodedBoard, decode_board, decode_board_with, encode_board};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::session::{GameId, GameSession, PlayerId};

/// Durable storage for game sessions.
pub trait GameStore: Send + Sync + 'static {
    /// Loads a session, `None` if no game has this id.
    fn load(&self, id: &GameId) -> Result<Option<GameSession>, StoreError>;

    /// Inserts or replaces a session. Last write wins.
    fn save(&self, session: &GameSession) -> Result<(), StoreError>;

    /// Games waiting for a second player, newest first.
    fn list_waiting(&self) -> Result<Vec<GameSession>, StoreError>;

    /// Unfinished games where `player` holds a seat, most recently updated first.
    fn list_active_for(&self, player: &PlayerId) -> Result<Vec<GameSession>, StoreError>;
}
