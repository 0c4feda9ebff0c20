//! Tic-Tac-Toe Pro server - authoritative game sessions over HTTP
//!
//! Composes the pure engine from `tictactoe_engine` into game sessions that
//! are persisted, serialized per game and pushed to watchers as they change.
//!
//! # Architecture
//!
//! - **Session**: one game's state and its legal transitions
//! - **Gateway**: per-game locking around load, transition, save and notify
//! - **Store**: SQLite (Diesel) or in-memory persistence
//! - **Broadcast**: per-game change notifications
//! - **API**: axum routes, session-id middleware and server-sent events
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tictactoe_server::{GameMode, MemoryStore, PlayerId, ServerConfig, SessionGateway};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let gateway = SessionGateway::new(Arc::new(MemoryStore::new()), &config);
//!
//! let game = gateway.create(PlayerId::new("alice"), GameMode::TwoPlayer).await?;
//! gateway.join(*game.id(), PlayerId::new("bob")).await?;
//! gateway.make_move(*game.id(), PlayerId::new("alice"), 1, 1).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod broadcast;
mod config;
mod error;
mod gateway;
mod server;
mod session;
mod store;

// Crate-level exports - Errors
pub use error::{GameError, GatewayError, StoreError, StoreErrorKind};

// Crate-level exports - Sessions
pub use session::{
    AI_LABEL, GameId, GameMode, GameSession, GameStatus, Opponent, PlayerId, SessionRecord,
    TurnReport,
};

// Crate-level exports - Persistence
pub use store::{
    CorruptBoardPolicy, DecodedBoard, GameStore, MemoryStore, SqliteStore, decode_board,
    decode_board_with, encode_board,
};

// Crate-level exports - Coordination
pub use broadcast::{BroadcastHub, DEFAULT_CAPACITY};
pub use gateway::SessionGateway;

// Crate-level exports - HTTP
pub use api::{
    ApiError, AppState, Caller, CreateGameRequest, ErrorEnvelope, GameEnvelope, GameView,
    GamesEnvelope, MoveRequest, SESSION_HEADER, router,
};
pub use server::serve;

// Crate-level exports - Configuration
pub use config::{ConfigError, MEMORY_DATABASE, ServerConfig};
