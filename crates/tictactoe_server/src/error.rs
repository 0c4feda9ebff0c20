//! Error types for game sessions, persistence and the gateway.

use crate::session::{GameId, PlayerId};
use derive_more::{Display, Error, From};
use tictactoe_engine::{Mark, MoveError};
use tracing::instrument;

/// Game-rule failure. Expected, user-facing, never a fault.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GameError {
    /// Row or column outside `0..3`.
    #[display("Invalid position ({}, {})", row, col)]
    InvalidPosition {
        /// Requested row.
        row: i64,
        /// Requested column.
        col: i64,
    },

    /// Target cell already holds a mark.
    #[display("Cell ({}, {}) is already occupied", row, col)]
    CellOccupied {
        /// Row of the occupied cell.
        row: usize,
        /// Column of the occupied cell.
        col: usize,
    },

    /// The acting player's mark is not the one on turn.
    #[display("Not your turn. Waiting for player {}", expected)]
    WrongTurn {
        /// Mark currently on turn.
        expected: Mark,
    },

    /// The game is waiting for a second player or already finished.
    #[display("Game is not in progress")]
    NotInProgress,

    /// The game is not waiting for a second player.
    #[display("Game not available to join")]
    NotJoinable,

    /// No game with this id exists.
    #[display("Game {} not found", _0)]
    GameNotFound(#[error(not(source))] GameId),

    /// The acting identity holds neither mark in this game.
    #[display("Player {} is not part of this game", _0)]
    NotAPlayer(#[error(not(source))] PlayerId),

    /// The AI was asked to move on a board without empty cells.
    #[display("AI could not determine a move")]
    AiNoMoveAvailable,
}

impl From<MoveError> for GameError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::InvalidPosition { row, col } => GameError::InvalidPosition { row, col },
            MoveError::CellOccupied(pos) => GameError::CellOccupied {
                row: pos.row(),
                col: pos.col(),
            },
        }
    }
}

/// Category of persistence failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StoreErrorKind {
    /// The store did not answer within the configured timeout.
    Timeout,
    /// The backend reported a failure (connection, query, lock).
    Backend,
    /// A stored record could not be decoded into a consistent session.
    Corrupt,
}

/// Persistence error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error ({}): {} at {}:{}", kind, message, file, line)]
pub struct StoreError {
    /// Failure category.
    pub kind: StoreErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Backend failure.
    #[track_caller]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Backend, message)
    }

    /// Store call exceeded its deadline.
    #[track_caller]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Timeout, message)
    }

    /// Undecodable or inconsistent record.
    #[track_caller]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Corrupt, message)
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, StoreErrorKind::Timeout | StoreErrorKind::Backend)
    }
}

impl From<diesel::result::Error> for StoreError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::backend(format!("Diesel error: {}", err))
    }
}

impl From<diesel::ConnectionError> for StoreError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::backend(format!("Connection error: {}", err))
    }
}

/// Error returned by gateway operations.
///
/// Keeps "your move was illegal" apart from "we couldn't save your move".
#[derive(Debug, Clone, Display, Error, From)]
pub enum GatewayError {
    /// A game rule rejected the request.
    #[display("{}", _0)]
    Game(GameError),
    /// Persistence failed.
    #[display("{}", _0)]
    Store(StoreError),
}

impl GatewayError {
    /// Returns the game-rule error, if this is one.
    pub fn as_game(&self) -> Option<&GameError> {
        match self {
            GatewayError::Game(err) => Some(err),
            GatewayError::Store(_) => None,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Game(_) => false,
            GatewayError::Store(err) => err.is_retryable(),
        }
    }
}
