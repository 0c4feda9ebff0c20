//! Game rules for tic-tac-toe.
//!
//! Pure functions over [`Board`]: move validation, move application,
//! outcome evaluation and turn alternation. Rules are separated from board
//! storage so sessions and the AI share one definition of a legal game.

mod draw;
mod win;

pub use draw::is_draw;
pub use win::{LINES, winner};

use crate::board::Board;
use crate::position::Position;
use crate::types::{Mark, Outcome};
use derive_more::{Display, Error};
use tracing::{instrument, warn};

/// Error that can occur when validating a move.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Row or column lies outside `0..3`.
    #[display("Invalid position ({}, {})", row, col)]
    InvalidPosition {
        /// Requested row.
        row: i64,
        /// Requested column.
        col: i64,
    },

    /// The target cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(#[error(not(source))] Position),
}

/// Validates a move request against the board.
///
/// Coordinates are taken as signed integers exactly as they arrive from the
/// wire, so a negative row is an [`MoveError::InvalidPosition`] rather than
/// a deserialization failure.
///
/// # Errors
///
/// - [`MoveError::InvalidPosition`] if row or col is outside `0..3`
/// - [`MoveError::CellOccupied`] if the target cell is not empty
#[instrument(skip(board))]
pub fn validate_move(board: &Board, row: i64, col: i64) -> Result<Position, MoveError> {
    let pos = usize::try_from(row)
        .ok()
        .zip(usize::try_from(col).ok())
        .and_then(|(r, c)| Position::from_row_col(r, c))
        .ok_or_else(|| {
            warn!(row, col, "Move outside the board");
            MoveError::InvalidPosition { row, col }
        })?;

    if !board.cell(pos).is_empty() {
        warn!(position = %pos, "Move onto occupied cell");
        return Err(MoveError::CellOccupied(pos));
    }

    Ok(pos)
}

/// Applies a validated move, returning the new board.
///
/// Only call with a position returned by [`validate_move`] for this board.
pub fn apply_move(board: &Board, pos: Position, mark: Mark) -> Board {
    board.place_at(pos, mark)
}

/// Evaluates the board.
///
/// Any completed line decides the outcome; a full board without one is a
/// draw; everything else is still pending.
pub fn evaluate_outcome(board: &Board) -> Outcome {
    if let Some(mark) = winner(board) {
        Outcome::Win(mark)
    } else if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::Pending
    }
}

/// Returns the mark that moves after `mark`.
pub fn next_turn(mark: Mark) -> Mark {
    mark.opponent()
}

/// Legal moves in row-major order.
pub fn legal_moves(board: &Board) -> Vec<Position> {
    board.empty_positions()
}
