//! Draw detection logic for tic-tac-toe.

use super::win::winner;
use crate::board::Board;

/// Checks if the board is a draw: full with no completed line.
pub fn is_draw(board: &Board) -> bool {
    board.is_full() && winner(board).is_none()
}
