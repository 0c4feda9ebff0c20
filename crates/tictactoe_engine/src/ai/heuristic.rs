//! Medium tier: win, block, centre, then random.

use super::random::random_move;
use crate::board::Board;
use crate::position::Position;
use crate::rules::LINES;
use crate::types::{Cell, Mark};
use rand::Rng;

/// Finds the empty cell that completes a line of two `mark`s.
///
/// Lines are scanned in [`LINES`] order; the first match wins.
pub fn completing_move(board: &Board, mark: Mark) -> Option<Position> {
    LINES.iter().find_map(|line| {
        let own = line
            .iter()
            .filter(|pos| board.cell(**pos) == Cell::Occupied(mark))
            .count();
        let mut empty = line.iter().filter(|pos| board.cell(**pos).is_empty());
        match (own, empty.next(), empty.next()) {
            (2, Some(pos), None) => Some(*pos),
            _ => None,
        }
    })
}

/// Picks a move by fixed priority.
///
/// 1. Complete our own line (win now).
/// 2. Complete the opponent's line (block).
/// 3. Take the centre.
/// 4. Random empty cell.
pub fn heuristic_move<R: Rng + ?Sized>(board: &Board, mark: Mark, rng: &mut R) -> Option<Position> {
    completing_move(board, mark)
        .or_else(|| completing_move(board, mark.opponent()))
        .or_else(|| board.cell(Position::Center).is_empty().then_some(Position::Center))
        .or_else(|| random_move(board, rng))
}
