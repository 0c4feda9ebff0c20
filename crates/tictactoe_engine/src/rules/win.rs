//! Win detection logic for tic-tac-toe.

use crate::board::Board;
use crate::position::Position;
use crate::types::{Cell, Mark};

/// The eight winning lines: rows, then columns, then diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
    ],
    [
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ],
    // Columns
    [
        Position::TopLeft,
        Position::MiddleLeft,
        Position::BottomLeft,
    ],
    [
        Position::TopCenter,
        Position::Center,
        Position::BottomCenter,
    ],
    [
        Position::TopRight,
        Position::MiddleRight,
        Position::BottomRight,
    ],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Checks if there is a winner on the board.
///
/// Returns the mark of the first line (in [`LINES`] order) holding three
/// identical marks, `None` otherwise.
pub fn winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|[a, b, c]| {
        let cell = board.cell(*a);
        match cell {
            Cell::Occupied(mark) if cell == board.cell(*b) && cell == board.cell(*c) => Some(mark),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(winner(&Board::empty()), None);
    }

    #[test]
    fn test_winner_top_row() {
        let board = Board::empty()
            .place(0, 0, Mark::X)
            .place(0, 1, Mark::X)
            .place(0, 2, Mark::X);
        assert_eq!(winner(&board), Some(Mark::X));
    }

    #[test]
    fn test_winner_column() {
        let board = Board::empty()
            .place(0, 1, Mark::O)
            .place(1, 1, Mark::O)
            .place(2, 1, Mark::O);
        assert_eq!(winner(&board), Some(Mark::O));
    }

    #[test]
    fn test_winner_anti_diagonal() {
        let board = Board::empty()
            .place(0, 2, Mark::O)
            .place(1, 1, Mark::O)
            .place(2, 0, Mark::O);
        assert_eq!(winner(&board), Some(Mark::O));
    }

    #[test]
    fn test_no_winner_incomplete() {
        let board = Board::empty().place(0, 0, Mark::X).place(0, 1, Mark::X);
        assert_eq!(winner(&board), None);
    }

    #[test]
    fn test_mixed_line_is_not_a_win() {
        let board = Board::empty()
            .place(0, 0, Mark::X)
            .place(0, 1, Mark::O)
            .place(0, 2, Mark::X);
        assert_eq!(winner(&board), None);
    }
}
