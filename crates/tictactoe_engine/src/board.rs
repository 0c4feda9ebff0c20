//! Immutable 3x3 board value type.

use crate::position::Position;
use crate::types::{Cell, Mark};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Board as three rows of three cells - the storage and wire shape.
pub type BoardRows = [[Cell; 3]; 3];

/// Error building a board from raw rows.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// Mark counts cannot come from alternating play starting with X.
    #[display("Unreachable board: {} X marks and {} O marks", x, o)]
    UnbalancedMarks {
        /// Number of X marks.
        x: usize,
        /// Number of O marks.
        o: usize,
    },
}

/// 3x3 tic-tac-toe board.
///
/// Boards are `Copy` values; [`Board::place`] returns a new board and leaves
/// the original untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "BoardRows", try_from = "BoardRows")]
pub struct Board {
    /// Cells in row-major order (0-8).
    cells: [Cell; 9],
}

impl Board {
    /// Creates the all-empty board.
    pub fn empty() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    /// Gets the cell at the given position.
    pub fn cell(&self, pos: Position) -> Cell {
        self.cells[pos.to_index()]
    }

    /// Checks if the cell at row/col holds a mark.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is outside `0..3`. Callers validate
    /// coordinates through the rules engine first.
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        let pos = Position::from_row_col(row, col)
            .unwrap_or_else(|| panic!("cell ({row}, {col}) is outside the 3x3 board"));
        !self.cell(pos).is_empty()
    }

    /// Returns a new board with `mark` placed at row/col.
    ///
    /// The target must be in range and empty; that is the caller's contract.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is outside `0..3`.
    #[must_use]
    pub fn place(&self, row: usize, col: usize, mark: Mark) -> Board {
        let pos = Position::from_row_col(row, col)
            .unwrap_or_else(|| panic!("cell ({row}, {col}) is outside the 3x3 board"));
        self.place_at(pos, mark)
    }

    /// Returns a new board with `mark` placed at `pos`.
    #[must_use]
    pub fn place_at(&self, pos: Position, mark: Mark) -> Board {
        debug_assert!(self.cell(pos).is_empty(), "{pos} is already occupied");
        let mut next = *self;
        next.cells[pos.to_index()] = Cell::Occupied(mark);
        next
    }

    /// Checks if every cell holds a mark.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Number of cells holding `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.cells
            .iter()
            .filter(|c| **c == Cell::Occupied(mark))
            .count()
    }

    /// Empty positions in row-major order.
    pub fn empty_positions(&self) -> Vec<Position> {
        Position::ALL
            .iter()
            .copied()
            .filter(|pos| self.cell(*pos).is_empty())
            .collect()
    }

    /// Mark expected to move next, inferred from the mark counts.
    pub fn side_to_move(&self) -> Mark {
        if self.count(Mark::X) > self.count(Mark::O) {
            Mark::O
        } else {
            Mark::X
        }
    }

    /// Returns the board as three rows.
    pub fn rows(&self) -> BoardRows {
        let mut rows = [[Cell::Empty; 3]; 3];
        for pos in Position::ALL {
            rows[pos.row()][pos.col()] = self.cell(pos);
        }
        rows
    }

    /// Builds a board from rows, checking the mark-count invariant.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnbalancedMarks`] unless X has the same number
    /// of marks as O or exactly one more.
    pub fn from_rows(rows: BoardRows) -> Result<Self, BoardError> {
        let mut cells = [Cell::Empty; 9];
        for pos in Position::ALL {
            cells[pos.to_index()] = rows[pos.row()][pos.col()];
        }
        let board = Self { cells };

        let x = board.count(Mark::X);
        let o = board.count(Mark::O);
        if x == o || x == o + 1 {
            Ok(board)
        } else {
            Err(BoardError::UnbalancedMarks { x, o })
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Board> for BoardRows {
    fn from(board: Board) -> Self {
        board.rows()
    }
}

impl TryFrom<BoardRows> for Board {
    type Error = BoardError;

    fn try_from(rows: BoardRows) -> Result<Self, Self::Error> {
        Board::from_rows(rows)
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let symbol = match self.cells[row * 3 + col] {
                    Cell::Empty => ".".to_string(),
                    Cell::Occupied(mark) => mark.to_string(),
                };
                f.write_str(&symbol)?;
                if col < 2 {
                    f.write_str("|")?;
                }
            }
            if row < 2 {
                f.write_str("\n-+-+-\n")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let board = Board::empty();
        assert!(!board.is_full());
        assert_eq!(board.empty_positions().len(), 9);
        assert!(!board.is_occupied(1, 1));
    }

    #[test]
    fn test_place_returns_new_board() {
        let board = Board::empty();
        let next = board.place(1, 1, Mark::X);
        assert!(next.is_occupied(1, 1));
        assert!(!board.is_occupied(1, 1), "original board must be unchanged");
        assert_eq!(next.cell(Position::Center), Cell::Occupied(Mark::X));
    }

    #[test]
    #[should_panic(expected = "outside the 3x3 board")]
    fn test_is_occupied_out_of_range_panics() {
        Board::empty().is_occupied(3, 0);
    }

    #[test]
    fn test_side_to_move() {
        let board = Board::empty();
        assert_eq!(board.side_to_move(), Mark::X);
        let board = board.place(0, 0, Mark::X);
        assert_eq!(board.side_to_move(), Mark::O);
    }

    #[test]
    fn test_from_rows_rejects_unbalanced() {
        let x = Cell::Occupied(Mark::X);
        let e = Cell::Empty;
        let result = Board::from_rows([[x, x, e], [e, e, e], [e, e, e]]);
        assert_eq!(result, Err(BoardError::UnbalancedMarks { x: 2, o: 0 }));
    }

    #[test]
    fn test_display() {
        let board = Board::empty().place(0, 0, Mark::X).place(1, 1, Mark::O);
        assert_eq!(board.to_string(), "X|.|.\n-+-+-\n.|O|.\n-+-+-\n.|.|.");
    }
}
