//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};

/// A player's mark.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Mark {
    /// Player X (always moves first).
    X,
    /// Player O (moves second).
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A cell on the board.
///
/// Serialized as `null`, `"X"` or `"O"`, matching the board wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Mark>", into = "Option<Mark>")]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell occupied by a mark.
    Occupied(Mark),
}

impl Cell {
    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark),
        }
    }

    /// Returns true if the cell is empty.
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<Option<Mark>> for Cell {
    fn from(mark: Option<Mark>) -> Self {
        match mark {
            Some(mark) => Cell::Occupied(mark),
            None => Cell::Empty,
        }
    }
}

impl From<Cell> for Option<Mark> {
    fn from(cell: Cell) -> Self {
        cell.mark()
    }
}

/// Result of evaluating a board.
///
/// Always derived from the board, never stored alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// No line completed and empty cells remain.
    Pending,
    /// The mark completed a line.
    Win(Mark),
    /// The board is full without a completed line.
    Draw,
}

impl Outcome {
    /// Returns the winning mark, if there is one.
    pub fn winner(self) -> Option<Mark> {
        match self {
            Outcome::Win(mark) => Some(mark),
            Outcome::Pending | Outcome::Draw => None,
        }
    }

    /// Returns true once the game can no longer continue.
    pub fn is_decided(self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Pending => write!(f, "In progress"),
            Outcome::Win(mark) => write!(f, "Player {} wins", mark),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_alternates() {
        assert_eq!(Mark::X.opponent(), Mark::O);
        assert_eq!(Mark::O.opponent(), Mark::X);
    }

    #[test]
    fn test_cell_serializes_as_symbol_or_null() {
        assert_eq!(serde_json::to_string(&Cell::Empty).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Cell::Occupied(Mark::X)).unwrap(), "\"X\"");
        let cell: Cell = serde_json::from_str("\"O\"").unwrap();
        assert_eq!(cell, Cell::Occupied(Mark::O));
    }

    #[test]
    fn test_outcome_winner() {
        assert_eq!(Outcome::Win(Mark::O).winner(), Some(Mark::O));
        assert_eq!(Outcome::Draw.winner(), None);
        assert!(!Outcome::Pending.is_decided());
        assert!(Outcome::Draw.is_decided());
    }
}
