//! Board text encoding for storage.
//!
//! A board is stored as a 3x3 JSON array of `null`, `"X"` or `"O"`, row by row.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use tictactoe_engine::Board;
use tracing::{instrument, warn};

/// What to do with a stored board that fails to decode.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CorruptBoardPolicy {
    /// Fail the load with a corrupt-record error.
    #[default]
    Reject,
    /// Replace the board with an empty one and restart the game.
    ResetToEmpty,
}

/// Result of a lenient decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedBoard {
    /// The stored board decoded cleanly.
    Stored(Board),
    /// The stored board was unreadable and replaced by an empty one.
    Reset,
}

impl DecodedBoard {
    /// The board to use.
    pub fn board(self) -> Board {
        match self {
            DecodedBoard::Stored(board) => board,
            DecodedBoard::Reset => Board::empty(),
        }
    }
}

/// Encodes a board as JSON text.
///
/// # Errors
///
/// Returns a backend [`StoreError`] if serialization fails.
pub fn encode_board(board: &Board) -> Result<String, StoreError> {
    serde_json::to_string(board)
        .map_err(|e| StoreError::backend(format!("Failed to encode board: {}", e)))
}

/// Decodes a board, rejecting bad shapes, unknown symbols and unreachable
/// mark counts.
///
/// # Errors
///
/// Returns a corrupt [`StoreError`] describing the failure.
pub fn decode_board(raw: &str) -> Result<Board, StoreError> {
    serde_json::from_str(raw)
        .map_err(|e| StoreError::corrupt(format!("Invalid stored board {:?}: {}", raw, e)))
}

/// Decodes a board under the given policy.
///
/// # Errors
///
/// Returns the [`decode_board`] error under [`CorruptBoardPolicy::Reject`].
#[instrument(skip(raw))]
pub fn decode_board_with(
    raw: &str,
    policy: CorruptBoardPolicy,
) -> Result<DecodedBoard, StoreError> {
    match (decode_board(raw), policy) {
        (Ok(board), _) => Ok(DecodedBoard::Stored(board)),
        (Err(e), CorruptBoardPolicy::Reject) => Err(e),
        (Err(e), CorruptBoardPolicy::ResetToEmpty) => {
            warn!(error = %e.message, "Resetting unreadable board to empty");
            Ok(DecodedBoard::Reset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreErrorKind;
    use tictactoe_engine::Mark;

    #[test]
    fn test_encode_empty_board() {
        let raw = encode_board(&Board::empty()).unwrap();
        assert_eq!(raw, "[[null,null,null],[null,null,null],[null,null,null]]");
    }

    #[test]
    fn test_encode_partial_board() {
        let board = Board::empty().place(0, 0, Mark::X).place(1, 1, Mark::O);
        let raw = encode_board(&board).unwrap();
        assert_eq!(raw, r#"[["X",null,null],[null,"O",null],[null,null,null]]"#);
        assert_eq!(decode_board(&raw).unwrap(), board);
    }

    #[test]
    fn test_full_board_survives() {
        let full = Board::empty()
            .place(0, 0, Mark::X)
            .place(0, 1, Mark::O)
            .place(0, 2, Mark::X)
            .place(1, 0, Mark::X)
            .place(1, 1, Mark::O)
            .place(1, 2, Mark::O)
            .place(2, 0, Mark::O)
            .place(2, 1, Mark::X)
            .place(2, 2, Mark::X);
        assert_eq!(decode_board(&encode_board(&full).unwrap()).unwrap(), full);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for raw in [
            "",
            "not json",
            "[[null,null],[null,null]]",
            r#"[["Z",null,null],[null,null,null],[null,null,null]]"#,
            r#"[[null,null,null],[null,null,null],[null,null,null],[null,null,null]]"#,
        ] {
            let err = decode_board(raw).unwrap_err();
            assert_eq!(err.kind, StoreErrorKind::Corrupt, "accepted {raw:?}");
        }
    }

    #[test]
    fn test_decode_rejects_unbalanced_counts() {
        let raw = r#"[["O","O",null],[null,null,null],[null,null,null]]"#;
        assert!(decode_board(raw).is_err());
    }

    #[test]
    fn test_reset_policy_falls_back_to_empty() {
        let decoded = decode_board_with("garbage", CorruptBoardPolicy::ResetToEmpty).unwrap();
        assert_eq!(decoded, DecodedBoard::Reset);
        assert_eq!(decoded.board(), Board::empty());
        assert!(decode_board_with("garbage", CorruptBoardPolicy::Reject).is_err());
    }
}
