//! AI move selection.
//!
//! Three difficulty tiers share one entry point, [`choose_move`]. Every
//! tier returns `None` only when the board has no empty cell; callers treat
//! that as an invariant violation since a full board is already decided.

mod heuristic;
mod minimax;
mod random;

pub use heuristic::{completing_move, heuristic_move};
pub use minimax::best_move;
pub use random::random_move;

use crate::board::Board;
use crate::position::Position;
use crate::types::Mark;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// AI difficulty tier.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Uniformly random empty cell.
    Easy,
    /// Win, block, centre, then random.
    #[default]
    Medium,
    /// Full-depth minimax; never loses.
    Hard,
}

/// Picks a move for `mark` at the given difficulty.
///
/// Returns `None` when the board is full.
#[instrument(skip(board, rng), fields(empty = board.empty_positions().len()))]
pub fn choose_move<R: Rng + ?Sized>(
    board: &Board,
    mark: Mark,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<Position> {
    let choice = match difficulty {
        Difficulty::Easy => random_move(board, rng),
        Difficulty::Medium => heuristic_move(board, mark, rng),
        Difficulty::Hard => best_move(board, mark),
    };
    debug!(?choice, "AI selected move");
    choice
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::str::FromStr;

    #[test]
    fn test_difficulty_parse_and_display() {
        assert_eq!(Difficulty::from_str("hard"), Ok(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("Easy"), Ok(Difficulty::Easy));
        assert!(Difficulty::from_str("impossible").is_err());
        assert_eq!(Difficulty::Medium.to_string(), "medium");
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn test_full_board_has_no_move() {
        let full = Board::empty()
            .place(0, 0, Mark::X)
            .place(0, 1, Mark::O)
            .place(0, 2, Mark::X)
            .place(1, 0, Mark::O)
            .place(1, 1, Mark::X)
            .place(1, 2, Mark::X)
            .place(2, 0, Mark::O)
            .place(2, 1, Mark::X)
            .place(2, 2, Mark::O);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(choose_move(&full, Mark::O, difficulty, &mut rng), None);
        }
    }
}
