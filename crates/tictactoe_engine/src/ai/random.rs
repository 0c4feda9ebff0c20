//! Easy tier: uniform random choice among empty cells.

use crate::board::Board;
use crate::position::Position;
use crate::rules::legal_moves;
use rand::Rng;

/// Picks an empty cell uniformly at random.
pub fn random_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Position> {
    let moves = legal_moves(board);
    if moves.is_empty() {
        return None;
    }
    let idx = rng.gen_range(0..moves.len());
    Some(moves[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mark;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_random_move_is_always_empty() {
        let board = Board::empty()
            .place(0, 0, Mark::X)
            .place(1, 1, Mark::O)
            .place(2, 2, Mark::X);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            let pos = random_move(&board, &mut rng).unwrap();
            assert!(board.cell(pos).is_empty());
        }
    }

    #[test]
    fn test_random_move_covers_all_empty_cells() {
        let board = Board::empty().place(1, 1, Mark::X);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let seen: HashSet<_> = (0..500)
            .filter_map(|_| random_move(&board, &mut rng))
            .collect();
        assert_eq!(seen.len(), 8);
    }
}
