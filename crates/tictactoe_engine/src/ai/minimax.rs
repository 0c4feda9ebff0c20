//! Hard tier: exhaustive minimax with alpha-beta pruning.
//!
//! Terminal boards score +10 when the AI's mark wins, -10 when the opponent
//! wins and 0 for a draw. Depth does not bias the score, so among equally
//! good moves the first one in row-major order is played. The AI therefore
//! never loses and always converts a forced win, though not necessarily by
//! the shortest route.

use crate::board::Board;
use crate::position::Position;
use crate::rules::{apply_move, evaluate_outcome, legal_moves};
use crate::types::{Mark, Outcome};

const WIN_SCORE: i32 = 10;

/// Returns the optimal move for `mark`, or `None` on a full board.
pub fn best_move(board: &Board, mark: Mark) -> Option<Position> {
    let mut best: Option<(Position, i32)> = None;
    let mut alpha = i32::MIN;

    for pos in legal_moves(board) {
        let next = apply_move(board, pos, mark);
        let score = alphabeta(&next, mark, mark.opponent(), alpha, i32::MAX);

        // Strict comparison keeps the earliest of equally scored moves.
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((pos, score));
            alpha = alpha.max(score);
        }
    }

    best.map(|(pos, _)| pos)
}

/// Scores `board` from `ai`'s perspective with `to_move` on turn.
fn alphabeta(board: &Board, ai: Mark, to_move: Mark, mut alpha: i32, mut beta: i32) -> i32 {
    match evaluate_outcome(board) {
        Outcome::Win(mark) if mark == ai => return WIN_SCORE,
        Outcome::Win(_) => return -WIN_SCORE,
        Outcome::Draw => return 0,
        Outcome::Pending => {}
    }

    if to_move == ai {
        let mut max_eval = i32::MIN;
        for pos in legal_moves(board) {
            let next = apply_move(board, pos, to_move);
            let eval = alphabeta(&next, ai, to_move.opponent(), alpha, beta);
            max_eval = max_eval.max(eval);
            alpha = alpha.max(eval);
            if beta <= alpha {
                break; // Beta cutoff
            }
        }
        max_eval
    } else {
        let mut min_eval = i32::MAX;
        for pos in legal_moves(board) {
            let next = apply_move(board, pos, to_move);
            let eval = alphabeta(&next, ai, to_move.opponent(), alpha, beta);
            min_eval = min_eval.min(eval);
            beta = beta.min(eval);
            if beta <= alpha {
                break; // Alpha cutoff
            }
        }
        min_eval
    }
}
