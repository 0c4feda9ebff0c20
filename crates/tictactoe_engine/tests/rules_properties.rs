//! Properties of the rules engine over every reachable board.

use std::collections::{HashSet, VecDeque};
use tictactoe_engine::{
    Board, LINES, Mark, Outcome, Position, apply_move, evaluate_outcome, legal_moves, next_turn,
    validate_move,
};

/// Every board reachable by alternating legal moves from the empty board,
/// paired with the mark to move. Play stops at decided boards.
fn reachable_boards() -> Vec<(Board, Mark)> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([(Board::empty(), Mark::X)]);
    let mut boards = Vec::new();

    while let Some((board, to_move)) = queue.pop_front() {
        if !seen.insert(board) {
            continue;
        }
        boards.push((board, to_move));
        if evaluate_outcome(&board).is_decided() {
            continue;
        }
        for pos in legal_moves(&board) {
            queue.push_back((apply_move(&board, pos, to_move), next_turn(to_move)));
        }
    }

    boards
}

fn has_full_line(board: &Board) -> bool {
    LINES.iter().any(|[a, b, c]| {
        let cell = board.cell(*a);
        !cell.is_empty() && cell == board.cell(*b) && cell == board.cell(*c)
    })
}

#[test]
fn test_reachable_state_count() {
    // Well-known count of legal tic-tac-toe positions, including the empty board.
    assert_eq!(reachable_boards().len(), 5478);
}

#[test]
fn test_outcome_pending_until_line_or_full() {
    for (board, _) in reachable_boards() {
        let outcome = evaluate_outcome(&board);
        let expected_pending = !has_full_line(&board) && !board.is_full();
        assert_eq!(
            outcome == Outcome::Pending,
            expected_pending,
            "unexpected outcome {outcome:?} for\n{board}"
        );
        if outcome == Outcome::Draw {
            assert!(board.is_full() && !has_full_line(&board));
        }
    }
}

#[test]
fn test_mark_counts_stay_balanced() {
    for (board, to_move) in reachable_boards() {
        let x = board.count(Mark::X);
        let o = board.count(Mark::O);
        assert!(x == o || x == o + 1, "unbalanced board\n{board}");
        assert_eq!(board.side_to_move(), to_move);
    }
}

#[test]
fn test_apply_then_evaluate_is_deterministic() {
    for (board, to_move) in reachable_boards().into_iter().take(500) {
        for pos in legal_moves(&board) {
            let first = evaluate_outcome(&apply_move(&board, pos, to_move));
            let second = evaluate_outcome(&apply_move(&board, pos, to_move));
            assert_eq!(first, second);
        }
    }
}

#[test]
fn test_winner_only_ever_the_last_mover() {
    for (board, to_move) in reachable_boards() {
        if let Outcome::Win(mark) = evaluate_outcome(&board) {
            assert_eq!(mark, to_move.opponent(), "winner must have just moved\n{board}");
        }
    }
}

#[test]
fn test_board_serde_round_trip() {
    for (board, _) in reachable_boards() {
        let json = serde_json::to_string(&board).expect("serialize");
        let back: Board = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, board);
    }
}

#[test]
fn test_scenario_centre_opening() {
    let board = Board::empty();
    let pos = validate_move(&board, 1, 1).expect("centre is free");
    assert_eq!(pos, Position::Center);

    let board = apply_move(&board, pos, Mark::X);
    assert!(board.is_occupied(1, 1));
    assert_eq!(evaluate_outcome(&board), Outcome::Pending);
    assert_eq!(next_turn(Mark::X), Mark::O);
}

#[test]
fn test_scenario_full_board_draw() {
    let rows = r#"[["X","O","X"],["X","O","O"],["O","X","X"]]"#;
    let board: Board = serde_json::from_str(rows).expect("valid board");
    assert!(board.is_full());
    assert_eq!(evaluate_outcome(&board), Outcome::Draw);
}
