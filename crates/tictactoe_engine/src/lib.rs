//! Tic-tac-toe engine - board model, rules and AI move selection.
//!
//! Everything in this crate is pure and synchronous. The server crate
//! composes these pieces into authoritative game sessions.
//!
//! # Architecture
//!
//! - **Board**: immutable 3x3 grid value type
//! - **Rules**: move validation, outcome evaluation, turn alternation
//! - **AI**: random, heuristic and minimax move selection
//!
//! # Example
//!
//! ```
//! use tictactoe_engine::{Board, Mark, Outcome, apply_move, evaluate_outcome, validate_move};
//!
//! let board = Board::empty();
//! let pos = validate_move(&board, 1, 1).expect("centre is free");
//! let board = apply_move(&board, pos, Mark::X);
//! assert_eq!(evaluate_outcome(&board), Outcome::Pending);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod ai;
mod board;
mod position;
mod rules;
mod types;

// Crate-level exports - Domain types
pub use types::{Cell, Mark, Outcome};

// Crate-level exports - Board model
pub use board::{Board, BoardError, BoardRows};
pub use position::Position;

// Crate-level exports - Rules engine
pub use rules::{
    LINES, MoveError, apply_move, evaluate_outcome, is_draw, legal_moves, next_turn,
    validate_move, winner,
};

// Crate-level exports - AI engine
pub use ai::{Difficulty, best_move, choose_move, completing_move, heuristic_move, random_move};
