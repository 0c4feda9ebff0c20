//! Request and response bodies.

use crate::session::{GameId, GameSession, GameStatus, PlayerId};
use chrono::{DateTime, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tictactoe_engine::{Board, Difficulty, Mark, Outcome};

/// Body of `POST /api/games/create`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Play against the AI.
    #[serde(default)]
    pub is_single_player: bool,
    /// AI difficulty; server default when absent.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

/// Body of `POST /api/games/{id}/move`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MoveRequest {
    /// Target row.
    pub row: i64,
    /// Target column.
    pub col: i64,
}

/// Client view of a game.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    id: GameId,
    board: Board,
    current_player: Mark,
    status: GameStatus,
    outcome: &'static str,
    winner: Option<String>,
    player_x: PlayerId,
    player_o: Option<String>,
    difficulty: Option<Difficulty>,
    spectators: Vec<PlayerId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Pending => "pending",
        Outcome::Win(Mark::X) => "x_wins",
        Outcome::Win(Mark::O) => "o_wins",
        Outcome::Draw => "draw",
    }
}

impl From<&GameSession> for GameView {
    fn from(session: &GameSession) -> Self {
        Self {
            id: *session.id(),
            board: *session.board(),
            current_player: session.turn(),
            status: session.status(),
            outcome: outcome_label(session.outcome()),
            winner: session.winner_label(),
            player_x: session.player_x().clone(),
            player_o: session.o_label(),
            difficulty: session.ai_difficulty(),
            spectators: session.spectators().iter().cloned().collect(),
            created_at: session.created_at().and_utc(),
            updated_at: session.updated_at().and_utc(),
        }
    }
}

/// `{"success": true, "game": {...}}`
#[derive(Debug, Clone, Serialize)]
pub struct GameEnvelope {
    success: bool,
    game: GameView,
}

impl From<&GameSession> for GameEnvelope {
    fn from(session: &GameSession) -> Self {
        Self {
            success: true,
            game: session.into(),
        }
    }
}

/// `{"success": true, "games": [...]}`
#[derive(Debug, Clone, Serialize)]
pub struct GamesEnvelope {
    success: bool,
    games: Vec<GameView>,
}

impl From<&[GameSession]> for GamesEnvelope {
    fn from(sessions: &[GameSession]) -> Self {
        Self {
            success: true,
            games: sessions.iter().map(GameView::from).collect(),
        }
    }
}

/// `{"success": false, "message": "..."}`
#[derive(Debug, Clone, Serialize, new)]
pub struct ErrorEnvelope {
    #[new(value = "false")]
    success: bool,
    message: String,
}
