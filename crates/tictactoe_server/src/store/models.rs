//! Database rows and their mapping to sessions.

use chrono::NaiveDateTime;
use derive_new::new;
use diesel::prelude::*;
use std::collections::BTreeSet;
use std::str::FromStr;
use tictactoe_engine::{Difficulty, Mark};
use tracing::{instrument, warn};

use super::codec::{CorruptBoardPolicy, DecodedBoard, decode_board_with, encode_board};
use super::schema;
use crate::error::StoreError;
use crate::session::{GameId, GameSession, GameStatus, Opponent, PlayerId, SessionRecord};

/// Game database row. Used for reads and upserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = schema::games)]
#[diesel(treat_none_as_null = true)]
pub struct GameRow {
    id: String,
    board: String,
    current_player: String,
    status: String,
    player_x: String,
    player_o: Option<String>,
    ai_difficulty: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// Spectator row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, new)]
#[diesel(table_name = schema::spectators)]
pub struct SpectatorRow {
    game_id: String,
    session_id: String,
}

fn parse_field<T: FromStr>(game_id: &str, field: &str, raw: &str) -> Result<T, StoreError> {
    raw.parse().map_err(|_| {
        StoreError::corrupt(format!(
            "game {}: invalid {} value {:?}",
            game_id, field, raw
        ))
    })
}

impl SpectatorRow {
    /// Game this row belongs to.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }
}

impl GameRow {
    /// Stored game id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Flattens a session into a row.
    ///
    /// The O seat is stored as `player_o` for a human or `ai_difficulty` for
    /// the AI. Both are null while the seat is open.
    pub fn from_session(session: &GameSession) -> Result<Self, StoreError> {
        let (player_o, ai_difficulty) = match session.opponent() {
            Some(Opponent::Human(id)) => (Some(id.to_string()), None),
            Some(Opponent::Ai(difficulty)) => (None, Some(difficulty.to_string())),
            None => (None, None),
        };

        Ok(Self {
            id: session.id().to_string(),
            board: encode_board(session.board())?,
            current_player: session.turn().to_string(),
            status: session.status().to_string(),
            player_x: session.player_x().to_string(),
            player_o,
            ai_difficulty,
            created_at: *session.created_at(),
            updated_at: *session.updated_at(),
        })
    }

    /// Spectator rows for a session.
    pub fn spectator_rows(session: &GameSession) -> Vec<SpectatorRow> {
        session
            .spectators()
            .iter()
            .map(|s| SpectatorRow::new(session.id().to_string(), s.to_string()))
            .collect()
    }

    /// Rebuilds the session this row describes.
    ///
    /// # Errors
    ///
    /// Returns a corrupt [`StoreError`] if a column does not parse or the
    /// fields contradict each other.
    #[instrument(skip(self, spectators), fields(game_id = %self.id))]
    pub fn into_session(
        self,
        spectators: Vec<SpectatorRow>,
        policy: CorruptBoardPolicy,
    ) -> Result<GameSession, StoreError> {
        let id: GameId = parse_field(&self.id, "id", &self.id)?;

        let opponent = match (self.player_o, self.ai_difficulty) {
            (None, None) => None,
            (Some(o), None) => Some(Opponent::Human(PlayerId::new(o))),
            (None, Some(d)) => Some(Opponent::Ai(parse_field::<Difficulty>(
                &self.id,
                "ai_difficulty",
                &d,
            )?)),
            (Some(_), Some(_)) => {
                return Err(StoreError::corrupt(format!(
                    "game {}: both a human and the AI hold the O seat",
                    self.id
                )));
            }
        };

        let (board, turn, status) = match decode_board_with(&self.board, policy)? {
            DecodedBoard::Stored(board) => (
                board,
                parse_field::<Mark>(&self.id, "current_player", &self.current_player)?,
                parse_field::<GameStatus>(&self.id, "status", &self.status)?,
            ),
            DecodedBoard::Reset => {
                let status = if opponent.is_some() {
                    GameStatus::InProgress
                } else {
                    GameStatus::Waiting
                };
                warn!(status = %status, "Restarting game after board reset");
                (DecodedBoard::Reset.board(), Mark::X, status)
            }
        };

        let spectators: BTreeSet<PlayerId> = spectators
            .into_iter()
            .map(|row| PlayerId::new(row.session_id))
            .collect();

        GameSession::restore(SessionRecord {
            id,
            board,
            turn,
            status,
            player_x: PlayerId::new(self.player_x),
            opponent,
            spectators,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
