//! Authoritative game session state and its transitions.
//!
//! A [`GameSession`] owns its board. Fields are private; the only way to
//! change a session is through [`GameSession::join`],
//! [`GameSession::make_move`], [`GameSession::play_ai_turn`],
//! [`GameSession::play_turn`] and [`GameSession::add_spectator`], which keep
//! board, turn and status mutually consistent.

use crate::error::{GameError, StoreError};
use chrono::{NaiveDateTime, Utc};
use derive_getters::Getters;
use derive_more::{Display, From};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use tictactoe_engine::{
    Board, Difficulty, Mark, Outcome, Position, apply_move, choose_move, evaluate_outcome,
    next_turn, validate_move,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Unique identifier for a game session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct GameId(Uuid);

impl GameId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Opaque identity of a participant (the caller's session id).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a player id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Lifecycle status of a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    /// Waiting for player O to join.
    Waiting,
    /// Both seats filled and the board undecided.
    InProgress,
    /// Won or drawn. Terminal.
    Finished,
}

/// Who occupies the O seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opponent {
    /// A second human.
    Human(PlayerId),
    /// The built-in AI at the given difficulty.
    Ai(Difficulty),
}

/// How a new session is set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Two humans; O joins later by id.
    TwoPlayer,
    /// Single player against the AI, which takes O immediately.
    VsAi(Difficulty),
}

/// Moves applied by one [`GameSession::play_turn`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    /// The human's move.
    pub human: Position,
    /// The AI's reply, if the AI moved.
    pub ai: Option<Position>,
}

/// Raw session fields as read back from storage.
///
/// Turned into a [`GameSession`] by [`GameSession::restore`], which rejects
/// records whose fields contradict each other.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Session id.
    pub id: GameId,
    /// Board.
    pub board: Board,
    /// Mark on turn.
    pub turn: Mark,
    /// Stored status.
    pub status: GameStatus,
    /// Player X.
    pub player_x: PlayerId,
    /// O seat.
    pub opponent: Option<Opponent>,
    /// Spectators.
    pub spectators: BTreeSet<PlayerId>,
    /// Creation time (UTC).
    pub created_at: NaiveDateTime,
    /// Last update time (UTC).
    pub updated_at: NaiveDateTime,
}

/// One game's authoritative state plus participant identities.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameSession {
    /// Session ID.
    id: GameId,
    /// The board.
    board: Board,
    /// Mark on turn.
    #[getter(skip)]
    turn: Mark,
    /// Lifecycle status.
    #[getter(skip)]
    status: GameStatus,
    /// Player X (the creator).
    player_x: PlayerId,
    /// O seat; `None` while waiting for a second player.
    opponent: Option<Opponent>,
    /// Spectator identities.
    spectators: BTreeSet<PlayerId>,
    /// Creation time (UTC).
    created_at: NaiveDateTime,
    /// Last update time (UTC).
    updated_at: NaiveDateTime,
}

/// Name shown for the AI in place of a player id.
pub const AI_LABEL: &str = "AI";

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Status implied by the board and the O seat.
fn derived_status(board: &Board, opponent: Option<&Opponent>) -> GameStatus {
    match opponent {
        None => GameStatus::Waiting,
        Some(_) if evaluate_outcome(board).is_decided() => GameStatus::Finished,
        Some(_) => GameStatus::InProgress,
    }
}

impl GameSession {
    /// Creates a new game session with X to move on an empty board.
    #[instrument(skip(player_x), fields(player_x = %player_x))]
    pub fn create(player_x: PlayerId, mode: GameMode) -> Self {
        let (status, opponent) = match mode {
            GameMode::TwoPlayer => (GameStatus::Waiting, None),
            GameMode::VsAi(difficulty) => (GameStatus::InProgress, Some(Opponent::Ai(difficulty))),
        };
        let created_at = now();
        let session = Self {
            id: GameId::new(),
            board: Board::empty(),
            turn: Mark::X,
            status,
            player_x,
            opponent,
            spectators: BTreeSet::new(),
            created_at,
            updated_at: created_at,
        };
        info!(session_id = %session.id, ?mode, status = %status, "Created new game session");
        session
    }

    /// Rebuilds a session from stored fields.
    ///
    /// # Errors
    ///
    /// Returns a corrupt [`StoreError`] if the turn does not match the mark
    /// counts, the status contradicts the board and O seat, or a waiting
    /// game already has marks on it.
    pub fn restore(record: SessionRecord) -> Result<Self, StoreError> {
        let expected_turn = record.board.side_to_move();
        if record.turn != expected_turn {
            return Err(StoreError::corrupt(format!(
                "game {}: turn {} but board implies {}",
                record.id, record.turn, expected_turn
            )));
        }

        let expected_status = derived_status(&record.board, record.opponent.as_ref());
        if record.status != expected_status {
            return Err(StoreError::corrupt(format!(
                "game {}: status {} but board and seats imply {}",
                record.id, record.status, expected_status
            )));
        }

        if record.status == GameStatus::Waiting && record.board != Board::empty() {
            return Err(StoreError::corrupt(format!(
                "game {}: waiting for a player but moves were made",
                record.id
            )));
        }

        if matches!(&record.opponent, Some(Opponent::Human(o)) if *o == record.player_x) {
            return Err(StoreError::corrupt(format!(
                "game {}: same player holds both seats",
                record.id
            )));
        }

        Ok(Self {
            id: record.id,
            board: record.board,
            turn: record.turn,
            status: record.status,
            player_x: record.player_x,
            opponent: record.opponent,
            spectators: record.spectators,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Mark currently on turn.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Lifecycle status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Outcome, recomputed from the board.
    pub fn outcome(&self) -> Outcome {
        evaluate_outcome(&self.board)
    }

    /// AI difficulty when the O seat is held by the AI.
    pub fn ai_difficulty(&self) -> Option<Difficulty> {
        match self.opponent {
            Some(Opponent::Ai(difficulty)) => Some(difficulty),
            _ => None,
        }
    }

    /// Human occupying the O seat, if any.
    pub fn player_o(&self) -> Option<&PlayerId> {
        match &self.opponent {
            Some(Opponent::Human(id)) => Some(id),
            _ => None,
        }
    }

    /// Display name of the O seat: the human's id, `"AI"`, or `None` while open.
    pub fn o_label(&self) -> Option<String> {
        match &self.opponent {
            Some(Opponent::Human(id)) => Some(id.to_string()),
            Some(Opponent::Ai(_)) => Some(AI_LABEL.to_string()),
            None => None,
        }
    }

    /// Identity of the winner, `"AI"` when the AI won.
    pub fn winner_label(&self) -> Option<String> {
        match self.outcome().winner()? {
            Mark::X => Some(self.player_x.to_string()),
            Mark::O => self.o_label(),
        }
    }

    /// Human participants: X, plus O when a human holds it.
    pub fn participants(&self) -> Vec<PlayerId> {
        std::iter::once(self.player_x.clone())
            .chain(self.player_o().cloned())
            .collect()
    }

    /// Resolves an identity to the mark it plays.
    pub fn mark_of(&self, player: &PlayerId) -> Option<Mark> {
        if *player == self.player_x {
            Some(Mark::X)
        } else if self.player_o() == Some(player) {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// Whether the identity holds a seat in this game.
    pub fn is_participant(&self, player: &PlayerId) -> bool {
        self.mark_of(player).is_some()
    }

    /// Whether the AI is next to move.
    pub fn awaits_ai(&self) -> bool {
        self.status == GameStatus::InProgress
            && self.ai_difficulty().is_some()
            && self.turn == Mark::O
    }

    /// Seats player O and starts the game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotJoinable`] unless the game is waiting with an
    /// empty O seat, or if `player_o` already holds the X seat.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn join(&mut self, player_o: PlayerId) -> Result<(), GameError> {
        if self.status != GameStatus::Waiting || self.opponent.is_some() {
            warn!(player_id = %player_o, status = %self.status, "Game not joinable");
            return Err(GameError::NotJoinable);
        }
        if player_o == self.player_x {
            warn!(player_id = %player_o, "Player tried to join own game");
            return Err(GameError::NotJoinable);
        }

        info!(player_id = %player_o, mark = "O", "Registering player as O");
        self.opponent = Some(Opponent::Human(player_o));
        self.status = GameStatus::InProgress;
        self.updated_at = now();
        Ok(())
    }

    /// Makes a move for the given player. Does not trigger the AI.
    ///
    /// On error the session is left unchanged.
    ///
    /// # Errors
    ///
    /// - [`GameError::NotInProgress`] if the game is waiting or finished
    /// - [`GameError::NotAPlayer`] if `actor` holds no seat
    /// - [`GameError::WrongTurn`] if `actor`'s mark is not on turn
    /// - [`GameError::InvalidPosition`] / [`GameError::CellOccupied`] from the rules
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn make_move(
        &mut self,
        actor: &PlayerId,
        row: i64,
        col: i64,
    ) -> Result<Position, GameError> {
        if self.status != GameStatus::InProgress {
            warn!(status = %self.status, "Move attempted outside an active game");
            return Err(GameError::NotInProgress);
        }

        let mark = self.mark_of(actor).ok_or_else(|| {
            warn!(player_id = %actor, "Unknown player attempted move");
            GameError::NotAPlayer(actor.clone())
        })?;

        if mark != self.turn {
            warn!(
                player_id = %actor,
                expected_mark = %self.turn,
                player_mark = %mark,
                "Player tried to move out of turn"
            );
            return Err(GameError::WrongTurn {
                expected: self.turn,
            });
        }

        let pos = validate_move(&self.board, row, col)?;
        self.apply(pos, mark);
        Ok(pos)
    }

    /// Lets the AI make its move.
    ///
    /// # Errors
    ///
    /// - [`GameError::NotInProgress`] if the game is not running
    /// - [`GameError::WrongTurn`] if the AI does not hold O or O is not on turn
    /// - [`GameError::AiNoMoveAvailable`] if the engine found no empty cell
    #[instrument(skip(self, rng), fields(session_id = %self.id))]
    pub fn play_ai_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Position, GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::NotInProgress);
        }
        let difficulty = match self.ai_difficulty() {
            Some(difficulty) if self.turn == Mark::O => difficulty,
            _ => {
                return Err(GameError::WrongTurn {
                    expected: self.turn,
                });
            }
        };

        let pos = choose_move(&self.board, Mark::O, difficulty, rng).ok_or_else(|| {
            error!(board = %self.board, "AI invoked without an empty cell");
            GameError::AiNoMoveAvailable
        })?;

        self.apply(pos, Mark::O);
        Ok(pos)
    }

    /// Human move followed, against the AI, by the AI's reply.
    ///
    /// A human move against the AI advances the game two plies unless the
    /// human's move ends it. If the AI step fails the human's move stays
    /// applied and the error is returned.
    ///
    /// # Errors
    ///
    /// Any error from [`GameSession::make_move`] (session unchanged), or
    /// [`GameError::AiNoMoveAvailable`] from the AI step.
    pub fn play_turn<R: Rng + ?Sized>(
        &mut self,
        actor: &PlayerId,
        row: i64,
        col: i64,
        rng: &mut R,
    ) -> Result<TurnReport, GameError> {
        let human = self.make_move(actor, row, col)?;
        let ai = if self.awaits_ai() {
            Some(self.play_ai_turn(rng)?)
        } else {
            None
        };
        Ok(TurnReport { human, ai })
    }

    /// Adds a spectator. Returns false if already watching.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn add_spectator(&mut self, spectator: PlayerId) -> bool {
        let added = self.spectators.insert(spectator);
        if added {
            self.updated_at = now();
            debug!(count = self.spectators.len(), "Spectator added");
        }
        added
    }

    fn apply(&mut self, pos: Position, mark: Mark) {
        self.board = apply_move(&self.board, pos, mark);
        let outcome = evaluate_outcome(&self.board);
        self.status = if outcome.is_decided() {
            GameStatus::Finished
        } else {
            GameStatus::InProgress
        };
        self.turn = next_turn(mark);
        self.updated_at = now();

        info!(
            session_id = %self.id,
            mark = %mark,
            position = %pos,
            outcome = %outcome,
            "Move applied"
        );
    }
}
