//! Route handlers.

use super::dto::{CreateGameRequest, GameEnvelope, GameView, GamesEnvelope, MoveRequest};
use super::error::ApiError;
use super::{AppState, Caller};
use crate::session::{GameId, GameMode, GameSession};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{Extension, Json};
use serde_json::{Value, json};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{instrument, warn};

/// SSE event name for state snapshots.
const GAME_STATE_EVENT: &str = "gameState";

/// A malformed id names no game, so it reads as not found.
fn parse_id(raw: &str) -> Result<GameId, ApiError> {
    raw.parse().map_err(|_| {
        warn!(id = %raw, "Malformed game id");
        ApiError::NotFound(format!("Game {} not found", raw))
    })
}

fn state_event(session: &GameSession) -> Result<Event, axum::Error> {
    Event::default()
        .event(GAME_STATE_EVENT)
        .json_data(GameView::from(session))
}

pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip_all, fields(player_id = %caller.0))]
pub(super) async fn create_game(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    body: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GameEnvelope>), ApiError> {
    let Json(request) = body?;
    let mode = if request.is_single_player {
        GameMode::VsAi(
            request
                .difficulty
                .unwrap_or_else(|| state.gateway.default_difficulty()),
        )
    } else {
        GameMode::TwoPlayer
    };

    let session = state.gateway.create(caller.0, mode).await?;
    Ok((StatusCode::CREATED, Json(GameEnvelope::from(&session))))
}

#[instrument(skip_all)]
pub(super) async fn available_games(
    State(state): State<AppState>,
) -> Result<Json<GamesEnvelope>, ApiError> {
    let games = state.gateway.available_games().await?;
    Ok(Json(GamesEnvelope::from(games.as_slice())))
}

#[instrument(skip_all, fields(player_id = %caller.0))]
pub(super) async fn my_games(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<GamesEnvelope>, ApiError> {
    let games = state.gateway.player_games(caller.0).await?;
    Ok(Json(GamesEnvelope::from(games.as_slice())))
}

#[instrument(skip_all, fields(game_id = %id))]
pub(super) async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameEnvelope>, ApiError> {
    let session = state.gateway.get(parse_id(&id)?).await?;
    Ok(Json(GameEnvelope::from(&session)))
}

#[instrument(skip_all, fields(game_id = %id, player_id = %caller.0))]
pub(super) async fn join_game(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<GameEnvelope>, ApiError> {
    let session = state.gateway.join(parse_id(&id)?, caller.0).await?;
    Ok(Json(GameEnvelope::from(&session)))
}

#[instrument(skip_all, fields(game_id = %id, player_id = %caller.0))]
pub(super) async fn spectate_game(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<GameEnvelope>, ApiError> {
    let session = state.gateway.spectate(parse_id(&id)?, caller.0).await?;
    Ok(Json(GameEnvelope::from(&session)))
}

#[instrument(skip_all, fields(game_id = %id, player_id = %caller.0))]
pub(super) async fn make_move(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    body: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<GameEnvelope>, ApiError> {
    let Json(MoveRequest { row, col }) = body?;
    let session = state
        .gateway
        .make_move(parse_id(&id)?, caller.0, row, col)
        .await?;
    Ok(Json(GameEnvelope::from(&session)))
}

/// Streams the current state, then every change, as `gameState` events.
#[instrument(skip_all, fields(game_id = %id))]
pub(super) async fn game_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (current, rx) = state.gateway.subscribe(parse_id(&id)?).await?;

    let updates = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(session) => Some(state_event(&session)),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            // The next snapshot carries the full state.
            warn!(skipped, "Subscriber lagged");
            None
        }
    });
    let stream = tokio_stream::once(state_event(&current)).chain(updates);

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
