//! HTTP API.
//!
//! Callers identify themselves with the `X-Session-Id` header. Requests
//! without one get a fresh id, echoed back in the response header.

mod dto;
mod error;
mod handlers;

pub use dto::{CreateGameRequest, ErrorEnvelope, GameEnvelope, GameView, GamesEnvelope, MoveRequest};
pub use error::ApiError;

use crate::gateway::SessionGateway;
use crate::session::PlayerId;
use axum::body::Body;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{debug, info};
use uuid::Uuid;

/// Header carrying the caller's session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    gateway: Arc<SessionGateway>,
}

impl AppState {
    /// Wraps a gateway.
    pub fn new(gateway: Arc<SessionGateway>) -> Self {
        Self { gateway }
    }
}

/// Identity of the caller, resolved by the session middleware.
#[derive(Debug, Clone)]
pub struct Caller(pub PlayerId);

/// Builds the application router.
pub fn router(gateway: Arc<SessionGateway>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/games/create", post(handlers::create_game))
        .route("/api/games/available", get(handlers::available_games))
        .route("/api/games/my-games", get(handlers::my_games))
        .route("/api/games/{id}", get(handlers::get_game))
        .route("/api/games/{id}/join", post(handlers::join_game))
        .route("/api/games/{id}/spectate", post(handlers::spectate_game))
        .route("/api/games/{id}/move", post(handlers::make_move))
        .route("/api/games/{id}/events", get(handlers::game_events))
        .with_state(AppState::new(gateway))
        .layer(
            ServiceBuilder::new()
                .map_request(|req: Request<Body>| {
                    info!(
                        method = %req.method(),
                        uri = %req.uri(),
                        "Incoming HTTP request"
                    );
                    req
                })
                .layer(middleware::from_fn(session_id)),
        )
}

/// Resolves the caller's session id and echoes it on the response.
async fn session_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let id = Uuid::new_v4().to_string();
            debug!(session_id = %id, "Minted session id");
            id
        });

    req.extensions_mut().insert(Caller(PlayerId::new(id.clone())));
    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}
