//! Plain HTTP endpoints: message board, heartbeats, page listing.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use roster_core::BoardMessage;

use super::AppState;
use crate::pages::list_pages;
use crate::presence::heartbeat_id;

/// Body of `POST /api/messages`.
#[derive(Debug, Default, Deserialize)]
struct NewMessage {
    #[serde(default)]
    text: Option<String>,
}

/// Body of `POST /track-online`.
#[derive(Debug, Default, Deserialize)]
struct Heartbeat {
    #[serde(default)]
    id: Option<String>,
}

/// Parses a JSON body, treating an empty or malformed one as "no fields".
fn lenient_json<T: for<'de> Deserialize<'de> + Default>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

/// `GET /api/messages`
pub(super) async fn list_messages(State(state): State<AppState>) -> Json<Vec<BoardMessage>> {
    Json(state.board.list().await)
}

/// `POST /api/messages`
pub(super) async fn post_message(State(state): State<AppState>, body: Bytes) -> Response {
    let request: NewMessage = lenient_json(&body);

    match state.board.post(request.text.as_deref()).await {
        Ok(message) => (StatusCode::CREATED, Json(message)).into_response(),
        Err(e) => {
            debug!(error = %e, "Rejected message post");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Message text is required" })),
            )
                .into_response()
        }
    }
}

/// `POST /track-online`
pub(super) async fn track_online(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let request: Heartbeat = lenient_json(&body);
    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok());

    let id = heartbeat_id(request.id.as_deref(), forwarded_for, &peer.ip().to_string());
    state.heartbeats.record(id).await;

    StatusCode::OK
}

/// `GET /online-users`
pub(super) async fn online_users(State(state): State<AppState>) -> Json<serde_json::Value> {
    let online = state.heartbeats.online_count().await;
    Json(json!({ "online": online }))
}

/// `GET /pages`
pub(super) async fn pages(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(list_pages(&state.public_dir).await)
}
