//! JSON API over a running game session.
//!
//! | Method | Path                | Effect                      |
//! |--------|---------------------|-----------------------------|
//! | GET    | `/api/state`        | current snapshot            |
//! | POST   | `/api/cells/{index}`| human selects a cell        |
//! | POST   | `/api/reset`        | clear the board             |
//! | POST   | `/api/ai-game`      | start a game against the AI |
//!
//! Every route answers with the snapshot taken right after the request was
//! handled. A rejected move is not an HTTP error: the unchanged snapshot
//! comes back with 200.

use crate::session::{InputEvent, SessionHandle, Snapshot};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use rival_tictactoe::Board;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

/// Builds the API router for `handle`.
pub fn router(handle: SessionHandle) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/cells/{index}", post(select_cell))
        .route("/api/reset", post(reset))
        .route("/api/ai-game", post(start_ai_game))
        .with_state(handle)
}

/// Serves the API on `host:port` until the listener fails.
///
/// # Errors
///
/// Fails if the address cannot be bound or the server stops with an error.
#[instrument(skip(handle))]
pub async fn serve(host: String, port: u16, handle: SessionHandle) -> std::io::Result<()> {
    let listener = TcpListener::bind((host.as_str(), port)).await?;
    info!(addr = %listener.local_addr()?, "HTTP API ready");
    axum::serve(listener, router(handle)).await
}

#[instrument(skip(handle))]
async fn get_state(State(handle): State<SessionHandle>) -> Json<Snapshot> {
    Json(handle.snapshot())
}

#[instrument(skip(handle))]
async fn select_cell(
    State(handle): State<SessionHandle>,
    Path(index): Path<usize>,
) -> Result<Json<Snapshot>, StatusCode> {
    if index >= Board::CELLS {
        warn!(index, "Cell index out of range");
        return Err(StatusCode::BAD_REQUEST);
    }
    dispatch(&handle, InputEvent::CellSelected(index)).await
}

#[instrument(skip(handle))]
async fn reset(State(handle): State<SessionHandle>) -> Result<Json<Snapshot>, StatusCode> {
    dispatch(&handle, InputEvent::Reset).await
}

#[instrument(skip(handle))]
async fn start_ai_game(State(handle): State<SessionHandle>) -> Result<Json<Snapshot>, StatusCode> {
    dispatch(&handle, InputEvent::StartAiGame).await
}

async fn dispatch(handle: &SessionHandle, input: InputEvent) -> Result<Json<Snapshot>, StatusCode> {
    handle.send(input).await.map(Json).map_err(|e| {
        error!(error = %e, "Session unavailable");
        StatusCode::SERVICE_UNAVAILABLE
    })
}
