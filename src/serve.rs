//! Websocket endpoint for editing sessions
//!
//! A single route at `/` upgrades to a websocket and hands the connection
//! to the session handler. Each connection gets its own task; they all
//! share one [`EditorState`].

use crate::session::{self, EditorState};
use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;
use axum::routing::get;
use color_eyre::eyre::{Result, WrapErr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub fn build_router(state: Arc<EditorState>) -> Router {
    Router::new().route("/", get(ws_handler)).with_state(state)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<EditorState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| session::handle_socket(socket, state))
}

/// Bind the editing endpoint. Failure to bind is fatal at startup.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let listener = TcpListener::bind((host, port))
        .await
        .wrap_err_with(|| format!("failed to bind live-edit endpoint on {host}:{port}"))?;
    let addr = listener.local_addr()?;
    tracing::info!("live-edit listening on ws://{addr}");
    Ok(listener)
}

/// Serve editing sessions on an already-bound listener until shutdown.
pub async fn run(listener: TcpListener, state: Arc<EditorState>) -> Result<()> {
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// Run the endpoint in the background.
pub fn spawn(listener: TcpListener, state: Arc<EditorState>) -> JoinHandle<Result<()>> {
    tokio::spawn(run(listener, state))
}
