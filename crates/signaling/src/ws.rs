//! WebSocket-Endpunkt – nimmt Upgrades an und startet Verbindungs-Tasks
//!
//! Der `SignalingServer` liefert einen axum-Router mit `GET /` und
//! `GET /ws`. Jede akzeptierte Verbindung laeuft als eigener tokio-Task mit
//! einer [`ClientConnection`].

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::sync::watch;

use crate::connection::ClientConnection;
use crate::server_state::SignalingState;

/// WebSocket-Signaling-Server
#[derive(Clone)]
pub struct SignalingServer {
    state: Arc<SignalingState>,
    shutdown_rx: watch::Receiver<bool>,
}

impl SignalingServer {
    /// Erstellt einen neuen SignalingServer
    ///
    /// Offene Verbindungen werden getrennt sobald `shutdown_rx` `true` meldet.
    pub fn neu(state: Arc<SignalingState>, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self { state, shutdown_rx }
    }

    /// Router mit den WebSocket-Routen
    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(ws_upgrade))
            .route("/ws", get(ws_upgrade))
            .with_state(self)
    }
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(server): State<SignalingServer>) -> Response {
    let verbindung = ClientConnection::neu(Arc::clone(&server.state));
    tracing::debug!(verbindung = %verbindung.id(), "WebSocket-Upgrade angenommen");
    ws.on_upgrade(move |socket| verbindung.verarbeiten(socket, server.shutdown_rx))
}
