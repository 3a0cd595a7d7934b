//! REST-Handler fuer Anruf-Aktionen ohne WebSocket
//!
//! Die Home-App kann aus einer Notification heraus ablehnen und ihr
//! FCM-Token registrieren, ohne eine Verbindung offen zu halten.

use std::str::FromStr;

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use vidrom_core::Rolle;

use crate::error::CommanderError;
use crate::rest::middleware::{fehler_antwort, JsonKoerper};
use crate::rest::CommanderState;

/// POST /decline
pub async fn post_decline(State(state): State<CommanderState>) -> Response {
    let weitergeleitet = state.signaling.anruf_ablehnen();
    tracing::info!(weitergeleitet, "Ablehnen per HTTP");
    Json(json!({ "ok": true })).into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FcmTokenBody {
    pub role: Option<String>,
    pub token: Option<String>,
}

/// POST /register-fcm-token
pub async fn post_register_fcm_token(
    State(state): State<CommanderState>,
    JsonKoerper(body): JsonKoerper<FcmTokenBody>,
) -> Response {
    let (rolle, token) = match (body.role, body.token) {
        (Some(r), Some(t)) if !r.is_empty() && !t.is_empty() => (r, t),
        _ => {
            return fehler_antwort(CommanderError::UngueltigeEingabe(
                "role and token required".into(),
            ))
        }
    };

    let rolle = match Rolle::from_str(&rolle) {
        Ok(r) => r,
        Err(_) => {
            return fehler_antwort(CommanderError::UngueltigeEingabe(format!(
                "invalid role: {rolle}"
            )))
        }
    };

    state.signaling.fcm_token_setzen(rolle, token);
    Json(json!({ "ok": true })).into_response()
}
