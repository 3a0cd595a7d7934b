//! Hilfsfunktionen fuer Auth-Header, JSON-Bodies und Fehlerantworten

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::error::{CommanderError, CommanderResult};

/// Fehlerantwort fuer die REST-API: `{ "error": "..." }`
pub fn fehler_antwort(fehler: CommanderError) -> Response {
    let status =
        StatusCode::from_u16(fehler.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(fehler = %fehler, "Anfrage fehlgeschlagen");
    } else {
        tracing::debug!(fehler = %fehler, status = status.as_u16(), "Anfrage abgelehnt");
    }
    (status, Json(json!({ "error": fehler.client_meldung() }))).into_response()
}

/// Extrahiert Bearer-Token aus Authorization-Header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

/// Vergleicht zwei Tokens in konstanter Zeit
pub fn token_gleich(gesendet: &str, erwartet: &str) -> bool {
    gesendet.as_bytes().ct_eq(erwartet.as_bytes()).into()
}

/// JSON-Body-Extraktor
///
/// Verlangt keinen `Content-Type`. Nicht lesbare Bodies werden mit
/// 400 `{ "error": "Invalid JSON" }` abgelehnt.
pub struct JsonKoerper<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonKoerper<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        json_lesen(req, state).await.map(JsonKoerper).map_err(fehler_antwort)
    }
}

async fn json_lesen<S, T>(req: Request, state: &S) -> CommanderResult<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    let bytes = Bytes::from_request(req, state)
        .await
        .map_err(|_| ungueltiges_json())?;
    serde_json::from_slice(&bytes).map_err(|_| ungueltiges_json())
}

fn ungueltiges_json() -> CommanderError {
    CommanderError::UngueltigeEingabe("Invalid JSON".into())
}
