//! REST-Interface der Vidrom HTTP-API

pub mod handlers;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::Response;
use vidrom_auth::{DeviceTokenService, GeraeteSpeicher};
use vidrom_signaling::SignalingState;

use crate::error::CommanderError;
use crate::rest::middleware::{bearer_token, fehler_antwort, token_gleich};

/// Axum-State fuer die HTTP-API
#[derive(Clone)]
pub struct CommanderState {
    pub signaling: Arc<SignalingState>,
    pub geraete: Arc<GeraeteSpeicher>,
    pub tokens: Arc<DeviceTokenService>,
    /// Statisches Admin-Token; ohne Token sind die Admin-Routen gesperrt
    pub admin_token: Option<Arc<str>>,
}

impl CommanderState {
    pub fn neu(
        signaling: Arc<SignalingState>,
        geraete: Arc<GeraeteSpeicher>,
        tokens: Arc<DeviceTokenService>,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            signaling,
            geraete,
            tokens,
            admin_token: admin_token.filter(|t| !t.is_empty()).map(Arc::from),
        }
    }
}

/// Prueft das Admin-Token aus dem Authorization-Header
pub fn admin_aus_headers(headers: &HeaderMap, state: &CommanderState) -> Result<(), Response> {
    let erwartet = state.admin_token.as_deref().ok_or_else(|| {
        tracing::warn!("Admin-Zugriff abgelehnt: kein Admin-Token konfiguriert");
        fehler_antwort(CommanderError::NichtAutorisiert("kein Admin-Token konfiguriert".into()))
    })?;

    match bearer_token(headers) {
        Some(token) if token_gleich(token, erwartet) => Ok(()),
        Some(_) => Err(fehler_antwort(CommanderError::NichtAutorisiert(
            "falsches Admin-Token".into(),
        ))),
        None => Err(fehler_antwort(CommanderError::NichtAutorisiert(
            "Authorization-Header fehlt".into(),
        ))),
    }
}
