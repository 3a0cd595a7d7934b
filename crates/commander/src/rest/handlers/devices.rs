//! REST-Handler fuer Provisionierung und Geraeteverwaltung

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use vidrom_core::DeviceId;

use crate::error::CommanderError;
use crate::rest::middleware::{fehler_antwort, JsonKoerper};
use crate::rest::{admin_aus_headers, CommanderState};

// ---------------------------------------------------------------------------
// Provisionierung (ohne Admin)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProvisionBody {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionAntwort {
    pub token: String,
    pub device_id: DeviceId,
    pub building_id: String,
}

/// POST /api/devices/provision
pub async fn post_provision(
    State(state): State<CommanderState>,
    JsonKoerper(body): JsonKoerper<ProvisionBody>,
) -> Response {
    let code = match body.code.filter(|c| !c.is_empty()) {
        Some(c) => c,
        None => {
            return fehler_antwort(CommanderError::UngueltigeEingabe(
                "Provisioning code required".into(),
            ))
        }
    };

    let ergebnis = state.geraete.code_einloesen(&code).and_then(|geraet| {
        let token = state.tokens.signieren(geraet.device_id, &geraet.building_id)?;
        Ok(ProvisionAntwort {
            token,
            device_id: geraet.device_id,
            building_id: geraet.building_id,
        })
    });

    match ergebnis {
        Ok(antwort) => {
            tracing::info!(device_id = %antwort.device_id, "Geraet per Code provisioniert");
            Json(antwort).into_response()
        }
        Err(e) => fehler_antwort(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/admin/devices
pub async fn list_devices(State(state): State<CommanderState>, headers: HeaderMap) -> Response {
    if let Err(r) = admin_aus_headers(&headers, &state) {
        return r;
    }
    Json(state.geraete.alle()).into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeraetAnlegenBody {
    pub building_id: Option<String>,
    pub name: Option<String>,
}

/// POST /api/admin/devices
pub async fn create_device(
    State(state): State<CommanderState>,
    headers: HeaderMap,
    JsonKoerper(body): JsonKoerper<GeraetAnlegenBody>,
) -> Response {
    if let Err(r) = admin_aus_headers(&headers, &state) {
        return r;
    }

    let (building_id, name) = match (body.building_id, body.name) {
        (Some(b), Some(n)) if !b.is_empty() && !n.is_empty() => (b, n),
        _ => {
            return fehler_antwort(CommanderError::UngueltigeEingabe(
                "buildingId and name required".into(),
            ))
        }
    };

    let neu = state.geraete.geraet_erstellen(&building_id, &name);
    Json(json!({
        "deviceId": neu.geraet.device_id,
        "provisioningCode": neu.code,
    }))
    .into_response()
}

/// POST /api/admin/devices/:id/revoke
pub async fn revoke_device(
    State(state): State<CommanderState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = admin_aus_headers(&headers, &state) {
        return r;
    }

    let device_id = match DeviceId::from_str(&id) {
        Ok(d) => d,
        Err(_) => {
            return fehler_antwort(CommanderError::UngueltigeEingabe(format!(
                "invalid device id: {id}"
            )))
        }
    };

    if !state.geraete.widerrufen(&device_id) {
        return fehler_antwort(CommanderError::NichtGefunden("Device not found".into()));
    }
    Json(json!({ "success": true })).into_response()
}
