//! Health-Check-Endpunkt fuer Vidrom
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime und welche Rollen gerade
//! verbunden sind. Der Signaling-Status kommt ueber eine Abfrage-Funktion
//! herein, damit dieser Crate nicht vom Signaling abhaengt.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Momentaufnahme des Signaling-Zustands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDetails {
    pub intercom_connected: bool,
    pub home_connected: bool,
    pub ring_pending: bool,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    #[serde(flatten)]
    pub details: HealthDetails,
}

type DetailsFn = Arc<dyn Fn() -> HealthDetails + Send + Sync>;

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
pub struct HealthState {
    start_time: Instant,
    details: DetailsFn,
}

impl HealthState {
    pub fn neu(details: impl Fn() -> HealthDetails + Send + Sync + 'static) -> Self {
        Self {
            start_time: Instant::now(),
            details: Arc::new(details),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn antwort(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            details: (self.details)(),
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck
async fn health_handler(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(state.antwort())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    #[test]
    fn antwort_enthaelt_details() {
        let state = HealthState::neu(|| HealthDetails {
            intercom_connected: true,
            home_connected: false,
            ring_pending: true,
        });
        let antwort = state.antwort();
        assert_eq!(antwort.status, "ok");
        assert!(antwort.uptime_seconds < 5);
        assert!(antwort.details.intercom_connected);
        assert!(antwort.details.ring_pending);
    }

    #[test]
    fn serialisierung_ist_flach() {
        let state = HealthState::neu(HealthDetails::default);
        let json = serde_json::to_value(state.antwort()).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["home_connected"], false);
        assert_eq!(json["ring_pending"], false);
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn endpunkt_fragt_aktuellen_zustand_ab() {
        let klingelt = Arc::new(AtomicBool::new(false));
        let k = Arc::clone(&klingelt);
        let app = health_router(HealthState::neu(move || HealthDetails {
            ring_pending: k.load(Ordering::Relaxed),
            ..HealthDetails::default()
        }));

        klingelt.store(true, Ordering::Relaxed);
        let antwort = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(antwort.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(antwort.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["ring_pending"], true);
    }
}
