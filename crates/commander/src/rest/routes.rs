//! Route-Definitionen fuer die HTTP-API

use axum::{
    routing::{get, post},
    Router,
};

use crate::rest::{handlers, CommanderState};

/// Erstellt den vollstaendigen API-Router
pub fn router(state: CommanderState) -> Router {
    Router::new()
        // Anruf-Aktionen
        .route("/decline", post(handlers::calls::post_decline))
        .route("/register-fcm-token", post(handlers::calls::post_register_fcm_token))
        // Provisionierung
        .route("/api/devices/provision", post(handlers::devices::post_provision))
        // Admin
        .route(
            "/api/admin/devices",
            get(handlers::devices::list_devices).post(handlers::devices::create_device),
        )
        .route(
            "/api/admin/devices/:id/revoke",
            post(handlers::devices::revoke_device),
        )
        .with_state(state)
}
