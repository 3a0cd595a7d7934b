//! vidrom-commander – HTTP-API neben dem WebSocket-Signaling
//!
//! - **Anruf-Aktionen**: Ablehnen aus der Notification, FCM-Token per HTTP
//! - **Provisionierung**: Geraete loesen ihren Code gegen ein Token ein
//! - **Admin** (/api/admin/...): Geraete anlegen, auflisten, widerrufen
//!
//! Alle Handler arbeiten auf demselben [`vidrom_signaling::SignalingState`]
//! wie die WebSocket-Verbindungen.

pub mod error;
pub mod rest;

pub use error::{CommanderError, CommanderResult};
pub use rest::{routes::router, CommanderState};
