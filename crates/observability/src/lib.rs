//! # vidrom-observability
//!
//! Observability-Crate fuer Vidrom:
//! - Health-Check-Endpunkt (`/health`) mit Signaling-Status
//! - Structured Logging (Text oder JSON) via tracing-subscriber

pub mod health;
pub mod logging;

pub use health::{health_router, HealthDetails, HealthResponse, HealthState};
pub use logging::logging_initialisieren;
