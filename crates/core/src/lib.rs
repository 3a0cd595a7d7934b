//! vidrom-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die Bausteine bereit, die von allen anderen
//! Vidrom-Crates gemeinsam genutzt werden: Rollen, Verbindungs- und
//! Geraete-IDs sowie der zentrale Fehler-Enum.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{CoreError, Result};
pub use types::{ConnectionId, DeviceId, Rolle};
