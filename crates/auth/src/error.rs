//! Fehlertypen fuer den Auth-Service

use thiserror::Error;
use vidrom_core::DeviceId;

/// Alle moeglichen Fehler im Auth-Service
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    // --- Intercom-Registrierung ---
    #[error("Kein Geraete-Token angegeben")]
    TokenFehlt,

    #[error("Geraete-Token ungueltig: {0}")]
    TokenUngueltig(String),

    #[error("Geraete-Token abgelaufen")]
    TokenAbgelaufen,

    #[error("Geraet nicht gefunden: {0}")]
    GeraetNichtGefunden(DeviceId),

    #[error("Geraet nicht aktiv: {0}")]
    GeraetWiderrufen(DeviceId),

    // --- Provisionierung ---
    #[error("Provisionierungscode ungueltig oder bereits eingeloest")]
    ProvisionierungsCodeUngueltig,

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    pub fn ungueltig(grund: impl Into<String>) -> Self {
        Self::TokenUngueltig(grund.into())
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;
