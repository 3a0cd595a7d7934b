//! Fehlertypen fuer den Signaling-Service

use thiserror::Error;
use vidrom_auth::AuthError;
use vidrom_protocol::ProtocolError;

/// Fehlertyp fuer den Signaling-Service
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Eingehender Frame nicht verwertbar
    #[error("Protokollfehler: {0}")]
    Protokoll(#[from] ProtocolError),

    /// Intercom-Registrierung abgelehnt
    #[error("Authentifizierungsfehler: {0}")]
    Auth(#[from] AuthError),

    /// Registrierung mit unbekannter Rolle
    #[error("Ungueltige Rolle: {0}")]
    UngueltigeRolle(String),

    /// Nachricht erfordert eine registrierte Rolle
    #[error("Verbindung hat keine Rolle")]
    NichtRegistriert,

    /// Relay-Ziel nicht verbunden
    #[error("Gegenstelle nicht verbunden")]
    GegenstelleFehlt,
}

impl SignalingError {
    /// Text der `error`-Nachricht an den Client, falls der Fehler gemeldet wird
    ///
    /// Auth-Fehler werden gemeldet (danach wird geschlossen), ebenso eine
    /// fehlende Gegenstelle bei `watch`. Alles andere wird nur geloggt.
    pub fn client_meldung(&self) -> Option<&'static str> {
        match self {
            Self::Auth(AuthError::TokenFehlt) => Some("Token required"),
            Self::Auth(AuthError::TokenUngueltig(_) | AuthError::TokenAbgelaufen) => {
                Some("Invalid token")
            }
            Self::Auth(AuthError::GeraetNichtGefunden(_)) => Some("Device not found"),
            Self::Auth(AuthError::GeraetWiderrufen(_)) => Some("Device revoked"),
            Self::Auth(_) => Some("Authentication failed"),
            Self::GegenstelleFehlt => Some("Intercom not connected"),
            _ => None,
        }
    }

    /// Ob die Verbindung nach diesem Fehler geschlossen wird
    pub fn erzwingt_schliessen(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;
