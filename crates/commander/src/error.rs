//! Fehlertypen fuer die Vidrom HTTP-API

use thiserror::Error;
use vidrom_auth::AuthError;

/// Alle moeglichen Fehler im Commander-Crate
#[derive(Debug, Error)]
pub enum CommanderError {
    #[error("Nicht autorisiert: {0}")]
    NichtAutorisiert(String),

    #[error("Ressource nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Auth-Fehler: {0}")]
    Auth(#[from] AuthError),

    #[error("Interner Fehler: {0}")]
    Intern(String),
}

pub type CommanderResult<T> = Result<T, CommanderError>;

/// HTTP-Statuscode fuer REST-Fehler
impl CommanderError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NichtAutorisiert(_) => 401,
            Self::NichtGefunden(_) => 404,
            Self::UngueltigeEingabe(_) => 400,
            Self::Auth(AuthError::ProvisionierungsCodeUngueltig) => 401,
            Self::Auth(_) | Self::Intern(_) => 500,
        }
    }

    /// Text fuer das `error`-Feld der Antwort
    pub fn client_meldung(&self) -> String {
        match self {
            Self::NichtAutorisiert(_) => "Unauthorized".into(),
            Self::Auth(AuthError::ProvisionierungsCodeUngueltig) => "Invalid or expired code".into(),
            Self::Auth(_) | Self::Intern(_) => "Internal server error".into(),
            Self::NichtGefunden(m) | Self::UngueltigeEingabe(m) => m.clone(),
        }
    }
}
