//! Fehlertypen fuer das Signaling-Protokoll

use thiserror::Error;

/// Fehler beim Dekodieren oder Kodieren eines Frames
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame ist kein gueltiges JSON
    #[error("Ungueltiges JSON: {0}")]
    UngueltigesJson(#[source] serde_json::Error),

    /// JSON-Objekt ohne `type`-Feld (oder `type` ist kein String)
    #[error("Feld 'type' fehlt")]
    TypFehlt,

    /// Unbekannter Nachrichtentyp – wird ignoriert
    #[error("Unbekannter Nachrichtentyp: {0}")]
    UnbekannterTyp(String),

    /// Bekannter Typ, aber Felder passen nicht zum Schema
    #[error("Ungueltige '{typ}'-Nachricht: {grund}")]
    UngueltigeNachricht { typ: String, grund: String },

    /// Serialisierung fehlgeschlagen
    #[error("Kodierung fehlgeschlagen: {0}")]
    Kodierung(#[source] serde_json::Error),
}

impl ProtocolError {
    /// `true` fuer Frames die nicht als strukturierte Nachricht lesbar sind
    pub fn ist_fehlerhaft(&self) -> bool {
        matches!(
            self,
            Self::UngueltigesJson(_) | Self::TypFehlt | Self::UngueltigeNachricht { .. }
        )
    }
}

/// Result-Typ fuer das Signaling-Protokoll
pub type ProtocolResult<T> = Result<T, ProtocolError>;
