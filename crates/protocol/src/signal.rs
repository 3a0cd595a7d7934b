//! Signaling-Nachrichten (WebSocket, JSON)
//!
//! ## Design
//! - Tagged Enum mit `type`-Diskriminator in kebab-case
//! - `sdp` und `candidate` sind opake JSON-Werte und werden unveraendert
//!   weitergereicht
//! - Die Rolle in `register` bleibt ein String, damit eine unbekannte Rolle
//!   als eigener Fall erkannt wird und nicht als kaputter Frame
//! - Das Token in `register` bleibt ein beliebiger JSON-Wert: ein Token das
//!   kein String ist, muss als ungueltiges Token abgelehnt werden koennen

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vidrom_core::Rolle;

use crate::error::{ProtocolError, ProtocolResult};

/// Alle `type`-Werte die das Protokoll kennt
pub const BEKANNTE_TYPEN: [&str; 14] = [
    "register",
    "registered",
    "ring",
    "accept",
    "decline",
    "offer",
    "answer",
    "candidate",
    "hangup",
    "watch",
    "watch-end",
    "register-fcm-token",
    "peer-disconnected",
    "error",
];

/// Eine Signaling-Nachricht in beide Richtungen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalMessage {
    // Registrierung
    Register {
        role: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<Value>,
    },
    Registered {
        role: Rolle,
    },

    // Anruf-Steuerung
    Ring,
    Accept,
    Decline,
    Hangup,

    // WebRTC-Negotiation (opake Payloads)
    Offer {
        sdp: Value,
    },
    Answer {
        sdp: Value,
    },
    Candidate {
        candidate: Value,
    },

    // Kamera-Vorschau ohne Anruf
    Watch,
    WatchEnd,

    // Push-Adresse der sendenden Rolle
    RegisterFcmToken {
        token: String,
    },

    // Server -> Client
    PeerDisconnected {
        role: Rolle,
    },
    Error {
        message: String,
    },
}

impl SignalMessage {
    /// Erstellt eine Fehler-Nachricht
    pub fn fehler(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Der `type`-Wert dieser Nachricht
    pub fn typ(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Registered { .. } => "registered",
            Self::Ring => "ring",
            Self::Accept => "accept",
            Self::Decline => "decline",
            Self::Hangup => "hangup",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::Candidate { .. } => "candidate",
            Self::Watch => "watch",
            Self::WatchEnd => "watch-end",
            Self::RegisterFcmToken { .. } => "register-fcm-token",
            Self::PeerDisconnected { .. } => "peer-disconnected",
            Self::Error { .. } => "error",
        }
    }

    /// Dekodiert einen eingehenden Text-Frame
    ///
    /// Unterscheidet zwischen kaputtem JSON, fehlendem `type`, unbekanntem
    /// Typ und Schema-Verletzungen eines bekannten Typs.
    pub fn dekodieren(rohdaten: &str) -> ProtocolResult<Self> {
        let wert: Value = serde_json::from_str(rohdaten).map_err(ProtocolError::UngueltigesJson)?;

        let typ = wert
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::TypFehlt)?
            .to_string();

        if !BEKANNTE_TYPEN.contains(&typ.as_str()) {
            return Err(ProtocolError::UnbekannterTyp(typ));
        }

        serde_json::from_value(wert).map_err(|e| ProtocolError::UngueltigeNachricht {
            typ,
            grund: e.to_string(),
        })
    }

    /// Serialisiert die Nachricht als JSON-Text
    pub fn kodieren(&self) -> ProtocolResult<String> {
        serde_json::to_string(self).map_err(ProtocolError::Kodierung)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
