//! Push-Benachrichtigungen fuer eingehende Anrufe
//!
//! Der Router ruft `anruf_melden` nie direkt auf, sondern ueber
//! [`push_ausloesen`] in einem eigenen Task. Fehlschlaege werden geloggt und
//! nicht wiederholt.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use vidrom_core::Rolle;

/// Fehler bei der Zustellung einer Push-Nachricht
#[derive(Debug, Error)]
pub enum PushError {
    #[error("Push-Dienst nicht konfiguriert: {0}")]
    NichtKonfiguriert(String),

    #[error("HTTP-Fehler: {0}")]
    Http(#[from] reqwest::Error),

    #[error("FCM lehnte die Nachricht ab (Status {status}): {antwort}")]
    Abgelehnt { status: u16, antwort: String },
}

pub type PushResult<T> = Result<T, PushError>;

/// Zustellweg fuer Anruf-Benachrichtigungen
#[async_trait]
pub trait PushDienst: Send + Sync {
    /// Meldet einen eingehenden Anruf an die Push-Adresse `token` der Rolle
    async fn anruf_melden(&self, rolle: Rolle, token: &str) -> PushResult<()>;
}

/// Startet die Zustellung im Hintergrund
pub fn push_ausloesen(dienst: Arc<dyn PushDienst>, rolle: Rolle, token: String) {
    tokio::spawn(async move {
        match dienst.anruf_melden(rolle, &token).await {
            Ok(()) => tracing::info!(rolle = %rolle, "Push-Benachrichtigung gesendet"),
            Err(e) => tracing::warn!(rolle = %rolle, fehler = %e, "Push-Benachrichtigung fehlgeschlagen"),
        }
    });
}

// ---------------------------------------------------------------------------
// KeinPush
// ---------------------------------------------------------------------------

/// Push deaktiviert: verwirft jede Benachrichtigung
#[derive(Debug, Default, Clone, Copy)]
pub struct KeinPush;

#[async_trait]
impl PushDienst for KeinPush {
    async fn anruf_melden(&self, rolle: Rolle, _token: &str) -> PushResult<()> {
        tracing::debug!(rolle = %rolle, "Push deaktiviert, Benachrichtigung verworfen");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FcmPush
// ---------------------------------------------------------------------------

/// Standard-Endpunkt der FCM HTTP v1 API
pub const FCM_ENDPUNKT: &str = "https://fcm.googleapis.com";

/// Zustellung ueber Firebase Cloud Messaging (HTTP v1)
pub struct FcmPush {
    client: reqwest::Client,
    endpunkt: String,
    projekt_id: String,
    access_token: String,
}

impl FcmPush {
    pub fn neu(
        endpunkt: impl Into<String>,
        projekt_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> PushResult<Self> {
        let projekt_id = projekt_id.into();
        if projekt_id.is_empty() {
            return Err(PushError::NichtKonfiguriert("fcm_projekt_id fehlt".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpunkt: endpunkt.into().trim_end_matches('/').to_string(),
            projekt_id,
            access_token: access_token.into(),
        })
    }

    fn sende_url(&self) -> String {
        format!("{}/v1/projects/{}/messages:send", self.endpunkt, self.projekt_id)
    }
}

/// Nutzlast einer Anruf-Benachrichtigung im FCM-v1-Format
pub fn anruf_nachricht(token: &str) -> serde_json::Value {
    json!({
        "message": {
            "token": token,
            "data": {
                "type": "incoming-call",
                "callerName": "Intercom",
            },
            "android": {
                "priority": "high",
            },
            "apns": {
                "headers": { "apns-priority": "10" },
                "payload": {
                    "aps": {
                        "content-available": 1,
                        "sound": "default",
                    },
                },
            },
        }
    })
}

#[async_trait]
impl PushDienst for FcmPush {
    async fn anruf_melden(&self, rolle: Rolle, token: &str) -> PushResult<()> {
        let antwort = self
            .client
            .post(self.sende_url())
            .bearer_auth(&self.access_token)
            .json(&anruf_nachricht(token))
            .send()
            .await?;

        let status = antwort.status();
        if !status.is_success() {
            let text = antwort.text().await.unwrap_or_default();
            return Err(PushError::Abgelehnt {
                status: status.as_u16(),
                antwort: text,
            });
        }

        tracing::debug!(rolle = %rolle, "FCM hat die Nachricht angenommen");
        Ok(())
    }
}
