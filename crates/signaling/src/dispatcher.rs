//! Message-Dispatcher – Routet Signaling-Nachrichten
//!
//! Der Dispatcher empfaengt die Text-Frames einer Verbindung, dekodiert sie
//! und fuehrt sie entweder als Zustandsaenderung aus (ring, accept, decline,
//! hangup) oder leitet sie an die Gegenrolle weiter.
//!
//! ## Zustand pro Verbindung
//! ```text
//! Anonym --register--> Registriert(rolle) --close--> Geschlossen
//! ```
//! Fehlerhafte und unbekannte Nachrichten werden nur geloggt; die Verbindung
//! bleibt offen. Eine abgelehnte Intercom-Registrierung bekommt eine
//! `error`-Nachricht und wird danach geschlossen.

use std::str::FromStr;
use serde_json::Value;
use std::sync::Arc;
use vidrom_auth::AuthError;
use vidrom_core::Rolle;
use vidrom_protocol::SignalMessage;

use crate::error::{SignalingError, SignalingResult};
use crate::handle::ConnectionHandle;
use crate::server_state::SignalingState;

/// Dispatcher-Kontext – Informationen ueber die aktuelle Verbindung
#[derive(Debug, Clone)]
pub struct DispatcherContext {
    /// Send-Queue der Verbindung
    pub verbindung: ConnectionHandle,
    /// Registrierte Rolle (None solange anonym)
    pub rolle: Option<Rolle>,
    /// Gesetzt nach einer abgelehnten Registrierung; weitere Frames werden
    /// nicht mehr verarbeitet
    pub schliessen: bool,
}

impl DispatcherContext {
    pub fn neu(verbindung: ConnectionHandle) -> Self {
        Self {
            verbindung,
            rolle: None,
            schliessen: false,
        }
    }

    fn rolle_erforderlich(&self) -> SignalingResult<Rolle> {
        self.rolle.ok_or(SignalingError::NichtRegistriert)
    }
}

/// Zentraler Message-Dispatcher
pub struct MessageDispatcher {
    state: Arc<SignalingState>,
}

impl MessageDispatcher {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<SignalingState>) -> Self {
        Self { state }
    }

    /// Verarbeitet einen rohen Text-Frame vollstaendig
    ///
    /// Fehler werden hier behandelt: geloggt, bei Bedarf als `error` an den
    /// Client gemeldet und die Verbindung zum Schliessen markiert.
    pub async fn rohdaten_verarbeiten(&self, rohdaten: &str, ctx: &mut DispatcherContext) {
        if ctx.schliessen {
            return;
        }

        let ergebnis = match SignalMessage::dekodieren(rohdaten) {
            Ok(nachricht) => self.dispatch(nachricht, ctx).await,
            Err(e) => Err(SignalingError::Protokoll(e)),
        };

        if let Err(fehler) = ergebnis {
            self.fehler_behandeln(fehler, ctx);
        }
    }

    /// Verarbeitet eine dekodierte Nachricht
    pub async fn dispatch(
        &self,
        nachricht: SignalMessage,
        ctx: &mut DispatcherContext,
    ) -> SignalingResult<()> {
        let id = ctx.verbindung.id();
        tracing::debug!(verbindung = %id, rolle = ?ctx.rolle, typ = nachricht.typ(), "Nachricht empfangen");

        match nachricht {
            SignalMessage::Register { role, token } => {
                let rolle =
                    Rolle::from_str(&role).map_err(|_| SignalingError::UngueltigeRolle(role))?;

                if rolle == Rolle::Intercom {
                    let token = match token {
                        None | Some(Value::Null) => None,
                        Some(Value::String(text)) => Some(text),
                        Some(_) => return Err(AuthError::ungueltig("Token ist kein String").into()),
                    };
                    let identitaet = self.state.auth_gate.authentifizieren(token.as_deref()).await?;
                    tracing::info!(
                        verbindung = %id,
                        device_id = %identitaet.device_id,
                        building_id = %identitaet.building_id,
                        "Intercom authentifiziert"
                    );
                }

                self.state.rolle_registrieren(rolle, &ctx.verbindung);
                ctx.rolle = Some(rolle);
            }

            SignalMessage::Ring => self.state.klingeln(),

            SignalMessage::Accept | SignalMessage::Decline => {
                self.state.anruf_beenden(nachricht, Some(Rolle::Intercom));
            }

            SignalMessage::Hangup => {
                let ziel = ctx.rolle.map(|r| r.gegenueber());
                self.state.anruf_beenden(SignalMessage::Hangup, ziel);
            }

            SignalMessage::Offer { .. }
            | SignalMessage::Answer { .. }
            | SignalMessage::Candidate { .. } => {
                let rolle = ctx.rolle_erforderlich()?;
                self.state.weiterleiten(rolle.gegenueber(), nachricht);
            }

            SignalMessage::Watch => {
                if !self.state.weiterleiten(Rolle::Intercom, SignalMessage::Watch) {
                    return Err(SignalingError::GegenstelleFehlt);
                }
            }

            SignalMessage::WatchEnd => {
                if let Some(rolle) = ctx.rolle {
                    self.state.weiterleiten(rolle.gegenueber(), SignalMessage::WatchEnd);
                }
            }

            SignalMessage::RegisterFcmToken { token } => {
                let rolle = ctx.rolle_erforderlich()?;
                self.state.fcm_token_setzen(rolle, token);
            }

            // Nur Server -> Client
            SignalMessage::Registered { .. }
            | SignalMessage::PeerDisconnected { .. }
            | SignalMessage::Error { .. } => {
                tracing::debug!(verbindung = %id, typ = nachricht.typ(), "Server-Nachricht vom Client ignoriert");
            }
        }

        Ok(())
    }

    /// Aufraeumen nach dem Schliessen der Verbindung
    pub fn verbindung_geschlossen(&self, ctx: &DispatcherContext) {
        let id = ctx.verbindung.id();
        match self.state.verbindung_freigeben(id) {
            Some(rolle) => tracing::info!(verbindung = %id, rolle = %rolle, "Slot freigegeben"),
            None => tracing::debug!(verbindung = %id, rolle = ?ctx.rolle, "Kein Slot zu raeumen"),
        }
    }

    fn fehler_behandeln(&self, fehler: SignalingError, ctx: &mut DispatcherContext) {
        let id = ctx.verbindung.id();

        match &fehler {
            SignalingError::Protokoll(e) if e.ist_fehlerhaft() => {
                tracing::warn!(verbindung = %id, fehler = %e, "Fehlerhafte Nachricht ignoriert");
            }
            SignalingError::Protokoll(e) => {
                tracing::info!(verbindung = %id, fehler = %e, "Nachricht ignoriert");
            }
            SignalingError::Auth(e) => {
                tracing::warn!(verbindung = %id, fehler = %e, "Intercom-Registrierung abgelehnt");
            }
            andere => {
                tracing::debug!(verbindung = %id, fehler = %andere, "Nachricht verworfen");
            }
        }

        if let Some(meldung) = fehler.client_meldung() {
            ctx.verbindung.senden(SignalMessage::fehler(meldung));
        }
        if fehler.erzwingt_schliessen() {
            ctx.schliessen = true;
            ctx.verbindung.schliessen();
        }
    }
}
