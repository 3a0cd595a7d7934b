//! Gemeinsamer Server-Zustand fuer den Signaling-Service
//!
//! Haelt Registry, FCM-Tabelle und Klingel-Zustand. Alle Aenderungen an
//! Registry und FCM-Tabelle laufen unter einem Mutex; der Klingel-Zustand
//! wird nur bei gehaltenem Mutex veraendert (Lock-Reihenfolge: erst
//! `anrufe`, dann der innere Lock von [`PendingRing`]). Der Ablauf-Timer
//! nimmt nur den inneren Lock.
//!
//! Sowohl der WebSocket-Dispatcher als auch die REST-Handler arbeiten auf
//! diesem Zustand.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use vidrom_auth::IntercomAuthGate;
use vidrom_core::{ConnectionId, Rolle};
use vidrom_protocol::SignalMessage;

use crate::handle::ConnectionHandle;
use crate::push::{push_ausloesen, PushDienst};
use crate::registry::RoleRegistry;
use crate::ring::{PendingRing, KLINGEL_TIMEOUT};

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Nach dieser Zeit verfaellt ein unbeantwortetes Klingeln
    pub klingel_timeout: Duration,
    /// Kapazitaet der Send-Queue pro Verbindung
    pub sende_queue_groesse: usize,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            klingel_timeout: KLINGEL_TIMEOUT,
            sende_queue_groesse: 64,
        }
    }
}

/// Momentaufnahme fuer Health-Checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalingStatus {
    pub intercom_verbunden: bool,
    pub home_verbunden: bool,
    pub klingelt: bool,
}

#[derive(Debug, Default)]
struct AnrufZustand {
    registry: RoleRegistry,
    fcm_tokens: HashMap<Rolle, String>,
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct SignalingState {
    /// Signaling-Konfiguration
    pub config: Arc<SignalingConfig>,
    /// Prueft Intercoms vor der Registrierung
    pub auth_gate: IntercomAuthGate,
    /// Zustellweg fuer Anruf-Benachrichtigungen
    pub push: Arc<dyn PushDienst>,
    anrufe: Mutex<AnrufZustand>,
    ring: PendingRing,
}

impl SignalingState {
    /// Erstellt einen neuen SignalingState
    pub fn neu(
        config: SignalingConfig,
        auth_gate: IntercomAuthGate,
        push: Arc<dyn PushDienst>,
    ) -> Arc<Self> {
        let ring = PendingRing::neu(config.klingel_timeout);
        Arc::new(Self {
            config: Arc::new(config),
            auth_gate,
            push,
            anrufe: Mutex::new(AnrufZustand::default()),
            ring,
        })
    }

    // -----------------------------------------------------------------------
    // Registrierung
    // -----------------------------------------------------------------------

    /// Belegt den Slot `rolle` mit `verbindung` und bestaetigt mit `registered`
    ///
    /// Belegte dieselbe Verbindung vorher eine andere Rolle, wird dieser Slot
    /// still freigegeben. Ein vorheriger Inhaber des Slots wird verdraengt,
    /// aber nicht geschlossen. Registriert sich `home` waehrend ein Klingeln
    /// offen ist, bekommt die Verbindung das `ring` direkt hinterher.
    pub fn rolle_registrieren(&self, rolle: Rolle, verbindung: &ConnectionHandle) {
        let mut anrufe = self.anrufe.lock();

        if let Some(alt) = anrufe.registry.freigeben(verbindung.id()) {
            if alt != rolle {
                tracing::info!(verbindung = %verbindung.id(), alt = %alt, neu = %rolle, "Rollenwechsel");
            }
        }

        if let Some(verdraengt) = anrufe.registry.registrieren(rolle, verbindung.clone()) {
            tracing::info!(
                verbindung = %verbindung.id(),
                verdraengt = %verdraengt.id(),
                rolle = %rolle,
                "Vorherige Verbindung aus dem Slot verdraengt"
            );
        }

        verbindung.senden(SignalMessage::Registered { role: rolle });
        tracing::info!(verbindung = %verbindung.id(), rolle = %rolle, "Registriert");

        if rolle == Rolle::Home && self.ring.klingelt() {
            tracing::info!(verbindung = %verbindung.id(), "Offenes Klingeln erneut an home gesendet");
            verbindung.senden(SignalMessage::Ring);
        }
    }

    /// Gibt den Slot der Verbindung frei und meldet das der Gegenstelle
    ///
    /// Nur wenn die Verbindung ihren Slot noch haelt; eine verdraengte
    /// Verbindung aendert beim Schliessen nichts. Trennt sich das Intercom,
    /// endet ein offenes Klingeln.
    pub fn verbindung_freigeben(&self, verbindung: ConnectionId) -> Option<Rolle> {
        let mut anrufe = self.anrufe.lock();
        let rolle = anrufe.registry.freigeben(verbindung)?;

        if rolle == Rolle::Intercom {
            self.ring.zuruecksetzen();
        }

        if let Some(gegenstelle) = anrufe.registry.abrufen(rolle.gegenueber()) {
            gegenstelle.senden(SignalMessage::PeerDisconnected { role: rolle });
            tracing::debug!(verbindung = %verbindung, rolle = %rolle, "peer-disconnected gesendet");
        }

        Some(rolle)
    }

    // -----------------------------------------------------------------------
    // Anruf-Steuerung
    // -----------------------------------------------------------------------

    /// Markiert ein Klingeln, leitet es an home weiter und loest den Push aus
    pub fn klingeln(&self) {
        let token = {
            let anrufe = self.anrufe.lock();
            self.ring.klingeln_markieren();

            match anrufe.registry.abrufen(Rolle::Home) {
                Some(home) => {
                    home.senden(SignalMessage::Ring);
                    tracing::info!("Klingeln an home weitergeleitet");
                }
                None => tracing::info!("home nicht verbunden, Klingeln bleibt offen"),
            }

            anrufe.fcm_tokens.get(&Rolle::Home).cloned()
        };

        match token {
            Some(token) => push_ausloesen(Arc::clone(&self.push), Rolle::Home, token),
            None => tracing::debug!("Kein FCM-Token fuer home, Push uebersprungen"),
        }
    }

    /// Beendet ein offenes Klingeln und leitet `nachricht` an `ziel` weiter
    ///
    /// Grundlage fuer `accept`, `decline` und `hangup`.
    pub fn anruf_beenden(&self, nachricht: SignalMessage, ziel: Option<Rolle>) -> bool {
        let anrufe = self.anrufe.lock();
        self.ring.zuruecksetzen();
        match ziel {
            Some(ziel) => Self::an_rolle(&anrufe, ziel, nachricht),
            None => false,
        }
    }

    /// Ablehnen ausserhalb einer WebSocket-Verbindung (z.B. aus der Notification)
    pub fn anruf_ablehnen(&self) -> bool {
        self.anruf_beenden(SignalMessage::Decline, Some(Rolle::Intercom))
    }

    /// Leitet `nachricht` an die aktuelle Verbindung von `ziel` weiter
    ///
    /// Gibt `false` zurueck wenn die Rolle nicht verbunden ist.
    pub fn weiterleiten(&self, ziel: Rolle, nachricht: SignalMessage) -> bool {
        let anrufe = self.anrufe.lock();
        Self::an_rolle(&anrufe, ziel, nachricht)
    }

    fn an_rolle(anrufe: &AnrufZustand, ziel: Rolle, nachricht: SignalMessage) -> bool {
        let typ = nachricht.typ();
        match anrufe.registry.abrufen(ziel) {
            Some(verbindung) => {
                let ok = verbindung.senden(nachricht);
                if ok {
                    tracing::debug!(ziel = %ziel, typ, "Weitergeleitet");
                }
                ok
            }
            None => {
                tracing::debug!(ziel = %ziel, typ, "Ziel nicht verbunden, verworfen");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // FCM-Tabelle
    // -----------------------------------------------------------------------

    /// Speichert die Push-Adresse einer Rolle (ueberschreibt die vorherige)
    pub fn fcm_token_setzen(&self, rolle: Rolle, token: impl Into<String>) {
        self.anrufe.lock().fcm_tokens.insert(rolle, token.into());
        tracing::info!(rolle = %rolle, "FCM-Token registriert");
    }

    pub fn fcm_token(&self, rolle: Rolle) -> Option<String> {
        self.anrufe.lock().fcm_tokens.get(&rolle).cloned()
    }

    // -----------------------------------------------------------------------
    // Abfragen
    // -----------------------------------------------------------------------

    pub fn klingelt(&self) -> bool {
        self.ring.klingelt()
    }

    pub fn verbunden(&self, rolle: Rolle) -> bool {
        self.anrufe.lock().registry.verbunden(rolle)
    }

    /// ID der Verbindung die den Slot `rolle` aktuell haelt
    pub fn inhaber(&self, rolle: Rolle) -> Option<ConnectionId> {
        self.anrufe.lock().registry.abrufen(rolle).map(ConnectionHandle::id)
    }

    pub fn status(&self) -> SignalingStatus {
        let anrufe = self.anrufe.lock();
        SignalingStatus {
            intercom_verbunden: anrufe.registry.verbunden(Rolle::Intercom),
            home_verbunden: anrufe.registry.verbunden(Rolle::Home),
            klingelt: self.ring.klingelt(),
        }
    }
}
