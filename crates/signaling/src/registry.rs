//! Rollen-Registry – wer ist gerade erreichbar?
//!
//! Genau ein Slot pro Rolle. Eine neue Registrierung ersetzt den Slot
//! ohne Fehler ("last writer wins"); die verdraengte Verbindung wird nicht
//! geschlossen und sieht spaeter ihr eigenes Close-Event.

use vidrom_core::{ConnectionId, Rolle};

use crate::handle::ConnectionHandle;

/// Fester Zwei-Slot-Speicher Rolle -> Verbindung
#[derive(Debug, Default)]
pub struct RoleRegistry {
    intercom: Option<ConnectionHandle>,
    home: Option<ConnectionHandle>,
}

impl RoleRegistry {
    pub fn neu() -> Self {
        Self::default()
    }

    fn slot(&self, rolle: Rolle) -> &Option<ConnectionHandle> {
        match rolle {
            Rolle::Intercom => &self.intercom,
            Rolle::Home => &self.home,
        }
    }

    fn slot_mut(&mut self, rolle: Rolle) -> &mut Option<ConnectionHandle> {
        match rolle {
            Rolle::Intercom => &mut self.intercom,
            Rolle::Home => &mut self.home,
        }
    }

    /// Belegt den Slot einer Rolle und gibt den bisherigen Inhaber zurueck
    pub fn registrieren(&mut self, rolle: Rolle, verbindung: ConnectionHandle) -> Option<ConnectionHandle> {
        let vorher = self.slot_mut(rolle).replace(verbindung);
        if let Some(ref alt) = vorher {
            tracing::debug!(rolle = %rolle, verdraengt = %alt.id(), "Rollen-Slot ersetzt");
        }
        vorher
    }

    /// Aktuelle, noch offene Verbindung einer Rolle
    pub fn abrufen(&self, rolle: Rolle) -> Option<&ConnectionHandle> {
        self.slot(rolle).as_ref().filter(|v| v.ist_offen())
    }

    /// Gibt den Slot frei, falls er noch auf `verbindung` zeigt
    ///
    /// Gibt die freigegebene Rolle zurueck, sonst `None`.
    pub fn freigeben(&mut self, verbindung: ConnectionId) -> Option<Rolle> {
        Rolle::ALLE.into_iter().find(|&rolle| {
            let slot = self.slot_mut(rolle);
            if slot.as_ref().is_some_and(|v| v.id() == verbindung) {
                *slot = None;
                true
            } else {
                false
            }
        })
    }

    /// Ob eine Rolle gerade erreichbar ist
    pub fn verbunden(&self, rolle: Rolle) -> bool {
        self.abrufen(rolle).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::Ausgehend;
    use tokio::sync::mpsc;

    fn verbindung() -> (ConnectionHandle, mpsc::Receiver<Ausgehend>) {
        ConnectionHandle::neu(ConnectionId::new(), 8)
    }

    #[test]
    fn leere_registry() {
        let registry = RoleRegistry::neu();
        assert!(registry.abrufen(Rolle::Intercom).is_none());
        assert!(registry.abrufen(Rolle::Home).is_none());
    }

    #[test]
    fn registrieren_und_abrufen() {
        let mut registry = RoleRegistry::neu();
        let (home, _rx) = verbindung();
        assert!(registry.registrieren(Rolle::Home, home.clone()).is_none());

        assert_eq!(registry.abrufen(Rolle::Home), Some(&home));
        assert!(registry.abrufen(Rolle::Intercom).is_none());
    }

    #[test]
    fn letzte_registrierung_gewinnt() {
        let mut registry = RoleRegistry::neu();
        let (alt, _rx_alt) = verbindung();
        let (neu, _rx_neu) = verbindung();

        registry.registrieren(Rolle::Home, alt.clone());
        let verdraengt = registry.registrieren(Rolle::Home, neu.clone());

        assert_eq!(verdraengt, Some(alt.clone()));
        assert_eq!(registry.abrufen(Rolle::Home), Some(&neu));
        // Verdraengte Verbindung bleibt offen
        assert!(alt.ist_offen());
    }

    #[test]
    fn freigeben_nur_fuer_aktuellen_inhaber() {
        let mut registry = RoleRegistry::neu();
        let (alt, _rx_alt) = verbindung();
        let (neu, _rx_neu) = verbindung();
        registry.registrieren(Rolle::Intercom, alt.clone());
        registry.registrieren(Rolle::Intercom, neu.clone());

        // Close der verdraengten Verbindung darf den Slot nicht leeren
        assert_eq!(registry.freigeben(alt.id()), None);
        assert_eq!(registry.abrufen(Rolle::Intercom), Some(&neu));

        assert_eq!(registry.freigeben(neu.id()), Some(Rolle::Intercom));
        assert!(registry.abrufen(Rolle::Intercom).is_none());
    }

    #[test]
    fn freigeben_unbekannter_verbindung_ist_noop() {
        let mut registry = RoleRegistry::neu();
        let (home, _rx) = verbindung();
        registry.registrieren(Rolle::Home, home.clone());

        assert_eq!(registry.freigeben(ConnectionId::new()), None);
        assert!(registry.verbunden(Rolle::Home));
    }

    #[test]
    fn geschlossene_verbindung_gilt_als_abwesend() {
        let mut registry = RoleRegistry::neu();
        let (home, rx) = verbindung();
        registry.registrieren(Rolle::Home, home);
        drop(rx);

        assert!(registry.abrufen(Rolle::Home).is_none());
        assert!(!registry.verbunden(Rolle::Home));
    }

    #[test]
    fn beliebige_folgen_spiegeln_letzte_offene_registrierung() {
        let mut registry = RoleRegistry::neu();
        let mut empfaenger = Vec::new();
        let mut erwartet: Option<ConnectionHandle> = None;

        // registrieren, registrieren, trennen (alt), trennen (aktuell), registrieren
        for schritt in 0..5 {
            match schritt {
                0 | 1 | 4 => {
                    let (v, rx) = verbindung();
                    empfaenger.push(rx);
                    registry.registrieren(Rolle::Home, v.clone());
                    erwartet = Some(v);
                }
                2 => {
                    // Erste Verbindung trennt sich, ist aber nicht mehr Inhaber
                    let _ = registry.freigeben(ConnectionId::new());
                }
                _ => {
                    let aktuell = erwartet.take().unwrap();
                    assert_eq!(registry.freigeben(aktuell.id()), Some(Rolle::Home));
                }
            }
            assert_eq!(registry.abrufen(Rolle::Home), erwartet.as_ref());
        }
    }
}
