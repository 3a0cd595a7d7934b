//! Auth-Gate fuer die Intercom-Registrierung
//!
//! Reihenfolge der Pruefungen:
//! 1. Token vorhanden?
//! 2. Signatur und Ablauf gueltig?
//! 3. Geraet existiert und ist `active`?
//!
//! Die Rolle "home" braucht kein Token und laeuft nicht durch das Gate.

use std::sync::Arc;

use crate::device_token::{CredentialVerifier, GeraeteIdentitaet};
use crate::devices::{GeraeteStatus, GeraeteVerzeichnis};
use crate::error::{AuthError, AuthResult};

/// Prueft Intercoms bevor sie den Intercom-Slot belegen duerfen
#[derive(Clone)]
pub struct IntercomAuthGate {
    verifier: Arc<dyn CredentialVerifier>,
    verzeichnis: Arc<dyn GeraeteVerzeichnis>,
}

impl IntercomAuthGate {
    pub fn neu(
        verifier: Arc<dyn CredentialVerifier>,
        verzeichnis: Arc<dyn GeraeteVerzeichnis>,
    ) -> Self {
        Self {
            verifier,
            verzeichnis,
        }
    }

    /// Authentifiziert ein Intercom anhand seines Geraete-Tokens
    pub async fn authentifizieren(&self, token: Option<&str>) -> AuthResult<GeraeteIdentitaet> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::TokenFehlt),
        };

        let identitaet = self.verifier.verifizieren(token)?;

        let geraet = self
            .verzeichnis
            .geraet_laden(&identitaet.device_id)
            .await?
            .ok_or(AuthError::GeraetNichtGefunden(identitaet.device_id))?;

        if geraet.status != GeraeteStatus::Active {
            return Err(AuthError::GeraetWiderrufen(identitaet.device_id));
        }

        Ok(identitaet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_token::DeviceTokenService;
    use crate::devices::GeraeteSpeicher;
    use vidrom_core::DeviceId;

    fn gate_mit_speicher() -> (IntercomAuthGate, Arc<GeraeteSpeicher>, Arc<DeviceTokenService>) {
        let tokens = Arc::new(DeviceTokenService::neu("gate-secret", 365));
        let speicher = GeraeteSpeicher::neu();
        let gate = IntercomAuthGate::neu(tokens.clone(), speicher.clone());
        (gate, speicher, tokens)
    }

    #[tokio::test]
    async fn aktives_geraet_wird_akzeptiert() {
        let (gate, speicher, tokens) = gate_mit_speicher();
        let neu = speicher.geraet_erstellen("b1", "Tor");
        speicher.code_einloesen(&neu.code).unwrap();
        let token = tokens.signieren(neu.geraet.device_id, "b1").unwrap();

        let identitaet = gate.authentifizieren(Some(&token)).await.unwrap();
        assert_eq!(identitaet.device_id, neu.geraet.device_id);
        assert_eq!(identitaet.building_id, "b1");
    }

    #[tokio::test]
    async fn fehlendes_token() {
        let (gate, _, _) = gate_mit_speicher();
        assert_eq!(gate.authentifizieren(None).await, Err(AuthError::TokenFehlt));
        assert_eq!(gate.authentifizieren(Some("")).await, Err(AuthError::TokenFehlt));
    }

    #[tokio::test]
    async fn ungueltiges_token() {
        let (gate, _, _) = gate_mit_speicher();
        let ergebnis = gate.authentifizieren(Some("kein.gueltiges.token")).await;
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig(_))));
    }

    #[tokio::test]
    async fn unbekanntes_geraet() {
        let (gate, _, tokens) = gate_mit_speicher();
        let device_id = DeviceId::new();
        let token = tokens.signieren(device_id, "b1").unwrap();

        assert_eq!(
            gate.authentifizieren(Some(&token)).await,
            Err(AuthError::GeraetNichtGefunden(device_id))
        );
    }

    #[tokio::test]
    async fn widerrufenes_geraet() {
        let (gate, speicher, tokens) = gate_mit_speicher();
        let neu = speicher.geraet_erstellen("b1", "Tor");
        speicher.code_einloesen(&neu.code).unwrap();
        let token = tokens.signieren(neu.geraet.device_id, "b1").unwrap();
        speicher.widerrufen(&neu.geraet.device_id);

        assert_eq!(
            gate.authentifizieren(Some(&token)).await,
            Err(AuthError::GeraetWiderrufen(neu.geraet.device_id))
        );
    }

    #[tokio::test]
    async fn noch_nicht_provisioniertes_geraet_gilt_als_nicht_aktiv() {
        let (gate, speicher, tokens) = gate_mit_speicher();
        let neu = speicher.geraet_erstellen("b1", "Tor");
        let token = tokens.signieren(neu.geraet.device_id, "b1").unwrap();

        assert_eq!(
            gate.authentifizieren(Some(&token)).await,
            Err(AuthError::GeraetWiderrufen(neu.geraet.device_id))
        );
    }
}
