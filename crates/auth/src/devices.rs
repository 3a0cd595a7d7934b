//! Geraete-Verwaltung und Provisionierung
//!
//! Ein Intercom wird vom Admin angelegt (`pending`) und erhaelt einen
//! 6-stelligen Provisionierungscode. Loest das Geraet den Code ein, wird
//! es `active` und der Code verfaellt. Ein widerrufenes Geraet kann sich
//! nicht mehr registrieren.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use vidrom_core::DeviceId;

use crate::error::{AuthError, AuthResult};

/// Lebenszyklus-Status eines Geraets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeraeteStatus {
    Pending,
    Active,
    Revoked,
}

/// Ein provisioniertes (oder zu provisionierendes) Intercom
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geraet {
    pub device_id: DeviceId,
    pub building_id: String,
    pub name: String,
    pub status: GeraeteStatus,
    pub created_at: DateTime<Utc>,
}

/// Ergebnis der Geraete-Anlage (Code nur hier sichtbar)
#[derive(Debug, Clone)]
pub struct NeuesGeraet {
    pub geraet: Geraet,
    pub code: String,
}

/// Nachschlagen von Geraeten fuer das Auth-Gate
#[async_trait]
pub trait GeraeteVerzeichnis: Send + Sync {
    async fn geraet_laden(&self, device_id: &DeviceId) -> AuthResult<Option<Geraet>>;
}

/// In-Memory-Geraetespeicher
///
/// Thread-safe via DashMap. Zustand geht beim Neustart verloren.
#[derive(Debug, Default)]
pub struct GeraeteSpeicher {
    geraete: DashMap<DeviceId, Geraet>,
    /// Provisionierungscode -> Geraet
    codes: DashMap<String, DeviceId>,
}

impl GeraeteSpeicher {
    pub fn neu() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Legt ein neues Geraet im Status `pending` an
    pub fn geraet_erstellen(&self, building_id: &str, name: &str) -> NeuesGeraet {
        let geraet = Geraet {
            device_id: DeviceId::new(),
            building_id: building_id.to_string(),
            name: name.to_string(),
            status: GeraeteStatus::Pending,
            created_at: Utc::now(),
        };
        self.geraete.insert(geraet.device_id, geraet.clone());

        let code = loop {
            let kandidat = code_generieren();
            if let dashmap::mapref::entry::Entry::Vacant(eintrag) = self.codes.entry(kandidat.clone()) {
                eintrag.insert(geraet.device_id);
                break kandidat;
            }
        };

        tracing::info!(device_id = %geraet.device_id, building_id, "Geraet angelegt");
        NeuesGeraet { geraet, code }
    }

    /// Loest einen Provisionierungscode ein und aktiviert das Geraet
    ///
    /// Der Code ist nur einmal gueltig und nur solange das Geraet `pending` ist.
    pub fn code_einloesen(&self, code: &str) -> AuthResult<Geraet> {
        let device_id = self
            .codes
            .get(code)
            .map(|eintrag| *eintrag.value())
            .ok_or(AuthError::ProvisionierungsCodeUngueltig)?;

        let aktiviert = {
            let mut geraet = self
                .geraete
                .get_mut(&device_id)
                .ok_or(AuthError::ProvisionierungsCodeUngueltig)?;
            if geraet.status != GeraeteStatus::Pending {
                return Err(AuthError::ProvisionierungsCodeUngueltig);
            }
            geraet.status = GeraeteStatus::Active;
            geraet.clone()
        };
        self.codes.remove(code);

        tracing::info!(device_id = %device_id, "Geraet provisioniert");
        Ok(aktiviert)
    }

    /// Gibt ein Geraet zurueck
    pub fn geraet(&self, device_id: &DeviceId) -> Option<Geraet> {
        self.geraete.get(device_id).map(|e| e.value().clone())
    }

    /// Widerruft ein Geraet; `false` wenn es nicht existiert
    pub fn widerrufen(&self, device_id: &DeviceId) -> bool {
        match self.geraete.get_mut(device_id) {
            Some(mut geraet) => {
                geraet.status = GeraeteStatus::Revoked;
                tracing::info!(device_id = %device_id, "Geraet widerrufen");
                true
            }
            None => false,
        }
    }

    /// Alle Geraete, aelteste zuerst
    pub fn alle(&self) -> Vec<Geraet> {
        let mut alle: Vec<Geraet> = self.geraete.iter().map(|e| e.value().clone()).collect();
        alle.sort_by_key(|g| g.created_at);
        alle
    }
}

#[async_trait]
impl GeraeteVerzeichnis for GeraeteSpeicher {
    async fn geraet_laden(&self, device_id: &DeviceId) -> AuthResult<Option<Geraet>> {
        Ok(self.geraet(device_id))
    }
}

/// 6-stelliger numerischer Code (100000..=999999), leicht am Geraet einzutippen
fn code_generieren() -> String {
    let zufall = Uuid::new_v4().as_u128();
    (100_000 + (zufall % 900_000) as u32).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neues_geraet_ist_pending_mit_code() {
        let speicher = GeraeteSpeicher::neu();
        let neu = speicher.geraet_erstellen("b1", "Haupteingang");

        assert_eq!(neu.geraet.status, GeraeteStatus::Pending);
        assert_eq!(neu.code.len(), 6);
        assert!(neu.code.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(speicher.alle().len(), 1);
    }

    #[test]
    fn code_einloesen_aktiviert_geraet() {
        let speicher = GeraeteSpeicher::neu();
        let neu = speicher.geraet_erstellen("b1", "Tor");

        let geraet = speicher.code_einloesen(&neu.code).unwrap();
        assert_eq!(geraet.status, GeraeteStatus::Active);
        assert_eq!(
            speicher.geraet(&neu.geraet.device_id).unwrap().status,
            GeraeteStatus::Active
        );
    }

    #[test]
    fn code_ist_nur_einmal_gueltig() {
        let speicher = GeraeteSpeicher::neu();
        let neu = speicher.geraet_erstellen("b1", "Tor");

        speicher.code_einloesen(&neu.code).unwrap();
        assert_eq!(
            speicher.code_einloesen(&neu.code).unwrap_err(),
            AuthError::ProvisionierungsCodeUngueltig
        );
    }

    #[test]
    fn unbekannter_code() {
        let speicher = GeraeteSpeicher::neu();
        assert_eq!(
            speicher.code_einloesen("000000").unwrap_err(),
            AuthError::ProvisionierungsCodeUngueltig
        );
    }

    #[test]
    fn widerrufenes_geraet_kann_code_nicht_einloesen() {
        let speicher = GeraeteSpeicher::neu();
        let neu = speicher.geraet_erstellen("b1", "Tor");

        assert!(speicher.widerrufen(&neu.geraet.device_id));
        assert!(speicher.code_einloesen(&neu.code).is_err());
        assert_eq!(
            speicher.geraet(&neu.geraet.device_id).unwrap().status,
            GeraeteStatus::Revoked
        );
    }

    #[test]
    fn widerrufen_unbekanntes_geraet() {
        let speicher = GeraeteSpeicher::neu();
        assert!(!speicher.widerrufen(&DeviceId::new()));
    }

    #[test]
    fn geraet_serialisierung_camel_case() {
        let speicher = GeraeteSpeicher::neu();
        let neu = speicher.geraet_erstellen("b9", "Hof");
        let json = serde_json::to_value(&neu.geraet).unwrap();
        assert_eq!(json["buildingId"], "b9");
        assert_eq!(json["status"], "pending");
        assert!(json.get("deviceId").is_some());
        assert!(json.get("createdAt").is_some());
    }

    #[tokio::test]
    async fn verzeichnis_liefert_geraet() {
        let speicher = GeraeteSpeicher::neu();
        let neu = speicher.geraet_erstellen("b1", "Tor");

        let gefunden = speicher.geraet_laden(&neu.geraet.device_id).await.unwrap();
        assert!(gefunden.is_some());
        let fehlt = speicher.geraet_laden(&DeviceId::new()).await.unwrap();
        assert!(fehlt.is_none());
    }
}
