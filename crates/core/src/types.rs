//! Gemeinsame Identifikationstypen fuer Vidrom
//!
//! IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! Verbindungs- und Geraete-IDs zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Rolle
// ---------------------------------------------------------------------------

/// Eine der beiden festen Peer-Rollen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rolle {
    /// Anrufendes Geraet an der Tuer
    Intercom,
    /// Empfangende App in der Wohnung
    Home,
}

impl Rolle {
    /// Beide Rollen in fester Reihenfolge
    pub const ALLE: [Rolle; 2] = [Rolle::Intercom, Rolle::Home];

    /// Wire-Darstellung der Rolle
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Intercom => "intercom",
            Self::Home => "home",
        }
    }

    /// Die jeweils andere Rolle (Relay-Ziel)
    pub fn gegenueber(&self) -> Rolle {
        match self {
            Self::Intercom => Self::Home,
            Self::Home => Self::Intercom,
        }
    }
}

impl std::fmt::Display for Rolle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_str())
    }
}

impl FromStr for Rolle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intercom" => Ok(Self::Intercom),
            "home" => Ok(Self::Home),
            andere => Err(CoreError::UngueltigeRolle(andere.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// IDs
// ---------------------------------------------------------------------------

/// Eindeutige ID einer Transport-Verbindung, vergeben beim Accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Erstellt eine neue zufaellige ConnectionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Eindeutige Geraete-ID eines provisionierten Intercoms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub Uuid);

impl DeviceId {
    /// Erstellt eine neue zufaellige DeviceId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeviceId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| CoreError::UngueltigeId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolle_gegenueber() {
        assert_eq!(Rolle::Intercom.gegenueber(), Rolle::Home);
        assert_eq!(Rolle::Home.gegenueber(), Rolle::Intercom);
    }

    #[test]
    fn rolle_aus_string() {
        assert_eq!("intercom".parse::<Rolle>(), Ok(Rolle::Intercom));
        assert_eq!("home".parse::<Rolle>(), Ok(Rolle::Home));
        assert!(matches!(
            "Home".parse::<Rolle>(),
            Err(CoreError::UngueltigeRolle(_))
        ));
    }

    #[test]
    fn rolle_serde_kleingeschrieben() {
        let json = serde_json::to_string(&Rolle::Intercom).unwrap();
        assert_eq!(json, "\"intercom\"");
        let zurueck: Rolle = serde_json::from_str("\"home\"").unwrap();
        assert_eq!(zurueck, Rolle::Home);
    }

    #[test]
    fn connection_ids_eindeutig() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn device_id_serialisiert_als_uuid_string() {
        let id = DeviceId(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
        assert_eq!(id.to_string().parse::<DeviceId>(), Ok(id));
    }
}
