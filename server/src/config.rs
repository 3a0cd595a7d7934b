//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vidrom_observability::logging::{log_format_gueltig, log_level_gueltig};
use vidrom_signaling::SignalingConfig;

/// Secret fuer Entwicklungsumgebungen; im Betrieb per `JWT_SECRET` setzen
pub const ENTWICKLUNGS_SECRET: &str = "vidrom-dev-secret-change-in-production";

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Klingel-Timeout und Send-Queues
    pub signaling: SignalingEinstellungen,
    /// Geraete-Tokens
    pub auth: AuthEinstellungen,
    /// Admin-Zugang zur HTTP-API
    pub admin: AdminEinstellungen,
    /// Push-Benachrichtigungen (FCM)
    pub push: PushEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer HTTP und WebSocket
    pub bind_adresse: String,
    /// Port fuer HTTP und WebSocket
    pub port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

/// Signaling-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalingEinstellungen {
    /// Sekunden bis ein unbeantwortetes Klingeln verfaellt
    pub klingel_timeout_sek: u64,
    /// Kapazitaet der Send-Queue pro Verbindung
    pub sende_queue_groesse: usize,
}

impl Default for SignalingEinstellungen {
    fn default() -> Self {
        Self {
            klingel_timeout_sek: 30,
            sende_queue_groesse: 64,
        }
    }
}

/// Auth-Einstellungen (Geraete-Tokens)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEinstellungen {
    /// HMAC-Secret fuer Geraete-Tokens
    pub jwt_secret: String,
    /// Gueltigkeit eines ausgestellten Tokens
    pub token_gueltigkeit_tage: i64,
}

impl Default for AuthEinstellungen {
    fn default() -> Self {
        Self {
            jwt_secret: ENTWICKLUNGS_SECRET.into(),
            token_gueltigkeit_tage: 365,
        }
    }
}

/// Admin-Einstellungen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminEinstellungen {
    /// Statisches Bearer-Token (leer = Admin-Routen gesperrt)
    pub token: Option<String>,
}

/// Push-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushEinstellungen {
    /// Aktiviert FCM-Push beim Klingeln
    pub aktiviert: bool,
    pub fcm_projekt_id: String,
    /// OAuth2-Access-Token fuer die FCM HTTP v1 API
    pub fcm_access_token: String,
    /// Basis-URL der FCM-API (ueberschreibbar fuer Tests und Proxies)
    pub fcm_endpunkt: String,
}

impl Default for PushEinstellungen {
    fn default() -> Self {
        Self {
            aktiviert: false,
            fcm_projekt_id: String::new(),
            fcm_access_token: String::new(),
            fcm_endpunkt: vidrom_signaling::push::FCM_ENDPUNKT.into(),
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                config
                    .validieren()
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Prueft Werte die serde allein nicht abfangen kann
    pub fn validieren(&self) -> anyhow::Result<()> {
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("ungueltiges Log-Level '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("ungueltiges Log-Format '{}'", self.logging.format);
        }
        if self.signaling.klingel_timeout_sek == 0 {
            anyhow::bail!("klingel_timeout_sek muss groesser als 0 sein");
        }
        Ok(())
    }

    /// Uebernimmt Werte aus der Umgebung (`JWT_SECRET`)
    pub fn umgebung_anwenden(&mut self, lesen: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lesen("JWT_SECRET").filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = secret;
        }
    }

    /// Gibt die vollstaendige Bind-Adresse zurueck
    pub fn bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.port)
    }

    /// Laeuft der Server mit dem eingebauten Entwicklungs-Secret?
    pub fn nutzt_entwicklungs_secret(&self) -> bool {
        self.auth.jwt_secret == ENTWICKLUNGS_SECRET
    }

    pub fn signaling_config(&self) -> SignalingConfig {
        SignalingConfig {
            klingel_timeout: Duration::from_secs(self.signaling.klingel_timeout_sek),
            sende_queue_groesse: self.signaling.sende_queue_groesse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.netzwerk.port, 8080);
        assert_eq!(cfg.signaling.klingel_timeout_sek, 30);
        assert_eq!(cfg.auth.token_gueltigkeit_tage, 365);
        assert!(cfg.admin.token.is_none());
        assert!(!cfg.push.aktiviert);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.nutzt_entwicklungs_secret());
    }

    #[test]
    fn bind_adresse() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_adresse(), "0.0.0.0:8080");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [netzwerk]
            port = 9000

            [signaling]
            klingel_timeout_sek = 45

            [admin]
            token = "geheim"
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.netzwerk.port, 9000);
        assert_eq!(cfg.signaling_config().klingel_timeout, Duration::from_secs(45));
        assert_eq!(cfg.admin.token.as_deref(), Some("geheim"));
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.netzwerk.bind_adresse, "0.0.0.0");
        assert_eq!(cfg.signaling.sende_queue_groesse, 64);
    }

    #[test]
    fn jwt_secret_aus_umgebung() {
        let mut cfg = ServerConfig::default();
        cfg.umgebung_anwenden(|k| (k == "JWT_SECRET").then(|| "aus-env".to_string()));
        assert_eq!(cfg.auth.jwt_secret, "aus-env");
        assert!(!cfg.nutzt_entwicklungs_secret());

        let mut cfg = ServerConfig::default();
        cfg.umgebung_anwenden(|_| Some(String::new()));
        assert!(cfg.nutzt_entwicklungs_secret());
    }

    #[test]
    fn logging_werte_werden_geprueft() {
        assert!(ServerConfig::default().validieren().is_ok());

        let mut cfg = ServerConfig::default();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validieren().is_err());

        let mut cfg = ServerConfig::default();
        cfg.logging.format = "xml".into();
        assert!(cfg.validieren().is_err());

        let mut cfg = ServerConfig::default();
        cfg.signaling.klingel_timeout_sek = 0;
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn ungueltige_datei_wird_abgelehnt() {
        let pfad = std::env::temp_dir().join(format!("vidrom-config-{}.toml", std::process::id()));
        std::fs::write(&pfad, "[logging]\nformat = \"xml\"\n").unwrap();
        let ergebnis = ServerConfig::laden(pfad.to_str().unwrap());
        std::fs::remove_file(&pfad).unwrap();
        assert!(ergebnis.is_err());
    }

    #[test]
    fn fehlende_datei_ergibt_standard() {
        let cfg = ServerConfig::laden("/nicht/vorhanden/vidrom.toml").unwrap();
        assert_eq!(cfg.netzwerk.port, 8080);
    }
}
