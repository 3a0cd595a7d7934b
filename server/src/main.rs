//! Vidrom Server – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Server.

use anyhow::Result;
use vidrom_observability::logging_initialisieren;
use vidrom_server::{config::ServerConfig, Server};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("VIDROM_CONFIG").unwrap_or_else(|_| "config.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let mut config = ServerConfig::laden(&config_pfad)?;
    config.umgebung_anwenden(|k| std::env::var(k).ok());

    logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        adresse = %config.bind_adresse(),
        "Vidrom Server wird initialisiert"
    );

    Server::neu(config).starten().await
}
