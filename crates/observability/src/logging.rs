//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable (hat Vorrang vor der Config-Datei):
//! - `VIDROM_LOG_LEVEL`: Filter-Direktive (z.B. `info`, `vidrom_signaling=debug`)
//! - `VIDROM_LOG_FORMAT`: Format (text/json), Standard: text

use tracing_subscriber::{fmt, EnvFilter};

const LEVEL_ENV: &str = "VIDROM_LOG_LEVEL";
const FORMAT_ENV: &str = "VIDROM_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Faellt auf `info` zurueck wenn weder Umgebung noch `level` einen gueltigen
/// Filter ergeben.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(LEVEL_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = std::env::var(FORMAT_ENV).unwrap_or_else(|_| format.to_string());

    let ergebnis = match format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        _ => fmt().with_env_filter(filter).with_target(true).try_init(),
    };

    if ergebnis.is_err() {
        tracing::debug!("Logging war bereits initialisiert");
    }
}

/// Validiert ob ein Log-Level-String aus der Config-Datei gueltig ist.
///
/// Filter-Direktiven pro Crate gehen nur ueber `VIDROM_LOG_LEVEL`.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
