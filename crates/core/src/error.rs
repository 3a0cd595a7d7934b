//! Fehlertypen fuer Vidrom
//!
//! Die uebrigen Crates definieren eigene Fehler-Enums; hier liegen nur die
//! Fehler der gemeinsamen Typen.

use thiserror::Error;

/// Globaler Result-Alias fuer Vidrom
pub type Result<T> = std::result::Result<T, CoreError>;

/// Fehler die crate-uebergreifend auftreten koennen
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Rolle ist weder "intercom" noch "home"
    #[error("Ungueltige Rolle: {0}")]
    UngueltigeRolle(String),

    /// ID konnte nicht geparst werden
    #[error("Ungueltige ID: {0}")]
    UngueltigeId(String),
}
