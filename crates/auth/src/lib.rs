//! vidrom-auth – Geraete-Provisionierung und Intercom-Authentifizierung
//!
//! Dieses Crate implementiert:
//! - Geraete-Token (HS256, JWT-kompatibel) signieren und verifizieren
//! - In-Memory-Geraetespeicher mit einmaligen Provisionierungscodes
//! - IntercomAuthGate (Token pruefen, Geraet nachschlagen, Status pruefen)

pub mod device_token;
pub mod devices;
pub mod error;
pub mod gate;

// Bequeme Re-Exporte
pub use device_token::{CredentialVerifier, DeviceClaims, DeviceTokenService, GeraeteIdentitaet};
pub use devices::{Geraet, GeraeteSpeicher, GeraeteStatus, GeraeteVerzeichnis, NeuesGeraet};
pub use error::{AuthError, AuthResult};
pub use gate::IntercomAuthGate;
