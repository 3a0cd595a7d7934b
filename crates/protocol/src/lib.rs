//! vidrom-protocol – Wire-Format des Signaling-Protokolls
//!
//! Alle Nachrichten sind JSON-Objekte mit einem `type`-Diskriminator.
//! Das Crate definiert die Nachrichtentypen und die tolerante
//! Dekodierung eingehender Frames.

pub mod error;
pub mod signal;

pub use error::{ProtocolError, ProtocolResult};
pub use signal::SignalMessage;
