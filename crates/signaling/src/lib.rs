//! vidrom-signaling – WebSocket-Signaling zwischen Intercom und Home
//!
//! Dieser Crate verbindet genau zwei Rollen: das Intercom an der Tuer und
//! die Home-App in der Wohnung. Er verwaltet, wer gerade erreichbar ist,
//! haelt ein offenes Klingeln ueber Verbindungsabbrueche hinweg und leitet
//! die WebRTC-Negotiation zwischen beiden Seiten weiter.
//!
//! ## Architektur
//!
//! ```text
//! SignalingServer (axum, GET / und /ws)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |  Anonym -> Registriert(rolle) -> Geschlossen
//!     |
//!     v
//! MessageDispatcher
//!     |
//!     v
//! SignalingState
//!     +-- RoleRegistry   (ein Slot pro Rolle, last writer wins)
//!     +-- PendingRing    (offenes Klingeln, 30s Ablauf)
//!     +-- FCM-Tabelle    (Push-Adresse pro Rolle)
//!     +-- IntercomAuthGate
//!     +-- PushDienst
//! ```

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod push;
pub mod registry;
pub mod ring;
pub mod server_state;
pub mod ws;

// Bequeme Re-Exporte
pub use connection::ClientConnection;
pub use dispatcher::{DispatcherContext, MessageDispatcher};
pub use error::{SignalingError, SignalingResult};
pub use handle::{Ausgehend, ConnectionHandle};
pub use push::{FcmPush, KeinPush, PushDienst, PushError};
pub use registry::RoleRegistry;
pub use ring::PendingRing;
pub use server_state::{SignalingConfig, SignalingState, SignalingStatus};
pub use ws::SignalingServer;
