//! Verbindungs-Handle – Sende-Queue einer einzelnen WebSocket-Verbindung
//!
//! Der Kern haelt nie den Socket selbst, nur dieses Handle. Der
//! Verbindungs-Task liest die Queue und schreibt auf den Socket. Endet der
//! Task, wird die Queue geschlossen und jedes weitere Senden schlaegt fehl.

use tokio::sync::mpsc;
use vidrom_core::ConnectionId;
use vidrom_protocol::SignalMessage;

/// Auftrag an den Verbindungs-Task
#[derive(Debug, Clone, PartialEq)]
pub enum Ausgehend {
    /// Nachricht als JSON-Text-Frame senden
    Nachricht(SignalMessage),
    /// Close-Frame senden und Verbindung beenden
    Schliessen,
}

/// Handle auf die Send-Queue einer Verbindung
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::Sender<Ausgehend>,
}

impl ConnectionHandle {
    /// Erstellt ein Handle samt Empfangsseite fuer den Verbindungs-Task
    pub fn neu(id: ConnectionId, queue_groesse: usize) -> (Self, mpsc::Receiver<Ausgehend>) {
        let (tx, rx) = mpsc::channel(queue_groesse.max(1));
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// `true` solange der Verbindungs-Task die Queue noch liest
    pub fn ist_offen(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Sendet eine Nachricht nicht-blockierend an den Client
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, nachricht: SignalMessage) -> bool {
        self.einreihen(Ausgehend::Nachricht(nachricht))
    }

    /// Fordert das Schliessen der Verbindung an
    ///
    /// Bereits eingereihte Nachrichten werden vorher noch gesendet.
    pub fn schliessen(&self) -> bool {
        self.einreihen(Ausgehend::Schliessen)
    }

    fn einreihen(&self, auftrag: Ausgehend) -> bool {
        match self.tx.try_send(auftrag) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(verbindung = %self.id, "Send-Queue voll – Nachricht verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(verbindung = %self.id, "Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn senden_landet_in_queue() {
        let (handle, mut rx) = ConnectionHandle::neu(ConnectionId::new(), 4);
        assert!(handle.senden(SignalMessage::Ring));
        assert_eq!(rx.try_recv().unwrap(), Ausgehend::Nachricht(SignalMessage::Ring));
    }

    #[test]
    fn schliessen_nach_nachricht() {
        let (handle, mut rx) = ConnectionHandle::neu(ConnectionId::new(), 4);
        handle.senden(SignalMessage::fehler("Token required"));
        handle.schliessen();
        assert!(matches!(rx.try_recv().unwrap(), Ausgehend::Nachricht(SignalMessage::Error { .. })));
        assert_eq!(rx.try_recv().unwrap(), Ausgehend::Schliessen);
    }

    #[test]
    fn senden_an_geschlossene_verbindung_schlaegt_fehl() {
        let (handle, rx) = ConnectionHandle::neu(ConnectionId::new(), 4);
        assert!(handle.ist_offen());
        drop(rx);
        assert!(!handle.ist_offen());
        assert!(!handle.senden(SignalMessage::Ring));
    }

    #[test]
    fn volle_queue_verwirft() {
        let (handle, _rx) = ConnectionHandle::neu(ConnectionId::new(), 1);
        assert!(handle.senden(SignalMessage::Ring));
        assert!(!handle.senden(SignalMessage::Ring));
    }

    #[test]
    fn gleichheit_ueber_id() {
        let id = ConnectionId::new();
        let (a, _rx_a) = ConnectionHandle::neu(id, 1);
        let (b, _rx_b) = ConnectionHandle::neu(id, 1);
        let (c, _rx_c) = ConnectionHandle::neu(ConnectionId::new(), 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
