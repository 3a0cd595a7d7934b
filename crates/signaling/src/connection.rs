//! Client-Connection – Verwaltet eine einzelne WebSocket-Verbindung
//!
//! Jede Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Der Task liest eingehende Frames und schreibt die Send-Queue
//! des [`ConnectionHandle`] auf den Socket.
//!
//! ## Ablauf
//! ```text
//! Accept -> Anonym -> Registriert(rolle) -> Close
//!                \-> Auth abgelehnt: error-Frame, Close-Frame
//! ```

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use vidrom_core::ConnectionId;
use vidrom_protocol::SignalMessage;

use crate::dispatcher::{DispatcherContext, MessageDispatcher};
use crate::handle::{Ausgehend, ConnectionHandle};
use crate::server_state::SignalingState;

enum Ereignis {
    Frame(Option<Result<Message, axum::Error>>),
    Auftrag(Ausgehend),
    Shutdown,
}

/// Verarbeitet eine einzelne WebSocket-Verbindung
pub struct ClientConnection {
    state: Arc<SignalingState>,
    id: ConnectionId,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection mit frischer ID
    pub fn neu(state: Arc<SignalingState>) -> Self {
        Self {
            state,
            id: ConnectionId::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis der Client trennt, die Verbindung nach einer abgelehnten
    /// Registrierung geschlossen wird oder ein Shutdown-Signal eingeht.
    pub async fn verarbeiten(self, socket: WebSocket, mut shutdown_rx: watch::Receiver<bool>) {
        let id = self.id;
        tracing::info!(verbindung = %id, "Neue Verbindung");

        let (mut ws_tx, mut ws_rx) = socket.split();
        let (handle, mut sende_rx) = ConnectionHandle::neu(id, self.state.config.sende_queue_groesse);
        let mut ctx = DispatcherContext::neu(handle);
        let dispatcher = MessageDispatcher::neu(Arc::clone(&self.state));

        // Frames die waehrend einer laufenden Verarbeitung eingetroffen sind
        let mut rueckstand: VecDeque<Message> = VecDeque::new();

        loop {
            let ereignis = match rueckstand.pop_front() {
                Some(frame) => Ereignis::Frame(Some(Ok(frame))),
                None => tokio::select! {
                    // Eingehender Frame vom Client
                    frame = ws_rx.next() => Ereignis::Frame(frame),

                    // Ausgehende Nachricht aus der Send-Queue
                    Some(auftrag) = sende_rx.recv() => Ereignis::Auftrag(auftrag),

                    // Shutdown-Signal
                    Ok(()) = shutdown_rx.changed() => {
                        if !*shutdown_rx.borrow() {
                            continue;
                        }
                        Ereignis::Shutdown
                    }
                },
            };

            match ereignis {
                Ereignis::Frame(frame) => {
                    let rohdaten = match frame {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Binary(daten))) => match String::from_utf8(daten) {
                            Ok(text) => text,
                            Err(_) => {
                                tracing::warn!(verbindung = %id, "Binaer-Frame ist kein UTF-8, ignoriert");
                                continue;
                            }
                        },
                        Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!(verbindung = %id, rolle = ?ctx.rolle, "Verbindung vom Client getrennt");
                            break;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(verbindung = %id, fehler = %e, "WebSocket-Lesefehler");
                            break;
                        }
                    };

                    // Eine laufende Intercom-Pruefung wird abgebrochen, sobald
                    // der Client trennt
                    let getrennt = {
                        let verarbeitung = dispatcher.rohdaten_verarbeiten(&rohdaten, &mut ctx);
                        tokio::pin!(verarbeitung);
                        loop {
                            tokio::select! {
                                biased;
                                () = &mut verarbeitung => break false,
                                frame = ws_rx.next() => match frame {
                                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break true,
                                    Some(Ok(frame)) => rueckstand.push_back(frame),
                                },
                            }
                        }
                    };

                    if getrennt {
                        tracing::info!(verbindung = %id, "Client waehrend der Verarbeitung getrennt");
                        break;
                    }
                    if ctx.schliessen {
                        queue_leeren_und_schliessen(&mut ws_tx, &mut sende_rx, id).await;
                        break;
                    }
                }

                Ereignis::Auftrag(Ausgehend::Nachricht(nachricht)) => {
                    if !frame_senden(&mut ws_tx, &nachricht, id).await {
                        break;
                    }
                }

                Ereignis::Auftrag(Ausgehend::Schliessen) => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    tracing::info!(verbindung = %id, "Verbindung serverseitig geschlossen");
                    break;
                }

                Ereignis::Shutdown => {
                    tracing::info!(verbindung = %id, "Shutdown-Signal – Verbindung wird getrennt");
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }

        dispatcher.verbindung_geschlossen(&ctx);
        tracing::info!(verbindung = %id, "Verbindungs-Task beendet");
    }
}

/// Sendet noch wartende Nachrichten und danach einen Close-Frame
async fn queue_leeren_und_schliessen<S>(
    ws_tx: &mut S,
    sende_rx: &mut mpsc::Receiver<Ausgehend>,
    id: ConnectionId,
) where
    S: Sink<Message> + Unpin,
{
    while let Ok(auftrag) = sende_rx.try_recv() {
        match auftrag {
            Ausgehend::Nachricht(nachricht) => {
                if !frame_senden(ws_tx, &nachricht, id).await {
                    return;
                }
            }
            Ausgehend::Schliessen => break,
        }
    }
    let _ = ws_tx.send(Message::Close(None)).await;
    tracing::info!(verbindung = %id, "Verbindung nach abgelehnter Registrierung geschlossen");
}

async fn frame_senden<S>(ws_tx: &mut S, nachricht: &SignalMessage, id: ConnectionId) -> bool
where
    S: Sink<Message> + Unpin,
{
    let text = match nachricht.kodieren() {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(verbindung = %id, fehler = %e, "Nachricht nicht kodierbar");
            return true;
        }
    };

    if ws_tx.send(Message::Text(text)).await.is_err() {
        tracing::warn!(verbindung = %id, "Senden fehlgeschlagen");
        return false;
    }
    true
}
