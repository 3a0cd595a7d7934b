//! vidrom-server – Bibliotheks-Root
//!
//! Baut aus der Konfiguration den kompletten HTTP-Router (WebSocket,
//! HTTP-API, Health) und stellt den Einstiegspunkt fuer Tests bereit.

pub mod config;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use config::ServerConfig;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use vidrom_auth::{DeviceTokenService, GeraeteSpeicher, IntercomAuthGate};
use vidrom_commander::CommanderState;
use vidrom_observability::{health_router, HealthDetails, HealthState};
use vidrom_signaling::{FcmPush, KeinPush, PushDienst, SignalingServer, SignalingState};

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
    shutdown_tx: watch::Sender<bool>,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            shutdown_tx,
        }
    }

    /// Baut den vollstaendigen Router
    ///
    /// ```text
    /// GET  /, /ws                        WebSocket-Signaling
    /// POST /decline, /register-fcm-token Anruf-Aktionen
    /// POST /api/devices/provision        Provisionierung
    /// *    /api/admin/devices...         Geraeteverwaltung (Admin-Token)
    /// GET  /health                       Health-Check
    /// ```
    pub fn router(&self) -> Result<Router> {
        let geraete = GeraeteSpeicher::neu();
        let tokens = Arc::new(DeviceTokenService::neu(
            &self.config.auth.jwt_secret,
            self.config.auth.token_gueltigkeit_tage,
        ));
        let gate = IntercomAuthGate::neu(tokens.clone(), geraete.clone());
        let push = self.push_dienst()?;

        let signaling = SignalingState::neu(self.config.signaling_config(), gate, push);

        let commander = CommanderState::neu(
            Arc::clone(&signaling),
            geraete,
            tokens,
            self.config.admin.token.clone(),
        );

        let status_quelle = Arc::clone(&signaling);
        let health = HealthState::neu(move || {
            let status = status_quelle.status();
            HealthDetails {
                intercom_connected: status.intercom_verbunden,
                home_connected: status.home_verbunden,
                ring_pending: status.klingelt,
            }
        });

        let app = SignalingServer::neu(signaling, self.shutdown_tx.subscribe())
            .router()
            .merge(vidrom_commander::router(commander))
            .merge(health_router(health))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        Ok(app)
    }

    fn push_dienst(&self) -> Result<Arc<dyn PushDienst>> {
        let push = &self.config.push;
        if !push.aktiviert {
            tracing::info!("Push deaktiviert");
            return Ok(Arc::new(KeinPush));
        }

        let fcm = FcmPush::neu(
            push.fcm_endpunkt.as_str(),
            push.fcm_projekt_id.as_str(),
            push.fcm_access_token.as_str(),
        )?;
        tracing::info!(projekt = %push.fcm_projekt_id, "FCM-Push aktiviert");
        Ok(Arc::new(fcm))
    }

    /// Startet den Server und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Router und geteilten Zustand aufbauen
    /// 2. TCP-Listener binden
    /// 3. Bis Ctrl-C bedienen, dann offene WebSockets trennen
    pub async fn starten(self) -> Result<()> {
        if self.config.nutzt_entwicklungs_secret() {
            tracing::warn!("Entwicklungs-Secret fuer Geraete-Tokens aktiv, JWT_SECRET setzen");
        }
        if self.config.admin.token.as_deref().unwrap_or("").is_empty() {
            tracing::warn!("Kein Admin-Token konfiguriert, Admin-Routen sind gesperrt");
        }

        let app = self.router()?;
        let adresse = self.config.bind_adresse();
        let listener = tokio::net::TcpListener::bind(&adresse).await?;
        tracing::info!(adresse = %listener.local_addr()?, "Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");

        let shutdown_tx = self.shutdown_tx;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(fehler = %e, "Ctrl-C-Handler konnte nicht installiert werden");
                    std::future::pending::<()>().await;
                }
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
                let _ = shutdown_tx.send(true);
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get(app: Router, pfad: &str) -> (StatusCode, serde_json::Value) {
        let antwort = app
            .oneshot(Request::builder().uri(pfad).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = antwort.status();
        let bytes = axum::body::to_bytes(antwort.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn health_ueber_gesamten_router() {
        let server = Server::neu(ServerConfig::default());
        let (status, body) = get(server.router().unwrap(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["intercom_connected"], false);
        assert_eq!(body["ring_pending"], false);
    }

    #[tokio::test]
    async fn admin_ohne_token_gesperrt() {
        let server = Server::neu(ServerConfig::default());
        let (status, _) = get(server.router().unwrap(), "/api/admin/devices").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn websocket_route_verlangt_upgrade() {
        let server = Server::neu(ServerConfig::default());
        let (status, _) = get(server.router().unwrap(), "/ws").await;
        assert!(status.is_client_error());
    }

    #[test]
    fn push_ohne_projekt_schlaegt_fehl() {
        let mut config = ServerConfig::default();
        config.push.aktiviert = true;
        assert!(Server::neu(config).router().is_err());
    }
}
