//! Klingel-Zustand – offener Anruf mit automatischem Ablauf
//!
//! Der Zustand ist unabhaengig von jeder einzelnen Verbindung: ein Klingeln
//! ueberlebt ein Trennen und Wiederverbinden der Home-App (z.B. nach einem
//! Push-getriggerten App-Start), verfaellt aber nach dem Timeout still.
//!
//! ## Timer
//! Pro Klingeln genau ein Ablauf-Task. Erneutes Markieren bricht den alten
//! Task ab. Jeder Task traegt eine Generation; ein Task, dessen Generation
//! nicht mehr aktuell ist, aendert nichts. Dadurch kann ein Ablauf, der
//! zeitgleich mit `accept`/`decline` eintrifft, den neuen Zustand nicht
//! ueberschreiben.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Standard-Timeout eines unbeantworteten Klingelns
pub const KLINGEL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
struct RingInner {
    aktiv: bool,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl RingInner {
    fn timer_abbrechen(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Systemweit hoechstens ein offenes Klingeln
#[derive(Debug)]
pub struct PendingRing {
    inner: Arc<Mutex<RingInner>>,
    timeout: Duration,
}

impl PendingRing {
    pub fn neu(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RingInner::default())),
            timeout,
        }
    }

    /// Markiert ein offenes Klingeln und (re)startet den Ablauf-Timer
    ///
    /// Muss innerhalb einer tokio-Runtime aufgerufen werden.
    pub fn klingeln_markieren(&self) {
        let mut inner = self.inner.lock();
        inner.timer_abbrechen();
        inner.generation = inner.generation.wrapping_add(1);
        inner.aktiv = true;

        let generation = inner.generation;
        let timeout = self.timeout;
        let zustand: Weak<Mutex<RingInner>> = Arc::downgrade(&self.inner);
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let Some(zustand) = zustand.upgrade() else {
                return;
            };
            let mut inner = zustand.lock();
            if inner.generation == generation && inner.aktiv {
                inner.aktiv = false;
                inner.timer = None;
                tracing::info!(timeout_sek = timeout.as_secs(), "Klingeln unbeantwortet abgelaufen");
            }
        }));
    }

    /// Beendet ein offenes Klingeln (idempotent)
    pub fn zuruecksetzen(&self) {
        let mut inner = self.inner.lock();
        inner.timer_abbrechen();
        inner.generation = inner.generation.wrapping_add(1);
        if inner.aktiv {
            tracing::debug!("Offenes Klingeln beendet");
        }
        inner.aktiv = false;
    }

    /// Ob gerade ein Klingeln offen ist
    pub fn klingelt(&self) -> bool {
        self.inner.lock().aktiv
    }
}

impl Default for PendingRing {
    fn default() -> Self {
        Self::neu(KLINGEL_TIMEOUT)
    }
}

impl Drop for PendingRing {
    fn drop(&mut self) {
        self.inner.lock().timer_abbrechen();
    }
}
