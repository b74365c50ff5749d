//! Background tasks for the atb server.
//!
//! Includes:
//! - Periodically re-reading the event file for newly appended records.

use atb_events::EventStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Default period between event file reloads.
pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_secs(10);

/// Owns the single periodic reload task for an [`EventStore`].
///
/// At most one loop runs at a time. [`start`](Self::start) and
/// [`stop`](Self::stop) are both idempotent.
pub struct ReloadScheduler {
    store: Arc<EventStore>,
    running: Mutex<Option<RunningLoop>>,
}

struct RunningLoop {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ReloadScheduler {
    pub fn new(store: Arc<EventStore>) -> Self {
        Self {
            store,
            running: Mutex::new(None),
        }
    }

    /// Spawns the reload loop unless one is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, interval: Duration) {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            tracing::debug!("reload task already running");
            return;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_reload_loop(self.store.clone(), interval, stop_rx));
        *running = Some(RunningLoop { stop_tx, handle });
    }

    /// Signals the loop to stop and waits up to `timeout` for it to exit.
    ///
    /// A reload already in progress is allowed to finish; no new reload
    /// starts after this returns. If the loop does not exit in time it is
    /// left to finish on its own rather than aborted.
    pub async fn stop(&self, timeout: Duration) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(RunningLoop { stop_tx, handle }) = running else {
            return;
        };

        // The loop may already be gone, in which case there is no receiver.
        let _ = stop_tx.send(true);

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(())) => tracing::info!("reload task stopped"),
            Ok(Err(e)) => tracing::error!(error = %e, "reload task panicked or was cancelled"),
            Err(_) => tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "reload task did not stop in time, leaving it to finish"
            ),
        }
    }

    /// Whether a reload loop is currently active.
    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }
}

/// Waits `interval`, reloads, and repeats until a stop is signalled.
///
/// A stop that arrives while waiting ends the loop without reloading. A
/// reload that fails or panics is logged and the loop keeps going.
async fn run_reload_loop(
    store: Arc<EventStore>,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    tracing::info!(
        interval_secs = interval.as_secs_f64(),
        event_file = %store.source().event_file().display(),
        "starting event reload task"
    );

    loop {
        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                // A dropped sender also means nobody can restart this loop.
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
                continue;
            }
            () = sleep(interval) => {}
        }

        let store = store.clone();
        match tokio::task::spawn_blocking(move || store.reload()).await {
            Ok(0) => tracing::trace!("no new event records"),
            Ok(merged) => tracing::info!(merged, "reloaded event file"),
            Err(e) => tracing::error!(error = %e, "event reload panicked"),
        }
    }

    tracing::debug!("event reload task exiting");
}
