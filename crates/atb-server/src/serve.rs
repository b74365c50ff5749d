//! Server startup, run loop and graceful shutdown.

use atb_events::EventStore;
use std::path::PathBuf;
use std::sync::Arc;

use crate::background::ReloadScheduler;
use crate::config::Config;
use crate::net::bind_listener;
use crate::{app, AppState, StartupError};

/// Loads the event log, binds the listener and serves until a shutdown
/// signal arrives.
///
/// The reload task is started only after the listener is bound and is
/// stopped once the server has drained.
///
/// # Errors
///
/// Returns [`StartupError`] when no event file is found or it cannot be
/// loaded, when no port can be bound, or when the server itself fails.
pub async fn run(logdir: PathBuf, config: Config) -> Result<(), StartupError> {
    let store = tokio::task::spawn_blocking(move || EventStore::initialize(logdir)).await??;
    let store = Arc::new(store);

    let listener = bind_listener(&config.server.host, config.server.port_request()).await?;
    let addr = listener.local_addr().map_err(StartupError::Serve)?;

    let scheduler = ReloadScheduler::new(store.clone());
    scheduler.start(config.reload.interval());

    tracing::info!(
        %addr,
        event_file = %store.source().event_file().display(),
        "serving at http://{}:{}/",
        config.server.host,
        addr.port()
    );

    let result = axum::serve(listener, app(AppState::new(store)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve);

    scheduler.stop(config.reload.shutdown_timeout()).await;
    tracing::info!("atb server shut down");
    result
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
///
/// A signal handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
