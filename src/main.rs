use fitness_tracker::{AppState, Config, FileBackend, FitnessStore, StorageAdapter, router};
use std::net::SocketAddr;
use tokio::fs;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Err(err) = fs::create_dir_all(&config.data_dir).await {
        warn!("failed to create data dir {}: {err}", config.data_dir.display());
    }

    let storage = StorageAdapter::new(FileBackend::new(&config.data_dir));
    if storage.is_durable() {
        info!("storing data in {}", config.data_dir.display());
    } else {
        warn!("data will not survive a restart");
    }

    let mut storage_events = storage.subscribe();
    tokio::spawn(async move {
        loop {
            match storage_events.recv().await {
                Ok(event) => debug!(op = ?event.op, key = ?event.key, "storage fallback: {}", event.message),
                Err(RecvError::Lagged(missed)) => debug!(missed, "storage events dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let state = AppState::new(FitnessStore::new(storage));
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutting down");
}
