//! # dsbridged: dsbridge daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Set up one integration per configured digitalSTROM server in its own
//!   task, rescheduling servers that are not ready yet
//! - Build the axum router over the integration registry and event bus
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod bootstrap;
mod config;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use dsbridge_adapter_http_axum::state::AppState;
use dsbridge_adapter_storage_sqlite_sqlx::{Database, SqliteStateRepository};
use dsbridge_adapter_virtual::VirtualServer;
use dsbridge_app::event_bus::InProcessEventBus;
use dsbridge_app::integration::DigitalStromIntegration;
use dsbridge_app::ports::Integration;
use dsbridge_app::registry::IntegrationRegistry;

use crate::bootstrap::Setup;
use crate::config::{Config, DigitalStromConfig};

type Bridge = DigitalStromIntegration<
    Arc<VirtualServer>,
    Arc<VirtualServer>,
    SqliteStateRepository,
    Arc<InProcessEventBus>,
>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Shutdown
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_tx.send_replace(true);
    });

    // Database
    let db = Arc::new(
        dsbridge_adapter_storage_sqlite_sqlx::Config {
            database_url: config.database_url().to_string(),
        }
        .build()
        .await?,
    );

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::default());

    // Integrations, each brought up in the background
    let registry = Arc::new(IntegrationRegistry::new());
    let mut setups = JoinSet::new();
    for entry in config.digitalstrom.iter().cloned() {
        setups.spawn(register(
            entry,
            Arc::clone(&db),
            Arc::clone(&event_bus),
            Arc::clone(&registry),
            shutdown_rx.clone(),
        ));
    }

    // HTTP
    let state = AppState::new(Arc::clone(&registry), Arc::clone(&event_bus));
    let app = dsbridge_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, servers = config.digitalstrom.len(), "dsbridged listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.wait_for(|stop| *stop).await.ok();
        })
        .await?;

    while let Some(result) = setups.join_next().await {
        if let Err(err) = result {
            tracing::error!(error = %err, "server setup task failed");
        }
    }
    registry.stop_all().await?;
    tracing::info!("dsbridged stopped");
    Ok(())
}

/// Set up one server, then register and start it.
async fn register(
    entry: DigitalStromConfig,
    db: Arc<Database>,
    event_bus: Arc<InProcessEventBus>,
    registry: Arc<IntegrationRegistry<Bridge>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let bridge = match connect(&entry, &db, &event_bus, &mut shutdown).await {
        Setup::Ready(bridge) => bridge,
        Setup::Skipped => return,
        Setup::Cancelled => {
            tracing::info!(host = %entry.host, "shutdown requested during setup");
            return;
        }
    };
    let bridge = match registry.insert(bridge) {
        Ok(bridge) => bridge,
        Err(err) => {
            tracing::error!(host = %entry.host, error = %err, "failed to register digitalSTROM server");
            return;
        }
    };
    if let Err(err) = bridge.start().await {
        tracing::error!(slug = %bridge.slug(), error = %err, "failed to start digitalSTROM server");
    }
}

/// Bring up one server, backed by a simulated dSS.
async fn connect(
    entry: &DigitalStromConfig,
    db: &Database,
    event_bus: &Arc<InProcessEventBus>,
    shutdown: &mut watch::Receiver<bool>,
) -> Setup<Bridge> {
    let server = Arc::new(VirtualServer::new(entry.simulated()));
    bootstrap::with_reschedule(&entry.host, entry.reschedule(), shutdown, || {
        DigitalStromIntegration::setup(
            entry.params(),
            Arc::clone(&server),
            Arc::clone(&server),
            SqliteStateRepository::new(db.pool().clone()),
            Arc::clone(event_bus),
        )
    })
    .await
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
