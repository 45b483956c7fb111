//! # Ledger-Anchor Node Runtime
//!
//! Entry point wiring the subsystems into one process:
//!
//! ```text
//! chain follower ──» ChainIngestor ──» LedgerStore «── ReconcileEngine
//!                                          ▲  ▲
//!                           GossipPublisher ┘  └ TimeoutSweeper
//!                           InboundHandler ─────────┘
//! ```
//!
//! All loops share one watch-channel shutdown signal; Ctrl+C flips it and
//! every loop finishes its in-flight iteration before exiting.

mod config;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use la_02_chain_ingest::{ChainIngestor, ChainMessage};
use la_03_ledger_store::{InMemoryLedgerStore, LedgerStore};
use la_04_reconciliation::{ReconcileEngine, TimeoutSweeper};
use la_05_gossip::{GossipPublisher, InboundHandler, LoopbackTransport};
use shared_types::{SystemTimeSource, TimeSource};

use crate::config::Config;

/// Handle the external chain follower pushes block/rollback messages into.
pub type FollowerHandle = mpsc::Sender<ChainMessage>;

struct NodeRuntime {
    tasks: Vec<tokio::task::JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
    /// Kept alive so the ingestor loop survives until a follower attaches.
    _follower: FollowerHandle,
}

impl NodeRuntime {
    fn start(config: Config) -> Self {
        info!("=========================================");
        info!("  Ledger-Anchor Node v0.1.0");
        info!("=========================================");

        let time: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
        let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::new(time.clone()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = Vec::new();

        let (follower_tx, follower_rx) = mpsc::channel(config.follower_buffer);
        let ingestor = ChainIngestor::new(store.clone());
        tasks.push(tokio::spawn(ingestor.run(follower_rx, shutdown_rx.clone())));

        let engine = ReconcileEngine::new(store.clone(), time.clone(), config.batch_size);
        tasks.push(tokio::spawn(engine.run(config.engine_tick, shutdown_rx.clone())));

        let sweeper = TimeoutSweeper::new(
            store.clone(),
            config.retention_window,
            config.mint_ttl_secs,
            time.clone(),
        );
        tasks.push(tokio::spawn(sweeper.run(config.sweep_interval, shutdown_rx.clone())));

        let (transport, gossip_rx) = LoopbackTransport::new();
        let publisher = GossipPublisher::new(store.clone(), Arc::new(transport), config.batch_size);
        tasks.push(tokio::spawn(publisher.run(config.gossip_interval, shutdown_rx.clone())));

        let inbound = InboundHandler::new(store);
        tasks.push(tokio::spawn(inbound.run(gossip_rx, shutdown_rx)));

        info!("all subsystems running");
        Self {
            tasks,
            shutdown_tx,
            _follower: follower_tx,
        }
    }

    async fn shutdown(self) {
        info!("initiating graceful shutdown");
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
        info!("shutdown complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let config = Config::from_env();
    info!(?config, "configuration loaded");

    let runtime = NodeRuntime::start(config);

    info!("node is running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
