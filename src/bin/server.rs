//! tempokv Server Binary
//!
//! Starts the TCP server for tempokv.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tempokv::network::Server;
use tempokv::{Config, VersionedStore};
use tracing_subscriber::{fmt, EnvFilter};

/// tempokv Server
#[derive(Parser, Debug)]
#[command(name = "tempokv-server")]
#[command(about = "Time-versioned key-value store with point-in-time reads")]
#[command(version)]
struct Args {
    /// Database file path
    #[arg(short, long, default_value = "./tempokv.db")]
    db_path: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7791")]
    listen: String,

    /// Number of connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Storage lock-wait timeout in milliseconds
    #[arg(short, long, default_value = "10000")]
    busy_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tempokv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("tempokv Server v{}", tempokv::VERSION);
    tracing::info!("Database file: {}", args.db_path);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .db_path(&args.db_path)
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .busy_timeout(Duration::from_millis(args.busy_timeout_ms))
        .build();

    // Open the store once; all workers share this instance
    let store = match VersionedStore::open(config.clone()) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Store initialized successfully");

    // Serve until shutdown is signalled
    let mut server = Server::new(config, Arc::clone(&store));
    let run_result = server.run();

    // Explicit shutdown phase: release the store before exiting
    store.close();

    if let Err(e) = run_result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
