//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver};

use crate::config::Config;
use crate::error::{Result, TempoError};
use crate::store::VersionedStore;

use super::connection::Connection;

/// How often the accept loop polls the shutdown flag
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// TCP server for tempokv
///
/// One acceptor thread (the caller of `run`) plus a fixed pool of worker
/// threads. Accepted streams travel over a bounded channel; each worker
/// serves one connection at a time until the client disconnects.
pub struct Server {
    /// Server configuration
    config: Config,

    /// Shared store all connections operate on
    store: Arc<VersionedStore>,

    /// Cooperative stop flag, polled by the accept loop
    shutdown: Arc<AtomicBool>,
}

/// Handle for signalling the server to stop from another thread
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Request a graceful stop; `Server::run` returns after draining
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

impl Server {
    /// Create a new server with the given config and store
    pub fn new(config: Config, store: Arc<VersionedStore>) -> Self {
        Self {
            config,
            store,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle that can stop this server
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Start the server (blocking)
    ///
    /// Returns once `shutdown` is signalled and the worker pool has drained,
    /// or immediately on a bind failure.
    pub fn run(&mut self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            TempoError::Network(format!("bind {}: {}", self.config.listen_addr, e))
        })?;

        // Non-blocking accept so the shutdown flag is polled between clients
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", self.config.listen_addr);

        // Bounded queue between the acceptor and the workers
        let (tx, rx) = channel::bounded::<TcpStream>(self.config.worker_threads * 2);

        let mut workers = Vec::with_capacity(self.config.worker_threads);
        for id in 0..self.config.worker_threads {
            let rx = rx.clone();
            let store = Arc::clone(&self.store);
            let config = self.config.clone();

            let handle = thread::Builder::new()
                .name(format!("tempokv-worker-{}", id))
                .spawn(move || worker_loop(id, rx, store, config))?;
            workers.push(handle);
        }
        drop(rx);

        // Accept loop
        while !self.shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    tracing::trace!("Accepted connection from {}", addr);
                    if tx.send(stream).is_err() {
                        // All workers gone; nothing left to serve with
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept error: {}", e);
                }
            }
        }

        tracing::info!("Shutting down, draining workers");

        // Closing the channel lets workers finish queued streams and exit
        drop(tx);
        for worker in workers {
            let _ = worker.join();
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Worker body: serve connections from the queue until it closes
fn worker_loop(id: usize, rx: Receiver<TcpStream>, store: Arc<VersionedStore>, config: Config) {
    while let Ok(stream) = rx.recv() {
        let mut conn = match Connection::new(stream, Arc::clone(&store)) {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("Worker {}: connection setup failed: {}", id, e);
                continue;
            }
        };

        if let Err(e) = conn.set_timeouts(config.read_timeout_ms, config.write_timeout_ms) {
            tracing::warn!("Worker {}: failed to set timeouts: {}", id, e);
            continue;
        }

        if let Err(e) = conn.handle() {
            tracing::warn!(
                "Worker {}: connection {} ended with error: {}",
                id,
                conn.peer_addr(),
                e
            );
        }
    }

    tracing::debug!("Worker {} exiting", id);
}
