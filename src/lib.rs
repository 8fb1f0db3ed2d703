//! # tempokv
//!
//! A time-versioned key-value store with:
//! - Point-in-time reads: the value of key K as of time T
//! - Caller-supplied integer timestamps, unique per (key, timestamp)
//! - Crash-durable transactional writes (embedded SQLite, WAL journal)
//! - Session-pooled concurrent access
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Worker Thread Pool                          │
//! │              (one connection per worker)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Versioned Store                             │
//! │          put(key, ts, value) / get_as_of(key, ts)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │Session Pool │          │   SQLite    │
//!   │ (per-worker)│          │ (WAL mode)  │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, TempoError};
pub use config::Config;
pub use store::VersionedStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tempokv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
