//! Versioned Store Module
//!
//! The core time-versioned key-value store.
//!
//! ## Responsibilities
//! - Own the persisted (key, timestamp, value) version history
//! - Point-in-time reads: latest record at or before a query timestamp
//! - Crash-durable writes, one transaction per put
//! - Session management for concurrent callers
//!
//! ## Versioning Model
//!
//! Records for one key form an ordered history indexed by the caller-supplied
//! timestamp. Timestamps need not be monotonic across calls and carry no
//! uniqueness requirement across keys; only the (key, timestamp) pair is
//! unique. A put on an existing pair overwrites that pair's value
//! (last-writer-wins) instead of adding a version.

mod session;

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::config::Config;
use crate::error::Result;
use session::SessionPool;

/// The time-versioned key-value store
///
/// ## Concurrency Model
///
/// Every operation acquires its own session (pooled connection) and runs
/// exactly one transaction against the backing database; there is no
/// in-process cache in front of it, so isolation reduces to the engine's own
/// transaction guarantees. Readers run concurrently with each other and with
/// a committing writer (WAL journal). A writer that cannot get the write
/// lock within the configured busy timeout fails with `TempoError::Busy`
/// rather than blocking indefinitely.
pub struct VersionedStore {
    /// Store configuration
    config: Config,

    /// Pooled sessions to the backing database
    pool: SessionPool,
}

impl VersionedStore {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Create parent directories for the database file
    /// 2. Open an initial session (creates the file if absent)
    /// 3. Ensure the schema exists (idempotent, safe on an existing store)
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: The engine creates the file, but not its directory
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let pool = SessionPool::new(config.db_path.clone(), config.busy_timeout);

        // Step 2 + 3: First session bootstraps the schema, then stays pooled
        {
            let mut session = pool.acquire()?;
            Self::init_schema(session.conn())?;
        }

        tracing::debug!("Store opened at {}", config.db_path.display());

        Ok(Self { config, pool })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified database file
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().db_path(path).build();
        Self::open(config)
    }

    /// Create the record table and its lookup index if they do not exist
    ///
    /// One table of (key, ts, value) triples, unique per (key, ts), plus an
    /// index supporting per-key descending-timestamp scans.
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS versions (
                key   TEXT NOT NULL,
                ts    INTEGER NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (key, ts)
            );

            -- Index for "max ts <= T for a given key" lookups
            CREATE INDEX IF NOT EXISTS idx_versions_key_ts
                ON versions(key, ts);
        "#,
        )?;
        Ok(())
    }

    /// Insert or overwrite the record for (key, timestamp)
    ///
    /// Runs as a single immediate transaction: the write is fully committed
    /// (and visible to subsequent reads) when this returns Ok, and no partial
    /// state is observable on any error path.
    pub fn put(&self, key: &str, timestamp: i64, value: &str) -> Result<()> {
        let mut session = self.pool.acquire()?;

        let tx = session
            .conn()
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT OR REPLACE INTO versions (key, ts, value) VALUES (?1, ?2, ?3)",
            params![key, timestamp, value],
        )?;
        tx.commit()?;

        Ok(())
    }

    /// Get the value of `key` as of `timestamp`
    ///
    /// Returns the value from the record with the largest timestamp at or
    /// before the query timestamp. `Ok(None)` means no qualifying record
    /// exists; that is a normal outcome, not a failure.
    pub fn get_as_of(&self, key: &str, timestamp: i64) -> Result<Option<String>> {
        let mut session = self.pool.acquire()?;

        let value = session
            .conn()
            .prepare(
                r#"SELECT value FROM versions
                   WHERE key = ?1 AND ts <= ?2
                   ORDER BY ts DESC
                   LIMIT 1"#,
            )?
            .query_row(params![key, timestamp], |row| row.get(0))
            .optional()?;

        Ok(value)
    }

    /// Close the store
    ///
    /// Releases all pooled sessions; every subsequent operation fails with
    /// `TempoError::Closed` rather than silently doing nothing. Sessions
    /// currently serving an operation finish it and are then discarded.
    pub fn close(&self) {
        self.pool.close();
        tracing::debug!("Store closed at {}", self.config.db_path.display());
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of version records held for a key
    pub fn version_count(&self, key: &str) -> Result<u64> {
        let mut session = self.pool.acquire()?;

        let count: i64 = session.conn().query_row(
            "SELECT COUNT(*) FROM versions WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;

        Ok(count as u64)
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &PathBuf {
        &self.config.db_path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
