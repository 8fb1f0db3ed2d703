//! Session pool
//!
//! Caches connections to the backing database so concurrent workers do not
//! pay session-establishment cost on every operation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::Connection;

use crate::error::{Result, TempoError};

/// Pool of idle sessions to the backing database
///
/// ## Concurrency:
/// - `idle`: Protected by Mutex, held only to push/pop a connection
/// - `closed`: Atomic flag; once set, acquire fails with `Closed` and
///   connections returned by in-flight sessions are discarded
///
/// Each `Session` handed out is used by exactly one thread; the pool itself
/// is shared across all workers.
pub(crate) struct SessionPool {
    /// Path of the database file new connections open
    db_path: PathBuf,

    /// Lock-wait budget applied to every connection
    busy_timeout: Duration,

    /// Idle connections available for reuse
    idle: Mutex<Vec<Connection>>,

    /// Set by `close`; never cleared
    closed: AtomicBool,
}

impl SessionPool {
    pub fn new(db_path: PathBuf, busy_timeout: Duration) -> Self {
        Self {
            db_path,
            busy_timeout,
            idle: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Acquire a session, reusing an idle connection when one is available
    pub fn acquire(&self) -> Result<Session<'_>> {
        if self.is_closed() {
            return Err(TempoError::Closed);
        }

        let pooled = self.idle.lock().pop();
        let conn = match pooled {
            Some(conn) => conn,
            None => self.open_connection()?,
        };

        Ok(Session {
            conn: Some(conn),
            pool: self,
        })
    }

    /// Open a fresh connection with the durability mode applied
    ///
    /// WAL journal + NORMAL synchronous: a committed write survives a process
    /// crash, and readers proceed while a writer commits. The busy timeout
    /// bounds how long the engine waits for the write lock before returning
    /// SQLITE_BUSY.
    fn open_connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(conn)
    }

    /// Return a connection to the pool (discarded if the pool closed while
    /// the session was out)
    fn release(&self, conn: Connection) {
        if self.is_closed() {
            drop(conn);
            return;
        }
        self.idle.lock().push(conn);
    }

    /// Drop all idle connections and refuse further acquires
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.idle.lock().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }
}

/// RAII handle to one pooled connection
///
/// Not shared between threads; the connection goes back to the pool when the
/// session drops, on every exit path.
pub(crate) struct Session<'a> {
    /// Present until drop takes it back
    conn: Option<Connection>,

    /// Owning pool
    pool: &'a SessionPool,
}

impl Session<'_> {
    /// Access the underlying connection
    pub fn conn(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("session connection taken before drop")
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}
