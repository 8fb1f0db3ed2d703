//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, TempoError};
use crate::protocol::{read_command, write_response, Command, Response};
use crate::store::VersionedStore;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Reference to the versioned store
    store: Arc<VersionedStore>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O on a blocking stream
    pub fn new(stream: TcpStream, store: Arc<VersionedStore>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // The listener accepts in non-blocking mode; handlers want blocking reads
        stream.set_nonblocking(false)?;
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            store,
            peer_addr,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads commands in a loop and sends responses.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            // Read next command
            let command = match read_command(&mut self.reader) {
                Ok(cmd) => cmd,
                Err(TempoError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} disconnected: {}", self.peer_addr, e.kind());
                    return Ok(());
                }
                Err(TempoError::Io(ref e)) if is_timeout(e.kind()) => {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(TempoError::InvalidInput(msg)) => {
                    // Frame was consumed; the content was bad. Report and keep serving.
                    self.send_response(Response::bad_request(&msg))?;
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    // Framing is gone; best-effort error response, then close
                    let _ = self.send_response(Response::error(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("Received command from {}: {:?}", self.peer_addr, command);

            // Execute command
            let response = self.execute_command(command);

            // Send response
            if let Err(e) = self.send_response(response) {
                // Client may have gone away before the response could be sent;
                // that is a graceful exit, not a server error.
                if let TempoError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Execute a command against the store and build the response
    ///
    /// Maps the store's failure taxonomy onto wire statuses: Busy is
    /// signalled as retryable, absent reads are a normal outcome, and
    /// everything else is an opaque error.
    fn execute_command(&self, command: Command) -> Response {
        match command {
            Command::GetAsOf { key, timestamp } => {
                match self.store.get_as_of(&key, timestamp) {
                    Ok(Some(value)) => Response::ok(Some(value.into_bytes())),
                    Ok(None) => Response::absent(),
                    Err(e) => error_response(e),
                }
            }
            Command::Put {
                key,
                timestamp,
                value,
            } => match self.store.put(&key, timestamp, &value) {
                Ok(()) => Response::ok(None),
                Err(e) => error_response(e),
            },
            Command::Ping => Response::ok(Some(b"PONG".to_vec())),
        }
    }

    /// Send a response to the client
    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)?;
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Map a store error onto a wire response
fn error_response(err: TempoError) -> Response {
    match err {
        TempoError::Busy => Response::busy(),
        TempoError::InvalidInput(msg) => Response::bad_request(&msg),
        other => Response::error(&other.to_string()),
    }
}

/// Error kinds meaning the peer went away
fn is_disconnect(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
    )
}

/// Error kinds meaning the read timed out (Windows reports TimedOut,
/// Unix reports WouldBlock)
fn is_timeout(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}
