//! Response definitions
//!
//! Represents responses to clients.

/// Response status codes
///
/// The split mirrors the store's failure taxonomy: BUSY is transient and
/// retryable, BAD_REQUEST and ERROR are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    Absent = 0x01,
    Busy = 0x02,
    BadRequest = 0x03,
    Error = 0x04,
}

/// A response to send to the client
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (value for GETASOF, message for failures)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create an ABSENT response (no qualifying record; not a failure)
    pub fn absent() -> Self {
        Self {
            status: Status::Absent,
            payload: None,
        }
    }

    /// Create a BUSY response
    pub fn busy() -> Self {
        Self {
            status: Status::Busy,
            payload: None,
        }
    }

    /// Create a BAD_REQUEST response
    pub fn bad_request(message: &str) -> Self {
        Self {
            status: Status::BadRequest,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }
}
