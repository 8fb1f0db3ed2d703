//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: GETASOF - Payload: key_len (4) + key + ts (8)
//! - 0x02: PUT     - Payload: key_len (4) + key + ts (8) + value
//! - 0x03: PING    - Payload: empty
//!
//! Timestamps are signed 64-bit integers, big-endian two's complement.
//! Key and value bytes must be valid UTF-8.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: ABSENT      (no record at or before the query timestamp)
//! - 0x02: BUSY        (lock-wait timeout; retryable)
//! - 0x03: BAD_REQUEST (malformed request content; not retryable)
//! - 0x04: ERROR

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response,
};
