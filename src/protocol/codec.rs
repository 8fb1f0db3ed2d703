//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - GETASOF: key_len (4 bytes) + key + ts (8 bytes)
//! - PUT:     key_len (4 bytes) + key + ts (8 bytes) + value
//! - PING:    empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! Framing violations (short payloads, unknown tags, oversized lengths)
//! decode to `Protocol` errors; well-framed but invalid content (non-UTF-8
//! key or value bytes) decodes to `InvalidInput`.

use std::io::{Read, Write};

use crate::error::{Result, TempoError};

use super::{Command, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Timestamp field width on the wire
const TIMESTAMP_SIZE: usize = 8;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let cmd_type = command.command_type() as u8;

    // Build payload based on command type
    let payload = match command {
        Command::GetAsOf { key, timestamp } => {
            let key = key.as_bytes();
            let mut payload = Vec::with_capacity(4 + key.len() + TIMESTAMP_SIZE);
            payload.extend_from_slice(&(key.len() as u32).to_be_bytes());
            payload.extend_from_slice(key);
            payload.extend_from_slice(&timestamp.to_be_bytes());
            payload
        }
        Command::Put {
            key,
            timestamp,
            value,
        } => {
            let key = key.as_bytes();
            let value = value.as_bytes();
            let mut payload = Vec::with_capacity(4 + key.len() + TIMESTAMP_SIZE + value.len());
            payload.extend_from_slice(&(key.len() as u32).to_be_bytes());
            payload.extend_from_slice(key);
            payload.extend_from_slice(&timestamp.to_be_bytes());
            payload.extend_from_slice(value);
            payload
        }
        Command::Ping => Vec::new(),
    };

    // Build full message: header + payload
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(cmd_type);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(&payload);

    message
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    if bytes.len() < HEADER_SIZE {
        return Err(TempoError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    // Parse header
    let cmd_type = bytes[0];
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;

    // Validate payload length
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(TempoError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(TempoError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    let payload = &bytes[HEADER_SIZE..total_len];

    // Parse command based on type
    match cmd_type {
        0x01 => decode_get_as_of_command(payload),
        0x02 => decode_put_command(payload),
        0x03 => decode_ping_command(payload),
        _ => Err(TempoError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            cmd_type
        ))),
    }
}

/// Decode GETASOF command payload
fn decode_get_as_of_command(payload: &[u8]) -> Result<Command> {
    let (key, rest) = take_key("GETASOF", payload)?;
    let (timestamp, rest) = take_timestamp("GETASOF", rest)?;

    if !rest.is_empty() {
        return Err(TempoError::Protocol(format!(
            "GETASOF command: {} trailing bytes after timestamp",
            rest.len()
        )));
    }

    Ok(Command::GetAsOf { key, timestamp })
}

/// Decode PUT command payload
fn decode_put_command(payload: &[u8]) -> Result<Command> {
    let (key, rest) = take_key("PUT", payload)?;
    let (timestamp, rest) = take_timestamp("PUT", rest)?;

    let value = String::from_utf8(rest.to_vec())
        .map_err(|_| TempoError::InvalidInput("value is not valid UTF-8".to_string()))?;

    Ok(Command::Put {
        key,
        timestamp,
        value,
    })
}

/// Decode PING command payload
fn decode_ping_command(payload: &[u8]) -> Result<Command> {
    if !payload.is_empty() {
        return Err(TempoError::Protocol(format!(
            "PING command: unexpected payload of {} bytes",
            payload.len()
        )));
    }
    Ok(Command::Ping)
}

/// Consume a length-prefixed key field, returning it and the remaining bytes
fn take_key<'a>(cmd: &str, payload: &'a [u8]) -> Result<(String, &'a [u8])> {
    if payload.len() < 4 {
        return Err(TempoError::Protocol(format!(
            "{} command: missing key length",
            cmd
        )));
    }

    let key_len = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;

    if payload.len() < 4 + key_len {
        return Err(TempoError::Protocol(format!(
            "{} command: incomplete key (expected {}, got {})",
            cmd,
            key_len,
            payload.len() - 4
        )));
    }

    let key = String::from_utf8(payload[4..4 + key_len].to_vec())
        .map_err(|_| TempoError::InvalidInput("key is not valid UTF-8".to_string()))?;

    Ok((key, &payload[4 + key_len..]))
}

/// Consume an 8-byte timestamp field, returning it and the remaining bytes
fn take_timestamp<'a>(cmd: &str, payload: &'a [u8]) -> Result<(i64, &'a [u8])> {
    if payload.len() < TIMESTAMP_SIZE {
        return Err(TempoError::Protocol(format!(
            "{} command: incomplete timestamp (expected {}, got {})",
            cmd,
            TIMESTAMP_SIZE,
            payload.len()
        )));
    }

    let mut buf = [0u8; TIMESTAMP_SIZE];
    buf.copy_from_slice(&payload[..TIMESTAMP_SIZE]);

    Ok((i64::from_be_bytes(buf), &payload[TIMESTAMP_SIZE..]))
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    let payload_len = payload.len() as u32;

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(response.status as u8);
    message.extend_from_slice(&payload_len.to_be_bytes());
    message.extend_from_slice(payload);

    message
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    if bytes.len() < HEADER_SIZE {
        return Err(TempoError::Protocol(format!(
            "Incomplete response header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    // Parse header
    let status_byte = bytes[0];
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;

    // Validate payload length
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(TempoError::Protocol(format!(
            "Response payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(TempoError::Protocol(format!(
            "Incomplete response payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    // Parse status
    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::Absent,
        0x02 => Status::Busy,
        0x03 => Status::BadRequest,
        0x04 => Status::Error,
        _ => {
            return Err(TempoError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    // Extract payload
    let payload = if payload_len > 0 {
        Some(bytes[HEADER_SIZE..total_len].to_vec())
    } else {
        None
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader)?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader)?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read one header + payload frame into a contiguous buffer
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;

    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(TempoError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}
