//! Codec Tests
//!
//! Tests for command and response encoding/decoding.

use std::io::Cursor;

use tempokv::protocol::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, Command, Response, Status,
};
use tempokv::TempoError;

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_get_as_of() {
    let cmd = Command::GetAsOf {
        key: "hello".to_string(),
        timestamp: 12345,
    };
    let encoded = encode_command(&cmd);
    let decoded = decode_command(&encoded).unwrap();

    match decoded {
        Command::GetAsOf { key, timestamp } => {
            assert_eq!(key, "hello");
            assert_eq!(timestamp, 12345);
        }
        _ => panic!("Expected GETASOF command"),
    }
}

#[test]
fn test_encode_decode_put() {
    let cmd = Command::Put {
        key: "mykey".to_string(),
        timestamp: -42,
        value: "myvalue".to_string(),
    };
    let encoded = encode_command(&cmd);
    let decoded = decode_command(&encoded).unwrap();

    match decoded {
        Command::Put {
            key,
            timestamp,
            value,
        } => {
            assert_eq!(key, "mykey");
            assert_eq!(timestamp, -42);
            assert_eq!(value, "myvalue");
        }
        _ => panic!("Expected PUT command"),
    }
}

#[test]
fn test_encode_decode_ping() {
    let cmd = Command::Ping;
    let encoded = encode_command(&cmd);
    let decoded = decode_command(&encoded).unwrap();

    match decoded {
        Command::Ping => {}
        _ => panic!("Expected PING command"),
    }
}

#[test]
fn test_encode_decode_empty_key_and_value() {
    let cmd = Command::Put {
        key: String::new(),
        timestamp: 0,
        value: String::new(),
    };
    let encoded = encode_command(&cmd);
    let decoded = decode_command(&encoded).unwrap();

    match decoded {
        Command::Put {
            key,
            timestamp,
            value,
        } => {
            assert!(key.is_empty());
            assert_eq!(timestamp, 0);
            assert!(value.is_empty());
        }
        _ => panic!("Expected PUT command"),
    }
}

#[test]
fn test_encode_decode_timestamp_extremes() {
    for ts in [i64::MIN, -1, 0, 1, i64::MAX] {
        let cmd = Command::GetAsOf {
            key: "k".to_string(),
            timestamp: ts,
        };
        let decoded = decode_command(&encode_command(&cmd)).unwrap();

        match decoded {
            Command::GetAsOf { timestamp, .. } => assert_eq!(timestamp, ts),
            _ => panic!("Expected GETASOF command"),
        }
    }
}

#[test]
fn test_encode_decode_multibyte_utf8() {
    let cmd = Command::Put {
        key: "ключ".to_string(),
        timestamp: 7,
        value: "値です".to_string(),
    };
    let decoded = decode_command(&encode_command(&cmd)).unwrap();

    match decoded {
        Command::Put { key, value, .. } => {
            assert_eq!(key, "ключ");
            assert_eq!(value, "値です");
        }
        _ => panic!("Expected PUT command"),
    }
}

// =============================================================================
// Malformed Command Tests
// =============================================================================

#[test]
fn test_decode_unknown_command_type() {
    let bytes = [0x7F, 0, 0, 0, 0];
    match decode_command(&bytes) {
        Err(TempoError::Protocol(_)) => {}
        other => panic!("Expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_decode_truncated_header() {
    let bytes = [0x01, 0, 0];
    match decode_command(&bytes) {
        Err(TempoError::Protocol(_)) => {}
        other => panic!("Expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_decode_truncated_timestamp() {
    // GETASOF frame whose payload ends mid-timestamp
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u32.to_be_bytes());
    payload.push(b'k');
    payload.extend_from_slice(&[0, 0, 0]); // 3 of 8 timestamp bytes

    let mut frame = vec![0x01];
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);

    match decode_command(&frame) {
        Err(TempoError::Protocol(_)) => {}
        other => panic!("Expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_decode_non_utf8_key() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&2u32.to_be_bytes());
    payload.extend_from_slice(&[0xFF, 0xFE]);
    payload.extend_from_slice(&0i64.to_be_bytes());

    let mut frame = vec![0x01];
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);

    match decode_command(&frame) {
        Err(TempoError::InvalidInput(_)) => {}
        other => panic!("Expected invalid input error, got {:?}", other),
    }
}

#[test]
fn test_decode_ping_with_payload() {
    let mut frame = vec![0x03];
    frame.extend_from_slice(&1u32.to_be_bytes());
    frame.push(0xAA);

    match decode_command(&frame) {
        Err(TempoError::Protocol(_)) => {}
        other => panic!("Expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_decode_get_as_of_trailing_bytes() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u32.to_be_bytes());
    payload.push(b'k');
    payload.extend_from_slice(&5i64.to_be_bytes());
    payload.push(0x00); // one byte too many

    let mut frame = vec![0x01];
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);

    match decode_command(&frame) {
        Err(TempoError::Protocol(_)) => {}
        other => panic!("Expected protocol error, got {:?}", other),
    }
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_ok_response() {
    let response = Response::ok(Some(b"value".to_vec()));
    let decoded = decode_response(&encode_response(&response)).unwrap();

    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload, Some(b"value".to_vec()));
}

#[test]
fn test_encode_decode_absent_response() {
    let response = Response::absent();
    let decoded = decode_response(&encode_response(&response)).unwrap();

    assert_eq!(decoded.status, Status::Absent);
    assert_eq!(decoded.payload, None);
}

#[test]
fn test_encode_decode_busy_response() {
    let response = Response::busy();
    let decoded = decode_response(&encode_response(&response)).unwrap();

    assert_eq!(decoded.status, Status::Busy);
    assert_eq!(decoded.payload, None);
}

#[test]
fn test_encode_decode_bad_request_response() {
    let response = Response::bad_request("key is not valid UTF-8");
    let decoded = decode_response(&encode_response(&response)).unwrap();

    assert_eq!(decoded.status, Status::BadRequest);
    assert_eq!(decoded.payload, Some(b"key is not valid UTF-8".to_vec()));
}

#[test]
fn test_decode_unknown_status() {
    let bytes = [0x7F, 0, 0, 0, 0];
    match decode_response(&bytes) {
        Err(TempoError::Protocol(_)) => {}
        other => panic!("Expected protocol error, got {:?}", other),
    }
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_write_read_command_roundtrip() {
    let cmd = Command::Put {
        key: "stream-key".to_string(),
        timestamp: 99,
        value: "stream-value".to_string(),
    };

    let mut buf = Vec::new();
    write_command(&mut buf, &cmd).unwrap();

    let mut cursor = Cursor::new(buf);
    let decoded = read_command(&mut cursor).unwrap();

    match decoded {
        Command::Put { key, value, .. } => {
            assert_eq!(key, "stream-key");
            assert_eq!(value, "stream-value");
        }
        _ => panic!("Expected PUT command"),
    }
}

#[test]
fn test_write_read_response_roundtrip() {
    let response = Response::error("boom");

    let mut buf = Vec::new();
    write_response(&mut buf, &response).unwrap();

    let mut cursor = Cursor::new(buf);
    let decoded = read_response(&mut cursor).unwrap();

    assert_eq!(decoded.status, Status::Error);
    assert_eq!(decoded.payload, Some(b"boom".to_vec()));
}

#[test]
fn test_read_command_truncated_stream() {
    // Header promises 10 payload bytes but the stream ends early
    let mut buf = vec![0x01];
    buf.extend_from_slice(&10u32.to_be_bytes());
    buf.extend_from_slice(&[0u8; 4]);

    let mut cursor = Cursor::new(buf);
    match read_command(&mut cursor) {
        Err(TempoError::Io(_)) => {}
        other => panic!("Expected IO error, got {:?}", other),
    }
}
