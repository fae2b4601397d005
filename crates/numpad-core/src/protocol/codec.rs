//! JSON codec for the Remote Numpad wire protocol.
//!
//! Each WebSocket text frame holds exactly one JSON object.  Decoding
//! enforces [`MAX_FRAME_BYTES`] before handing the text to `serde_json`, so a
//! transport that does not cap frame sizes on its own still cannot make the
//! host parse arbitrarily large payloads.

use thiserror::Error;

use crate::protocol::messages::{KeyMessage, ServerMessage, MAX_FRAME_BYTES};

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame is larger than [`MAX_FRAME_BYTES`].
    #[error("frame of {size} bytes exceeds the {limit}-byte limit")]
    FrameTooLarge { size: usize, limit: usize },

    /// The text is not valid JSON or does not match the expected shape.
    #[error("malformed JSON payload: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes an inbound client frame into a [`KeyMessage`].
///
/// # Errors
///
/// Returns [`ProtocolError::FrameTooLarge`] for oversize frames and
/// [`ProtocolError::MalformedJson`] for anything `serde_json` rejects.
///
/// # Examples
///
/// ```rust
/// use numpad_core::decode_key_message;
///
/// let msg = decode_key_message(r#"{"key":"5","type":"key","timestamp":1}"#).unwrap();
/// assert_eq!(msg.key, "5");
/// assert!(msg.is_key_press());
/// ```
pub fn decode_key_message(text: &str) -> Result<KeyMessage, ProtocolError> {
    check_size(text)?;
    Ok(serde_json::from_str(text)?)
}

/// Decodes a host control payload, as received by a client.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedJson`] if the payload is neither a status
/// nor an error object.
pub fn decode_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

/// Encodes a host control payload into the text of one WebSocket frame.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedJson`] if serialization fails.
pub fn encode_server_message(msg: &ServerMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}

/// Encodes a client key message into the text of one WebSocket frame.
///
/// # Errors
///
/// Returns [`ProtocolError::FrameTooLarge`] if the encoded message would be
/// rejected by the host, or [`ProtocolError::MalformedJson`] if
/// serialization fails.
pub fn encode_key_message(msg: &KeyMessage) -> Result<String, ProtocolError> {
    let text = serde_json::to_string(msg)?;
    check_size(&text)?;
    Ok(text)
}

fn check_size(text: &str) -> Result<(), ProtocolError> {
    if text.len() > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge {
            size: text.len(),
            limit: MAX_FRAME_BYTES,
        });
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_key_message_rejects_malformed_json() {
        let result = decode_key_message("{not json");
        assert!(matches!(result, Err(ProtocolError::MalformedJson(_))));
    }

    #[test]
    fn test_decode_key_message_rejects_missing_key_field() {
        let result = decode_key_message(r#"{"type":"key"}"#);
        assert!(matches!(result, Err(ProtocolError::MalformedJson(_))));
    }

    #[test]
    fn test_decode_key_message_rejects_oversize_frame() {
        // Arrange: a syntactically valid message padded past the limit
        let padding = "9".repeat(MAX_FRAME_BYTES);
        let text = format!(r#"{{"key":"{padding}","type":"key"}}"#);

        // Act
        let result = decode_key_message(&text);

        // Assert
        assert!(matches!(
            result,
            Err(ProtocolError::FrameTooLarge { limit: MAX_FRAME_BYTES, .. })
        ));
    }

    #[test]
    fn test_frame_exactly_at_limit_is_accepted() {
        let skeleton = r#"{"key":"","type":"key"}"#;
        let key = "a".repeat(MAX_FRAME_BYTES - skeleton.len());
        let text = format!(r#"{{"key":"{key}","type":"key"}}"#);
        assert_eq!(text.len(), MAX_FRAME_BYTES);
        assert!(decode_key_message(&text).is_ok());
    }

    #[test]
    fn test_encode_server_message_matches_wire_shape() {
        let text = encode_server_message(&ServerMessage::connected()).unwrap();
        assert_eq!(text, r#"{"status":"connected"}"#);
    }

    #[test]
    fn test_decode_server_message_reads_eviction_notice() {
        let msg = decode_server_message(
            r#"{"status":"disconnected","reason":"Another device connected"}"#,
        )
        .unwrap();
        assert!(msg.is_eviction());
    }

    #[test]
    fn test_decode_server_message_rejects_unrelated_object() {
        assert!(decode_server_message(r#"{"hello":"world"}"#).is_err());
    }

    #[test]
    fn test_encode_key_message_refuses_oversize_key() {
        let msg = KeyMessage::key_press("k".repeat(MAX_FRAME_BYTES), 0.0);
        assert!(matches!(
            encode_key_message(&msg),
            Err(ProtocolError::FrameTooLarge { .. })
        ));
    }
}
