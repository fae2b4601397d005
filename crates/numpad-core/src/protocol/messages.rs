//! JSON message types for the browser-facing WebSocket protocol.
//!
//! Every WebSocket text frame carries exactly one JSON object.  There is no
//! further application-level framing.
//!
//! # Message flow
//!
//! ```text
//! Browser → Host:  {"key":"5","type":"key","timestamp":1718000000000}
//! Host → Browser:  {"status":"connected"}
//!                  {"status":"disconnected","reason":"Another device connected"}
//!                  {"error":"Failed to press key: x"}
//! ```
//!
//! The two directions use distinct types ([`KeyMessage`] and
//! [`ServerMessage`]) so a host-only payload can never be decoded as a key
//! press and vice versa.

use serde::{Deserialize, Serialize};

/// Reason string carried by the eviction notice sent to an incumbent client
/// when another device takes over the session.
pub const EVICTION_REASON: &str = "Another device connected";

/// Maximum size, in bytes, of one inbound WebSocket frame or message.
pub const MAX_FRAME_BYTES: usize = 512;

// ── Browser → Host ────────────────────────────────────────────────────────────

/// Discriminant of an inbound message (`"type"` field).
///
/// Only `"key"` has a meaning today.  Any other value decodes to
/// [`MessageKind::Other`] and is ignored by the host rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// A key press request.
    Key,
    /// Any unrecognised or missing type.
    #[default]
    #[serde(other)]
    Other,
}

/// A key action sent by the client.
///
/// # Serde representation
///
/// ```json
/// {"key":"enter","type":"key","timestamp":1718000000000}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMessage {
    /// Symbolic key identifier: a digit, an operator (`*`, `+`, `-`, `.`, `/`),
    /// or one of `"enter"`, `"backspace"`, `"escape"`.
    pub key: String,

    /// Message discriminant, serialized as `"type"`.
    #[serde(rename = "type", default)]
    pub kind: MessageKind,

    /// Client-side wall clock in milliseconds.
    ///
    /// Advisory only: the host never orders or filters by it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl KeyMessage {
    /// Builds a `"type":"key"` message for `key` stamped with `timestamp`.
    pub fn key_press(key: impl Into<String>, timestamp: f64) -> Self {
        Self {
            key: key.into(),
            kind: MessageKind::Key,
            timestamp: Some(timestamp),
        }
    }

    /// Returns `true` when the host should act on this message.
    pub fn is_key_press(&self) -> bool {
        self.kind == MessageKind::Key
    }
}

// ── Host → Browser ────────────────────────────────────────────────────────────

/// Session status reported in a [`ServerMessage::Status`] payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// The client has been admitted as the active keypad.
    Connected,
    /// The client's session is being closed by the host.
    Disconnected,
}

/// Control payloads the host sends to a client.
///
/// The wire format has no discriminant field, so the enum is untagged: a
/// payload with a `"status"` field is a status update, a payload with an
/// `"error"` field is an action failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    /// `{"status":"connected"}` or `{"status":"disconnected","reason":"..."}`.
    Status {
        status: SessionStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// `{"error":"..."}`, surfaced to the user as a transient notification.
    Error { error: String },
}

impl ServerMessage {
    /// The welcome payload enqueued to every newly admitted client.
    pub fn connected() -> Self {
        Self::Status {
            status: SessionStatus::Connected,
            reason: None,
        }
    }

    /// A `disconnected` payload carrying `reason`.
    pub fn disconnected(reason: impl Into<String>) -> Self {
        Self::Status {
            status: SessionStatus::Disconnected,
            reason: Some(reason.into()),
        }
    }

    /// The notice sent to an incumbent client that is being replaced.
    pub fn evicted() -> Self {
        Self::disconnected(EVICTION_REASON)
    }

    /// The error payload reported when injecting `key` failed.
    pub fn key_failed(key: &str) -> Self {
        Self::Error {
            error: format!("Failed to press key: {key}"),
        }
    }

    /// Returns `true` if this payload tells the client it was replaced by
    /// another device.
    pub fn is_eviction(&self) -> bool {
        matches!(
            self,
            Self::Status {
                status: SessionStatus::Disconnected,
                reason: Some(reason),
            } if reason == EVICTION_REASON
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
