//! # numpad-core
//!
//! Shared library for Remote Numpad containing the JSON wire protocol, the
//! numeric keypad key model with its per-platform code tables, and the client
//! reconnection state machine.
//!
//! This crate is used by both the host server and the terminal client.
//! It has zero dependencies on OS APIs, async runtimes, or network sockets.
//!
//! # Architecture overview
//!
//! Remote Numpad turns a phone or browser into a numeric keypad for another
//! computer.  The browser sends one small JSON message per key press over a
//! WebSocket; the host injects the matching keypad keystroke into its OS.
//!
//! - **`protocol`** – The JSON envelopes exchanged over the WebSocket, and
//!   the codec that enforces the inbound frame size limit.
//!
//! - **`keymap`** – The closed set of keypad keys ([`NumpadKey`]) and the
//!   translation tables to Windows Virtual Key codes, X11 KeySyms, and macOS
//!   `CGKeyCode`s.
//!
//! - **`reconnect`** – A sans-IO state machine deciding when a client should
//!   re-establish its session after losing it.

pub mod keymap;
pub mod protocol;
pub mod reconnect;

// Re-export the most-used types at the crate root so callers can write
// `numpad_core::ServerMessage` instead of the full module path.
pub use keymap::{KeyMapper, KeymapError, NumpadKey};
pub use protocol::codec::{
    decode_key_message, decode_server_message, encode_key_message, encode_server_message,
    ProtocolError,
};
pub use protocol::messages::{
    KeyMessage, MessageKind, ServerMessage, SessionStatus, EVICTION_REASON, MAX_FRAME_BYTES,
};
pub use reconnect::{ConnectionState, ReconnectAction, ReconnectMachine, ReconnectPolicy};
