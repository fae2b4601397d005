//! numpad-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does numpad-client do?
//!
//! It is a keypad for a Remote Numpad host that lives in a terminal instead
//! of a browser.  Each line typed is parsed into keypad keys, which are sent
//! to the host over the same WebSocket protocol the keypad page uses.  Status
//! and error payloads from the host are printed back.
//!
//! The client follows the same reconnection rules as the page: a bounded
//! number of automatic retries after an unexpected drop, no automatic retry
//! after another device took over, and a manual `:reconnect` / `:reload`.

/// Application layer: terminal command parsing.
pub mod application;

/// Infrastructure layer: the WebSocket connection loop.
pub mod infrastructure;
