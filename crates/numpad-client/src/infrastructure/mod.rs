//! Infrastructure layer for the terminal client.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `numpad_core`, but MUST NOT be imported by the `application` layer.
//!
//! - **`ws_client`** – The WebSocket connection loop, driven by the shared
//!   reconnection state machine.

pub mod ws_client;

pub use ws_client::{ClientConfig, ClientError, ClientEvent, KeypadClient, DEFAULT_URL};
