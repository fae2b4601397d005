//! Domain layer for numpad-server.
//!
//! Pure types with no dependencies on I/O, networking, or async runtimes:
//! runtime configuration and connection identity.
//!
//! # What does NOT belong here?
//!
//! - Any `tokio`, `axum`, or WebSocket types
//! - File I/O or environment variable reading
//! - Anything that could block or fail due to external state

pub mod config;
pub mod connection;

pub use config::{ServerConfig, SessionConfig};
pub use connection::ConnectionId;
