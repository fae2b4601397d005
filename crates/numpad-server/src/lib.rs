//! numpad-server library crate.
//!
//! The host side of Remote Numpad: serves the keypad web page, accepts one
//! active WebSocket client at a time, and injects each key the client
//! presses into the host operating system.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Browser keypad (JSON over WebSocket)
//!         ↕
//! [numpad-server]
//!   ├── domain/           ServerConfig, SessionConfig, ConnectionId
//!   ├── application/
//!   │     ├── hub         single-active-client admission and eviction
//!   │     ├── pumps       per-connection read and write loops
//!   │     ├── session     admission → pumps → teardown
//!   │     └── press_key   symbolic key → platform injector
//!   └── infrastructure/
//!         ├── http_server    axum router: /ws + static files
//!         ├── ws_transport   axum WebSocket as a Transport
//!         ├── memory_transport  channel-backed Transport for tests
//!         ├── key_injection  SendInput / xdotool / XTest / CoreGraphics
//!         └── config_file    optional TOML settings
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async runtime.
//! - `application` depends on `domain` and `numpad-core`; it reaches the
//!   wire and the OS only through the `Transport` and `PlatformKeyInjector`
//!   traits.
//! - `infrastructure` implements those traits with axum, tokio and OS APIs.

/// Domain layer: pure configuration and identity types.
pub mod domain;

/// Application layer: hub, pumps, sessions, key press use case.
pub mod application;

/// Infrastructure layer: HTTP server, transports, key injection, config file.
pub mod infrastructure;
