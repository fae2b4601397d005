//! Application layer for numpad-server.
//!
//! The application layer owns the session logic: it knows *what* happens to
//! a connection, but delegates *how* bytes move and keys get injected to the
//! infrastructure layer through the [`transport`] and [`press_key`] traits.
//!
//! # Responsibilities
//!
//! - The connection hub and its single-active-client policy
//! - The per-connection read and write pumps
//! - The session lifecycle tying the two together
//! - The Press Key use case
//!
//! # What does NOT belong here?
//!
//! - HTTP routing and the WebSocket upgrade (infrastructure)
//! - OS API calls (infrastructure)

pub mod hub;
pub mod press_key;
pub mod pumps;
pub mod session;
pub mod transport;

pub use hub::{ConnectionHandle, Hub, HubError, HubHandle};
pub use press_key::{DryRunSink, InjectionError, KeyActionSink, PlatformKeyInjector, PressKeyUseCase};
pub use session::{run_session, SessionContext};
pub use transport::{Frame, FrameSink, FrameSource, Transport, TransportError};
