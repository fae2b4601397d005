//! Transport seam between the session logic and the wire.
//!
//! A [`Transport`] is one full-duplex, message-framed connection.  It splits
//! into a [`FrameSource`] owned by the read pump and a [`FrameSink`] owned by
//! the write pump, so each half has exactly one user and no lock is needed.
//!
//! Deadlines are applied by the pumps (`tokio::time::timeout`) rather than by
//! the transport, which keeps implementations trivial: the production axum
//! WebSocket adapter and the in-memory pair used by tests both just move
//! frames.

use async_trait::async_trait;
use thiserror::Error;

/// One WebSocket-level frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

/// Errors reported by a transport half.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer or the local side already closed the connection.
    #[error("connection closed")]
    Closed,

    /// A deadline elapsed before the operation completed.
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    /// The underlying WebSocket implementation reported a failure.
    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read half of a transport.
#[async_trait]
pub trait FrameSource: Send {
    /// Waits for the next inbound frame.
    ///
    /// Returns `None` once the stream has ended.
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>>;
}

/// Write half of a transport.
#[async_trait]
pub trait FrameSink: Send {
    /// Writes one frame.
    async fn send_frame(&mut self, frame: Frame) -> Result<(), TransportError>;

    /// Releases the underlying connection.  Idempotent.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// A connection that can be split into independently owned halves.
pub trait Transport: Send + 'static {
    type Source: FrameSource + 'static;
    type Sink: FrameSink + 'static;

    fn split(self) -> (Self::Source, Self::Sink);
}
