//! In-process transport backed by channels.
//!
//! [`memory_transport`] returns the server-side [`MemoryTransport`] plus a
//! [`MemoryPeer`] that plays the client.  Sessions run over it exactly as
//! they do over a WebSocket, which lets the hub and pump behaviour be tested
//! (and embedded) without sockets.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::transport::{Frame, FrameSink, FrameSource, Transport, TransportError};

/// Creates a connected transport/peer pair.
pub fn memory_transport() -> (MemoryTransport, MemoryPeer) {
    let (to_server, from_peer) = mpsc::unbounded_channel();
    let (to_peer, from_server) = mpsc::unbounded_channel();
    (
        MemoryTransport {
            inbound: from_peer,
            outbound: to_peer,
        },
        MemoryPeer {
            outbound: Some(to_server),
            inbound: from_server,
        },
    )
}

/// Server side of an in-memory connection.
pub struct MemoryTransport {
    inbound: mpsc::UnboundedReceiver<Frame>,
    outbound: mpsc::UnboundedSender<Frame>,
}

impl Transport for MemoryTransport {
    type Source = MemorySource;
    type Sink = MemorySink;

    fn split(self) -> (MemorySource, MemorySink) {
        (
            MemorySource {
                inbound: self.inbound,
            },
            MemorySink {
                outbound: Some(self.outbound),
            },
        )
    }
}

pub struct MemorySource {
    inbound: mpsc::UnboundedReceiver<Frame>,
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        self.inbound.recv().await.map(Ok)
    }
}

pub struct MemorySink {
    outbound: Option<mpsc::UnboundedSender<Frame>>,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        let outbound = self.outbound.as_ref().ok_or(TransportError::Closed)?;
        outbound.send(frame).map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.outbound = None;
        Ok(())
    }
}

/// Client side of an in-memory connection.
pub struct MemoryPeer {
    outbound: Option<mpsc::UnboundedSender<Frame>>,
    inbound: mpsc::UnboundedReceiver<Frame>,
}

impl MemoryPeer {
    /// Sends a frame to the server.  Returns `false` once the server's read
    /// half is gone or the peer hung up.
    pub fn send(&self, frame: Frame) -> bool {
        self.outbound
            .as_ref()
            .is_some_and(|tx| tx.send(frame).is_ok())
    }

    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.send(Frame::Text(text.into()))
    }

    /// Next frame written by the server, or `None` once the server closed
    /// the transport.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.inbound.recv().await
    }

    /// Ends the server's inbound stream, like a dropped TCP connection.
    pub fn hang_up(&mut self) {
        self.outbound = None;
    }
}
