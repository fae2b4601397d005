//! The connection hub: sole owner of the set of admitted sessions.
//!
//! Every admission, removal, and fan-out decision is an event processed by a
//! single task, so the active set needs no lock and decisions are totally
//! ordered by arrival at the hub channel.  Sessions talk to the hub through
//! a cloneable [`HubHandle`].
//!
//! # Single active client
//!
//! The hub is built with a capacity (Remote Numpad uses
//! [`MAX_ACTIVE_CLIENTS`](crate::domain::config::MAX_ACTIVE_CLIENTS) = 1).
//! Registering while full evicts the *oldest* member:
//!
//! 1. The eviction notice is offered to its queue without blocking.
//! 2. The member is removed, which drops the hub's sender and closes its
//!    queue; its write pump flushes what is buffered, then sends a close
//!    frame.
//! 3. A grace timer task cancels the member's close signal after
//!    `eviction_grace`, forcing the transport shut if the pump has not
//!    finished by then.
//!
//! The hub then admits the newcomer and enqueues its welcome payload.
//!
//! # Queue ownership
//!
//! The hub holds the only strong [`mpsc::Sender`] of each session's outbound
//! queue.  Sessions keep at most a weak sender, so removal from the set is
//! exactly what closes a queue, and it can happen only once.

use std::time::Duration;

use numpad_core::ServerMessage;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::ConnectionId;

/// Capacity of the hub's event channel.
pub const HUB_EVENT_CAPACITY: usize = 64;

/// Error returned by [`HubHandle`] once the hub task has stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("connection hub is no longer running")]
    Closed,
}

// ── Connection handle ─────────────────────────────────────────────────────────

/// The hub's view of one admitted session.
#[derive(Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::Sender<ServerMessage>,
    close: CancellationToken,
}

impl ConnectionHandle {
    /// Bundles a session's identity, the strong sender of its outbound queue
    /// and its close signal.
    pub fn new(
        id: ConnectionId,
        outbound: mpsc::Sender<ServerMessage>,
        close: CancellationToken,
    ) -> Self {
        Self {
            id,
            outbound,
            close,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

enum HubEvent {
    Register {
        handle: ConnectionHandle,
        admitted: oneshot::Sender<()>,
    },
    Unregister(ConnectionId),
    Broadcast(ServerMessage),
    ActiveConnections(oneshot::Sender<Vec<ConnectionId>>),
    Shutdown(oneshot::Sender<()>),
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Cloneable entry point for submitting events to the hub.
#[derive(Clone)]
pub struct HubHandle {
    events: mpsc::Sender<HubEvent>,
}

impl HubHandle {
    /// Submits a session for admission and waits until the hub has admitted
    /// it.  Admission never fails while the hub runs; it may evict another
    /// session.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Closed`] if the hub has shut down.  The handle is
    /// dropped, which closes the session's queue.
    pub async fn register(&self, handle: ConnectionHandle) -> Result<(), HubError> {
        let (admitted, ack) = oneshot::channel();
        self.submit(HubEvent::Register { handle, admitted }).await?;
        ack.await.map_err(|_| HubError::Closed)
    }

    /// Removes a session if it is still a member.  Removing a non-member is a
    /// no-op, so calling this twice is harmless.
    pub async fn unregister(&self, id: ConnectionId) -> Result<(), HubError> {
        self.submit(HubEvent::Unregister(id)).await
    }

    /// Offers `msg` to every member without blocking.  Members whose queue is
    /// full or closed are removed.
    pub async fn broadcast(&self, msg: ServerMessage) -> Result<(), HubError> {
        self.submit(HubEvent::Broadcast(msg)).await
    }

    /// Ids of the current members, oldest first.
    pub async fn active_connections(&self) -> Result<Vec<ConnectionId>, HubError> {
        let (reply, answer) = oneshot::channel();
        self.submit(HubEvent::ActiveConnections(reply)).await?;
        answer.await.map_err(|_| HubError::Closed)
    }

    /// Closes every member's queue and transport and stops the hub.
    pub async fn shutdown(&self) -> Result<(), HubError> {
        let (done, ack) = oneshot::channel();
        self.submit(HubEvent::Shutdown(done)).await?;
        ack.await.map_err(|_| HubError::Closed)
    }

    async fn submit(&self, event: HubEvent) -> Result<(), HubError> {
        self.events.send(event).await.map_err(|_| HubError::Closed)
    }
}

// ── Hub task ──────────────────────────────────────────────────────────────────

/// The hub's state, owned by its task.
pub struct Hub {
    capacity: usize,
    eviction_grace: Duration,
    members: Vec<ConnectionHandle>,
    events: mpsc::Receiver<HubEvent>,
}

impl Hub {
    /// Creates a hub and the handle used to reach it.  A capacity of zero is
    /// treated as one.
    pub fn new(capacity: usize, eviction_grace: Duration) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::channel(HUB_EVENT_CAPACITY);
        let hub = Self {
            capacity: capacity.max(1),
            eviction_grace,
            members: Vec::with_capacity(capacity.max(1)),
            events: rx,
        };
        (hub, HubHandle { events: tx })
    }

    /// Creates a hub and runs it on a new task.
    pub fn spawn(capacity: usize, eviction_grace: Duration) -> HubHandle {
        let (hub, handle) = Self::new(capacity, eviction_grace);
        tokio::spawn(hub.run());
        handle
    }

    /// Processes events until [`HubHandle::shutdown`] is called or every
    /// handle is dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            match event {
                HubEvent::Register { handle, admitted } => {
                    self.admit(handle);
                    let _ = admitted.send(());
                }
                HubEvent::Unregister(id) => self.remove(id),
                HubEvent::Broadcast(msg) => self.broadcast(&msg),
                HubEvent::ActiveConnections(reply) => {
                    let _ = reply.send(self.members.iter().map(|m| m.id).collect());
                }
                HubEvent::Shutdown(done) => {
                    self.close_all();
                    let _ = done.send(());
                    break;
                }
            }
        }
        self.close_all();
        debug!("connection hub stopped");
    }

    fn admit(&mut self, handle: ConnectionHandle) {
        while self.members.len() >= self.capacity {
            let incumbent = self.members.remove(0);
            self.evict(incumbent);
        }

        let id = handle.id;
        if let Err(e) = handle.outbound.try_send(ServerMessage::connected()) {
            warn!(connection = %id, "welcome payload dropped: {e}");
        }
        self.members.push(handle);
        info!(connection = %id, active = self.members.len(), "client admitted");
    }

    fn evict(&self, incumbent: ConnectionHandle) {
        if incumbent.outbound.try_send(ServerMessage::evicted()).is_err() {
            debug!(connection = %incumbent.id, "eviction notice dropped");
        }
        info!(connection = %incumbent.id, "evicting client: another device connected");

        let close = incumbent.close.clone();
        // Dropping the handle drops the queue's only strong sender.
        drop(incumbent);

        let grace = self.eviction_grace;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            close.cancel();
        });
    }

    fn remove(&mut self, id: ConnectionId) {
        match self.members.iter().position(|m| m.id == id) {
            Some(index) => {
                self.members.remove(index);
                info!(connection = %id, active = self.members.len(), "client removed");
            }
            None => debug!(connection = %id, "unregister of non-member ignored"),
        }
    }

    fn broadcast(&mut self, msg: &ServerMessage) {
        self.members.retain(|member| match member.outbound.try_send(msg.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(connection = %member.id, "outbound queue full; dropping slow client");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(connection = %member.id, "outbound queue closed; dropping client");
                false
            }
        });
    }

    fn close_all(&mut self) {
        for member in self.members.drain(..) {
            member.close.cancel();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
