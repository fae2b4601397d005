//! Session lifecycle: admission, pumps, teardown.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::hub::{ConnectionHandle, HubHandle};
use crate::application::press_key::KeyActionSink;
use crate::application::pumps::{ReadPump, WritePump};
use crate::application::transport::Transport;
use crate::domain::{ConnectionId, SessionConfig};

/// Everything a session needs besides its transport.  Cheap to clone.
#[derive(Clone)]
pub struct SessionContext {
    pub hub: HubHandle,
    pub sink: Arc<dyn KeyActionSink>,
    pub config: Arc<SessionConfig>,
}

/// Runs one client session to completion.
///
/// The transport is not touched until the hub has admitted the session, so
/// a session that is rejected (hub shut down) simply drops its transport.
/// Returns once both pumps have stopped.
pub async fn run_session<T: Transport>(transport: T, ctx: SessionContext) {
    let id = ConnectionId::new();
    let (outbound_tx, outbound_rx) = mpsc::channel(ctx.config.outbound_capacity.max(1));
    let weak_outbound = outbound_tx.downgrade();
    let close = CancellationToken::new();

    let handle = ConnectionHandle::new(id, outbound_tx, close.clone());
    if let Err(e) = ctx.hub.register(handle).await {
        warn!(connection = %id, "rejecting connection: {e}");
        return;
    }

    let (source, sink) = transport.split();

    let writer = tokio::spawn(
        WritePump {
            id,
            sink,
            outbound: outbound_rx,
            close: close.clone(),
            ping_interval: ctx.config.ping_interval,
            write_timeout: ctx.config.write_timeout,
        }
        .run(),
    );

    ReadPump {
        id,
        source,
        sink: Arc::clone(&ctx.sink),
        outbound: weak_outbound,
        hub: ctx.hub.clone(),
        close,
        read_timeout: ctx.config.read_timeout,
    }
    .run()
    .await;

    if let Err(e) = writer.await {
        warn!(connection = %id, "write pump task failed: {e}");
    }
    info!(connection = %id, "session ended");
}
