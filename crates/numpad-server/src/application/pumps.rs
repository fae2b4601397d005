//! Per-connection read and write loops.
//!
//! Every admitted session runs one [`ReadPump`] and one [`WritePump`]
//! concurrently.  They share nothing but the session's close signal (a
//! [`CancellationToken`]):
//!
//! - The read pump owns the transport's read half.  When it stops for any
//!   reason it unregisters the session from the hub, then fires the close
//!   signal.
//! - The write pump owns the write half and is the only code that writes to
//!   the transport.  When it stops it closes the transport, then fires the
//!   close signal.
//!
//! Whichever pump stops first takes the other down with it; hub membership
//! makes the duplicate unregister that may follow harmless.

use std::sync::Arc;
use std::time::Duration;

use numpad_core::{decode_key_message, encode_server_message, ServerMessage};
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::hub::HubHandle;
use crate::application::press_key::{InjectionError, KeyActionSink};
use crate::application::transport::{Frame, FrameSink, FrameSource, TransportError};
use crate::domain::ConnectionId;

// ── Read pump ─────────────────────────────────────────────────────────────────

/// Decodes inbound frames and forwards key presses to the key sink.
pub struct ReadPump<S> {
    pub id: ConnectionId,
    pub source: S,
    pub sink: Arc<dyn KeyActionSink>,
    /// Weak handle on the session's outbound queue, for error payloads.
    pub outbound: mpsc::WeakSender<ServerMessage>,
    pub hub: HubHandle,
    pub close: CancellationToken,
    /// Maximum silence (no frame of any kind) before the session is ended.
    pub read_timeout: Duration,
}

impl<S: FrameSource> ReadPump<S> {
    /// Runs until the transport fails, ends, closes, goes silent for longer
    /// than `read_timeout`, or the close signal fires.
    pub async fn run(mut self) {
        loop {
            let next = tokio::select! {
                _ = self.close.cancelled() => {
                    debug!(connection = %self.id, "read pump: close signal");
                    break;
                }
                next = timeout(self.read_timeout, self.source.next_frame()) => next,
            };

            let frame = match next {
                Err(_) => {
                    info!(connection = %self.id, "no traffic within read deadline; closing");
                    break;
                }
                Ok(None) => {
                    debug!(connection = %self.id, "read pump: stream ended");
                    break;
                }
                Ok(Some(Err(e))) => {
                    debug!(connection = %self.id, "read pump: {e}");
                    break;
                }
                Ok(Some(Ok(frame))) => frame,
            };

            match frame {
                Frame::Text(text) => self.handle_text(&text).await,
                Frame::Binary(bytes) => {
                    warn!(connection = %self.id, len = bytes.len(), "ignoring binary frame");
                }
                Frame::Ping(_) | Frame::Pong(_) => {
                    debug!(connection = %self.id, "control frame received");
                }
                Frame::Close => {
                    debug!(connection = %self.id, "peer closed the connection");
                    break;
                }
            }
        }

        if let Err(e) = self.hub.unregister(self.id).await {
            debug!(connection = %self.id, "unregister skipped: {e}");
        }
        self.close.cancel();
    }

    async fn handle_text(&mut self, text: &str) {
        let msg = match decode_key_message(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(connection = %self.id, "ignoring malformed message: {e}");
                return;
            }
        };
        debug!(connection = %self.id, key = %msg.key, kind = ?msg.kind, "message received");

        if !msg.is_key_press() {
            return;
        }

        if let Err(e) = press_off_runtime(Arc::clone(&self.sink), msg.key.clone()).await {
            warn!(connection = %self.id, key = %msg.key, "key press failed: {e}");
            self.notify(ServerMessage::key_failed(&msg.key));
        }
    }

    /// Best-effort enqueue; dropped when the queue is full or already closed.
    fn notify(&self, msg: ServerMessage) {
        let Some(outbound) = self.outbound.upgrade() else {
            return;
        };
        if outbound.try_send(msg).is_err() {
            debug!(connection = %self.id, "error payload dropped");
        }
    }
}

/// Runs the sink off the runtime threads; injectors may block on the OS or
/// on a child process.  Presses stay ordered since each one is awaited.
async fn press_off_runtime(
    sink: Arc<dyn KeyActionSink>,
    key: String,
) -> Result<(), InjectionError> {
    match tokio::task::spawn_blocking(move || sink.press(&key)).await {
        Ok(result) => result,
        Err(e) => Err(InjectionError::Platform(format!("key press task failed: {e}"))),
    }
}

// ── Write pump ────────────────────────────────────────────────────────────────

/// Drains the outbound queue to the transport and keeps the peer alive.
pub struct WritePump<K> {
    pub id: ConnectionId,
    pub sink: K,
    pub outbound: mpsc::Receiver<ServerMessage>,
    pub close: CancellationToken,
    pub ping_interval: Duration,
    /// Deadline for each individual write.
    pub write_timeout: Duration,
}

impl<K: FrameSink> WritePump<K> {
    /// Runs until a write fails, the queue is closed, or the close signal
    /// fires.  Payloads queued before the close signal are still written.
    /// Always closes the transport on the way out.
    pub async fn run(mut self) {
        let mut ticker = interval_at(Instant::now() + self.ping_interval, self.ping_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.close.cancelled() => {
                    debug!(connection = %self.id, "write pump: close signal");
                    self.flush_pending().await;
                    break;
                }
                item = self.outbound.recv() => match item {
                    Some(msg) => {
                        if let Err(e) = self.write_message(&msg).await {
                            debug!(connection = %self.id, "write failed: {e}");
                            break;
                        }
                    }
                    None => {
                        // Queue closed by the hub: say goodbye and stop.
                        if let Err(e) = self.write(Frame::Close, "close").await {
                            debug!(connection = %self.id, "close frame not sent: {e}");
                        }
                        break;
                    }
                },
                _ = ticker.tick() => {
                    if let Err(e) = self.write(Frame::Ping(Vec::new()), "ping").await {
                        debug!(connection = %self.id, "keepalive failed: {e}");
                        break;
                    }
                    debug!(connection = %self.id, "keepalive ping sent");
                }
            }
        }

        if let Err(e) = self.sink.close().await {
            debug!(connection = %self.id, "transport close: {e}");
        }
        self.close.cancel();
    }

    /// Writes whatever is already queued (an eviction notice, usually)
    /// without waiting for more.  Stops at the first failed write.
    async fn flush_pending(&mut self) {
        while let Ok(msg) = self.outbound.try_recv() {
            if let Err(e) = self.write_message(&msg).await {
                debug!(connection = %self.id, "pending payload not sent: {e}");
                return;
            }
        }
    }

    async fn write_message(&mut self, msg: &ServerMessage) -> Result<(), TransportError> {
        let text = match encode_server_message(msg) {
            Ok(text) => text,
            Err(e) => {
                warn!(connection = %self.id, "skipping unencodable payload: {e}");
                return Ok(());
            }
        };
        self.write(Frame::Text(text), "write").await
    }

    async fn write(&mut self, frame: Frame, operation: &'static str) -> Result<(), TransportError> {
        match timeout(self.write_timeout, self.sink.send_frame(frame)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout { operation }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use numpad_core::{decode_server_message, encode_key_message, KeyMessage, NumpadKey};

    use super::*;
    use crate::application::hub::Hub;
    use crate::application::press_key::PressKeyUseCase;
    use crate::application::transport::Transport;
    use crate::infrastructure::key_injection::mock::MockKeyInjector;
    use crate::infrastructure::{memory_transport, MemoryPeer};

    const STEP: Duration = Duration::from_secs(5);

    fn key_frame(key: &str) -> String {
        encode_key_message(&KeyMessage::key_press(key, 1_718_000_000_000.0)).unwrap()
    }

    fn read_pump<S: FrameSource>(
        source: S,
        sink: Arc<dyn KeyActionSink>,
        outbound: &mpsc::Sender<ServerMessage>,
    ) -> ReadPump<S> {
        ReadPump {
            id: ConnectionId::new(),
            source,
            sink,
            outbound: outbound.downgrade(),
            hub: Hub::spawn(1, Duration::from_millis(100)),
            close: CancellationToken::new(),
            read_timeout: Duration::from_secs(60),
        }
    }

    async fn expect_text(peer: &mut MemoryPeer) -> ServerMessage {
        match timeout(STEP, peer.recv()).await.unwrap() {
            Some(Frame::Text(text)) => decode_server_message(&text).unwrap(),
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    /// Blocks inside `press` until the test opens the gate.
    struct GatedSink {
        started: mpsc::UnboundedSender<()>,
        gate: Mutex<std::sync::mpsc::Receiver<()>>,
        pressed: Mutex<Vec<String>>,
    }

    impl KeyActionSink for GatedSink {
        fn press(&self, key: &str) -> Result<(), InjectionError> {
            let _ = self.started.send(());
            let gate = self
                .gate
                .lock()
                .map_err(|_| InjectionError::Platform("gate poisoned".to_string()))?;
            gate.recv_timeout(STEP)
                .map_err(|_| InjectionError::Platform("gate never opened".to_string()))?;
            self.pressed
                .lock()
                .map_err(|_| InjectionError::Platform("log poisoned".to_string()))?
                .push(key.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_error_payload_dropped_when_queue_full_and_session_continues() {
        // Arrange: a capacity-1 queue already holding the welcome payload
        let injector = Arc::new(MockKeyInjector::failing_on([NumpadKey::Digit1]));
        let (outbound_tx, mut outbound_rx) = mpsc::channel(1);
        outbound_tx.try_send(ServerMessage::connected()).unwrap();
        let (transport, mut peer) = memory_transport();
        let (source, _sink) = transport.split();
        let pump = read_pump(
            source,
            Arc::new(PressKeyUseCase::new(injector.clone())),
            &outbound_tx,
        );

        // Act: a failing key, then a good one, then hang up
        assert!(peer.send_text(key_frame("1")));
        assert!(peer.send_text(key_frame("5")));
        peer.hang_up();
        timeout(STEP, pump.run()).await.unwrap();

        // Assert: the good key still went through
        assert_eq!(injector.taps(), vec![NumpadKey::Digit5]);

        // Assert: the error payload was dropped, not queued behind the welcome
        assert_eq!(outbound_rx.try_recv().unwrap(), ServerMessage::connected());
        assert!(outbound_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_blocking_key_sink_does_not_stall_runtime() {
        // Arrange: a sink that blocks until this (single-threaded) test task
        // gets to run again
        let (started_tx, mut started_rx) = mpsc::unbounded_channel();
        let (gate_tx, gate_rx) = std::sync::mpsc::channel();
        let sink = Arc::new(GatedSink {
            started: started_tx,
            gate: Mutex::new(gate_rx),
            pressed: Mutex::new(Vec::new()),
        });
        let (outbound_tx, mut outbound_rx) = mpsc::channel(4);
        let (transport, mut peer) = memory_transport();
        let (source, _sink) = transport.split();
        let pump = tokio::spawn(read_pump(source, sink.clone(), &outbound_tx).run());

        // Act
        assert!(peer.send_text(key_frame("5")));
        timeout(STEP, started_rx.recv()).await.unwrap().unwrap();
        gate_tx.send(()).unwrap();
        peer.hang_up();
        timeout(STEP, pump).await.unwrap().unwrap();

        // Assert
        assert_eq!(*sink.pressed.lock().unwrap(), vec!["5".to_string()]);
        assert!(outbound_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_write_pump_flushes_queued_notice_after_close_signal() {
        // Arrange: eviction notice queued and the close signal already fired
        // before the writer ever runs
        let (transport, mut peer) = memory_transport();
        let (_source, sink) = transport.split();
        let (outbound_tx, outbound_rx) = mpsc::channel(4);
        outbound_tx.try_send(ServerMessage::evicted()).unwrap();
        let close = CancellationToken::new();
        close.cancel();
        let pump = WritePump {
            id: ConnectionId::new(),
            sink,
            outbound: outbound_rx,
            close,
            ping_interval: Duration::from_secs(30),
            write_timeout: Duration::from_secs(10),
        };

        // Act
        timeout(STEP, pump.run()).await.unwrap();

        // Assert: the notice is written, then the transport is closed
        assert_eq!(expect_text(&mut peer).await, ServerMessage::evicted());
        assert_eq!(timeout(STEP, peer.recv()).await.unwrap(), None);
    }
}
