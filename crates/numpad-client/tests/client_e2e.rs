//! End-to-end tests: the terminal client against a real host on loopback.

use std::sync::Arc;
use std::time::Duration;

use numpad_client::application::Command;
use numpad_client::infrastructure::{ClientConfig, ClientError, ClientEvent, KeypadClient};
use numpad_core::{ConnectionState, NumpadKey, ReconnectPolicy, ServerMessage};
use numpad_server::application::{HubHandle, PressKeyUseCase};
use numpad_server::domain::ServerConfig;
use numpad_server::infrastructure::key_injection::mock::MockKeyInjector;
use numpad_server::infrastructure::NumpadServer;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;

const STEP: Duration = Duration::from_secs(10);

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Host {
    url: String,
    hub: HubHandle,
    injector: Arc<MockKeyInjector>,
    _stop: oneshot::Sender<()>,
}

async fn start_host() -> Host {
    let config = ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        static_dir: std::env::temp_dir(),
        shutdown_grace: Duration::from_secs(1),
        ..ServerConfig::default()
    };
    let injector = Arc::new(MockKeyInjector::new());
    let server = NumpadServer::bind(&config, Arc::new(PressKeyUseCase::new(injector.clone())))
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    let hub = server.hub();
    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(server.run(async move {
        let _ = stopped.await;
    }));

    Host {
        url: format!("ws://{addr}/ws"),
        hub,
        injector,
        _stop: stop,
    }
}

struct Client {
    commands: mpsc::Sender<Command>,
    events: mpsc::UnboundedReceiver<ClientEvent>,
    task: JoinHandle<Result<(), ClientError>>,
}

impl Client {
    fn start(url: &str) -> Self {
        let config = ClientConfig {
            url: url.to_string(),
            policy: ReconnectPolicy {
                max_attempts: 5,
                retry_delay: Duration::from_millis(50),
            },
        };
        let (commands, command_rx) = mpsc::channel(16);
        let (event_tx, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(KeypadClient::new(config, command_rx, event_tx).run());
        Self {
            commands,
            events,
            task,
        }
    }

    /// Waits for `wanted`, returning every event seen before it.
    async fn wait_for(&mut self, wanted: ClientEvent) -> Vec<ClientEvent> {
        let mut before = Vec::new();
        timeout(STEP, async {
            loop {
                match self.events.recv().await {
                    Some(event) if event == wanted => return,
                    Some(event) => before.push(event),
                    None => panic!("client stopped while waiting for {wanted:?}"),
                }
            }
        })
        .await
        .unwrap();
        before
    }

    async fn send(&self, command: Command) {
        self.commands.send(command).await.unwrap();
    }

    async fn quit(self) {
        self.commands.send(Command::Quit).await.unwrap();
        timeout(STEP, self.task).await.unwrap().unwrap().unwrap();
    }
}

async fn wait_for_taps(injector: &MockKeyInjector, count: usize) -> Vec<NumpadKey> {
    timeout(STEP, async {
        loop {
            let taps = injector.taps();
            if taps.len() >= count {
                return taps;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap()
}

fn connected() -> ClientEvent {
    ClientEvent::State(ConnectionState::Connected)
}

fn replaced() -> ClientEvent {
    ClientEvent::State(ConnectionState::Disconnected { replaced: true })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_typed_keys_are_injected_on_host() {
    // Arrange
    let host = start_host().await;
    let mut client = Client::start(&host.url);
    client.wait_for(connected()).await;

    // Act
    client
        .send(Command::Keys(vec![
            NumpadKey::Digit4,
            NumpadKey::Add,
            NumpadKey::Digit2,
            NumpadKey::Enter,
        ]))
        .await;

    // Assert
    assert_eq!(
        wait_for_taps(&host.injector, 4).await,
        vec![
            NumpadKey::Digit4,
            NumpadKey::Add,
            NumpadKey::Digit2,
            NumpadKey::Enter
        ]
    );
    client.quit().await;
}

#[tokio::test]
async fn test_welcome_payload_is_reported() {
    let host = start_host().await;
    let mut client = Client::start(&host.url);

    client
        .wait_for(ClientEvent::Server(ServerMessage::connected()))
        .await;

    client.quit().await;
}

#[tokio::test]
async fn test_replaced_client_does_not_reconnect_automatically() {
    // Arrange
    let host = start_host().await;
    let mut first = Client::start(&host.url);
    first.wait_for(connected()).await;

    // Act
    let mut second = Client::start(&host.url);
    second.wait_for(connected()).await;

    // Assert: the first client saw the notice and went idle
    let before = first.wait_for(replaced()).await;
    assert!(before.contains(&ClientEvent::Server(ServerMessage::evicted())));

    // Assert: several retry delays later it is still idle
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(first.events.try_recv().is_err());
    assert_eq!(host.hub.active_connections().await.unwrap().len(), 1);

    first.quit().await;
    second.quit().await;
}

#[tokio::test]
async fn test_replaced_client_can_take_the_session_back() {
    // Arrange
    let host = start_host().await;
    let mut first = Client::start(&host.url);
    first.wait_for(connected()).await;
    let mut second = Client::start(&host.url);
    second.wait_for(connected()).await;
    first.wait_for(replaced()).await;

    // Act
    first.send(Command::Reconnect).await;

    // Assert: roles swap
    first.wait_for(connected()).await;
    second.wait_for(replaced()).await;
    first.send(Command::Keys(vec![NumpadKey::Digit9])).await;
    assert_eq!(wait_for_taps(&host.injector, 1).await, vec![NumpadKey::Digit9]);

    first.quit().await;
    second.quit().await;
}

#[tokio::test]
async fn test_host_restart_is_survived_with_retries() {
    // Arrange: a host that goes away while the client is connected
    let host = start_host().await;
    let mut client = Client::start(&host.url);
    client.wait_for(connected()).await;

    // Act
    host.hub.shutdown().await.unwrap();

    // Assert: the drop is not mistaken for a takeover
    let before = client
        .wait_for(ClientEvent::State(ConnectionState::Disconnected {
            replaced: false,
        }))
        .await;
    assert!(!before.contains(&replaced()));
    client
        .wait_for(ClientEvent::State(ConnectionState::Connecting))
        .await;

    client.quit().await;
}
