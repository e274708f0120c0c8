//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use claude_probe::backend::{Availability, Backend, BackendError, Message, MessageStream, QueryOptions};
use claude_probe::{HttpServer, ProbeConfig, Shutdown};
use futures_util::{stream, StreamExt};
use tokio::net::TcpListener;

/// What the stub backend does when queried.
#[allow(dead_code)]
pub enum Reply {
    Message(&'static str),
    Never,
    Fail(&'static str),
}

/// Backend test double that counts queries.
pub struct StubBackend {
    reply: Reply,
    calls: AtomicUsize,
}

impl StubBackend {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Backend for StubBackend {
    fn query(&self, _prompt: &str, _options: &QueryOptions) -> Result<MessageStream, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Reply::Message(text) => Ok(stream::iter(vec![Ok(Message::assistant(text))]).boxed()),
            Reply::Never => Ok(stream::pending().boxed()),
            Reply::Fail(stderr) => Ok(stream::iter(vec![Err(BackendError::Exited {
                code: Some(1),
                stderr: stderr.to_string(),
            })])
            .boxed()),
        }
    }

    fn label(&self) -> String {
        "stub".to_string()
    }
}

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the probe server with the given backend and gate.
pub async fn start_server(
    backend: Arc<StubBackend>,
    availability: Availability,
    probe_deadline: Duration,
) -> TestServer {
    let mut config = ProbeConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.timeouts.probe_deadline_ms = probe_deadline.as_millis() as u64;

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(&config, backend, availability);
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer { addr, shutdown }
}

pub fn available() -> Availability {
    Availability::Available {
        version: "1.0.0 (Claude Code)".to_string(),
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
