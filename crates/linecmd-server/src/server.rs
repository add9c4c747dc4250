//! TCP listener lifecycle and one-shot client.

use crate::connection::handle_connection;
use crate::error::{ServerError, ServerResult};
use crate::registry::CommandRegistry;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use wire_protocol_types::Response;

/// Default bind address for the daemon.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:12345";

/// How long `stop` waits for in-flight handlers before aborting them.
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A live connection tracked by the listener.
struct ConnectionHandle {
    peer: SocketAddr,
    task: JoinHandle<()>,
}

/// TCP server that frames newline-delimited JSON requests.
///
/// Each accepted connection runs on its own task; the only state shared
/// across handlers is the command registry and the connection map.
pub struct Server {
    registry: Arc<CommandRegistry>,
    connections: Arc<RwLock<HashMap<Uuid, ConnectionHandle>>>,
    shutdown_tx: broadcast::Sender<()>,
    listener_task: Mutex<Option<JoinHandle<()>>>,
    shutdown_grace: Duration,
}

impl Server {
    /// Create a server around a command registry.
    pub fn new(registry: CommandRegistry) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            registry: Arc::new(registry),
            connections: Arc::new(RwLock::new(HashMap::new())),
            shutdown_tx,
            listener_task: Mutex::new(None),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// Override the grace period `stop` allows in-flight handlers.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// The registry this server dispatches against.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Number of currently tracked connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Bind the listener and start accepting connections.
    ///
    /// Returns the bound address, so callers may bind port 0 and discover
    /// the assigned port. Starting an already started server is an error.
    pub async fn start(&self, bind_addr: &str) -> ServerResult<SocketAddr> {
        let mut task_slot = self.listener_task.lock().await;
        if task_slot.is_some() {
            return Err(ServerError::AlreadyListening);
        }

        let listener = TcpListener::bind(bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "Server started");

        let registry = self.registry.clone();
        let connections = self.connections.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();
        *task_slot = Some(tokio::spawn(accept_loop(
            listener,
            registry,
            connections,
            shutdown_rx,
        )));

        Ok(local_addr)
    }

    /// Stop accepting connections and wait for in-flight handlers to drain.
    ///
    /// Handlers still running after the grace period are aborted. Calling
    /// `stop` when the server is not listening is a no-op.
    pub async fn stop(&self) {
        let task = self.listener_task.lock().await.take();
        let Some(task) = task else {
            return;
        };

        let _ = self.shutdown_tx.send(());
        let _ = task.await;

        let deadline = Instant::now() + self.shutdown_grace;
        loop {
            if self.connections.read().await.is_empty() {
                break;
            }
            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let mut connections = self.connections.write().await;
        for (id, handle) in connections.drain() {
            warn!(connection = %id, peer = %handle.peer, "Aborting connection open at shutdown");
            handle.task.abort();
        }

        info!("Server stopped");
    }
}

/// Accept connections until the shutdown signal arrives.
///
/// The listener socket is dropped when this task returns, so `stop` can
/// await it to know no further connections will be accepted.
async fn accept_loop(
    listener: TcpListener,
    registry: Arc<CommandRegistry>,
    connections: Arc<RwLock<HashMap<Uuid, ConnectionHandle>>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer)) => {
                        let id = Uuid::new_v4();
                        let registry = registry.clone();
                        let connections_for_task = connections.clone();

                        // Hold the write lock across the spawn so the
                        // handler's removal cannot run before the insert.
                        let mut tracked = connections.write().await;
                        let task = tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, registry).await {
                                error!(connection = %id, error = %e, "Connection error");
                            }
                            connections_for_task.write().await.remove(&id);
                            debug!(connection = %id, "Connection closed");
                        });
                        tracked.insert(id, ConnectionHandle { peer, task });
                        debug!(connection = %id, peer = %peer, "Connection accepted");
                    }
                    Err(e) => {
                        error!(error = %e, "Accept error");
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Server shutting down");
                break;
            }
        }
    }
}

/// One-shot client for the daemon.
pub struct Client {
    addr: String,
}

impl Client {
    /// Create a client for the given server address.
    pub fn new(addr: &str) -> Self {
        Self {
            addr: addr.to_string(),
        }
    }

    /// Send one command and wait for its response.
    pub async fn call(&self, command: &str, data: Value) -> ServerResult<Response> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| ServerError::Socket(format!("Failed to connect: {}", e)))?;

        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        let request = serde_json::json!({ "command": command, "data": data });
        let request_json = serde_json::to_string(&request)?;
        writer.write_all(request_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        let mut line = String::new();
        reader.read_line(&mut line).await?;

        if line.is_empty() {
            return Err(ServerError::ConnectionClosed);
        }

        let response = Response::from_json(line.trim())?;
        Ok(response)
    }

    /// Check whether a server is accepting connections at the address.
    pub async fn is_running(&self) -> bool {
        TcpStream::connect(&self.addr).await.is_ok()
    }
}
