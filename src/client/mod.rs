//! Client-side request correlation
//!
//! The correlator is transport-agnostic: outbound payloads go into an
//! unbounded channel, and the read loop feeds inbound payloads back in. The
//! chat command bridges these channels to a WebSocket; tests wire them to a
//! router task directly.

pub mod session;

pub use session::McpSession;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ChatRelayError, Result};
use crate::protocol::envelope::{Envelope, MessageKind, RequestId};

/// Deadline applied when the caller does not supply one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Correlates outbound requests with inbound responses by id.
///
/// Ids are issued from a monotonically increasing counter and sent as
/// strings, so the echo always matches byte for byte. Every pending request
/// holds a oneshot that the read loop resolves; a timed-out request removes
/// its own entry so a late response is treated as an orphan and discarded.
pub struct RpcClient {
    next_id: Arc<AtomicU64>,
    pending: Arc<Mutex<HashMap<RequestId, oneshot::Sender<Envelope>>>>,
    outbound: mpsc::UnboundedSender<String>,
}

impl RpcClient {
    /// Create a correlator writing raw payloads into `outbound`.
    pub fn new(outbound: mpsc::UnboundedSender<String>) -> Self {
        Self {
            next_id: Arc::new(AtomicU64::new(1)),
            pending: Arc::new(Mutex::new(HashMap::new())),
            outbound,
        }
    }

    /// Hand out another handle sharing the id counter, pending map, and
    /// outbound channel.
    pub fn clone_shared(&self) -> Self {
        Self {
            next_id: Arc::clone(&self.next_id),
            pending: Arc::clone(&self.pending),
            outbound: self.outbound.clone(),
        }
    }

    /// Number of requests still awaiting a response.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    fn issue_id(&self) -> RequestId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        RequestId::String(n.to_string())
    }

    /// Send a request and await its response envelope.
    ///
    /// The pending entry is registered before the payload is handed to the
    /// transport, so a response cannot race the registration. On timeout the
    /// entry is removed and [`ChatRelayError::Timeout`] is returned; the
    /// response, if it ever arrives, is logged and dropped by the read loop.
    pub async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<Envelope> {
        let id = self.issue_id();
        let envelope = Envelope::request(id.clone(), method, params);
        let payload = envelope.to_json()?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        if self.outbound.send(payload).is_err() {
            self.pending.lock().await.remove(&id);
            return Err(ChatRelayError::Transport("outbound channel closed".to_string()).into());
        }

        let deadline = timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => {
                // Sender dropped without resolving; the read loop is gone.
                Err(ChatRelayError::Transport("connection closed".to_string()).into())
            }
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(ChatRelayError::Timeout {
                    method: method.to_string(),
                }
                .into())
            }
        }
    }

    /// Send a notification. No id is attached and no response is awaited.
    pub fn notify(&self, method: &str, params: serde_json::Value) -> Result<()> {
        let payload = Envelope::notification(method, params).to_json()?;
        self.outbound
            .send(payload)
            .map_err(|_| ChatRelayError::Transport("outbound channel closed".to_string()))?;
        Ok(())
    }

    /// Resolve the pending request matching this response, if any. Orphan
    /// responses (unknown or already timed-out ids) are logged and dropped.
    async fn resolve(&self, envelope: Envelope) {
        let Some(id) = envelope.id.clone() else {
            tracing::debug!("Dropping response without id");
            return;
        };

        let sender = self.pending.lock().await.remove(&id);
        match sender {
            Some(tx) => {
                // A receiver dropped mid-flight is fine; the caller gave up.
                let _ = tx.send(envelope);
            }
            None => tracing::debug!("Dropping orphan response for id {id}"),
        }
    }

    /// Drop every pending request. Their callers observe a closed oneshot.
    async fn clear_pending(&self) {
        let mut pending = self.pending.lock().await;
        if !pending.is_empty() {
            tracing::debug!("Clearing {} pending request(s)", pending.len());
        }
        pending.clear();
    }
}

/// Drive inbound payloads from the transport into the correlator until the
/// channel closes or `cancel` fires. Pending requests are cleared on exit.
pub fn start_read_loop(
    mut inbound: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
    client: RpcClient,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Read loop cancelled");
                    break;
                }
                msg = inbound.recv() => {
                    let Some(raw) = msg else {
                        tracing::debug!("Inbound channel closed");
                        break;
                    };
                    handle_inbound(&client, &raw).await;
                }
            }
        }
        client.clear_pending().await;
    })
}

async fn handle_inbound(client: &RpcClient, raw: &str) {
    let envelope = match Envelope::parse(raw) {
        Ok(env) => env,
        Err(e) => {
            tracing::warn!("Discarding unparseable inbound message: {e}");
            return;
        }
    };

    match envelope.classify() {
        Ok(MessageKind::Response) => client.resolve(envelope).await,
        Ok(kind) => tracing::debug!("Ignoring inbound {kind:?} from server"),
        Err(e) => tracing::warn!("Discarding malformed inbound message: {e}"),
    }
}
