//! Persistent WebSocket host
//!
//! One [`Session`] per connection, living for the socket's lifetime. Frames
//! are processed strictly in arrival order; a slow tool call holds up the
//! frames behind it on the same connection, which keeps per-connection
//! ordering trivially correct. A dropped connection abandons whatever call
//! was in flight and its result is discarded with the socket.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::error::Result;
use crate::server::{MethodRouter, Session};

/// Tracks the number of live WebSocket connections.
#[derive(Default)]
pub struct ConnectionManager {
    active: AtomicUsize,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection and return the updated count.
    pub fn connected(&self) -> usize {
        let count = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("Client connected ({count} active)");
        count
    }

    /// Record a closed connection and return the updated count.
    pub fn disconnected(&self) -> usize {
        let count = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::info!("Client disconnected ({count} active)");
        count
    }

    /// Current number of live connections.
    pub fn count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

struct WsState {
    router: Arc<MethodRouter>,
    connections: Arc<ConnectionManager>,
}

/// Build the WebSocket application around a shared router.
pub fn app(router: Arc<MethodRouter>, connections: Arc<ConnectionManager>) -> Router {
    let state = Arc::new(WsState {
        router,
        connections,
    });
    Router::new().route("/ws", get(upgrade)).with_state(state)
}

/// Bind and serve the WebSocket host until the process exits.
pub async fn serve(
    bind: &str,
    router: Arc<MethodRouter>,
    connections: Arc<ConnectionManager>,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("WebSocket server listening on ws://{bind}/ws");
    axum::serve(listener, app(router, connections)).await?;
    Ok(())
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<WsState>) {
    state.connections.connected();
    let mut session = Session::new();

    // In-order processing: the next frame is not read until the previous
    // one's reply has been sent.
    while let Some(msg) = socket.recv().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!("WebSocket receive error: {e}");
                break;
            }
        };

        match msg {
            Message::Text(raw) => {
                match state.router.handle_raw(&raw, &mut session).await {
                    Ok(Some(reply)) => {
                        if let Err(e) = socket.send(Message::Text(reply)).await {
                            tracing::debug!("WebSocket send error: {e}");
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!("Failed to format WebSocket reply: {e}");
                        break;
                    }
                }
            }
            Message::Close(_) => break,
            // Pings are answered by axum automatically.
            _ => {}
        }
    }

    state.connections.disconnected();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_manager_counts_up_and_down() {
        let manager = ConnectionManager::new();
        assert_eq!(manager.count(), 0);
        assert_eq!(manager.connected(), 1);
        assert_eq!(manager.connected(), 2);
        assert_eq!(manager.disconnected(), 1);
        assert_eq!(manager.count(), 1);
        assert_eq!(manager.disconnected(), 0);
    }
}
