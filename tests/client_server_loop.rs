//! Client correlator driven against a live router task over in-process
//! channels, exercising the same message flow as a WebSocket connection.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use chatrelay::client::{start_read_loop, McpSession, RpcClient};
use chatrelay::error::ChatRelayError;
use chatrelay::server::{MethodRouter, Session};

/// Run a router as the remote end of the wire, one session per "connection".
fn spawn_server(
    router: Arc<MethodRouter>,
    mut wire_rx: mpsc::UnboundedReceiver<String>,
    reply_tx: mpsc::UnboundedSender<String>,
) {
    tokio::spawn(async move {
        let mut session = Session::new();
        while let Some(raw) = wire_rx.recv().await {
            match router.handle_raw(&raw, &mut session).await {
                Ok(Some(reply)) => {
                    let _ = reply_tx.send(reply);
                }
                Ok(None) => {}
                Err(e) => panic!("router failed to format reply: {e}"),
            }
        }
    });
}

fn connect(router: Arc<MethodRouter>) -> (McpSession, CancellationToken) {
    let (wire_tx, wire_rx) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    let client = RpcClient::new(wire_tx);
    let cancel = CancellationToken::new();
    start_read_loop(reply_rx, cancel.clone(), client.clone_shared());
    spawn_server(router, wire_rx, reply_tx);

    (
        McpSession::new(client).with_timeout(Duration::from_secs(2)),
        cancel,
    )
}

#[tokio::test]
async fn test_handshake_and_catalog_over_the_loop() {
    let (router, _tmp) = common::build_router("looped reply");
    let (session, cancel) = connect(router);

    let init = session.initialize().await.expect("initialize failed");
    assert_eq!(init.protocol_version, "2024-11-05");
    assert_eq!(init.server_info.name, "ChatRelay Customer Support Server");

    let tools = session.list_tools().await.expect("tools/list failed");
    assert_eq!(tools.tools.len(), 2);

    let resources = session.list_resources().await.expect("resources/list failed");
    assert_eq!(resources.resources[0].uri, "conversation://history");

    cancel.cancel();
}

#[tokio::test]
async fn test_chat_and_history_through_typed_session() {
    let (router, _tmp) = common::build_router("typed answer");
    let (session, cancel) = connect(router);
    session.initialize().await.expect("initialize failed");

    let payload = session
        .chat("first question", Some("conv-loop"), Some("bob"))
        .await
        .expect("chat failed");
    assert_eq!(payload["response"], "typed answer");

    let history = session
        .get_history("conv-loop")
        .await
        .expect("history failed");
    assert_eq!(history["total_exchanges"], 1);
    assert_eq!(history["history"][0]["query"], "first question");

    cancel.cancel();
}

#[tokio::test]
async fn test_server_error_maps_to_rpc_error() {
    let (router, _tmp) = common::build_router("unused");
    let (session, cancel) = connect(router);

    let err = session
        .get_prompt("customer_support", serde_json::json!({}))
        .await
        .expect_err("missing required argument must fail");
    let err = err.downcast::<ChatRelayError>().expect("typed error");
    match err {
        ChatRelayError::Rpc(msg) => assert!(msg.contains("customer_issue")),
        other => panic!("unexpected error: {other}"),
    }

    cancel.cancel();
}

#[tokio::test]
async fn test_sampling_through_typed_session() {
    let (router, _tmp) = common::build_router("a haiku");
    let (session, cancel) = connect(router);

    let result = session
        .create_message(
            serde_json::json!([{ "role": "user", "content": "write a haiku" }]),
            Some(64),
            None,
        )
        .await
        .expect("sampling failed");
    assert_eq!(result.role, "assistant");
    assert_eq!(result.content.text, "a haiku");
    assert_eq!(result.stop_reason, "endTurn");

    cancel.cancel();
}
