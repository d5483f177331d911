//! Interactive chat client
//!
//! Connects to a running WebSocket server, performs the initialize
//! handshake, and drives a readline loop. The socket is bridged into the
//! correlator's channels so the RPC layer stays transport-agnostic.

use futures::{SinkExt, StreamExt};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::client::{start_read_loop, McpSession, RpcClient};
use crate::error::{ChatRelayError, Result};

/// Run the interactive chat loop against the server at `url`.
pub async fn run_chat(url: Option<String>, user: Option<String>) -> Result<()> {
    let url = url.unwrap_or_else(|| "ws://127.0.0.1:8765/ws".to_string());
    let user_id = user.unwrap_or_else(|| "anonymous".to_string());

    tracing::info!("Connecting to {url}");
    let (stream, _) = connect_async(&url)
        .await
        .map_err(|e| ChatRelayError::Transport(format!("connect to {url} failed: {e}")))?;
    let (mut ws_tx, mut ws_rx) = stream.split();

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<String>();
    let cancel = CancellationToken::new();

    // Socket writer: drains the correlator's outbound channel.
    let writer_cancel = cancel.clone();
    let writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = writer_cancel.cancelled() => break,
                msg = outbound_rx.recv() => {
                    let Some(payload) = msg else { break };
                    if ws_tx.send(WsMessage::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = ws_tx.send(WsMessage::Close(None)).await;
    });

    // Socket reader: feeds text frames into the correlator's read loop.
    let reader_cancel = cancel.clone();
    let reader = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = reader_cancel.cancelled() => break,
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(WsMessage::Text(raw))) => {
                            if inbound_tx.send(raw.to_string()).is_err() {
                                break;
                            }
                        }
                        Some(Ok(WsMessage::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::debug!("WebSocket read error: {e}");
                            break;
                        }
                    }
                }
            }
        }
    });

    let client = RpcClient::new(outbound_tx);
    let _read_loop = start_read_loop(inbound_rx, cancel.clone(), client.clone_shared());
    let session = McpSession::new(client);

    let init = session.initialize().await?;
    println!(
        "Connected to {} v{} (protocol {})",
        init.server_info.name, init.server_info.version, init.protocol_version
    );
    let conversation_id = Uuid::new_v4().to_string();
    println!("Conversation: {conversation_id}");
    print_help();

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match trimmed {
                    "/quit" | "/exit" => break,
                    "/help" => print_help(),
                    "/history" => match session.get_history(&conversation_id).await {
                        Ok(payload) => print_json(&payload),
                        Err(e) => println!("Error: {e}"),
                    },
                    "/tools" => match session.list_tools().await {
                        Ok(list) => {
                            for tool in list.tools {
                                println!("  {} - {}", tool.name, tool.description);
                            }
                        }
                        Err(e) => println!("Error: {e}"),
                    },
                    "/resources" => match session.list_resources().await {
                        Ok(list) => {
                            for resource in list.resources {
                                println!("  {} - {}", resource.uri, resource.name);
                            }
                        }
                        Err(e) => println!("Error: {e}"),
                    },
                    "/prompts" => match session.list_prompts().await {
                        Ok(list) => {
                            for prompt in list.prompts {
                                println!("  {} - {}", prompt.name, prompt.description);
                            }
                        }
                        Err(e) => println!("Error: {e}"),
                    },
                    message => {
                        match session
                            .chat(message, Some(&conversation_id), Some(&user_id))
                            .await
                        {
                            Ok(payload) => match payload.get("response").and_then(|r| r.as_str()) {
                                Some(text) => println!("assistant> {text}"),
                                None => print_json(&payload),
                            },
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                cancel.cancel();
                return Err(e.into());
            }
        }
    }

    cancel.cancel();
    let _ = writer.await;
    let _ = reader.await;
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  /history    show this conversation's stored turns");
    println!("  /tools      list server tools");
    println!("  /resources  list server resources");
    println!("  /prompts    list server prompts");
    println!("  /quit       exit");
    println!("Anything else is sent as a chat message.");
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{value}"),
    }
}
