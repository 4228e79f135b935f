//! Connection loop for one participant.

use std::time::Duration;

use banter_shared::{ChatEvent, EventKind};
use futures_util::{Sink, SinkExt, StreamExt};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::{error::ClientError, session::ParticipantSession};

/// Reserved input that triggers a graceful leave.
const EXIT_COMMAND: &str = "exit";

/// Grace period letting in-flight sends flush before the socket closes.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Run a participant session until the user exits or the connection ends.
///
/// # Errors
///
/// Returns [`ClientError::ConnectionFailure`] when the coordinator cannot be
/// reached, and [`ClientError::ConnectionLost`] / [`ClientError::ConnectionClosed`]
/// when the stream ends mid-session. Neither is retried.
pub async fn run_client(
    participant_id: u64,
    host: &str,
    port: u16,
) -> Result<(), ClientError> {
    let addr = format!("ws://{host}:{port}/ws");
    let (ws_stream, _) =
        connect_async(&addr)
            .await
            .map_err(|source| ClientError::ConnectionFailure {
                addr: addr.clone(),
                source,
            })?;
    tracing::info!("connected to coordinator at {}", addr);

    let (mut sink, mut stream) = ws_stream.split();
    let mut session = ParticipantSession::new(participant_id);

    // Joining is a local event; the join frame identifies this session.
    let join = session.join_event();
    send_event(&mut sink, &join).await?;

    // Keystrokes come in over a channel from a dedicated readline thread so
    // the blocking prompt never stalls the receive path.
    let mut lines = spawn_input_thread();

    loop {
        tokio::select! {
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ChatEvent>(&text) {
                        Ok(event) => {
                            let clock = session.apply_incoming(&event);
                            display_event(&event, clock);
                        }
                        Err(e) => tracing::warn!("dropping unparseable frame: {}", e),
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    return Err(ClientError::ConnectionClosed);
                }
                Some(Err(e)) => {
                    return Err(ClientError::ConnectionLost(e));
                }
                Some(Ok(_)) => {}
            },
            line = lines.recv() => {
                // A closed channel means stdin is gone; leave gracefully.
                let line = line.unwrap_or_else(|| EXIT_COMMAND.to_string());
                let trimmed = line.trim();
                if trimmed == EXIT_COMMAND {
                    let leave = session.leave_event();
                    send_event(&mut sink, &leave).await?;
                    tokio::time::sleep(SHUTDOWN_GRACE).await;
                    let _ = sink.close().await;
                    tracing::info!("left the chat");
                    return Ok(());
                }
                if trimmed.is_empty() {
                    continue;
                }
                let message = session.message_event(trimmed);
                send_event(&mut sink, &message).await?;
            }
        }
    }
}

async fn send_event<S>(sink: &mut S, event: &ChatEvent) -> Result<(), ClientError>
where
    S: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let json = serde_json::to_string(event)?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(ClientError::ConnectionLost)
}

/// Print one received event together with the local clock value it produced.
fn display_event(event: &ChatEvent, clock: u64) {
    let now = chrono::Local::now().format("%H:%M:%S");
    match event.kind {
        EventKind::Message => println!(
            "[{now}] (clock {clock}) participant {}: {}",
            event.participant_id, event.content
        ),
        _ => println!("[{now}] (clock {clock}) {}", event.content),
    }
}

/// Read lines on a plain thread and forward them over a channel. Ctrl-C and
/// Ctrl-D are folded into the exit command so every way out sends a Leave.
fn spawn_input_thread() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                tracing::error!("failed to initialize line editor: {}", e);
                let _ = tx.send(EXIT_COMMAND.to_string());
                return;
            }
        };
        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    let _ = tx.send(EXIT_COMMAND.to_string());
                    break;
                }
                Err(e) => {
                    tracing::error!("readline error: {}", e);
                    let _ = tx.send(EXIT_COMMAND.to_string());
                    break;
                }
            }
        }
    });
    rx
}
