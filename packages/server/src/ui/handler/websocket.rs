//! WebSocket connection handlers.
//!
//! One connection carries one participant session. The first frame must be a
//! Join event announcing the participant id; everything after that is chat
//! traffic until an explicit Leave event or the stream ends. Both exits land
//! on the same idempotent leave path, so the departure is broadcast exactly
//! once even when a Leave frame and a socket close are both observed.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use banter_shared::{COORDINATOR_ID, ChatEvent, EventKind, ParticipantId};
use futures_util::{
    sink::SinkExt,
    stream::{SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    coordinator::{BroadcastReport, CoordinatorError},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // The participant id arrives in the first frame, which must be Join.
    let Some(join_event) = read_join_event(&mut receiver).await else {
        tracing::warn!("connection ended before a valid join event arrived");
        return;
    };
    let participant_id = join_event.participant_id;

    // Create a channel for this participant to receive broadcasts
    let (tx, mut rx) = mpsc::unbounded_channel();

    let outcome = match state.coordinator.join(participant_id, tx).await {
        Ok(outcome) => outcome,
        Err(e @ CoordinatorError::DuplicateParticipant(_)) => {
            tracing::warn!("rejecting join: {}", e);
            let rejection = ChatEvent::info(COORDINATOR_ID, 0, e.to_string());
            let rejection_json = serde_json::to_string(&rejection).unwrap();
            let _ = sender.send(Message::Text(rejection_json.into())).await;
            let _ = sender.close().await;
            return;
        }
        Err(e) => {
            tracing::error!("join failed for participant {}: {}", participant_id, e);
            return;
        }
    };
    tracing::info!("participant {} joined and registered", participant_id);
    log_failed_deliveries(&outcome.announcement, "join notice");

    // Hand the roster snapshot to the joiner before its broadcast queue
    // starts draining, so it is always the first thing the joiner sees.
    let roster_json = serde_json::to_string(&outcome.roster).unwrap();
    if let Err(e) = sender.send(Message::Text(roster_json.into())).await {
        tracing::error!("failed to send roster to participant {}: {}", participant_id, e);
        finish_session(&state, participant_id).await;
        return;
    }

    let state_clone = state.clone();

    // Task pulling inbound events off this participant's stream
    let mut recv_task = tokio::spawn(async move {
        receive_loop(&mut receiver, state_clone, participant_id).await;
    });

    // Task draining this participant's broadcast queue onto the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = serde_json::to_string(&event).unwrap();
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    finish_session(&state, participant_id).await;
}

/// Read frames until the opening Join event shows up.
///
/// Returns `None` when the stream ends first or the opening frame is not a
/// Join; an unidentified connection has nothing to register.
async fn read_join_event(receiver: &mut SplitStream<WebSocket>) -> Option<ChatEvent> {
    while let Some(frame) = receiver.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("websocket error before join: {}", e);
                return None;
            }
        };
        match msg {
            Message::Text(text) => {
                let event = match serde_json::from_str::<ChatEvent>(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("failed to parse opening frame as event: {}", e);
                        return None;
                    }
                };
                if event.kind != EventKind::Join {
                    tracing::warn!(
                        "expected a join event as opening frame, got {}",
                        event.kind
                    );
                    return None;
                }
                return Some(event);
            }
            Message::Close(_) => return None,
            // Ping/pong is handled automatically by the WebSocket protocol
            _ => {}
        }
    }
    None
}

/// Inbound event loop for one registered participant.
async fn receive_loop(
    receiver: &mut SplitStream<WebSocket>,
    state: Arc<AppState>,
    participant_id: ParticipantId,
) {
    while let Some(frame) = receiver.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!("websocket error from participant {}: {}", participant_id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                let event = match serde_json::from_str::<ChatEvent>(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(
                            "dropping unparseable frame from participant {}: {}",
                            participant_id,
                            e
                        );
                        continue;
                    }
                };

                match event.kind {
                    EventKind::Message => {
                        tracing::info!(
                            "participant {} (clock {}): {}",
                            event.participant_id,
                            event.clock,
                            event.content
                        );
                        match state.coordinator.relay(event).await {
                            Ok(report) => log_failed_deliveries(&report, "chat message"),
                            Err(e) => tracing::warn!("dropping message: {}", e),
                        }
                    }
                    EventKind::Leave => {
                        tracing::info!("participant {} announced leave", participant_id);
                        break;
                    }
                    EventKind::Join => {
                        tracing::warn!(
                            "ignoring repeated join from participant {}",
                            participant_id
                        );
                    }
                    EventKind::Info => {
                        tracing::warn!(
                            "ignoring info event from participant {}",
                            participant_id
                        );
                    }
                }
            }
            Message::Close(_) => {
                tracing::info!("participant {} closed the connection", participant_id);
                break;
            }
            Message::Ping(_) => {
                tracing::debug!("received ping");
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            _ => {}
        }
    }
}

/// Deregister and announce the departure. Every exit path of a registered
/// session routes here, and the coordinator's leave is idempotent, so the
/// departure side effects happen exactly once even when an explicit Leave
/// event and the stream close are both observed.
async fn finish_session(state: &Arc<AppState>, participant_id: ParticipantId) {
    if let Some(report) = state.coordinator.leave(participant_id).await {
        tracing::info!(
            "participant {} left, notified {} others",
            participant_id,
            report.delivered()
        );
        log_failed_deliveries(&report, "leave notice");
    }
}

fn log_failed_deliveries(report: &BroadcastReport, what: &str) {
    for delivery in report.failures() {
        tracing::warn!(
            "failed to deliver {} to participant {}",
            what,
            delivery.recipient
        );
    }
}
