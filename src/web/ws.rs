use axum::extract::{
    State,
    ws::{self, WebSocket, WebSocketUpgrade},
};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::session::messages::client_message_from_ws_text;
use crate::session::{QuizSession, ServerToClientMessage};
use crate::state::AppState;

pub async fn ws_handler(
    ws_upgrade: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    tracing::info!("WebSocket: quiz session connection attempt");
    ws_upgrade.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn send_state(
    ws_sender: &mut SplitSink<WebSocket, ws::Message>,
    session: &QuizSession,
    session_id: Uuid,
) -> bool {
    let update = ServerToClientMessage::StateUpdate {
        state: session.snapshot(),
    };
    match update.to_ws_text() {
        Ok(ws_msg) => {
            if ws_sender.send(ws_msg).await.is_err() {
                tracing::info!(
                    session.id = %session_id,
                    "WS send failed, client likely disconnected"
                );
                return false;
            }
            true
        }
        Err(e) => {
            tracing::error!(
                session.id = %session_id,
                error = %e,
                "Failed to serialize session snapshot"
            );
            true
        }
    }
}

/// Runs one quiz session for the lifetime of the socket. Events are handled
/// strictly one at a time: receive, transition, push the fresh snapshot.
pub async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let session_id = Uuid::new_v4();
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let mut session = QuizSession::new(app_state.store.image_urls());
    tracing::info!(session.id = %session_id, "Quiz session started");

    // Let the client render the loading state before the fetch completes.
    if !send_state(&mut ws_sender, &session, session_id).await {
        return;
    }

    // The bank is fetched once per session; a failure is absorbed by the
    // session as the terminal Empty state.
    let load_result = app_state.store.fetch_all_questions().await;
    session.questions_loaded(load_result);
    if !send_state(&mut ws_sender, &session, session_id).await {
        return;
    }

    loop {
        match ws_receiver.next().await {
            Some(Ok(ws::Message::Text(text_msg))) => {
                match client_message_from_ws_text(&text_msg) {
                    Ok(event) => {
                        tracing::debug!(
                            session.id = %session_id,
                            event = ?event,
                            "Handling client event"
                        );
                        if session.handle_event(event)
                            && !send_state(&mut ws_sender, &session, session_id).await
                        {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            session.id = %session_id,
                            error = %e,
                            raw = %text_msg,
                            "Failed to deserialize client message"
                        );
                        let error_response = ServerToClientMessage::SystemError {
                            message: format!("Invalid message format: {}", e),
                        };
                        if let Ok(ws_msg) = error_response.to_ws_text() {
                            let _ = ws_sender.send(ws_msg).await;
                        }
                    }
                }
            }
            Some(Ok(ws::Message::Binary(_))) => {
                tracing::debug!(session.id = %session_id, "Received binary message (ignored)");
            }
            Some(Ok(ws::Message::Ping(_))) | Some(Ok(ws::Message::Pong(_))) => {
                // Axum auto-responds to pings; nothing to do.
            }
            Some(Ok(ws::Message::Close(_))) => {
                tracing::info!(session.id = %session_id, "WebSocket closed by client");
                break;
            }
            Some(Err(e)) => {
                tracing::warn!(session.id = %session_id, error = %e, "WebSocket error");
                break;
            }
            None => {
                tracing::info!(session.id = %session_id, "WebSocket connection closed");
                break;
            }
        }
    }

    let _ = ws_sender.close().await;
    tracing::info!(session.id = %session_id, "Quiz session ended");
}
