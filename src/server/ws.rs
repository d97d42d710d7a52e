use crate::state::{AppState, WsMessage};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use portable_atomic::Ordering;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.scanner.subscribe();
    let counters = Arc::clone(&state.counters);

    // Current state first, then every change. The watch channel coalesces,
    // so a slow client only ever sees the latest progress.
    let send_task = tokio::spawn(async move {
        loop {
            let msg = WsMessage::ScanState {
                state: rx.borrow_and_update().clone(),
            };
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                    counters.ws_messages_sent.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => tracing::warn!(error = %e, "scan state serialization failed"),
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    });

    // Read (and discard) incoming messages; detect disconnect
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {} // Ignore client messages
            }
        }
    });

    end_with_first(send_task, recv_task).await;
}

/// Wait for either task, then abort the other so a disconnected client never
/// leaves a sender parked on `rx.changed()`.
async fn end_with_first<A, B>(mut a: JoinHandle<A>, mut b: JoinHandle<B>) {
    tokio::select! {
        _ = &mut a => b.abort(),
        _ = &mut b => a.abort(),
    }
}
