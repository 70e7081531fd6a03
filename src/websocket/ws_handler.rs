use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::app_state::AppState;
use crate::db::Notification;
use crate::identity::Identity;

/// Live feed of the caller's own notifications
pub async fn notifications_ws(
    ws: WebSocketUpgrade,
    identity: Identity,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let rx = state.notifications.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, identity, rx))
}

async fn handle_socket(socket: WebSocket, identity: Identity, mut rx: broadcast::Receiver<Notification>) {
    let (mut sender, mut receiver) = socket.split();
    let user_id = identity.user_id;
    debug!(%user_id, "Notification socket opened");

    // Inbound frames are ignored; this only notices when the client goes away.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    let feed_user = user_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let notification = match rx.recv().await {
                Ok(notification) => notification,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(user_id = %feed_user, skipped, "Notification socket lagged behind");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if notification.recipient_id != feed_user {
                continue;
            }

            let payload = match serde_json::to_string(&notification) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("Failed to encode notification: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    }
    debug!(%user_id, "Notification socket closed");
}
