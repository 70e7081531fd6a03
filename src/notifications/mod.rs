use tokio::sync::broadcast;
use tracing::debug;

use crate::db::Notification;

/// Outbound channel for counterparty notifications. Delivery is
/// fire-and-forget; a failed send never affects the scheduling change that
/// produced it.
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(&self, notification: Notification);
}

/// Fans notifications out to every live WebSocket subscriber.
#[derive(Clone)]
pub struct BroadcastDispatcher {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastDispatcher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl NotificationDispatcher for BroadcastDispatcher {
    fn dispatch(&self, notification: Notification) {
        let appointment_id = notification.related_appointment_id;
        let recipient = notification.recipient_id.clone();
        match self.tx.send(notification) {
            Ok(receivers) => debug!(
                %appointment_id,
                %recipient,
                receivers,
                "Notification dispatched"
            ),
            Err(_) => debug!(
                %appointment_id,
                %recipient,
                "No notification subscribers, dropping notification"
            ),
        }
    }
}
