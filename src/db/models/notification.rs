use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;

use super::Actor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    BookingCancelled,
    BookingRescheduled,
}

/// Fire-and-forget message to the other party of an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub recipient_id: String,
    pub recipient_role: Actor,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
    pub related_appointment_id: Uuid,
}
