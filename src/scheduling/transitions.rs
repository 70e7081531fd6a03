use time::{Date, OffsetDateTime};

use crate::db::{Actor, Appointment, AppointmentStatus, Notification, NotificationType};
use crate::scheduling::{SchedulingError, SchedulingResult};

/// A status or time mutation of an existing appointment.
///
/// Only `upcoming` appointments can move; `completed` and `cancelled` are
/// terminal. Rescheduling keeps the appointment `upcoming` and rewrites its
/// date and time in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Cancel {
        actor: Actor,
        reason: Option<String>,
    },
    Reschedule {
        actor: Actor,
        date: Date,
        time: String,
        reason: Option<String>,
    },
    Complete,
}

impl Transition {
    pub fn action(&self) -> &'static str {
        match self {
            Transition::Cancel { .. } => "cancel",
            Transition::Reschedule { .. } => "reschedule",
            Transition::Complete => "complete",
        }
    }

    pub fn target_status(&self) -> AppointmentStatus {
        match self {
            Transition::Cancel { .. } => AppointmentStatus::Cancelled,
            Transition::Reschedule { .. } => AppointmentStatus::Upcoming,
            Transition::Complete => AppointmentStatus::Completed,
        }
    }

    pub fn check(&self, from: AppointmentStatus) -> SchedulingResult<()> {
        if from.is_terminal() {
            return Err(SchedulingError::InvalidTransition {
                action: self.action(),
                from,
            });
        }
        Ok(())
    }

    /// Applies the mutation to an in-memory record. Callers check the
    /// transition first.
    pub fn apply_to(&self, appointment: &mut Appointment, now: OffsetDateTime) {
        match self {
            Transition::Cancel { actor, reason } => {
                appointment.cancelled_by = Some(*actor);
                appointment.cancellation_reason = reason.clone();
            }
            Transition::Reschedule {
                actor,
                date,
                time,
                reason,
            } => {
                appointment.date = *date;
                appointment.time = time.clone();
                appointment.rescheduled_by = Some(*actor);
                appointment.reschedule_reason = reason.clone();
            }
            Transition::Complete => {}
        }
        appointment.status = self.target_status();
        appointment.updated_at = now;
    }

    /// Message for the other party, sent after the transition is stored.
    /// `previous` is the appointment as it was before the change.
    pub fn notification(&self, previous: &Appointment) -> Option<Notification> {
        let (actor, notification_type, mut message, reason) = match self {
            Transition::Cancel { actor, reason } => (
                *actor,
                NotificationType::BookingCancelled,
                format!(
                    "Your appointment on {} at {} was cancelled by the {}.",
                    previous.date, previous.time, actor
                ),
                reason,
            ),
            Transition::Reschedule {
                actor,
                date,
                time,
                reason,
            } => (
                *actor,
                NotificationType::BookingRescheduled,
                format!(
                    "Your appointment on {} at {} was moved to {} at {} by the {}.",
                    previous.date, previous.time, date, time, actor
                ),
                reason,
            ),
            Transition::Complete => return None,
        };

        if let Some(reason) = reason.as_deref().filter(|r| !r.trim().is_empty()) {
            message.push_str(&format!(" Reason: {}", reason.trim()));
        }

        let recipient_role = actor.counterparty();
        Some(Notification {
            recipient_id: previous.participant(recipient_role).to_string(),
            recipient_role,
            notification_type,
            message,
            related_appointment_id: previous.id,
        })
    }
}
