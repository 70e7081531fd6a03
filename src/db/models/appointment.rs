use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use std::fmt;
use time::{Date, OffsetDateTime};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Whether an appointment in this status holds its (date, time) slot.
    /// Every availability check goes through this predicate.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Upcoming => "upcoming",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

/// Which side of an appointment performed a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "appointment_actor", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Client,
    Consultant,
}

impl Actor {
    pub fn counterparty(&self) -> Actor {
        match self {
            Actor::Client => Actor::Consultant,
            Actor::Consultant => Actor::Client,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Actor::Client => "client",
            Actor::Consultant => "consultant",
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: String,
    pub consultant_id: String,
    #[sqlx(rename = "appointment_date")]
    pub date: Date,
    #[sqlx(rename = "slot_time")]
    pub time: String,
    #[sqlx(rename = "duration_minutes")]
    #[serde(rename = "duration")]
    pub duration_minutes: i32,
    pub mode: String,
    pub amount: Decimal,
    pub status: AppointmentStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub notes: Option<String>,
    pub reschedule_reason: Option<String>,
    pub rescheduled_by: Option<Actor>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<Actor>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Appointment {
    pub fn occupies(&self, date: Date, time: &str) -> bool {
        self.status.occupies_slot() && self.date == date && self.time == time
    }

    pub fn party(&self, user_id: &str) -> Option<Actor> {
        if self.client_id == user_id {
            Some(Actor::Client)
        } else if self.consultant_id == user_id {
            Some(Actor::Consultant)
        } else {
            None
        }
    }

    pub fn participant(&self, actor: Actor) -> &str {
        match actor {
            Actor::Client => &self.client_id,
            Actor::Consultant => &self.consultant_id,
        }
    }
}

/// Booking request as submitted by a client.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[validate(length(min = 1, message = "Consultant is required"))]
    pub consultant_id: String,
    #[validate(required(message = "Date is required"))]
    pub date: Option<Date>,
    #[validate(required(message = "Time is required"))]
    pub time: Option<String>,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration: i32,
    #[validate(required(message = "Consultation mode is required"))]
    pub mode: Option<String>,
    #[validate(required(message = "Payment method is required"))]
    pub payment_method: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Fully validated appointment ready to be written.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub id: Uuid,
    pub client_id: String,
    pub consultant_id: String,
    pub date: Date,
    pub time: String,
    pub duration_minutes: i32,
    pub mode: String,
    pub amount: Decimal,
    pub payment_method: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub date: Date,
    #[validate(length(min = 1, message = "Time is required"))]
    pub time: String,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}
