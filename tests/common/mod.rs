#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use consultbook_backend::{
    app_state::AppState,
    config::Config,
    db::{
        Appointment, AppointmentStore, BookingRequest, DatabaseError, DayOfWeek, DaySchedule,
        MemoryStore, NewAppointment, Notification, UpdateConsultantTerms, WeeklyAvailability,
    },
    notifications::NotificationDispatcher,
    scheduling::{FixedClock, SchedulingService, Transition},
};
use rust_decimal::Decimal;
use sqlx::types::Uuid;
use time::{Date, PrimitiveDateTime, macros::datetime};

pub const CONSULTANT: &str = "consultant-1";
pub const CLIENT: &str = "client-1";
pub const OTHER_CLIENT: &str = "client-2";

/// Wednesday before the Monday the scenarios book against.
pub const NOW: PrimitiveDateTime = datetime!(2025-01-15 08:00);

#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn dispatch(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

pub struct Harness {
    pub service: SchedulingService,
    pub notifications: Arc<RecordingDispatcher>,
}

pub fn harness_at(now: PrimitiveDateTime) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let notifications = Arc::new(RecordingDispatcher::default());
    let service = SchedulingService::new(
        store.clone(),
        store.clone(),
        store,
        notifications.clone(),
        Arc::new(FixedClock(now)),
    );
    Harness {
        service,
        notifications,
    }
}

/// Appointment store whose day listings always come back empty, as if read
/// just before a competing write landed. Writes go to the real store.
pub struct StaleReads(pub Arc<MemoryStore>);

#[async_trait]
impl AppointmentStore for StaleReads {
    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment, DatabaseError> {
        self.0.insert(appointment).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        AppointmentStore::get(self.0.as_ref(), id).await
    }

    async fn list_for_consultant(
        &self,
        _consultant_id: &str,
        _from: Date,
        _until: Date,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        Ok(Vec::new())
    }

    async fn list_for_participant(&self, user_id: &str) -> Result<Vec<Appointment>, DatabaseError> {
        self.0.list_for_participant(user_id).await
    }

    async fn apply(
        &self,
        id: Uuid,
        transition: &Transition,
    ) -> Result<Option<Appointment>, DatabaseError> {
        self.0.apply(id, transition).await
    }

    async fn complete_elapsed(&self, now: PrimitiveDateTime) -> Result<u64, DatabaseError> {
        self.0.complete_elapsed(now).await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.0.ping().await
    }
}

/// Service whose pre-write slot checks never see existing bookings, so only
/// the store's occupancy guard stands between two requests.
pub fn stale_harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let notifications = Arc::new(RecordingDispatcher::default());
    let service = SchedulingService::new(
        store.clone(),
        Arc::new(StaleReads(store.clone())),
        store,
        notifications.clone(),
        Arc::new(FixedClock(NOW)),
    );
    Harness {
        service,
        notifications,
    }
}

pub fn harness() -> Harness {
    harness_at(NOW)
}

pub fn day(slots: &[&str]) -> DaySchedule {
    DaySchedule {
        enabled: true,
        time_slots: slots.iter().map(|s| s.to_string()).collect(),
    }
}

/// Monday 09:00/10:00 and Tuesday 10:00/11:00.
pub fn weekly_template() -> WeeklyAvailability {
    WeeklyAvailability::new()
        .with_day(DayOfWeek::Monday, day(&["09:00", "10:00"]))
        .with_day(DayOfWeek::Tuesday, day(&["10:00", "11:00"]))
}

pub async fn seed_consultant(service: &SchedulingService) {
    service
        .set_availability(CONSULTANT, &weekly_template())
        .await
        .unwrap();
    service
        .set_terms(
            CONSULTANT,
            &UpdateConsultantTerms {
                hourly_rate: Decimal::new(12000, 2),
                consultation_modes: vec!["video".to_string(), "phone".to_string()],
            },
        )
        .await
        .unwrap();
}

pub fn booking(date: Date, time: &str) -> BookingRequest {
    BookingRequest {
        consultant_id: CONSULTANT.to_string(),
        date: Some(date),
        time: Some(time.to_string()),
        duration: 60,
        mode: Some("video".to_string()),
        payment_method: Some("card".to_string()),
        notes: None,
    }
}

/// Router over fresh in-memory stores with a fixed clock.
pub fn test_app() -> (axum::Router, AppState) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_stores(
        Config::in_memory(),
        store.clone(),
        store.clone(),
        store,
        Arc::new(FixedClock(NOW)),
    );
    (consultbook_backend::app::create_router(state.clone()), state)
}
