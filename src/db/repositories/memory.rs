use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use sqlx::types::Uuid;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};
use tokio::sync::Mutex;
use tracing::warn;

use super::{AppointmentStore, AvailabilityStore, ConsultantTermsStore};
use crate::db::{
    Appointment, AppointmentStatus, AvailabilityTemplateRow, ConsultantTerms, DatabaseError,
    DayOfWeek, NewAppointment, PaymentStatus, UpdateConsultantTerms, WeeklyAvailability,
    OCCUPIED_SLOT_CONSTRAINT,
};
use crate::scheduling::Transition;
use crate::scheduling::slots::parse_slot_time;

#[derive(Default)]
struct MemoryState {
    templates: HashMap<String, BTreeMap<DayOfWeek, AvailabilityTemplateRow>>,
    appointments: Vec<Appointment>,
    terms: HashMap<String, ConsultantTerms>,
}

impl MemoryState {
    fn slot_taken(&self, consultant_id: &str, date: Date, time: &str, except: Option<Uuid>) -> bool {
        self.appointments.iter().any(|a| {
            Some(a.id) != except && a.consultant_id == consultant_id && a.occupies(date, time)
        })
    }
}

/// Process-local store with the same guarantees as the PostgreSQL
/// repositories. Every check-and-write happens under one lock.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by(|a, b| {
        (a.date, &a.time, a.created_at).cmp(&(b.date, &b.time, b.created_at))
    });
    appointments
}

#[async_trait]
impl AvailabilityStore for MemoryStore {
    async fn get(&self, consultant_id: &str) -> Result<WeeklyAvailability, DatabaseError> {
        let state = self.state.lock().await;
        let rows = state
            .templates
            .get(consultant_id)
            .map(|days| days.values().cloned().collect::<Vec<_>>())
            .unwrap_or_default();

        Ok(WeeklyAvailability::with_defaults(
            rows.into_iter().map(AvailabilityTemplateRow::into_entry),
        ))
    }

    async fn set(
        &self,
        consultant_id: &str,
        availability: &WeeklyAvailability,
    ) -> Result<(), DatabaseError> {
        let mut state = self.state.lock().await;
        let now = OffsetDateTime::now_utc();
        let days = state.templates.entry(consultant_id.to_string()).or_default();

        for (day, schedule) in availability.iter() {
            days.entry(day)
                .and_modify(|row| {
                    row.enabled = schedule.enabled;
                    row.time_slots = schedule.time_slots.clone();
                    row.updated_at = now;
                })
                .or_insert_with(|| AvailabilityTemplateRow {
                    consultant_id: consultant_id.to_string(),
                    day_of_week: day,
                    enabled: schedule.enabled,
                    time_slots: schedule.time_slots.clone(),
                    created_at: now,
                    updated_at: now,
                });
        }

        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment, DatabaseError> {
        let mut state = self.state.lock().await;

        if state.appointments.iter().any(|a| a.id == appointment.id) {
            return Err(DatabaseError::Duplicate("appointments_pkey".to_string()));
        }
        if state.slot_taken(&appointment.consultant_id, appointment.date, &appointment.time, None) {
            return Err(DatabaseError::Duplicate(OCCUPIED_SLOT_CONSTRAINT.to_string()));
        }

        let now = OffsetDateTime::now_utc();
        let created = Appointment {
            id: appointment.id,
            client_id: appointment.client_id.clone(),
            consultant_id: appointment.consultant_id.clone(),
            date: appointment.date,
            time: appointment.time.clone(),
            duration_minutes: appointment.duration_minutes,
            mode: appointment.mode.clone(),
            amount: appointment.amount,
            status: AppointmentStatus::Upcoming,
            payment_status: PaymentStatus::Pending,
            payment_method: appointment.payment_method.clone(),
            notes: appointment.notes.clone(),
            reschedule_reason: None,
            rescheduled_by: None,
            cancellation_reason: None,
            cancelled_by: None,
            created_at: now,
            updated_at: now,
        };
        state.appointments.push(created.clone());

        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        let state = self.state.lock().await;
        Ok(state.appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn list_for_consultant(
        &self,
        consultant_id: &str,
        from: Date,
        until: Date,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let state = self.state.lock().await;
        Ok(sorted(
            state
                .appointments
                .iter()
                .filter(|a| a.consultant_id == consultant_id && a.date >= from && a.date <= until)
                .cloned()
                .collect(),
        ))
    }

    async fn list_for_participant(&self, user_id: &str) -> Result<Vec<Appointment>, DatabaseError> {
        let state = self.state.lock().await;
        Ok(sorted(
            state
                .appointments
                .iter()
                .filter(|a| a.client_id == user_id || a.consultant_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn apply(
        &self,
        id: Uuid,
        transition: &Transition,
    ) -> Result<Option<Appointment>, DatabaseError> {
        let mut state = self.state.lock().await;

        let Some(index) = state
            .appointments
            .iter()
            .position(|a| a.id == id && a.status == AppointmentStatus::Upcoming)
        else {
            return Ok(None);
        };

        if let Transition::Reschedule { date, time, .. } = transition {
            let consultant_id = state.appointments[index].consultant_id.clone();
            if state.slot_taken(&consultant_id, *date, time, Some(id)) {
                return Err(DatabaseError::Duplicate(OCCUPIED_SLOT_CONSTRAINT.to_string()));
            }
        }

        let appointment = &mut state.appointments[index];
        transition.apply_to(appointment, OffsetDateTime::now_utc());
        Ok(Some(appointment.clone()))
    }

    async fn complete_elapsed(&self, now: PrimitiveDateTime) -> Result<u64, DatabaseError> {
        let mut state = self.state.lock().await;
        let mut completed = 0;

        for appointment in state
            .appointments
            .iter_mut()
            .filter(|a| a.status == AppointmentStatus::Upcoming)
        {
            let Some(start) = parse_slot_time(&appointment.time) else {
                continue;
            };
            let Some(ends_at) = PrimitiveDateTime::new(appointment.date, start)
                .checked_add(Duration::minutes(i64::from(appointment.duration_minutes)))
            else {
                warn!(appointment_id = %appointment.id, "Session end is out of range, skipping");
                continue;
            };
            if ends_at <= now {
                Transition::Complete.apply_to(appointment, OffsetDateTime::now_utc());
                completed += 1;
            }
        }

        Ok(completed)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl ConsultantTermsStore for MemoryStore {
    async fn get(&self, consultant_id: &str) -> Result<Option<ConsultantTerms>, DatabaseError> {
        let state = self.state.lock().await;
        Ok(state.terms.get(consultant_id).cloned())
    }

    async fn set(
        &self,
        consultant_id: &str,
        terms: &UpdateConsultantTerms,
    ) -> Result<ConsultantTerms, DatabaseError> {
        let mut state = self.state.lock().await;
        let stored = ConsultantTerms {
            consultant_id: consultant_id.to_string(),
            hourly_rate: terms.hourly_rate,
            consultation_modes: terms.consultation_modes.clone(),
            updated_at: OffsetDateTime::now_utc(),
        };
        state.terms.insert(consultant_id.to_string(), stored.clone());
        Ok(stored)
    }
}
