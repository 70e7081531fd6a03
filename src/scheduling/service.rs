use std::sync::Arc;

use serde::Serialize;
use sqlx::types::Uuid;
use time::{Date, Duration};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::db::{
    Appointment, AppointmentStore, AvailabilityStore, BookingRequest, CancelRequest, ConsultantTerms,
    ConsultantTermsStore, NewAppointment, RescheduleRequest, UpdateConsultantTerms,
    WeeklyAvailability, max_money,
};
use crate::notifications::NotificationDispatcher;
use crate::scheduling::clock::Clock;
use crate::scheduling::resolver::{self, SlotView, MAX_LOOKAHEAD_DAYS};
use crate::scheduling::slots::{validate_slot_time, validate_template};
use crate::scheduling::{SchedulingError, SchedulingResult, Transition};

/// Answer to "can this slot be booked right now?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCheck {
    pub bookable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Booking, availability and appointment lifecycle operations.
#[derive(Clone)]
pub struct SchedulingService {
    availability: Arc<dyn AvailabilityStore>,
    appointments: Arc<dyn AppointmentStore>,
    terms: Arc<dyn ConsultantTermsStore>,
    notifier: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
}

fn required<'a>(value: &'a Option<String>, what: &str) -> SchedulingResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SchedulingError::validation(format!("{} is required", what)))
}

impl SchedulingService {
    pub fn new(
        availability: Arc<dyn AvailabilityStore>,
        appointments: Arc<dyn AppointmentStore>,
        terms: Arc<dyn ConsultantTermsStore>,
        notifier: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            availability,
            appointments,
            terms,
            notifier,
            clock,
        }
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    pub async fn get_availability(&self, consultant_id: &str) -> SchedulingResult<WeeklyAvailability> {
        Ok(self.availability.get(consultant_id).await?)
    }

    #[instrument(skip(self, availability), fields(days = availability.len()))]
    pub async fn set_availability(
        &self,
        consultant_id: &str,
        availability: &WeeklyAvailability,
    ) -> SchedulingResult<WeeklyAvailability> {
        validate_template(availability)?;
        self.availability.set(consultant_id, availability).await?;

        // Public schedule views key their caches off this event.
        info!(consultant_id, "Availability template updated");
        Ok(self.availability.get(consultant_id).await?)
    }

    pub async fn get_terms(&self, consultant_id: &str) -> SchedulingResult<ConsultantTerms> {
        self.terms
            .get(consultant_id)
            .await?
            .ok_or_else(|| SchedulingError::NotFound(format!("No booking terms for consultant {}", consultant_id)))
    }

    pub async fn set_terms(
        &self,
        consultant_id: &str,
        terms: &UpdateConsultantTerms,
    ) -> SchedulingResult<ConsultantTerms> {
        terms.validate()?;
        if terms.hourly_rate.is_sign_negative() {
            return Err(SchedulingError::validation("Hourly rate cannot be negative"));
        }
        if terms.hourly_rate.round_dp(2) != terms.hourly_rate || terms.hourly_rate > max_money() {
            return Err(SchedulingError::validation(format!(
                "Hourly rate must have at most two decimals and not exceed {}",
                max_money()
            )));
        }
        if terms.consultation_modes.iter().any(|m| m.trim().is_empty()) {
            return Err(SchedulingError::validation("Consultation modes cannot be blank"));
        }

        let stored = self.terms.set(consultant_id, terms).await?;
        info!(consultant_id, hourly_rate = %stored.hourly_rate, "Consultant terms updated");
        Ok(stored)
    }

    async fn day_appointments(&self, consultant_id: &str, date: Date) -> SchedulingResult<Vec<Appointment>> {
        Ok(self.appointments.list_for_consultant(consultant_id, date, date).await?)
    }

    pub async fn resolve_day(&self, consultant_id: &str, date: Date) -> SchedulingResult<Vec<SlotView>> {
        let template = self.availability.get(consultant_id).await?;
        let booked = self.day_appointments(consultant_id, date).await?;
        Ok(resolver::resolve_day(consultant_id, date, &template, &booked))
    }

    /// Slot membership, occupancy and the past-date rule in one answer.
    pub async fn check_slot(&self, consultant_id: &str, date: Date, time: &str) -> SchedulingResult<SlotCheck> {
        if resolver::is_past(date, self.today()) {
            return Ok(SlotCheck {
                bookable: false,
                reason: Some(format!("{} is in the past", date)),
            });
        }

        let template = self.availability.get(consultant_id).await?;
        let booked = self.day_appointments(consultant_id, date).await?;
        Ok(match resolver::check_slot(consultant_id, date, time, &template, &booked) {
            Ok(()) => SlotCheck {
                bookable: true,
                reason: None,
            },
            Err(rejection) => SlotCheck {
                bookable: false,
                reason: Some(rejection.to_string()),
            },
        })
    }

    pub async fn is_bookable(&self, consultant_id: &str, date: Date, time: &str) -> SchedulingResult<bool> {
        Ok(self.check_slot(consultant_id, date, time).await?.bookable)
    }

    pub async fn bookable_dates(&self, consultant_id: &str, from: Date, days: u32) -> SchedulingResult<Vec<Date>> {
        let days = days.min(MAX_LOOKAHEAD_DAYS);
        if days == 0 {
            return Ok(Vec::new());
        }
        let until = from
            .checked_add(Duration::days(i64::from(days) - 1))
            .unwrap_or(Date::MAX);

        let template = self.availability.get(consultant_id).await?;
        let booked = self.appointments.list_for_consultant(consultant_id, from, until).await?;
        Ok(resolver::bookable_dates(
            consultant_id,
            &template,
            &booked,
            from,
            days,
            self.today(),
        ))
    }

    /// Validates the requested slot against the template and current
    /// bookings, then writes it. The write itself rejects the slot if a
    /// concurrent request took it after validation.
    #[instrument(skip(self, request), fields(consultant_id = %request.consultant_id))]
    pub async fn book(&self, client_id: &str, request: &BookingRequest) -> SchedulingResult<Appointment> {
        request.validate()?;
        let date = request
            .date
            .ok_or_else(|| SchedulingError::validation("Date is required"))?;
        let time = required(&request.time, "Time")?;
        let mode = required(&request.mode, "Consultation mode")?;
        let payment_method = required(&request.payment_method, "Payment method")?;
        let consultant_id = request.consultant_id.trim();

        if consultant_id == client_id {
            return Err(SchedulingError::validation("You cannot book an appointment with yourself"));
        }
        validate_slot_time(time)?;
        if resolver::is_past(date, self.today()) {
            return Err(SchedulingError::validation(format!("{} is in the past", date)));
        }

        let terms = self.get_terms(consultant_id).await?;
        if !terms.offers_mode(mode) {
            return Err(SchedulingError::validation(format!(
                "The consultant does not offer '{}' consultations",
                mode
            )));
        }

        let template = self.availability.get(consultant_id).await?;
        let booked = self.day_appointments(consultant_id, date).await?;
        resolver::check_slot(consultant_id, date, time, &template, &booked)
            .map_err(|rejection| SchedulingError::validation(rejection.to_string()))?;

        let amount = terms.amount_for(request.duration).ok_or_else(|| {
            SchedulingError::validation("The price of this booking is too large; choose a shorter duration")
        })?;

        let new_appointment = NewAppointment {
            id: Uuid::now_v7(),
            client_id: client_id.to_string(),
            consultant_id: consultant_id.to_string(),
            date,
            time: time.to_string(),
            duration_minutes: request.duration,
            mode: mode.to_string(),
            amount,
            payment_method: payment_method.to_string(),
            notes: request.notes.clone().filter(|n| !n.trim().is_empty()),
        };

        let appointment = self.appointments.insert(&new_appointment).await.map_err(|err| {
            if err.is_slot_conflict() {
                warn!(%date, time, "Booking lost the race for its slot");
                SchedulingError::Conflict(format!(
                    "The slot {} at {} was just booked by someone else. Please choose another time.",
                    date, time
                ))
            } else {
                err.into()
            }
        })?;

        info!(
            appointment_id = %appointment.id,
            client_id,
            %date,
            time,
            amount = %appointment.amount,
            "Appointment booked"
        );
        Ok(appointment)
    }

    /// Loads an appointment the caller takes part in.
    pub async fn get_appointment(&self, id: Uuid, user_id: &str) -> SchedulingResult<Appointment> {
        let appointment = self
            .appointments
            .get(id)
            .await?
            .ok_or_else(|| SchedulingError::NotFound(format!("Appointment {} not found", id)))?;

        if appointment.party(user_id).is_none() {
            return Err(SchedulingError::Forbidden(
                "You are not a participant of this appointment".to_string(),
            ));
        }
        Ok(appointment)
    }

    pub async fn list_appointments(&self, user_id: &str) -> SchedulingResult<Vec<Appointment>> {
        Ok(self.appointments.list_for_participant(user_id).await?)
    }

    pub async fn cancel(&self, id: Uuid, user_id: &str, reason: Option<String>) -> SchedulingResult<Appointment> {
        let request = CancelRequest { reason };
        request.validate()?;
        let reason = request.reason;

        let appointment = self.get_appointment(id, user_id).await?;
        let actor = appointment.party(user_id).ok_or_else(|| {
            SchedulingError::Forbidden("You are not a participant of this appointment".to_string())
        })?;

        self.transition(appointment, Transition::Cancel { actor, reason }).await
    }

    pub async fn reschedule(&self, id: Uuid, user_id: &str, request: &RescheduleRequest) -> SchedulingResult<Appointment> {
        request.validate()?;
        let appointment = self.get_appointment(id, user_id).await?;
        let actor = appointment.party(user_id).ok_or_else(|| {
            SchedulingError::Forbidden("You are not a participant of this appointment".to_string())
        })?;

        let transition = Transition::Reschedule {
            actor,
            date: request.date,
            time: request.time.trim().to_string(),
            reason: request.reason.clone(),
        };
        transition.check(appointment.status)?;

        let time = request.time.trim();
        validate_slot_time(time)?;
        if resolver::is_past(request.date, self.today()) {
            return Err(SchedulingError::validation(format!("{} is in the past", request.date)));
        }
        if appointment.date == request.date && appointment.time == time {
            return Err(SchedulingError::validation(
                "The appointment is already booked for this slot",
            ));
        }

        let template = self.availability.get(&appointment.consultant_id).await?;
        let booked = self.day_appointments(&appointment.consultant_id, request.date).await?;
        resolver::check_slot(&appointment.consultant_id, request.date, time, &template, &booked)
            .map_err(|rejection| SchedulingError::validation(rejection.to_string()))?;

        self.transition(appointment, transition).await
    }

    /// Externally triggered completion, e.g. after the consultant confirms the session.
    pub async fn complete(&self, id: Uuid, user_id: &str) -> SchedulingResult<Appointment> {
        let appointment = self.get_appointment(id, user_id).await?;
        if appointment.consultant_id != user_id {
            return Err(SchedulingError::Forbidden(
                "Only the consultant can complete an appointment".to_string(),
            ));
        }

        self.transition(appointment, Transition::Complete).await
    }

    async fn transition(&self, previous: Appointment, transition: Transition) -> SchedulingResult<Appointment> {
        transition.check(previous.status)?;

        let updated = match self.appointments.apply(previous.id, &transition).await {
            Ok(Some(updated)) => updated,
            // Another request moved it out of `upcoming` since we loaded it.
            Ok(None) => {
                let current = self
                    .appointments
                    .get(previous.id)
                    .await?
                    .map(|a| a.status)
                    .unwrap_or(previous.status);
                return Err(SchedulingError::InvalidTransition {
                    action: transition.action(),
                    from: current,
                });
            }
            Err(err) if err.is_slot_conflict() => {
                return Err(SchedulingError::Conflict(
                    "That slot was just booked by someone else. Please choose another time.".to_string(),
                ));
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            appointment_id = %updated.id,
            action = transition.action(),
            status = %updated.status,
            "Appointment updated"
        );

        if let Some(notification) = transition.notification(&previous) {
            self.notifier.dispatch(notification);
        }

        Ok(updated)
    }

    /// Completes every upcoming appointment whose session has ended.
    pub async fn complete_elapsed(&self) -> SchedulingResult<u64> {
        let completed = self.appointments.complete_elapsed(self.clock.now()).await?;
        if completed > 0 {
            info!(completed, "Marked elapsed appointments as completed");
        } else {
            debug!("No elapsed appointments to complete");
        }
        Ok(completed)
    }

    pub async fn storage_healthy(&self) -> bool {
        match self.appointments.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Storage health check failed: {}", e);
                false
            }
        }
    }
}
