mod appointment_repository;
mod availability_repository;
mod consultant_terms_repository;
mod memory;

pub use appointment_repository::AppointmentRepository;
pub use availability_repository::AvailabilityRepository;
pub use consultant_terms_repository::ConsultantTermsRepository;
pub use memory::MemoryStore;

use async_trait::async_trait;
use sqlx::types::Uuid;
use time::{Date, PrimitiveDateTime};

use crate::db::{
    Appointment, ConsultantTerms, DatabaseError, NewAppointment, UpdateConsultantTerms,
    WeeklyAvailability,
};
use crate::scheduling::Transition;

#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Complete 7-day template; weekdays without a stored row are defaulted.
    async fn get(&self, consultant_id: &str) -> Result<WeeklyAvailability, DatabaseError>;

    /// Upserts every weekday present in `availability` in one transaction.
    async fn set(
        &self,
        consultant_id: &str,
        availability: &WeeklyAvailability,
    ) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Fails with [`DatabaseError::Duplicate`] on the occupied-slot constraint
    /// when a live appointment already holds the (consultant, date, time).
    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment, DatabaseError>;

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError>;

    /// Appointments of every status for a consultant between two dates, inclusive.
    async fn list_for_consultant(
        &self,
        consultant_id: &str,
        from: Date,
        until: Date,
    ) -> Result<Vec<Appointment>, DatabaseError>;

    /// Appointments where `user_id` is the client or the consultant.
    async fn list_for_participant(&self, user_id: &str) -> Result<Vec<Appointment>, DatabaseError>;

    /// Applies `transition` if the appointment is still upcoming. Returns
    /// `None` when no upcoming appointment with this id exists.
    async fn apply(
        &self,
        id: Uuid,
        transition: &Transition,
    ) -> Result<Option<Appointment>, DatabaseError>;

    /// Marks upcoming appointments that ended at or before `now` as completed.
    async fn complete_elapsed(&self, now: PrimitiveDateTime) -> Result<u64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait ConsultantTermsStore: Send + Sync {
    async fn get(&self, consultant_id: &str) -> Result<Option<ConsultantTerms>, DatabaseError>;

    async fn set(
        &self,
        consultant_id: &str,
        terms: &UpdateConsultantTerms,
    ) -> Result<ConsultantTerms, DatabaseError>;
}
