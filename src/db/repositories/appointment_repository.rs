use async_trait::async_trait;
use sqlx::types::Uuid;
use sqlx::{PgPool, Postgres};
use time::{Date, PrimitiveDateTime};

use super::AppointmentStore;
use crate::db::{Appointment, DatabaseError, NewAppointment};
use crate::scheduling::Transition;

pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentStore for AppointmentRepository {
    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment, DatabaseError> {
        // The partial unique index rejects a second live booking of the same
        // slot inside this single statement.
        let created = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (
                id, client_id, consultant_id, appointment_date, slot_time,
                duration_minutes, mode, amount, payment_method, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(appointment.id)
        .bind(&appointment.client_id)
        .bind(&appointment.consultant_id)
        .bind(appointment.date)
        .bind(&appointment.time)
        .bind(appointment.duration_minutes)
        .bind(&appointment.mode)
        .bind(appointment.amount)
        .bind(&appointment.payment_method)
        .bind(&appointment.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        let appointment = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(appointment)
    }

    async fn list_for_consultant(
        &self,
        consultant_id: &str,
        from: Date,
        until: Date,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE consultant_id = $1 AND appointment_date BETWEEN $2 AND $3
            ORDER BY appointment_date, slot_time, created_at
            "#,
        )
        .bind(consultant_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    async fn list_for_participant(&self, user_id: &str) -> Result<Vec<Appointment>, DatabaseError> {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE client_id = $1 OR consultant_id = $1
            ORDER BY appointment_date, slot_time, created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    async fn apply(
        &self,
        id: Uuid,
        transition: &Transition,
    ) -> Result<Option<Appointment>, DatabaseError> {
        let query = match transition {
            Transition::Cancel { actor, reason } => sqlx::query_as::<Postgres, Appointment>(
                r#"
                UPDATE appointments
                SET
                    status = 'cancelled',
                    cancelled_by = $2,
                    cancellation_reason = $3,
                    updated_at = NOW()
                WHERE id = $1 AND status = 'upcoming'
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(*actor)
            .bind(reason.as_deref()),
            // Moving onto a held slot trips the occupied-slot index and fails atomically.
            Transition::Reschedule {
                actor,
                date,
                time,
                reason,
            } => sqlx::query_as::<Postgres, Appointment>(
                r#"
                UPDATE appointments
                SET
                    appointment_date = $2,
                    slot_time = $3,
                    rescheduled_by = $4,
                    reschedule_reason = $5,
                    updated_at = NOW()
                WHERE id = $1 AND status = 'upcoming'
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(*date)
            .bind(time.as_str())
            .bind(*actor)
            .bind(reason.as_deref()),
            Transition::Complete => sqlx::query_as::<Postgres, Appointment>(
                r#"
                UPDATE appointments
                SET status = 'completed', updated_at = NOW()
                WHERE id = $1 AND status = 'upcoming'
                RETURNING *
                "#,
            )
            .bind(id),
        };

        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn complete_elapsed(&self, now: PrimitiveDateTime) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET status = 'completed', updated_at = NOW()
            WHERE status = 'upcoming'
              AND appointment_date + slot_time::time + make_interval(mins => duration_minutes) <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
