use async_trait::async_trait;
use sqlx::PgPool;

use super::AvailabilityStore;
use crate::db::{AvailabilityTemplateRow, DatabaseError, WeeklyAvailability};

pub struct AvailabilityRepository {
    pool: PgPool,
}

impl AvailabilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityStore for AvailabilityRepository {
    async fn get(&self, consultant_id: &str) -> Result<WeeklyAvailability, DatabaseError> {
        let rows = sqlx::query_as::<_, AvailabilityTemplateRow>(
            r#"
            SELECT consultant_id, day_of_week, enabled, time_slots, created_at, updated_at
            FROM availability_templates
            WHERE consultant_id = $1
            "#,
        )
        .bind(consultant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(WeeklyAvailability::with_defaults(
            rows.into_iter().map(AvailabilityTemplateRow::into_entry),
        ))
    }

    async fn set(
        &self,
        consultant_id: &str,
        availability: &WeeklyAvailability,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        for (day, schedule) in availability.iter() {
            sqlx::query(
                r#"
                INSERT INTO availability_templates (consultant_id, day_of_week, enabled, time_slots)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (consultant_id, day_of_week) DO UPDATE
                SET
                    enabled = EXCLUDED.enabled,
                    time_slots = EXCLUDED.time_slots,
                    updated_at = NOW()
                "#,
            )
            .bind(consultant_id)
            .bind(day)
            .bind(schedule.enabled)
            .bind(&schedule.time_slots)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
