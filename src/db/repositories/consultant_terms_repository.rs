use async_trait::async_trait;
use sqlx::PgPool;

use super::ConsultantTermsStore;
use crate::db::{ConsultantTerms, DatabaseError, UpdateConsultantTerms};

pub struct ConsultantTermsRepository {
    pool: PgPool,
}

impl ConsultantTermsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConsultantTermsStore for ConsultantTermsRepository {
    async fn get(&self, consultant_id: &str) -> Result<Option<ConsultantTerms>, DatabaseError> {
        let terms = sqlx::query_as::<_, ConsultantTerms>(
            r#"
            SELECT consultant_id, hourly_rate, consultation_modes, updated_at
            FROM consultant_terms
            WHERE consultant_id = $1
            "#,
        )
        .bind(consultant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(terms)
    }

    async fn set(
        &self,
        consultant_id: &str,
        terms: &UpdateConsultantTerms,
    ) -> Result<ConsultantTerms, DatabaseError> {
        let terms = sqlx::query_as::<_, ConsultantTerms>(
            r#"
            INSERT INTO consultant_terms (consultant_id, hourly_rate, consultation_modes)
            VALUES ($1, $2, $3)
            ON CONFLICT (consultant_id) DO UPDATE
            SET
                hourly_rate = EXCLUDED.hourly_rate,
                consultation_modes = EXCLUDED.consultation_modes,
                updated_at = NOW()
            RETURNING consultant_id, hourly_rate, consultation_modes, updated_at
            "#,
        )
        .bind(consultant_id)
        .bind(terms.hourly_rate)
        .bind(&terms.consultation_modes)
        .fetch_one(&self.pool)
        .await?;

        Ok(terms)
    }
}
