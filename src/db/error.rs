use thiserror::Error;

/// Constraint that keeps a consultant's (date, time) held by one live appointment.
pub const OCCUPIED_SLOT_CONSTRAINT: &str = "appointments_occupied_slot_idx";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Database connection error: {0}")]
    ConnectionError(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                let constraint = db_err.constraint().unwrap_or("unique constraint").to_string();
                DatabaseError::Duplicate(constraint)
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionError(err.to_string())
            }
            other => DatabaseError::Sqlx(other),
        }
    }
}

impl DatabaseError {
    /// True when the write lost a race for an already occupied slot.
    pub fn is_slot_conflict(&self) -> bool {
        matches!(self, DatabaseError::Duplicate(constraint) if constraint == OCCUPIED_SLOT_CONSTRAINT)
    }
}
