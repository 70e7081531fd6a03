use thiserror::Error;
use validator::ValidationErrors;

use crate::db::{AppointmentStatus, DatabaseError};

#[derive(Debug, Error)]
pub enum SchedulingError {
    /// The caller can fix the request and try again.
    #[error("{0}")]
    Validation(String),

    /// Another request claimed the slot first; the caller must pick a different one.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("cannot {action} an appointment that is {from}")]
    InvalidTransition {
        action: &'static str,
        from: AppointmentStatus,
    },

    #[error("storage failure: {0}")]
    Storage(#[from] DatabaseError),
}

impl SchedulingError {
    pub fn validation(message: impl Into<String>) -> Self {
        SchedulingError::Validation(message.into())
    }
}

impl From<ValidationErrors> for SchedulingError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid ({})", field, error.code),
                })
            })
            .collect();
        messages.sort();
        SchedulingError::Validation(messages.join("; "))
    }
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;
