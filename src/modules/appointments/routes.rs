use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{
    cancel_appointment, complete_appointment, create_appointment, get_appointment,
    list_appointments, reschedule_appointment,
};
use crate::app_state::AppState;

pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_appointment).get(list_appointments))
        .route("/{id}", get(get_appointment))
        .route("/{id}/cancel", post(cancel_appointment))
        .route("/{id}/reschedule", post(reschedule_appointment))
        .route("/{id}/complete", post(complete_appointment))
}
