use axum::{Router, routing::get};

use super::handlers::{
    check_slot, get_availability, get_bookable_dates, get_day_slots, get_terms, put_availability,
    put_terms,
};
use crate::app_state::AppState;

/// Consultant schedule routes, nested under `/consultants`
pub fn availability_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{consultant_id}/availability",
            get(get_availability).put(put_availability),
        )
        .route("/{consultant_id}/terms", get(get_terms).put(put_terms))
        .route("/{consultant_id}/slots", get(get_day_slots))
        .route("/{consultant_id}/slots/check", get(check_slot))
        .route("/{consultant_id}/bookable-dates", get(get_bookable_dates))
}
