use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::types::Uuid;

use crate::app_state::AppState;
use crate::db::{Actor, Appointment, BookingRequest, CancelRequest, RescheduleRequest};
use crate::error::AppResult;
use crate::identity::Identity;

/// Book a slot for the calling client
pub async fn create_appointment(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<BookingRequest>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    identity.require_role(Actor::Client)?;
    let appointment = state.scheduler.book(&identity.user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn list_appointments(
    State(state): State<AppState>,
    identity: Identity,
) -> AppResult<Json<Vec<Appointment>>> {
    Ok(Json(state.scheduler.list_appointments(&identity.user_id).await?))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(state.scheduler.get_appointment(id, &identity.user_id).await?))
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    request: Option<Json<CancelRequest>>,
) -> AppResult<Json<Appointment>> {
    let reason = request.and_then(|Json(body)| body.reason);
    Ok(Json(state.scheduler.cancel(id, &identity.user_id, reason).await?))
}

pub async fn reschedule_appointment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(state.scheduler.reschedule(id, &identity.user_id, &request).await?))
}

pub async fn complete_appointment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    identity.require_role(Actor::Consultant)?;
    Ok(Json(state.scheduler.complete(id, &identity.user_id).await?))
}
