use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::app_state::AppState;
use crate::db::{ConsultantTerms, UpdateConsultantTerms, WeeklyAvailability};
use crate::error::AppResult;
use crate::identity::Identity;
use crate::scheduling::{SlotCheck, SlotView};

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Date,
}

#[derive(Debug, Deserialize)]
pub struct SlotCheckQuery {
    pub date: Date,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct BookableDatesQuery {
    pub from: Option<Date>,
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlotsResponse {
    pub consultant_id: String,
    pub date: Date,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookableDatesResponse {
    pub consultant_id: String,
    pub dates: Vec<Date>,
}

/// Weekly template with every weekday present
pub async fn get_availability(
    State(state): State<AppState>,
    Path(consultant_id): Path<String>,
) -> AppResult<Json<WeeklyAvailability>> {
    Ok(Json(state.scheduler.get_availability(&consultant_id).await?))
}

/// Replace the template for the weekdays in the body
pub async fn put_availability(
    State(state): State<AppState>,
    identity: Identity,
    Path(consultant_id): Path<String>,
    Json(availability): Json<WeeklyAvailability>,
) -> AppResult<Json<WeeklyAvailability>> {
    identity.require_consultant(&consultant_id)?;
    let stored = state
        .scheduler
        .set_availability(&consultant_id, &availability)
        .await?;
    Ok(Json(stored))
}

pub async fn get_terms(
    State(state): State<AppState>,
    Path(consultant_id): Path<String>,
) -> AppResult<Json<ConsultantTerms>> {
    Ok(Json(state.scheduler.get_terms(&consultant_id).await?))
}

pub async fn put_terms(
    State(state): State<AppState>,
    identity: Identity,
    Path(consultant_id): Path<String>,
    Json(terms): Json<UpdateConsultantTerms>,
) -> AppResult<Json<ConsultantTerms>> {
    identity.require_consultant(&consultant_id)?;
    Ok(Json(state.scheduler.set_terms(&consultant_id, &terms).await?))
}

/// Slots offered on one date, each marked booked or free
pub async fn get_day_slots(
    State(state): State<AppState>,
    Path(consultant_id): Path<String>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<DaySlotsResponse>> {
    let slots = state.scheduler.resolve_day(&consultant_id, query.date).await?;
    Ok(Json(DaySlotsResponse {
        consultant_id,
        date: query.date,
        slots,
    }))
}

pub async fn check_slot(
    State(state): State<AppState>,
    Path(consultant_id): Path<String>,
    Query(query): Query<SlotCheckQuery>,
) -> AppResult<Json<SlotCheck>> {
    let check = state
        .scheduler
        .check_slot(&consultant_id, query.date, query.time.trim())
        .await?;
    Ok(Json(check))
}

/// Upcoming dates with at least one free slot, for date pickers
pub async fn get_bookable_dates(
    State(state): State<AppState>,
    Path(consultant_id): Path<String>,
    Query(query): Query<BookableDatesQuery>,
) -> AppResult<Json<BookableDatesResponse>> {
    let from = query.from.unwrap_or_else(|| state.scheduler.today());
    let dates = state
        .scheduler
        .bookable_dates(&consultant_id, from, query.days.unwrap_or(30))
        .await?;
    Ok(Json(BookableDatesResponse {
        consultant_id,
        dates,
    }))
}
