use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::api::dtos::requests::{CheckNameQuery, ScheduleQuery};
use crate::api::dtos::responses::{NameAvailabilityResponse, StatusResponse};
use crate::api::extractors::identity::AdminUser;
use crate::domain::models::page::PageRequest;
use crate::domain::models::venue::NewVenue;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;

pub async fn list_venues(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let venues = state.venue_service.list(page).await?;
    Ok(Json(venues))
}

pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let venue = state.venue_service.require(venue_id).await?;
    Ok(Json(venue))
}

pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<i64>,
    Query(query): Query<ScheduleQuery>,
) -> Result<impl IntoResponse, AppError> {
    let venue = state.venue_service.require(venue_id).await?;
    let schedule = state.scheduler.day_schedule(venue, query.date).await?;
    Ok(Json(schedule))
}

pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<NewVenue>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.venue_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_venue(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(venue_id): Path<i64>,
    Json(payload): Json<NewVenue>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.venue_service.update(venue_id, payload).await?;
    Ok(Json(updated))
}

pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(venue_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.venue_service.delete(venue_id).await?;
    Ok(Json(StatusResponse::new("deleted")))
}

pub async fn check_name(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<CheckNameQuery>,
) -> Result<impl IntoResponse, AppError> {
    let available = state.venue_service.is_name_available(&query.name).await?;
    Ok(Json(NameAvailabilityResponse { name: query.name, available }))
}
