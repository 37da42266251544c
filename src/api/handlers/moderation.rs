use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use crate::api::dtos::responses::StatusResponse;
use crate::api::extractors::identity::AdminUser;
use crate::domain::models::page::PageRequest;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.scheduler.find_no_audit_order(page).await?;
    let views = state.scheduler.order_view_page(orders).await?;
    Ok(Json(views))
}

pub async fn list_audited(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.scheduler.find_audit_order().await?;
    let views = state.scheduler.order_views(orders).await?;
    Ok(Json(views))
}

pub async fn approve_order(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.scheduler.confirm_order(order_id).await?;
    info!("Order {} approved by {}", order_id, admin.id);
    Ok(Json(StatusResponse::new("approved")))
}

pub async fn reject_order(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.scheduler.reject_order(order_id).await?;
    info!("Order {} rejected by {}", order_id, admin.id);
    Ok(Json(StatusResponse::new("rejected")))
}

pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.scheduler.del_order(order_id).await?;
    Ok(Json(StatusResponse::new("deleted")))
}
