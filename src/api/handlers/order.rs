use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::api::dtos::requests::OrderRequest;
use crate::api::dtos::responses::StatusResponse;
use crate::api::extractors::identity::CurrentUser;
use crate::domain::models::page::PageRequest;
use crate::domain::services::scheduler::ORDER_NOT_FOUND;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

pub async fn submit_order(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(payload): Json<OrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let start_time = payload.start_time(state.scheduler.timezone())?;
    let order = state.scheduler
        .submit(&payload.venue_name, start_time, payload.hours, &user.id)
        .await?;
    let view = state.scheduler.order_view(order.id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_my_orders(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.scheduler.find_user_order(&user.id, page).await?;
    let views = state.scheduler.order_view_page(orders).await?;
    Ok(Json(views))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let view = state.scheduler.order_view(order_id).await?;
    if !user.is_admin && view.order.user_id != user.id {
        return Err(AppError::Forbidden("Order belongs to another user".into()));
    }
    Ok(Json(view))
}

pub async fn modify_order(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(order_id): Path<i64>,
    Json(payload): Json<OrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let start_time = payload.start_time(state.scheduler.timezone())?;
    let order = state.scheduler
        .modify_order(order_id, &payload.venue_name, start_time, payload.hours, &user.id)
        .await?;
    let view = state.scheduler.order_view(order.id).await?;
    Ok(Json(view))
}

pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.scheduler.cancel_order(order_id, &user.id).await?;
    Ok(Json(StatusResponse::new("cancelled")))
}

/// Owners mark their own approved booking as used; admins may do it for anyone.
pub async fn finish_order(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !user.is_admin {
        let order = state.scheduler.find_by_id(order_id).await?
            .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.into()))?;
        if order.user_id != user.id {
            return Err(AppError::Forbidden("Order belongs to another user".into()));
        }
    }

    state.scheduler.finish_order(order_id).await?;
    info!("Order {} finished by {}", order_id, user.id);
    Ok(Json(StatusResponse::new("finished")))
}
