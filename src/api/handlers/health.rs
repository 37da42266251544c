use axum::{response::IntoResponse, Json};
use crate::api::dtos::responses::StatusResponse;

pub async fn health_check() -> impl IntoResponse {
    Json(StatusResponse::new("ok"))
}
