use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, moderation, order, venue};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public catalog
        .route("/api/v1/venues", get(venue::list_venues))
        .route("/api/v1/venues/{venue_id}", get(venue::get_venue))
        .route("/api/v1/venues/{venue_id}/schedule", get(venue::get_schedule))

        // Customer orders
        .route("/api/v1/orders", post(order::submit_order).get(order::list_my_orders))
        .route("/api/v1/orders/{order_id}", get(order::get_order).put(order::modify_order).delete(order::cancel_order))
        .route("/api/v1/orders/{order_id}/finish", post(order::finish_order))

        // Moderation
        .route("/api/v1/admin/orders/pending", get(moderation::list_pending))
        .route("/api/v1/admin/orders/audited", get(moderation::list_audited))
        .route("/api/v1/admin/orders/{order_id}/approve", post(moderation::approve_order))
        .route("/api/v1/admin/orders/{order_id}/reject", post(moderation::reject_order))
        .route("/api/v1/admin/orders/{order_id}", delete(moderation::delete_order))

        // Venue administration
        .route("/api/v1/admin/venues", post(venue::create_venue))
        .route("/api/v1/admin/venues/check-name", get(venue::check_name))
        .route("/api/v1/admin/venues/{venue_id}", put(venue::update_venue).delete(venue::delete_venue))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
