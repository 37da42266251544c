use crate::domain::models::{
    order::{Order, OrderState},
    page::{Page, PageRequest},
    venue::Venue,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait VenueRepository: Send + Sync {
    async fn create(&self, venue: &Venue) -> Result<Venue, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Venue>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Venue>, AppError>;
    async fn count_by_name(&self, name: &str) -> Result<i64, AppError>;
    async fn list(&self, page: PageRequest) -> Result<Page<Venue>, AppError>;
    async fn list_all(&self) -> Result<Vec<Venue>, AppError>;
    async fn update(&self, venue: &Venue) -> Result<Venue, AppError>;
    /// Deletes the venue unless an active order still references it.
    async fn delete_if_idle(&self, id: i64) -> Result<(), AppError>;
}

/// Persistent order store. The write methods that take a slot are atomic
/// check-then-write units serialised per venue.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts the order unless an active order of the same venue overlaps it.
    async fn insert_if_free(&self, order: &Order) -> Result<Order, AppError>;
    /// Rewrites the order unless it left `expected` meanwhile or its new slot
    /// overlaps another active order of the target venue.
    async fn update_if_free(&self, order: &Order, expected: OrderState) -> Result<Order, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, AppError>;
    /// Active orders of the venue whose `[start, end)` intersects the given range.
    async fn find_overlapping(
        &self,
        venue_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<i64>,
    ) -> Result<Vec<Order>, AppError>;
    /// Orders of the venue starting within `[start, end)`, any state.
    async fn find_by_start_range(&self, venue_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Order>, AppError>;
    async fn find_by_user(&self, user_id: &str, page: PageRequest) -> Result<Page<Order>, AppError>;
    async fn find_by_state(&self, state: OrderState, page: PageRequest) -> Result<Page<Order>, AppError>;
    async fn find_by_states(&self, states: &[OrderState]) -> Result<Vec<Order>, AppError>;
    /// Compare-and-set on the state column; `false` when the order is missing or not in `from`.
    async fn transition_state(&self, id: i64, from: OrderState, to: OrderState) -> Result<bool, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
    /// Deletes the order only while it is still PENDING or APPROVED.
    async fn delete_active(&self, id: i64) -> Result<bool, AppError>;
}
