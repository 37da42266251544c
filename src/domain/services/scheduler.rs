use crate::domain::models::order::{BookingSlot, NewOrderParams, Order, OrderState, OrderView};
use crate::domain::models::page::{Page, PageRequest};
use crate::domain::models::venue::Venue;
use crate::domain::ports::{OrderRepository, VenueRepository};
use crate::domain::services::availability::open_slots;
use crate::domain::services::rules::ensure_within_business_hours;
use crate::error::AppError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const ORDER_NOT_FOUND: &str = "订单不存在";
const STATE_CHANGED: &str = "Order state already changed";

/// A venue together with what is booked and still free on one local day.
#[derive(Debug, Serialize)]
pub struct DaySchedule {
    pub venue: Venue,
    pub date: NaiveDate,
    pub orders: Vec<Order>,
    pub open_slots: Vec<DateTime<Utc>>,
}

/// Admission control and lifecycle for venue bookings.
///
/// Every check-then-write runs inside the order store as one atomic unit, so
/// two racing submissions for the same slot cannot both succeed, and state
/// transitions are compare-and-set updates.
pub struct BookingScheduler {
    orders: Arc<dyn OrderRepository>,
    venues: Arc<dyn VenueRepository>,
    tz: Tz,
}

impl BookingScheduler {
    pub fn new(orders: Arc<dyn OrderRepository>, venues: Arc<dyn VenueRepository>, tz: Tz) -> Self {
        Self { orders, venues, tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub async fn submit(
        &self,
        venue_name: &str,
        start_time: DateTime<Utc>,
        hours: i32,
        user_id: &str,
    ) -> Result<Order, AppError> {
        let slot = BookingSlot::new(start_time, hours, Utc::now())?;
        let venue = self.venue_by_name(venue_name).await?;
        ensure_within_business_hours(&venue, &slot, self.tz)?;

        let order = Order::new(NewOrderParams {
            user_id: user_id.to_string(),
            venue: &venue,
            slot,
        })?;

        let created = self.orders.insert_if_free(&order).await.inspect_err(|e| {
            if e.is_conflict() {
                warn!("Booking rejected: venue {} at {} for {}h is taken", venue.name, start_time, hours);
            }
        })?;

        info!("Order {} submitted by {} for venue {} (total {})", created.id, user_id, venue.name, created.total);
        Ok(created)
    }

    pub async fn modify_order(
        &self,
        order_id: i64,
        venue_name: &str,
        start_time: DateTime<Utc>,
        hours: i32,
        user_id: &str,
    ) -> Result<Order, AppError> {
        let current = self.require_order(order_id).await?;

        if current.user_id != user_id {
            return Err(AppError::Forbidden("Order belongs to another user".into()));
        }
        if current.state.is_terminal() {
            return Err(terminal_conflict("modify", current.state));
        }

        let slot = BookingSlot::new(start_time, hours, Utc::now())?;
        let venue = self.venue_by_name(venue_name).await?;
        ensure_within_business_hours(&venue, &slot, self.tz)?;

        let mut changed = current.clone();
        changed.reschedule(&venue, slot)?;

        let updated = self.orders.update_if_free(&changed, current.state).await?;
        info!("Order {} modified by {}: venue {} at {} for {}h", order_id, user_id, venue.name, start_time, hours);
        Ok(updated)
    }

    pub async fn confirm_order(&self, order_id: i64) -> Result<(), AppError> {
        self.transition(order_id, OrderState::Pending, OrderState::Approved).await
    }

    pub async fn reject_order(&self, order_id: i64) -> Result<(), AppError> {
        self.transition(order_id, OrderState::Pending, OrderState::Rejected).await
    }

    /// Only approved orders can be finished.
    pub async fn finish_order(&self, order_id: i64) -> Result<(), AppError> {
        self.transition(order_id, OrderState::Approved, OrderState::Finished).await
    }

    /// Removes the order whatever its state. Missing orders are not an error.
    pub async fn del_order(&self, order_id: i64) -> Result<(), AppError> {
        if self.orders.delete(order_id).await? {
            info!("Order {} deleted", order_id);
        } else {
            debug!("Order {} already gone", order_id);
        }
        Ok(())
    }

    /// User-initiated cancellation of an order that still holds its slot.
    pub async fn cancel_order(&self, order_id: i64, user_id: &str) -> Result<(), AppError> {
        let order = self.require_order(order_id).await?;
        if order.user_id != user_id {
            return Err(AppError::Forbidden("Order belongs to another user".into()));
        }
        ensure_cancellable(order.state)?;

        if !self.orders.delete_active(order_id).await? {
            // Lost a race against a moderator or another request.
            let order = self.require_order(order_id).await?;
            ensure_cancellable(order.state)?;
            return Err(AppError::Conflict(STATE_CHANGED.into()));
        }

        info!("Order {} cancelled by {}", order_id, user_id);
        Ok(())
    }

    pub async fn find_by_id(&self, order_id: i64) -> Result<Option<Order>, AppError> {
        self.orders.find_by_id(order_id).await
    }

    pub async fn find_user_order(&self, user_id: &str, page: PageRequest) -> Result<Page<Order>, AppError> {
        self.orders.find_by_user(user_id, page.normalized()).await
    }

    pub async fn find_no_audit_order(&self, page: PageRequest) -> Result<Page<Order>, AppError> {
        self.orders.find_by_state(OrderState::Pending, page.normalized()).await
    }

    pub async fn find_audit_order(&self) -> Result<Vec<Order>, AppError> {
        self.orders.find_by_states(&OrderState::AUDITED).await
    }

    pub async fn find_date_order(
        &self,
        venue_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, AppError> {
        self.orders.find_by_start_range(venue_id, start, end).await
    }

    pub async fn order_view(&self, order_id: i64) -> Result<OrderView, AppError> {
        let order = self.require_order(order_id).await?;
        let mut views = self.order_views(vec![order]).await?;
        views.pop().ok_or_else(|| AppError::InternalWithMsg(format!("No view built for order {}", order_id)))
    }

    /// Joins venue names onto orders; a deleted venue renders as an empty name.
    pub async fn order_views(&self, orders: Vec<Order>) -> Result<Vec<OrderView>, AppError> {
        let mut names: HashMap<i64, String> = HashMap::new();
        let mut views = Vec::with_capacity(orders.len());

        for order in orders {
            let venue_name = match names.get(&order.venue_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.venues.find_by_id(order.venue_id).await?
                        .map(|v| v.name)
                        .unwrap_or_default();
                    names.insert(order.venue_id, name.clone());
                    name
                }
            };
            views.push(OrderView { order, venue_name });
        }
        Ok(views)
    }

    pub async fn order_view_page(&self, page: Page<Order>) -> Result<Page<OrderView>, AppError> {
        let Page { items, total, page, size } = page;
        let items = self.order_views(items).await?;
        Ok(Page { items, total, page, size })
    }

    pub async fn venue_day_schedule(&self, venue_name: &str, date: NaiveDate) -> Result<DaySchedule, AppError> {
        let venue = self.venue_by_name(venue_name).await?;
        self.day_schedule(venue, date).await
    }

    pub async fn day_schedule(&self, venue: Venue, date: NaiveDate) -> Result<DaySchedule, AppError> {
        let day_start = self.local_midnight(date)?;
        let next_day = date.succ_opt().ok_or(AppError::Validation("Date out of range".into()))?;
        let day_end = self.local_midnight(next_day)?;

        let mut orders = self.orders.find_overlapping(venue.id, day_start, day_end, None).await?;
        orders.sort_by_key(|o| o.start_time);
        let open_slots = open_slots(&venue, date, self.tz, &orders, Utc::now());

        Ok(DaySchedule { venue, date, orders, open_slots })
    }

    async fn transition(&self, order_id: i64, from: OrderState, to: OrderState) -> Result<(), AppError> {
        if self.orders.transition_state(order_id, from, to).await? {
            info!("Order {} moved {} -> {}", order_id, from, to);
            return Ok(());
        }

        let order = self.require_order(order_id).await?;
        warn!("Order {} is {}, cannot move {} -> {}", order_id, order.state, from, to);

        if to == OrderState::Finished && order.state == OrderState::Pending {
            return Err(AppError::Conflict("Order must be approved before it can be finished".into()));
        }
        Err(AppError::Conflict(STATE_CHANGED.into()))
    }

    async fn require_order(&self, order_id: i64) -> Result<Order, AppError> {
        self.orders.find_by_id(order_id).await?
            .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.into()))
    }

    async fn venue_by_name(&self, venue_name: &str) -> Result<Venue, AppError> {
        self.venues.find_by_name(venue_name.trim()).await?
            .ok_or_else(|| AppError::NotFound(format!("Venue '{}' not found", venue_name)))
    }

    fn local_midnight(&self, date: NaiveDate) -> Result<DateTime<Utc>, AppError> {
        let naive = date.and_hms_opt(0, 0, 0).ok_or(AppError::Internal)?;
        self.tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| AppError::Validation("Invalid local date".into()))
    }
}

fn ensure_cancellable(state: OrderState) -> Result<(), AppError> {
    if state.is_terminal() {
        return Err(terminal_conflict("cancel", state));
    }
    Ok(())
}

/// "Cannot modify finished order", "Cannot cancel rejected order", ...
fn terminal_conflict(action: &str, state: OrderState) -> AppError {
    AppError::Conflict(format!("Cannot {} {} order", action, state.as_str().to_lowercase()))
}
