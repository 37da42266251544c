use crate::domain::models::venue::Venue;
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MIN_HOURS: i32 = 1;
pub const MAX_HOURS: i32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    Pending,
    Approved,
    Rejected,
    Finished,
}

impl OrderState {
    /// States that hold their time slot.
    pub const ACTIVE: [OrderState; 2] = [OrderState::Pending, OrderState::Approved];
    pub const AUDITED: [OrderState; 2] = [OrderState::Approved, OrderState::Finished];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderState::Pending => "PENDING",
            OrderState::Approved => "APPROVED",
            OrderState::Rejected => "REJECTED",
            OrderState::Finished => "FINISHED",
        }
    }

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderState::Rejected | OrderState::Finished)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown order state: {0}")]
pub struct ParseOrderStateError(String);

impl FromStr for OrderState {
    type Err = ParseOrderStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderState::Pending),
            "APPROVED" => Ok(OrderState::Approved),
            "REJECTED" => Ok(OrderState::Rejected),
            "FINISHED" => Ok(OrderState::Finished),
            other => Err(ParseOrderStateError(other.to_string())),
        }
    }
}

impl TryFrom<String> for OrderState {
    type Error = ParseOrderStateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub user_id: String,
    pub venue_id: i64,
    pub order_time: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub hours: i32,
    pub total: i64,
    #[sqlx(try_from = "String")]
    pub state: OrderState,
}

/// A requested time span that already passed the duration and not-in-past checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingSlot {
    start: DateTime<Utc>,
    hours: i32,
}

impl BookingSlot {
    pub fn new(start: DateTime<Utc>, hours: i32, now: DateTime<Utc>) -> Result<Self, AppError> {
        if !(MIN_HOURS..=MAX_HOURS).contains(&hours) {
            return Err(AppError::Validation("Invalid booking duration".into()));
        }
        if start <= now {
            return Err(AppError::Validation("Cannot book time in the past".into()));
        }
        Ok(Self { start, hours })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::hours(self.hours as i64)
    }

    pub fn hours(&self) -> i32 {
        self.hours
    }
}

pub struct NewOrderParams<'a> {
    pub user_id: String,
    pub venue: &'a Venue,
    pub slot: BookingSlot,
}

impl Order {
    pub fn new(params: NewOrderParams<'_>) -> Result<Self, AppError> {
        let total = order_total(params.venue.price, params.slot.hours())?;
        Ok(Self {
            id: 0,
            user_id: params.user_id,
            venue_id: params.venue.id,
            order_time: Utc::now(),
            start_time: params.slot.start(),
            end_time: params.slot.end(),
            hours: params.slot.hours(),
            total,
            state: OrderState::Pending,
        })
    }

    /// Moves the order to a new venue/slot; edited orders go back to moderation.
    pub fn reschedule(&mut self, venue: &Venue, slot: BookingSlot) -> Result<(), AppError> {
        self.total = order_total(venue.price, slot.hours())?;
        self.venue_id = venue.id;
        self.start_time = slot.start();
        self.end_time = slot.end();
        self.hours = slot.hours();
        self.state = OrderState::Pending;
        Ok(())
    }
}

pub fn order_total(price: i64, hours: i32) -> Result<i64, AppError> {
    price
        .checked_mul(hours as i64)
        .ok_or_else(|| AppError::Validation("Booking total is out of range".into()))
}

/// An order joined with the name of the venue it references.
#[derive(Debug, Serialize, Clone)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub venue_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    fn venue(id: i64, price: i64) -> Venue {
        Venue {
            id,
            name: format!("Venue {}", id),
            description: String::new(),
            address: String::new(),
            price,
            open_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            close_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 7, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_slot_duration_bounds() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        for hours in [0, -1, 25] {
            let err = BookingSlot::new(start(), hours, now).unwrap_err();
            assert_eq!(err.to_string(), "Invalid input: Invalid booking duration");
        }
        for hours in [1, 24] {
            assert!(BookingSlot::new(start(), hours, now).is_ok());
        }
    }

    #[test]
    fn test_slot_rejects_past_and_present() {
        let err = BookingSlot::new(start(), 2, start()).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Cannot book time in the past"));
        assert!(BookingSlot::new(start(), 2, start() + Duration::hours(1)).is_err());
    }

    #[test]
    fn test_duration_checked_before_past() {
        let err = BookingSlot::new(start(), 0, start() + Duration::days(1)).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Invalid booking duration"));
    }

    #[test]
    fn test_new_order_computes_total_and_end() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let slot = BookingSlot::new(start(), 3, now).unwrap();
        let v = venue(4, 120);
        let order = Order::new(NewOrderParams { user_id: "alice".into(), venue: &v, slot }).unwrap();

        assert_eq!(order.total, 360);
        assert_eq!(order.venue_id, 4);
        assert_eq!(order.end_time, start() + Duration::hours(3));
        assert_eq!(order.state, OrderState::Pending);
    }

    #[test]
    fn test_reschedule_resets_state_and_total() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let first = venue(1, 100);
        let second = venue(2, 50);
        let slot = BookingSlot::new(start(), 2, now).unwrap();
        let mut order = Order::new(NewOrderParams { user_id: "bob".into(), venue: &first, slot }).unwrap();
        order.state = OrderState::Approved;

        let moved = BookingSlot::new(start() + Duration::hours(1), 4, now).unwrap();
        order.reschedule(&second, moved).unwrap();

        assert_eq!(order.venue_id, 2);
        assert_eq!(order.total, 200);
        assert_eq!(order.hours, 4);
        assert_eq!(order.state, OrderState::Pending);
    }

    #[test]
    fn test_total_overflow_is_rejected() {
        assert!(order_total(i64::MAX, 2).is_err());
        assert_eq!(order_total(i64::MAX, 1).unwrap(), i64::MAX);
    }

    #[test]
    fn test_state_parsing() {
        for state in [OrderState::Pending, OrderState::Approved, OrderState::Rejected, OrderState::Finished] {
            assert_eq!(state.as_str().parse::<OrderState>().unwrap(), state);
        }
        assert!("CANCELLED".parse::<OrderState>().is_err());
        assert!(OrderState::Approved.is_active());
        assert!(!OrderState::Rejected.is_active());
        assert!(OrderState::Finished.is_terminal());
    }
}
