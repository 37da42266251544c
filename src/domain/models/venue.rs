use crate::error::AppError;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub address: String,
    /// Hourly price in whole currency units.
    pub price: i64,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

/// Admin-supplied venue fields, validated by [`Venue::new`] / [`Venue::apply`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewVenue {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    pub price: i64,
    pub open_time: String,
    pub close_time: String,
}

struct CheckedVenue {
    name: String,
    description: String,
    address: String,
    price: i64,
    open_time: NaiveTime,
    close_time: NaiveTime,
}

impl Venue {
    pub fn new(draft: NewVenue) -> Result<Self, AppError> {
        let checked = check(draft)?;
        Ok(Self {
            id: 0,
            name: checked.name,
            description: checked.description,
            address: checked.address,
            price: checked.price,
            open_time: checked.open_time,
            close_time: checked.close_time,
            created_at: Utc::now(),
        })
    }

    /// Overwrites the editable fields, keeping identity and creation time.
    pub fn apply(&mut self, draft: NewVenue) -> Result<(), AppError> {
        let checked = check(draft)?;
        self.name = checked.name;
        self.description = checked.description;
        self.address = checked.address;
        self.price = checked.price;
        self.open_time = checked.open_time;
        self.close_time = checked.close_time;
        Ok(())
    }

    /// A closing time of 23:59 means the venue stays open until midnight.
    pub fn closes_at_midnight(&self) -> bool {
        self.close_time.hour() == 23 && self.close_time.minute() == 59
    }

    /// Local wall-clock window in which bookings starting on `date` must fit.
    pub fn business_window(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let open = date.and_time(self.open_time);
        let close = if self.closes_at_midnight() {
            date.and_hms_opt(23, 59, 0).unwrap_or(open) + Duration::minutes(1)
        } else {
            date.and_time(self.close_time)
        };
        (open, close)
    }
}

fn check(draft: NewVenue) -> Result<CheckedVenue, AppError> {
    let name = draft.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Venue name is required".into()));
    }
    if draft.price <= 0 {
        return Err(AppError::Validation("Price must be a positive number".into()));
    }

    let open_time = parse_clock(&draft.open_time)?;
    let close_time = parse_clock(&draft.close_time)?;
    if open_time >= close_time {
        return Err(AppError::Validation("Opening time must be before closing time".into()));
    }

    Ok(CheckedVenue {
        name,
        description: draft.description.trim().to_string(),
        address: draft.address.trim().to_string(),
        price: draft.price,
        open_time,
        close_time,
    })
}

/// Parses `HH:MM`, rejecting anything outside 00:00..=23:59.
pub fn parse_clock(raw: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid time '{}', expected HH:MM", raw)))
}
