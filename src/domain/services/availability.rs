use crate::domain::models::order::Order;
use crate::domain::models::venue::Venue;
use crate::domain::services::rules::conflicting;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

const SLOT_STEP_MIN: i64 = 60;

/// Hourly start times on `date` where a one-hour booking would currently be accepted.
pub fn open_slots(
    venue: &Venue,
    date: NaiveDate,
    tz: Tz,
    existing: &[Order],
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let (open, close) = venue.business_window(date);
    let step = Duration::minutes(SLOT_STEP_MIN);

    let mut slots = Vec::new();
    let mut cursor = open;
    while cursor + step <= close {
        // Local times skipped by a DST jump have no single instant.
        if let Some(local) = tz.from_local_datetime(&cursor).single() {
            let start = local.with_timezone(&Utc);
            let end = start + step;
            if start > now && conflicting(existing, start, end, None).next().is_none() {
                slots.push(start);
            }
        }
        cursor += step;
    }

    slots.sort();
    slots.dedup();
    slots
}
