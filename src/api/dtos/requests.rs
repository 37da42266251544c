use crate::error::AppError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

const LOCAL_FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Body of both submit and modify.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub venue_name: String,
    pub start_time: String,
    pub hours: i32,
}

impl OrderRequest {
    /// RFC 3339 timestamps are taken as-is; bare wall-clock times are read in `tz`.
    pub fn start_time(&self, tz: Tz) -> Result<DateTime<Utc>, AppError> {
        parse_start_time(&self.start_time, tz)
    }
}

pub fn parse_start_time(raw: &str, tz: Tz) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = LOCAL_FORMATS.iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| AppError::Validation(format!("Invalid start time '{}'", raw)))?;

    // Wall-clock times skipped by a DST jump do not exist locally.
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::Validation(format!("Start time '{}' does not exist in {}", raw, tz)))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct CheckNameQuery {
    pub name: String,
}
