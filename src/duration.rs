use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::controller::ControllerSettings;
use crate::error::{ClassboardError, Result};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Formats minutes past midnight as `HH:MM`.
///
/// Precondition: `minutes < 1440`. Larger values are a caller bug and are not
/// wrapped or clamped.
pub fn minutes_to_time(minutes: u32) -> String {
    debug_assert!(minutes < MINUTES_PER_DAY, "minutes out of day: {minutes}");
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn time_to_minutes(time: &str) -> Result<u32> {
    let bad = || ClassboardError::InvalidTime(time.to_string());
    let (h, m) = time.trim().split_once(':').ok_or_else(bad)?;
    let h: u32 = h.parse().map_err(|_| bad())?;
    let m: u32 = m.parse().map_err(|_| bad())?;
    if h >= 24 || m >= 60 {
        return Err(bad());
    }
    Ok(h * 60 + m)
}

pub fn pretty_duration(minutes: i64) -> String {
    if minutes <= 0 {
        return "0 min".to_string();
    }
    let (h, m) = (minutes / 60, minutes % 60);
    match (h, m) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m} min"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub event_date: String,
    pub duration: i64,
}

/// Timestamp for a new event placed at `next_slot` on `selected_date`, with the
/// default duration for the booking's student capacity.
pub fn calculate_event_time(
    capacity_students: u32,
    next_slot: &str,
    selected_date: NaiveDate,
    settings: &ControllerSettings,
) -> Result<EventTime> {
    let minutes = time_to_minutes(next_slot)?;
    let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        .ok_or_else(|| ClassboardError::InvalidTime(next_slot.to_string()))?;
    let at = selected_date.and_time(time);
    Ok(EventTime {
        event_date: at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        duration: settings.duration_for_capacity(capacity_students),
    })
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let head = s.trim().get(..10).unwrap_or(s.trim());
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .map_err(|_| ClassboardError::InvalidDate(s.to_string()))
}
