//! Free-slot search over a day's bookable window.
//!
//! Candidate starts are enumerated on a fixed grid inside the bookable
//! window and kept when the requested duration fits before the window
//! closes, collides with no busy interval, and (for the real current day
//! only) does not start in the past.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` range during which the user is unavailable,
/// in local wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Event title, kept for display only.
    pub summary: Option<String>,
}

impl BusyInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            summary: None,
        }
    }

    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start < self.end && end > self.start
    }
}

/// Bookable-window parameters for slot search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Opening hour of the bookable window (local).
    pub window_start_hour: u32,
    /// Closing hour of the bookable window (local).
    pub window_end_hour: u32,
    /// Candidate grid step in minutes.
    pub grid_minutes: i64,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            window_start_hour: 8,
            window_end_hour: 22,
            grid_minutes: 30,
        }
    }
}

/// List candidate break start times for `day`, ascending.
///
/// `now` is the real current moment; it floors candidates only when `day`
/// is the same calendar date. Future days are unconstrained, and past days
/// get no special treatment either. An empty result means nothing fits and
/// is a normal outcome.
pub fn available_slots(
    day: NaiveDate,
    duration_minutes: i64,
    busy: &[BusyInterval],
    now: NaiveDateTime,
    config: &SlotConfig,
) -> Vec<NaiveDateTime> {
    let Some(opening) = day.and_hms_opt(config.window_start_hour, 0, 0) else {
        return Vec::new();
    };
    let Some(closing) = day.and_hms_opt(config.window_end_hour, 0, 0) else {
        return Vec::new();
    };
    if duration_minutes <= 0 {
        return Vec::new();
    }

    let duration = Duration::minutes(duration_minutes);
    let step = Duration::minutes(config.grid_minutes);
    let floor = if day == now.date() { now } else { opening };

    let mut slots = Vec::new();
    let mut cursor = opening;
    while cursor + duration <= closing {
        let slot_end = cursor + duration;
        if cursor >= floor && !busy.iter().any(|b| b.overlaps(cursor, slot_end)) {
            slots.push(cursor);
        }
        cursor = cursor + step;
    }
    slots
}
