//! Time-interval conflict checking for room bookings
//!
//! Windows are half-open [start, end): touching intervals do not
//! conflict, so back-to-back bookings are allowed.

use chrono::NaiveTime;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Errors for proposed booking windows
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("invalid time {value:?}: expected zero-padded 24-hour HH:MM")]
    InvalidTime { value: String },

    #[error("start time must precede end time")]
    InvalidOrder,
}

/// Parse a clock time in strict zero-padded 24-hour "HH:MM" form.
///
/// Lexicographic comparison of such strings happens to order correctly,
/// but only when every caller zero-pads; parsing into [`NaiveTime`] makes
/// the format explicit and the comparison unconditional.
pub fn parse_clock(value: &str) -> Result<NaiveTime, WindowError> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(WindowError::InvalidTime {
            value: value.to_string(),
        });
    }
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| WindowError::InvalidTime {
        value: value.to_string(),
    })
}

/// A validated booking window: construction guarantees start < end, so an
/// inverted window can never reach the overlap test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    starts_at: NaiveTime,
    ends_at: NaiveTime,
}

impl BookingWindow {
    pub fn new(starts_at: NaiveTime, ends_at: NaiveTime) -> Result<Self, WindowError> {
        if starts_at >= ends_at {
            return Err(WindowError::InvalidOrder);
        }
        Ok(Self { starts_at, ends_at })
    }

    /// Parse and validate a window from "HH:MM" strings
    pub fn parse(starts_at: &str, ends_at: &str) -> Result<Self, WindowError> {
        Self::new(parse_clock(starts_at)?, parse_clock(ends_at)?)
    }

    pub fn starts_at(&self) -> NaiveTime {
        self.starts_at
    }

    pub fn ends_at(&self) -> NaiveTime {
        self.ends_at
    }
}

/// An existing booking on a room's schedule for one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ScheduleEntry {
    #[schema(value_type = String, example = "10:00:00")]
    pub starts_at: NaiveTime,
    #[schema(value_type = String, example = "12:00:00")]
    pub ends_at: NaiveTime,
    /// Display name of whoever holds the booking
    pub booked_by: String,
}

/// Half-open interval overlap: [a_start, a_end) intersects [b_start, b_end).
/// Shared boundaries are not an overlap.
pub fn spans_overlap<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && a_end > b_start
}

/// Return every schedule entry the proposed window overlaps, with owner
/// labels intact so callers can say *which* bookings are in the way.
/// An empty result means the window is free. O(n), no mutation; cheap
/// enough to re-run on every edit of the time fields.
pub fn find_conflicts<'a>(
    window: &BookingWindow,
    schedule: &'a [ScheduleEntry],
) -> Vec<&'a ScheduleEntry> {
    schedule
        .iter()
        .filter(|entry| {
            spans_overlap(window.starts_at, window.ends_at, entry.starts_at, entry.ends_at)
        })
        .collect()
}
