//! Booking arbitration engine
//!
//! Pure decision logic for loan approval: time-window conflict checking
//! for room bookings and availability arbitration across the three
//! resource kinds. Nothing in this module performs I/O or touches
//! session state; callers fetch a snapshot, evaluate, and are
//! responsible for re-running the evaluation against fresh data inside
//! the commit transaction.

pub mod arbitrator;
pub mod interval;

pub use arbitrator::{evaluate_request, ApprovedDetail, CatalogSnapshot, Conflict};
pub use interval::{find_conflicts, parse_clock, spans_overlap, BookingWindow, ScheduleEntry, WindowError};

#[cfg(test)]
mod tests;
