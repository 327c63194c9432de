//! Transit data models, schedule times and errors.

pub mod time;
pub mod types;

// Re-exports for convenience
pub use time::{
    format_relative, minutes_until, now_in_display_zone, now_minutes_in_zone, parse_to_minutes,
    TimeOfDay, MINUTES_PER_DAY,
};
pub use types::{Result, ScheduledStopTime, Stop, TransitError, Trip, UpcomingTrip};
