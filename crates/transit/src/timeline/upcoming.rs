//! Arrival cards for a stop's "upcoming buses" list.

use crate::models::time::{format_relative, minutes_until};
use crate::models::types::UpcomingTrip;

/// Minutes covered by the approach bar; anything further out sits at 0%.
pub const APPROACH_WINDOW_MINUTES: f64 = 60.0;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UpcomingArrival {
    pub trip: UpcomingTrip,
    pub minutes_until: Option<f64>,
    pub label: String,
    pub departed: bool,
    /// 0 = far away, 100 = at the stop
    pub progress: f64,
}

impl UpcomingArrival {
    pub fn evaluate(trip: UpcomingTrip, now_minutes: i32) -> Self {
        let minutes = trip.arrival.map(|arrival| minutes_until(&arrival, now_minutes));
        let label = match minutes {
            Some(minutes) => format_relative(minutes),
            None => "--".to_owned(),
        };

        Self {
            departed: minutes.is_some_and(|m| m < 0.0),
            progress: minutes
                .map(|m| approach_progress(m, APPROACH_WINDOW_MINUTES))
                .unwrap_or(0.0),
            minutes_until: minutes,
            label,
            trip,
        }
    }
}

/// Percentage along the approach bar, clamped to `0..=100`.
pub fn approach_progress(minutes_until: f64, max_minutes: f64) -> f64 {
    if max_minutes <= 0.0 {
        return if minutes_until <= 0.0 { 100.0 } else { 0.0 };
    }
    ((1.0 - minutes_until / max_minutes) * 100.0).clamp(0.0, 100.0)
}
