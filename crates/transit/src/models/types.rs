//! Core data types for stops, trips and schedules.

use std::sync::Arc;

use geo::Point;

use crate::identifiers::*;
use crate::models::time::TimeOfDay;

// ============================================================================
// Data Structures
// ============================================================================

/// A boarding location, normalized from whatever shape the API returned.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id: StopIdentifier,
    pub name: Arc<str>,
    /// `None` when the API did not include coordinates.
    pub location: Option<Point>,
}

/// A scheduled arrival/departure pairing for one stop within one trip.
///
/// Times are optional because GTFS allows blank times on non-timepoint stops.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledStopTime {
    pub stop_id: StopIdentifier,
    pub stop_name: Arc<str>,
    pub sequence: u32,
    pub arrival: Option<TimeOfDay>,
    pub departure: Option<TimeOfDay>,
    pub location: Option<Point>,
}

impl ScheduledStopTime {
    pub fn new(
        stop_id: impl Into<StopIdentifier>,
        stop_name: impl Into<Arc<str>>,
        sequence: u32,
        arrival: Option<TimeOfDay>,
        departure: Option<TimeOfDay>,
    ) -> Self {
        Self {
            stop_id: stop_id.into(),
            stop_name: stop_name.into(),
            sequence,
            arrival,
            departure,
            location: None,
        }
    }

    /// Arrival in minutes since midnight, if the stop has a scheduled arrival.
    pub fn arrival_minutes(&self) -> Option<i32> {
        self.arrival.map(|t| t.minutes())
    }

    /// Same stop with both times moved by `offset_minutes`.
    pub fn shifted(&self, offset_minutes: i32) -> Self {
        Self {
            arrival: self.arrival.map(|t| t.shifted(offset_minutes)),
            departure: self.departure.map(|t| t.shifted(offset_minutes)),
            ..self.clone()
        }
    }
}

/// A single vehicle run with its ordered stop times.
#[derive(Clone, Debug, PartialEq)]
pub struct Trip {
    pub id: TripIdentifier,
    pub route_name: Arc<str>,
    pub headed_to: Arc<str>,
    /// Ordered by `sequence`
    pub stop_times: Vec<ScheduledStopTime>,
}

impl Trip {
    /// Copy of this trip with every schedule time moved into another zone.
    pub fn shifted(&self, offset_minutes: i32) -> Self {
        Self {
            stop_times: self
                .stop_times
                .iter()
                .map(|st| st.shifted(offset_minutes))
                .collect(),
            ..self.clone()
        }
    }

    /// Position of a stop in this trip's sequence. The first match wins.
    pub fn stop_index(&self, stop_id: &StopIdentifier) -> Option<usize> {
        self.stop_times.iter().position(|st| &st.stop_id == stop_id)
    }
}

/// A trip calling at a particular stop, as listed on that stop's arrivals board.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UpcomingTrip {
    pub trip_id: TripIdentifier,
    pub route_name: Arc<str>,
    /// Empty when the API gave no headsign
    pub headed_to: Arc<str>,
    pub arrival: Option<TimeOfDay>,
    pub departure: Option<TimeOfDay>,
    pub sequence: Option<u32>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Malformed schedule time {input:?}: {reason}")]
    MalformedTime { input: String, reason: String },

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Trip not found: {0}")]
    TripNotFound(TripIdentifier),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, TransitError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> Option<TimeOfDay> {
        Some(s.parse().unwrap())
    }

    fn sample_trip() -> Trip {
        Trip {
            id: TripIdentifier::new("T1"),
            route_name: "502".into(),
            headed_to: "Airport".into(),
            stop_times: vec![
                ScheduledStopTime::new("A", "Alpha", 1, time("02:30:00"), time("02:31:00")),
                ScheduledStopTime::new("B", "Bravo", 2, None, None),
                ScheduledStopTime::new("C", "Charlie", 3, time("20:00:00"), time("20:00:30")),
            ],
        }
    }

    #[test]
    fn test_trip_shift_moves_every_time() {
        let shifted = sample_trip().shifted(330);

        assert_eq!(shifted.stop_times[0].arrival.unwrap().to_string(), "08:00:00");
        assert_eq!(shifted.stop_times[0].departure.unwrap().to_string(), "08:01:00");
        assert_eq!(shifted.stop_times[1].arrival, None);
        assert_eq!(shifted.stop_times[2].arrival.unwrap().to_string(), "01:30:00");
        assert_eq!(shifted.route_name.as_ref(), "502");
    }

    #[test]
    fn test_stop_index() {
        let trip = sample_trip();
        assert_eq!(trip.stop_index(&StopIdentifier::new("C")), Some(2));
        assert_eq!(trip.stop_index(&StopIdentifier::new("Z")), None);
    }

    #[test]
    fn test_error_messages() {
        let err = TransitError::MalformedTime {
            input: "8".into(),
            reason: "expected at least HH:MM".into(),
        };
        assert_eq!(err.to_string(), "Malformed schedule time \"8\": expected at least HH:MM");
        assert_eq!(
            TransitError::TripNotFound(TripIdentifier::new("T9")).to_string(),
            "Trip not found: T9"
        );
    }
}
