//! Route listings and the per-route timetable grid.
//!
//! The grid has one column per stop of the route's longest trip and one row
//! per trip. Rows are ordered by their earliest known time along that stop
//! order; trips with no time at any column go last.

use std::collections::HashMap;
use std::sync::Arc;

use crate::identifiers::{RouteIdentifier, StopIdentifier, TripIdentifier};
use crate::models::time::TimeOfDay;
use crate::models::types::Stop;

#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub id: RouteIdentifier,
    pub short_name: Arc<str>,
    pub long_name: Arc<str>,
}

impl Route {
    /// `"{short} - {long}"`, or whichever half is present.
    pub fn label(&self) -> String {
        match (self.short_name.is_empty(), self.long_name.is_empty()) {
            (false, false) => format!("{} - {}", self.short_name, self.long_name),
            (false, true) => self.short_name.to_string(),
            (true, false) => self.long_name.to_string(),
            (true, true) => self.id.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimetableRow {
    pub trip_id: TripIdentifier,
    /// Arrival per stop; stops the trip skips are absent.
    pub times: HashMap<StopIdentifier, TimeOfDay>,
}

impl TimetableRow {
    pub fn time_at(&self, stop_id: &StopIdentifier) -> Option<TimeOfDay> {
        self.times.get(stop_id).copied()
    }

    fn start_time(&self, stops: &[Stop]) -> Option<TimeOfDay> {
        stops.iter().find_map(|stop| self.time_at(&stop.id))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteTimetable {
    pub route_id: RouteIdentifier,
    pub stops: Vec<Stop>,
    pub trips: Vec<TimetableRow>,
}

impl RouteTimetable {
    pub fn new(route_id: RouteIdentifier, stops: Vec<Stop>, mut trips: Vec<TimetableRow>) -> Self {
        // Stable, so trips with equal start keep the order the server sent.
        trips.sort_by_key(|row| {
            let start = row.start_time(&stops);
            (start.is_none(), start)
        });
        Self {
            route_id,
            stops,
            trips,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
