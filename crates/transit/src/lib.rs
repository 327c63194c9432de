//! # bus-radar-transit
//!
//! Schedule-only transit logic for the Bus Radar rider views.
//!
//! ## Features
//!
//! - **Time normalization**: GTFS `HH:MM:SS` parsing, zone shifting, relative labels
//! - **Trip timeline**: infer where a bus is from its schedule, rider ETA, rail layout
//! - **Timetables**: route listings and the per-route trip grid
//! - **Spatial queries**: Haversine distances and an R-tree backed stop directory
//! - **Pluggable networking**: implement [`DataFetcher`] to feed the API client
//!
//! ## Example
//!
//! ```
//! use bus_radar_transit::prelude::*;
//!
//! let stop = |id: &str, time: &str| {
//!     let time: Option<TimeOfDay> = Some(time.parse().unwrap());
//!     ScheduledStopTime::new(id, id, 0, time, time)
//! };
//! let trip = Trip {
//!     id: TripIdentifier::new("T1"),
//!     route_name: "502".into(),
//!     headed_to: "Airport".into(),
//!     stop_times: vec![stop("A", "08:00:00"), stop("B", "08:10:00"), stop("C", "08:20:00")],
//! };
//!
//! let now = parse_to_minutes("08:05:00").unwrap();
//! let timeline = TripTimeline::evaluate(&trip, now, Some(&StopIdentifier::new("C")));
//! assert_eq!(timeline.position.current_stop_index, Some(0));
//! assert_eq!(timeline.eta.unwrap().summary(), "2 stops away · ~20 min");
//! ```

pub mod identifiers;
pub mod models;
pub mod network;
pub mod provider;
pub mod spatial;
pub mod timeline;
pub mod timetable;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::*;
    pub use crate::network::traits::*;
    pub use crate::provider::{RankedStop, StopDirectory};
    pub use crate::spatial::{format_distance, format_rounded_distance, haversine_distance};
    pub use crate::timeline::*;
    pub use crate::timetable::{Route, RouteTimetable, TimetableRow};
}

pub use prelude::*;
