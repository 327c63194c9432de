//! Raw response shapes returned by the REST backend.
//!
//! The backend is not consistent: stop endpoints return GeoJSON feature
//! collections (sometimes paginated, sometimes flat lists) and identifiers may
//! be strings or numbers. The timetable explorer serves plain GTFS rows. These
//! types accept every shape seen in practice;
//! [`crate::api::adapter`] turns them into the canonical model.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IdValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdValue::Text(s) => f.write_str(s),
            IdValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A list that may or may not be wrapped in a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paginated { results: Vec<T> },
    List(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Paginated { results } => results,
            Listing::List(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StopsResponse {
    Paginated { results: StopCollection },
    Collection(StopCollection),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StopCollection {
    FeatureCollection { features: Vec<StopRecord> },
    List(Vec<StopRecord>),
}

impl StopsResponse {
    pub fn into_records(self) -> Vec<StopRecord> {
        let collection = match self {
            StopsResponse::Paginated { results } => results,
            StopsResponse::Collection(collection) => collection,
        };
        match collection {
            StopCollection::FeatureCollection { features } => features,
            StopCollection::List(records) => records,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StopRecord {
    Feature {
        /// Set to the primary key when the serializer lifts it out of `properties`.
        id: Option<IdValue>,
        geometry: Option<PointGeometry>,
        properties: StopFields,
    },
    Flat(StopFields),
}

#[derive(Debug, Deserialize)]
pub struct PointGeometry {
    /// `[lon, lat]`
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StopFields {
    pub stop_id: Option<IdValue>,
    pub id: Option<IdValue>,
    pub name: Option<String>,
    pub stop_name: Option<String>,
    pub lat: Option<f64>,
    pub latitude: Option<f64>,
    pub lon: Option<f64>,
    pub longitude: Option<f64>,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TripSummary {
    pub trip_id: Option<IdValue>,
    pub route: Option<IdValue>,
    pub route_name: Option<String>,
    pub headed_to: Option<String>,
    pub trip_headsign: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingRecord {
    pub trip: Option<TripSummary>,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    pub stop_sequence: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TripRecord {
    pub trip_id: Option<IdValue>,
    pub route: Option<IdValue>,
    pub route_name: Option<String>,
    pub headed_to: Option<String>,
    pub trip_headsign: Option<String>,
    #[serde(default)]
    pub stop_times: Vec<StopTimeRecord>,
}

#[derive(Debug, Deserialize)]
pub struct StopTimeRecord {
    pub stop: Option<IdValue>,
    pub stop_id: Option<IdValue>,
    pub stop_name: Option<String>,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
    pub stop_sequence: Option<u32>,
    pub sequence: Option<u32>,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
}

/// A `routes.txt` row from the timetable explorer.
#[derive(Debug, Deserialize)]
pub struct RouteRecord {
    pub route_id: Option<IdValue>,
    pub route_short_name: Option<IdValue>,
    pub route_long_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TimetableRecord {
    #[serde(default)]
    pub stops: Vec<StopFields>,
    #[serde(default)]
    pub trips: Vec<TimetableTripRecord>,
}

#[derive(Debug, Deserialize)]
pub struct TimetableTripRecord {
    pub trip_id: Option<IdValue>,
    /// Arrival keyed by stop id; skipped stops are `null` or blank.
    #[serde(default)]
    pub times: HashMap<String, Option<String>>,
}
