//! Normalizes raw API responses into the canonical transit model.
//!
//! This is the only place that knows about the backend's alternative field
//! names and envelopes. Schedule strings are parsed here, so a malformed time
//! surfaces as an error instead of reaching the timeline engine.

use std::collections::HashMap;

use geo::Point;
use tracing::warn;

use bus_radar_transit::{
    Result, Route, RouteIdentifier, RouteTimetable, ScheduledStopTime, Stop, StopIdentifier,
    TimeOfDay, TimetableRow, TransitError, Trip, TripIdentifier, UpcomingTrip,
};

use crate::api::wire::{
    IdValue, RouteRecord, StopFields, StopRecord, StopTimeRecord, StopsResponse, TimetableRecord,
    TripRecord, TripSummary, UpcomingRecord,
};

const DEFAULT_HEADSIGN: &str = "Final Stop";
const DEFAULT_ROUTE_NAME: &str = "Route";

/// Parse an optional schedule time. Blank means "not scheduled".
pub fn parse_schedule_time(raw: Option<&str>) -> Result<Option<TimeOfDay>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

/// Stops from any of the stop-list shapes. Records without an id are dropped.
pub fn stops_from_response(response: StopsResponse) -> Vec<Stop> {
    response
        .into_records()
        .into_iter()
        .filter_map(|record| {
            let stop = stop_from_record(record);
            if stop.is_none() {
                warn!("dropping stop record without an id");
            }
            stop
        })
        .collect()
}

fn stop_from_record(record: StopRecord) -> Option<Stop> {
    let (feature_id, geometry, fields) = match record {
        StopRecord::Feature {
            id,
            geometry,
            properties,
        } => (id, geometry, properties),
        StopRecord::Flat(fields) => (None, None, fields),
    };

    let StopFields {
        stop_id,
        id,
        name,
        stop_name,
        lat,
        latitude,
        lon,
        longitude,
        stop_lat,
        stop_lon,
    } = fields;

    let id = stop_id.or(id).or(feature_id)?.to_string();
    let from_geometry = geometry
        .filter(|g| g.coordinates.len() >= 2)
        .map(|g| Point::new(g.coordinates[0], g.coordinates[1]));
    let from_fields = lon
        .or(longitude)
        .or(stop_lon)
        .zip(lat.or(latitude).or(stop_lat))
        .map(|(lon, lat)| Point::new(lon, lat));

    Some(Stop {
        name: stop_name.or(name).unwrap_or_else(|| id.clone()).into(),
        id: StopIdentifier::new(id),
        location: from_geometry.or(from_fields),
    })
}

fn route_label(route_name: Option<String>, route: Option<IdValue>) -> String {
    route_name
        .filter(|n| !n.is_empty())
        .or_else(|| route.map(|r| r.to_string()))
        .unwrap_or_else(|| DEFAULT_ROUTE_NAME.to_owned())
}

/// Upcoming trips at a stop. Entries without a trip id are dropped.
pub fn upcoming_from_records(records: Vec<UpcomingRecord>) -> Result<Vec<UpcomingTrip>> {
    let mut trips = Vec::with_capacity(records.len());
    for record in records {
        let Some(TripSummary {
            trip_id: Some(trip_id),
            route,
            route_name,
            headed_to,
            trip_headsign,
        }) = record.trip
        else {
            warn!("dropping upcoming entry without a trip id");
            continue;
        };

        trips.push(UpcomingTrip {
            trip_id: TripIdentifier::new(trip_id.to_string()),
            route_name: route_label(route_name, route).into(),
            headed_to: headed_to.or(trip_headsign).unwrap_or_default().into(),
            arrival: parse_schedule_time(record.arrival_time.as_deref())?,
            departure: parse_schedule_time(record.departure_time.as_deref())?,
            sequence: record.stop_sequence,
        });
    }
    Ok(trips)
}

/// A trip with its stop times sorted by sequence.
///
/// `requested` names the trip when the response omits its own id.
pub fn trip_from_record(record: TripRecord, requested: &TripIdentifier) -> Result<Trip> {
    let mut stop_times = record
        .stop_times
        .into_iter()
        .enumerate()
        .map(|(index, st)| stop_time_from_record(st, index))
        .collect::<Result<Vec<_>>>()?;
    stop_times.sort_by_key(|st| st.sequence);

    Ok(Trip {
        id: record
            .trip_id
            .map(|id| TripIdentifier::new(id.to_string()))
            .unwrap_or_else(|| requested.clone()),
        route_name: route_label(record.route_name, record.route).into(),
        headed_to: record
            .headed_to
            .or(record.trip_headsign)
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HEADSIGN.to_owned())
            .into(),
        stop_times,
    })
}

fn stop_time_from_record(record: StopTimeRecord, index: usize) -> Result<ScheduledStopTime> {
    let stop_id = record.stop.or(record.stop_id).ok_or_else(|| {
        TransitError::InvalidData(format!("stop time at position {index} has no stop id"))
    })?;
    let stop_id = stop_id.to_string();

    Ok(ScheduledStopTime {
        stop_name: record.stop_name.unwrap_or_else(|| stop_id.clone()).into(),
        stop_id: StopIdentifier::new(stop_id),
        sequence: record
            .stop_sequence
            .or(record.sequence)
            .unwrap_or(index as u32 + 1),
        arrival: parse_schedule_time(record.arrival_time.as_deref())?,
        departure: parse_schedule_time(record.departure_time.as_deref())?,
        location: record
            .stop_lon
            .zip(record.stop_lat)
            .map(|(lon, lat)| Point::new(lon, lat)),
    })
}

/// Explorer route rows. Rows without a `route_id` are dropped.
pub fn routes_from_records(records: Vec<RouteRecord>) -> Vec<Route> {
    records
        .into_iter()
        .filter_map(|record| {
            let Some(id) = record.route_id else {
                warn!("dropping route row without an id");
                return None;
            };
            Some(Route {
                id: RouteIdentifier::new(id.to_string()),
                short_name: record
                    .route_short_name
                    .map(|n| n.to_string())
                    .unwrap_or_default()
                    .into(),
                long_name: record.route_long_name.unwrap_or_default().into(),
            })
        })
        .collect()
}

/// The explorer's pivoted timetable. Stop columns keep the server's order.
pub fn timetable_from_record(record: TimetableRecord, route_id: &RouteIdentifier) -> Result<RouteTimetable> {
    let stops = record
        .stops
        .into_iter()
        .filter_map(|fields| stop_from_record(StopRecord::Flat(fields)))
        .collect();

    let mut rows = Vec::with_capacity(record.trips.len());
    for trip in record.trips {
        let Some(trip_id) = trip.trip_id else {
            warn!(route = %route_id, "dropping timetable row without a trip id");
            continue;
        };
        let mut times = HashMap::with_capacity(trip.times.len());
        for (stop_id, raw) in trip.times {
            if let Some(time) = parse_schedule_time(raw.as_deref())? {
                times.insert(StopIdentifier::new(stop_id), time);
            }
        }
        rows.push(TimetableRow {
            trip_id: TripIdentifier::new(trip_id.to_string()),
            times,
        });
    }

    Ok(RouteTimetable::new(route_id.clone(), stops, rows))
}
