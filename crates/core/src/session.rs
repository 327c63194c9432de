//! Request orchestration for the rider views.
//!
//! The timeline engine is pure; this layer owns everything around it: which
//! request is the latest, debouncing the search box, and shifting backend
//! times into the display zone before evaluation. Nothing here retries on its
//! own. A failed call is returned and the caller decides whether to ask again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use geo::Point;
use tracing::{debug, info};

use bus_radar_transit::{
    DataFetcher, RankedStop, Result, StopDirectory, StopIdentifier, Trip, TripIdentifier,
    TripTimeline, UpcomingArrival, now_minutes_in_zone,
};

use crate::api::ApiClient;
use crate::config::RadarConfig;

/// Hands out increasing generations so late responses can be recognised.
#[derive(Clone, Debug, Default)]
pub struct RequestTracker {
    latest: Arc<AtomicU64>,
}

impl RequestTracker {
    /// Start a request; any ticket issued earlier stops being current.
    pub fn begin(&self) -> RequestTicket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket {
            generation,
            latest: self.latest.clone(),
        }
    }
}

#[derive(Debug)]
pub struct RequestTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl RequestTicket {
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }
}

/// Outcome of a request that a newer one may have overtaken.
#[derive(Clone, Debug, PartialEq)]
pub enum Loaded<T> {
    Current(T),
    /// A newer request started before this one finished; its result was dropped.
    Superseded,
}

impl<T> Loaded<T> {
    pub fn into_current(self) -> Option<T> {
        match self {
            Loaded::Current(value) => Some(value),
            Loaded::Superseded => None,
        }
    }
}

pub struct RadarSession<F> {
    client: Arc<ApiClient<F>>,
    display_offset_minutes: i32,
    nearby_radius_m: f64,
    search_debounce: Duration,
    trips: RequestTracker,
    stops: RequestTracker,
    arrivals: RequestTracker,
}

impl<F: DataFetcher> RadarSession<F> {
    pub fn new(client: Arc<ApiClient<F>>, config: &RadarConfig) -> Self {
        Self {
            client,
            display_offset_minutes: config.display_offset_minutes,
            nearby_radius_m: config.nearby_radius_m,
            search_debounce: config.search_debounce,
            trips: RequestTracker::default(),
            stops: RequestTracker::default(),
            arrivals: RequestTracker::default(),
        }
    }

    pub fn client(&self) -> &ApiClient<F> {
        &self.client
    }

    /// Minutes since midnight in the display zone at `now`.
    pub fn now_minutes(&self, now: DateTime<Utc>) -> i32 {
        now_minutes_in_zone(now, self.display_offset_minutes)
    }

    /// Stops around `origin`, nearest first.
    pub async fn nearby(&self, origin: Point) -> Result<Loaded<Vec<RankedStop>>> {
        let ticket = self.stops.begin();
        let result = self.client.nearby_stops(origin, self.nearby_radius_m).await;
        if !ticket.is_current() {
            return Ok(Loaded::Superseded);
        }

        let stops = result?;
        info!(count = stops.len(), "nearby stops loaded");
        Ok(Loaded::Current(
            StopDirectory::from_stops(stops).ranked_by_distance(Some(origin)),
        ))
    }

    /// What the stop list shows for the current search box contents.
    ///
    /// A blank query falls back to the nearby list (or nothing without a
    /// position). Otherwise the search waits out the debounce and is dropped
    /// if a newer query arrived meanwhile.
    pub async fn find_stops(&self, query: &str, origin: Option<Point>) -> Result<Loaded<Vec<RankedStop>>> {
        let query = query.trim();
        if query.is_empty() {
            return match origin {
                Some(origin) => self.nearby(origin).await,
                None => {
                    self.stops.begin();
                    Ok(Loaded::Current(Vec::new()))
                }
            };
        }

        let ticket = self.stops.begin();
        tokio::time::sleep(self.search_debounce).await;
        if !ticket.is_current() {
            debug!(query, "search superseded during debounce");
            return Ok(Loaded::Superseded);
        }

        let result = self.client.search_stops(query).await;
        if !ticket.is_current() {
            return Ok(Loaded::Superseded);
        }

        let stops = result?;
        info!(query, count = stops.len(), "stop search finished");
        Ok(Loaded::Current(StopDirectory::from_stops(stops).ranked_by_distance(origin)))
    }

    /// Arrival cards for a stop, evaluated at `now`.
    pub async fn upcoming_arrivals(
        &self,
        stop_id: &StopIdentifier,
        now: DateTime<Utc>,
    ) -> Result<Loaded<Vec<UpcomingArrival>>> {
        let ticket = self.arrivals.begin();
        let result = self.client.upcoming_trips(stop_id, None).await;
        if !ticket.is_current() {
            return Ok(Loaded::Superseded);
        }

        let offset = self.display_offset_minutes;
        let now_minutes = self.now_minutes(now);
        let arrivals = result?
            .into_iter()
            .map(|mut trip| {
                trip.arrival = trip.arrival.map(|t| t.shifted(offset));
                trip.departure = trip.departure.map(|t| t.shifted(offset));
                UpcomingArrival::evaluate(trip, now_minutes)
            })
            .collect::<Vec<_>>();
        info!(stop = %stop_id, count = arrivals.len(), "upcoming arrivals loaded");
        Ok(Loaded::Current(arrivals))
    }

    /// Fetch a trip and move its schedule into the display zone.
    pub async fn load_trip(&self, trip_id: &TripIdentifier) -> Result<Loaded<Trip>> {
        let ticket = self.trips.begin();
        let result = self.client.trip_details(trip_id).await;
        if !ticket.is_current() {
            debug!(trip = %trip_id, "discarding stale trip response");
            return Ok(Loaded::Superseded);
        }

        let trip = result?;
        info!(trip = %trip.id, stops = trip.stop_times.len(), "trip loaded");
        Ok(Loaded::Current(trip.shifted(self.display_offset_minutes)))
    }

    /// Evaluate an already shifted trip at `now`. Cheap; call it on every tick.
    pub fn evaluate_trip(
        &self,
        trip: &Trip,
        now: DateTime<Utc>,
        user_stop_id: Option<&StopIdentifier>,
    ) -> TripTimeline {
        TripTimeline::evaluate(trip, self.now_minutes(now), user_stop_id)
    }
}
