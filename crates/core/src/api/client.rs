//! REST clients for the GTFS backend and the timetable explorer.

use geo::Point;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use bus_radar_transit::{
    DataFetcher, Result, Route, RouteIdentifier, RouteTimetable, Stop, StopIdentifier, TimeOfDay,
    TransitError, Trip, TripIdentifier, UpcomingTrip,
};

use crate::api::adapter::{
    routes_from_records, stops_from_response, timetable_from_record, trip_from_record,
    upcoming_from_records,
};
use crate::api::wire::{Listing, RouteRecord, StopsResponse, TimetableRecord, UpcomingRecord};

/// Search radius used when the caller does not pick one.
pub const DEFAULT_NEARBY_RADIUS_M: f64 = 500.0;

pub struct ApiClient<F> {
    fetcher: F,
    base_url: Url,
}

impl<F: DataFetcher> ApiClient<F> {
    /// `base_url` is the API root, e.g. `http://localhost:8000/api`.
    pub fn new(fetcher: F, base_url: &str) -> Result<Self> {
        Ok(Self {
            fetcher,
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Stops within `radius_m` of `origin`.
    pub async fn nearby_stops(&self, origin: Point, radius_m: f64) -> Result<Vec<Stop>> {
        let mut url = join_path(&self.base_url, &["gtfs", "stops"], true);
        url.query_pairs_mut()
            .append_pair("point", &format!("{},{}", origin.x(), origin.y()))
            .append_pair("dist", &radius_m.to_string());

        let response: StopsResponse = get_json(&self.fetcher, url, "stops").await?;
        Ok(stops_from_response(response))
    }

    /// Stops whose name or id matches `query`.
    pub async fn search_stops(&self, query: &str) -> Result<Vec<Stop>> {
        let mut url = join_path(&self.base_url, &["gtfs", "stops"], true);
        url.query_pairs_mut().append_pair("search", query);

        let response: StopsResponse = get_json(&self.fetcher, url, "stops").await?;
        Ok(stops_from_response(response))
    }

    /// Trips calling at `stop_id`, optionally from a given time (backend zone).
    pub async fn upcoming_trips(
        &self,
        stop_id: &StopIdentifier,
        time: Option<TimeOfDay>,
    ) -> Result<Vec<UpcomingTrip>> {
        let mut url = join_path(
            &self.base_url,
            &["gtfs", "stops", stop_id.as_str(), "upcoming"],
            true,
        );
        if let Some(time) = time {
            url.query_pairs_mut().append_pair("time", &time.to_string());
        }

        let listing: Listing<UpcomingRecord> =
            get_json(&self.fetcher, url, "upcoming trips").await?;
        upcoming_from_records(listing.into_items())
    }

    /// A trip with all its stop times, in the backend's zone.
    pub async fn trip_details(&self, trip_id: &TripIdentifier) -> Result<Trip> {
        const WHAT: &str = "trip details";
        let url = join_path(&self.base_url, &["gtfs", "trips", trip_id.as_str()], true);

        debug!(%url, "requesting {WHAT}");
        let bytes = match self.fetcher.fetch(url.as_str()).await {
            Err(TransitError::HttpStatus { status: 404, .. }) => {
                return Err(TransitError::TripNotFound(trip_id.clone()));
            }
            other => other.map_err(|e| fetch_failed(WHAT, e))?,
        };
        trip_from_record(decode(&bytes, WHAT)?, trip_id)
    }
}

/// Client for the timetable explorer, which serves GTFS tables from the
/// server root without the `/api` prefix or trailing slashes.
pub struct ExplorerClient<F> {
    fetcher: F,
    base_url: Url,
}

impl<F: DataFetcher> ExplorerClient<F> {
    pub fn new(fetcher: F, base_url: &str) -> Result<Self> {
        Ok(Self {
            fetcher,
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub async fn routes(&self) -> Result<Vec<Route>> {
        let url = join_path(&self.base_url, &["routes"], false);
        let records: Vec<RouteRecord> = get_json(&self.fetcher, url, "routes").await?;
        Ok(routes_from_records(records))
    }

    pub async fn timetable(&self, route_id: &RouteIdentifier) -> Result<RouteTimetable> {
        let url = join_path(&self.base_url, &["timetable", route_id.as_str()], false);
        let record: TimetableRecord = get_json(&self.fetcher, url, "timetable").await?;
        timetable_from_record(record, route_id)
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| TransitError::InvalidData(format!("invalid API url {base_url:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(TransitError::InvalidData(format!(
            "API url {url} cannot carry a path"
        )));
    }
    Ok(url)
}

/// `{base}/{segments..}[/]` with each segment percent-encoded.
fn join_path(base: &Url, segments: &[&str], trailing_slash: bool) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
        if trailing_slash {
            path.push("");
        }
    }
    url
}

/// Every transport failure, any status included, becomes `DataUnavailable`.
fn fetch_failed(what: &str, error: TransitError) -> TransitError {
    match error {
        TransitError::HttpStatus { status, .. } => {
            TransitError::DataUnavailable(format!("Failed to fetch {what}: {status}"))
        }
        TransitError::DataUnavailable(detail) => {
            TransitError::DataUnavailable(format!("Failed to fetch {what}: {detail}"))
        }
        other => other,
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| TransitError::SerializationError(format!("{what}: {e}")))
}

async fn get_json<F: DataFetcher, T: DeserializeOwned>(fetcher: &F, url: Url, what: &str) -> Result<T> {
    debug!(%url, "requesting {what}");
    let bytes = fetcher
        .fetch(url.as_str())
        .await
        .map_err(|e| fetch_failed(what, e))?;
    decode(&bytes, what)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Canned responses keyed by URL substring, with an optional delay.
    #[derive(Default)]
    pub(crate) struct FakeFetcher {
        routes: Vec<(String, Duration, std::result::Result<String, u16>)>,
        pub(crate) requests: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub(crate) fn respond(mut self, pattern: &str, body: &str) -> Self {
            self.routes.push((pattern.to_owned(), Duration::ZERO, Ok(body.to_owned())));
            self
        }

        pub(crate) fn respond_after(mut self, pattern: &str, delay: Duration, body: &str) -> Self {
            self.routes.push((pattern.to_owned(), delay, Ok(body.to_owned())));
            self
        }

        pub(crate) fn fail(mut self, pattern: &str, status: u16) -> Self {
            self.routes.push((pattern.to_owned(), Duration::ZERO, Err(status)));
            self
        }

        pub(crate) fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl DataFetcher for FakeFetcher {
        fn fetch<'a>(
            &'a self,
            url: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
            Box::pin(async move {
                self.requests.lock().unwrap().push(url.to_owned());
                let route = self.routes.iter().find(|(pattern, _, _)| url.contains(pattern.as_str()));
                let Some((_, delay, response)) = route else {
                    return Err(TransitError::HttpStatus { url: url.to_owned(), status: 404 });
                };
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                match response {
                    Ok(body) => Ok(body.clone().into_bytes()),
                    Err(status) => Err(TransitError::HttpStatus { url: url.to_owned(), status: *status }),
                }
            })
        }
    }

    const TRIP_JSON: &str = r#"{
        "trip_id": "T1", "route_name": "502", "headed_to": "Airport",
        "stop_times": [
            {"stop": "A", "stop_name": "Alpha", "stop_sequence": 1, "arrival_time": "02:30:00", "departure_time": "02:30:00"},
            {"stop": "B", "stop_name": "Bravo", "stop_sequence": 2, "arrival_time": "02:40:00", "departure_time": "02:40:00"}
        ]
    }"#;

    fn client(fetcher: FakeFetcher) -> ApiClient<FakeFetcher> {
        ApiClient::new(fetcher, "http://localhost:8000/api").unwrap()
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(ApiClient::new(FakeFetcher::default(), "not a url").is_err());
        assert!(ApiClient::new(FakeFetcher::default(), "mailto:ops@example.org").is_err());
    }

    #[test]
    fn test_endpoint_paths() {
        let client = client(FakeFetcher::default());
        assert_eq!(
            join_path(client.base_url(), &["gtfs", "trips", "T 1"], true).as_str(),
            "http://localhost:8000/api/gtfs/trips/T%201/"
        );

        let trailing = ApiClient::new(FakeFetcher::default(), "http://localhost:8000/api/").unwrap();
        assert_eq!(
            join_path(trailing.base_url(), &["gtfs", "stops"], true).as_str(),
            "http://localhost:8000/api/gtfs/stops/"
        );

        let root = Url::parse("http://localhost:8000").unwrap();
        assert_eq!(
            join_path(&root, &["timetable", "R1"], false).as_str(),
            "http://localhost:8000/timetable/R1"
        );
    }

    #[tokio::test]
    async fn test_nearby_and_search_urls() {
        let client = client(FakeFetcher::default().respond("/gtfs/stops/", "[]"));

        client.nearby_stops(Point::new(77.5, 12.9), 1000.0).await.unwrap();
        client.search_stops("MG Road").await.unwrap();

        let requests = client.fetcher.requests();
        assert_eq!(
            requests[0],
            "http://localhost:8000/api/gtfs/stops/?point=77.5%2C12.9&dist=1000"
        );
        assert_eq!(requests[1], "http://localhost:8000/api/gtfs/stops/?search=MG+Road");
    }

    #[tokio::test]
    async fn test_upcoming_with_time() {
        let client = client(FakeFetcher::default().respond(
            "/gtfs/stops/S1/upcoming/",
            r#"[{"trip": {"trip_id": "T1", "route_name": "200"}, "arrival_time": "08:20:00"}]"#,
        ));

        let time: TimeOfDay = "08:00:00".parse().unwrap();
        let trips = client
            .upcoming_trips(&StopIdentifier::new("S1"), Some(time))
            .await
            .unwrap();

        assert_eq!(trips.len(), 1);
        assert!(client.fetcher.requests()[0].ends_with("/upcoming/?time=08%3A00%3A00"));
    }

    #[tokio::test]
    async fn test_trip_details() {
        let client = client(FakeFetcher::default().respond("/gtfs/trips/T1/", TRIP_JSON));
        let trip = client.trip_details(&TripIdentifier::new("T1")).await.unwrap();

        assert_eq!(trip.route_name.as_ref(), "502");
        assert_eq!(trip.stop_times.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_trip() {
        let client = client(FakeFetcher::default());
        let err = client.trip_details(&TripIdentifier::new("T404")).await.unwrap_err();
        assert!(matches!(err, TransitError::TripNotFound(id) if id.as_str() == "T404"));
    }

    #[tokio::test]
    async fn test_server_error_is_data_unavailable() {
        let client = client(FakeFetcher::default().fail("/gtfs/trips/", 500));
        let err = client.trip_details(&TripIdentifier::new("T1")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Data unavailable: Failed to fetch trip details: 500"
        );
    }

    #[tokio::test]
    async fn test_garbage_body() {
        let client = client(FakeFetcher::default().respond("/gtfs/trips/", "<html>"));
        let err = client.trip_details(&TripIdentifier::new("T1")).await.unwrap_err();
        assert!(matches!(err, TransitError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_missing_stop_is_data_unavailable() {
        let client = client(FakeFetcher::default());
        let err = client
            .upcoming_trips(&StopIdentifier::new("NOPE"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, TransitError::DataUnavailable(_)));
        assert_eq!(err.to_string(), "Data unavailable: Failed to fetch upcoming trips: 404");

        let err = client.search_stops("x").await.unwrap_err();
        assert_eq!(err.to_string(), "Data unavailable: Failed to fetch stops: 404");
    }

    #[tokio::test]
    async fn test_explorer_routes_and_timetable() {
        let explorer = ExplorerClient::new(
            FakeFetcher::default()
                .respond(
                    "/routes",
                    r#"[{"route_id": "R1", "route_short_name": "502", "route_long_name": "Airport"}]"#,
                )
                .respond(
                    "/timetable/R1",
                    r#"{"stops": [{"stop_id": "A", "stop_name": "Alpha"}],
                        "trips": [{"trip_id": "T1", "times": {"A": "08:00:00"}}]}"#,
                ),
            "http://localhost:8000",
        )
        .unwrap();

        let routes = explorer.routes().await.unwrap();
        assert_eq!(routes[0].label(), "502 - Airport");

        let timetable = explorer.timetable(&routes[0].id).await.unwrap();
        assert_eq!(timetable.trips.len(), 1);

        let requests = explorer.fetcher().requests();
        assert_eq!(requests[0], "http://localhost:8000/routes");
        assert_eq!(requests[1], "http://localhost:8000/timetable/R1");
    }

    #[tokio::test]
    async fn test_explorer_failure_is_data_unavailable() {
        let explorer =
            ExplorerClient::new(FakeFetcher::default().fail("/timetable/", 500), "http://localhost:8000")
                .unwrap();
        let err = explorer.timetable(&RouteIdentifier::new("R1")).await.unwrap_err();
        assert_eq!(err.to_string(), "Data unavailable: Failed to fetch timetable: 500");
    }
}
