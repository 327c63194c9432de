//! In-memory stop directory with a spatial index.
//!
//! Built from whatever stop list the API returned (nearby or search results)
//! and used to rank those stops by distance from the rider.

use std::collections::HashMap;
use std::sync::Arc;

use geo::Point;
use rstar::RTree;

use crate::identifiers::StopIdentifier;
use crate::models::types::Stop;
use crate::spatial::index::StopNode;
use crate::spatial::queries::{haversine_distance, meters_to_degrees_approx};

/// A stop paired with its distance from the query origin.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedStop {
    pub stop: Arc<Stop>,
    /// Meters; `None` without an origin or when the stop has no coordinates.
    pub distance_m: Option<f64>,
}

/// This type is cheap to clone since all stops are stored in `Arc`s.
#[derive(Clone)]
pub struct StopDirectory {
    stops: Vec<Arc<Stop>>,
    stop_map: HashMap<StopIdentifier, Arc<Stop>>,
    stop_tree: RTree<StopNode>,
}

impl StopDirectory {
    pub fn new() -> Self {
        Self {
            stops: Vec::new(),
            stop_map: HashMap::new(),
            stop_tree: RTree::new(),
        }
    }

    /// Build a directory, keeping the input order for unranked listings.
    pub fn from_stops(stops: Vec<Stop>) -> Self {
        let stops: Vec<Arc<Stop>> = stops.into_iter().map(Arc::new).collect();

        let stop_map: HashMap<_, _> = stops.iter().map(|s| (s.id.clone(), s.clone())).collect();

        let stop_tree = RTree::bulk_load(
            stops
                .iter()
                .filter_map(|s| s.location.map(|location| StopNode::new(location, s.clone())))
                .collect(),
        );

        Self {
            stops,
            stop_map,
            stop_tree,
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn get(&self, id: &StopIdentifier) -> Option<Arc<Stop>> {
        self.stop_map.get(id).cloned()
    }

    pub fn all_stops(&self) -> &[Arc<Stop>] {
        &self.stops
    }

    /// Stops within `radius_m` meters of `point`, nearest first.
    pub fn stops_near(&self, point: Point, radius_m: f64) -> Vec<RankedStop> {
        // Validate radius is positive
        if radius_m <= 0.0 || !radius_m.is_finite() {
            return Vec::new();
        }

        // Longitude degrees shrink with latitude, so widen the envelope to match.
        let lat_scale = point.y().to_radians().cos().abs().max(0.01);
        let radius_deg = meters_to_degrees_approx(radius_m) / lat_scale;

        let mut found: Vec<RankedStop> = self
            .stop_tree
            .locate_within_distance([point.x(), point.y()], radius_deg * radius_deg)
            .filter_map(|node| {
                let location = node.stop.location?;
                let distance = haversine_distance(point, location);
                (distance <= radius_m).then(|| RankedStop {
                    stop: node.stop.clone(),
                    distance_m: Some(distance),
                })
            })
            .collect();
        sort_by_distance(&mut found);
        found
    }

    /// The `n` stops closest to `point`.
    pub fn nearest_stops(&self, point: Point, n: usize) -> Vec<RankedStop> {
        let mut ranked = self.ranked_by_distance(Some(point));
        ranked.retain(|r| r.distance_m.is_some());
        ranked.truncate(n);
        ranked
    }

    /// Every stop, sorted by distance from `origin` when one is known.
    ///
    /// Without an origin the directory order is kept. Stops lacking
    /// coordinates sort last.
    pub fn ranked_by_distance(&self, origin: Option<Point>) -> Vec<RankedStop> {
        let mut ranked: Vec<RankedStop> = self
            .stops
            .iter()
            .map(|stop| RankedStop {
                stop: stop.clone(),
                distance_m: origin
                    .zip(stop.location)
                    .map(|(origin, location)| haversine_distance(origin, location)),
            })
            .collect();
        if origin.is_some() {
            sort_by_distance(&mut ranked);
        }
        ranked
    }
}

impl Default for StopDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_by_distance(stops: &mut [RankedStop]) {
    stops.sort_by(|a, b| match (a.distance_m, b.distance_m) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
