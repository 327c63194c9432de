//! Spatial indexing and distance utilities.

pub mod index;
pub mod queries;

pub use queries::{
    format_distance, format_rounded_distance, haversine_distance, meters_to_degrees_approx,
    EARTH_RADIUS_M,
};
