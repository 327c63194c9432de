//! Runtime configuration.
//!
//! Defaults match the development backend; every value can be overridden
//! from the environment or by the caller.

use std::time::Duration;

use bus_radar_transit::{Result, TransitError};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// India Standard Time, UTC+05:30.
pub const IST_OFFSET_MINUTES: i32 = 330;

pub const API_URL_VAR: &str = "BUS_RADAR_API_URL";
pub const OFFSET_VAR: &str = "BUS_RADAR_OFFSET_MINUTES";
pub const EXPLORER_URL_VAR: &str = "BUS_RADAR_EXPLORER_URL";

#[derive(Clone, Debug, PartialEq)]
pub struct RadarConfig {
    /// Server root; the REST API lives under `{api_url}/api`.
    pub api_url: String,
    /// Root of the timetable explorer; it serves GTFS tables without `/api`.
    pub explorer_url: String,
    /// Minutes east of UTC for displayed times. Backend times are UTC.
    pub display_offset_minutes: i32,
    /// Radius for the "stops near me" list.
    pub nearby_radius_m: f64,
    pub search_debounce: Duration,
    pub request_timeout: Duration,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            explorer_url: DEFAULT_API_URL.to_owned(),
            display_offset_minutes: IST_OFFSET_MINUTES,
            nearby_radius_m: 1000.0,
            search_debounce: Duration::from_millis(300),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl RadarConfig {
    /// Defaults overlaid with `BUS_RADAR_API_URL`, `BUS_RADAR_EXPLORER_URL`
    /// and `BUS_RADAR_OFFSET_MINUTES`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().to_owned();
        }
        if let Some(url) = lookup(EXPLORER_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.explorer_url = url.trim().to_owned();
        }
        if let Some(offset) = lookup(OFFSET_VAR) {
            config.display_offset_minutes = offset.trim().parse().map_err(|_| {
                TransitError::InvalidData(format!("{OFFSET_VAR} must be an integer, got {offset:?}"))
            })?;
        }
        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_explorer_url(mut self, explorer_url: impl Into<String>) -> Self {
        self.explorer_url = explorer_url.into();
        self
    }

    pub fn with_display_offset(mut self, minutes: i32) -> Self {
        self.display_offset_minutes = minutes;
        self
    }

    /// Base URL of the REST API.
    pub fn api_base(&self) -> String {
        format!("{}/api", self.api_url.trim_end_matches('/'))
    }
}
