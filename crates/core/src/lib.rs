pub mod api;
pub mod config;
pub mod fetch;
pub mod session;

pub use api::{ApiClient, ExplorerClient};
pub use config::RadarConfig;
pub use fetch::HttpFetcher;
pub use session::{Loaded, RadarSession, RequestTicket, RequestTracker};

// Re-export transit from the transit crate
pub use bus_radar_transit as transit;
