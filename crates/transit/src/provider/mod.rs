//! In-memory stop lookups.

pub mod stop_directory;

pub use stop_directory::{RankedStop, StopDirectory};
