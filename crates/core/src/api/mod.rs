//! Backend access: raw wire shapes, their normalization, and the clients.

pub mod adapter;
pub mod client;
pub mod wire;

pub use client::{ApiClient, ExplorerClient, DEFAULT_NEARBY_RADIUS_M};
