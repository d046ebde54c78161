//! Near-Earth object dashboard.
//!
//! Fetches a week of close approaches from the NASA NeoWs feed, flattens them
//! into [`models::AsteroidRecord`]s, derives headline metrics and a decorative
//! impact simulation, and assembles chart descriptors for the terminal UI.

pub mod api;
pub mod app;
pub mod cache;
pub mod charts;
pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod session;
pub mod ui;

pub use error::{Error, ExtractionError, FeedError, Result};
pub use models::{AsteroidRecord, Dataset, QueryWindow};
