//! Error types for the NEO dashboard core.
//!
//! [`FeedError`] covers the outbound call, [`ExtractionError`] a single
//! malformed object (recoverable), and [`Error`] everything the metrics and
//! presentation layers can report.

use crate::models::QueryWindow;
use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of the outbound feed request.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network failure, non-2xx status or undecodable body.
    #[error("feed unavailable for {window}: {source}")]
    Unavailable {
        window: QueryWindow,
        #[source]
        source: reqwest::Error,
    },
}

impl FeedError {
    pub fn unavailable(window: QueryWindow, source: reqwest::Error) -> Self {
        Self::Unavailable { window, source }
    }

    /// The query window the failed request was made for.
    pub fn window(&self) -> QueryWindow {
        match self {
            Self::Unavailable { window, .. } => *window,
        }
    }
}

/// One object in the feed could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("skipped {} on {date}: {reason}", describe_position(.index))]
pub struct ExtractionError {
    /// Date key the object was listed under.
    pub date: String,
    /// Position of the object within that date; `None` when the whole date
    /// entry was unusable.
    pub index: Option<usize>,
    pub reason: String,
}

fn describe_position(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!("object #{i}"),
        None => "date entry".to_string(),
    }
}

/// Errors raised by metrics derivation, window construction and startup.
#[derive(Debug, Error)]
pub enum Error {
    /// A magnitude that goes through a logarithm was not strictly positive.
    #[error("invalid magnitude: {field} must be > 0, got {value}")]
    InvalidMagnitude { field: &'static str, value: f64 },

    /// Aggregates over zero records are undefined.
    #[error("no objects in the query window")]
    EmptyDataset,

    /// Window start after its end
    #[error("invalid query window: {start} is after {end}")]
    InvalidWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// `start + days` is past the last representable date.
    #[error("query window of {days} days from {start} is out of range")]
    WindowOutOfRange { start: chrono::NaiveDate, days: u32 },

    /// No feed credential was supplied.
    #[error("no API key configured: set {env} or feed.api_key in config.toml")]
    MissingApiKey { env: &'static str },
}

impl Error {
    pub fn invalid_magnitude(field: &'static str, value: f64) -> Self {
        Self::InvalidMagnitude { field, value }
    }
}
