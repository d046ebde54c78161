use crate::error::{Error, Result};
use chrono::{Days, Local, NaiveDate};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// Calendar date range sent to the feed as `start_date`/`end_date`.
///
/// Also the key under which fetch outcomes are memoized, so it is `Copy`,
/// `Eq` and `Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl QueryWindow {
    /// Builds a window, rejecting `start > end`. The feed caps windows at
    /// 7 days but that limit is left to the provider.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// `[today, today + days]` in the local calendar.
    pub fn starting_today(days: u32) -> Result<Self> {
        Self::starting_on(Local::now().date_naive(), days)
    }

    /// `[start, start + days]`, failing if the end is past chrono's last date.
    pub fn starting_on(start: NaiveDate, days: u32) -> Result<Self> {
        let end = start
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or(Error::WindowOutOfRange { start, days })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Query parameters in the feed's `YYYY-MM-DD` format.
    pub fn query_params(&self) -> [(&'static str, String); 2] {
        [
            ("start_date", self.start.format("%Y-%m-%d").to_string()),
            ("end_date", self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

impl fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Raw feed payload, in the provider's own shape.
///
/// Objects stay as untyped JSON so a single malformed entry fails only its
/// own extraction. Date keys keep provider order. A body without the
/// `near_earth_objects` map is not a feed and fails to decode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub element_count: Option<u64>,
    pub near_earth_objects: serde_json::Map<String, serde_json::Value>,
}

/// One observed near-Earth object, flattened from its first close approach.
#[derive(Debug, Clone, PartialEq)]
pub struct AsteroidRecord {
    pub name: String,
    pub diameter_m: f64,
    pub speed_kmh: f64,
    pub distance_km: f64,
    pub orbiting_body: String,
    pub hazardous: bool,
}

/// Ordered, immutable set of records from one query window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<AsteroidRecord>,
}

impl Dataset {
    pub fn new(records: Vec<AsteroidRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AsteroidRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AsteroidRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AsteroidRecord> {
        self.records.get(index)
    }

    /// Distinct names in first-seen order, for the selection list.
    pub fn unique_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// First record carrying `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&AsteroidRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}

impl From<Vec<AsteroidRecord>> for Dataset {
    fn from(records: Vec<AsteroidRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a AsteroidRecord;
    type IntoIter = std::slice::Iter<'a, AsteroidRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
