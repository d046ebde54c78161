//! Flattens the feed's per-date listing into a [`Dataset`].
//!
//! Every object contributes one [`AsteroidRecord`] built from its first
//! close-approach entry; later entries are ignored. Objects that are missing
//! fields or carry unusable numbers are skipped and reported, the rest of the
//! batch still goes through.

use crate::error::ExtractionError;
use crate::models::{AsteroidRecord, Dataset, FeedResponse};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Output of [`extract`]: the records that parsed and the objects that didn't.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub dataset: Dataset,
    pub failures: Vec<ExtractionError>,
}

#[derive(Deserialize)]
struct NeoObject {
    name: String,
    estimated_diameter: EstimatedDiameter,
    close_approach_data: Vec<Value>,
    is_potentially_hazardous_asteroid: bool,
}

#[derive(Deserialize)]
struct EstimatedDiameter {
    meters: DiameterRange,
}

#[derive(Deserialize)]
struct DiameterRange {
    estimated_diameter_max: f64,
}

#[derive(Deserialize)]
struct CloseApproach {
    relative_velocity: RelativeVelocity,
    miss_distance: MissDistance,
    orbiting_body: String,
}

#[derive(Deserialize)]
struct RelativeVelocity {
    kilometers_per_hour: Magnitude,
}

#[derive(Deserialize)]
struct MissDistance {
    kilometers: Magnitude,
}

// The feed sends these as decimal strings; plain numbers are accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Magnitude {
    Number(f64),
    Text(String),
}

impl Magnitude {
    fn parse(&self, field: &str) -> Result<f64, String> {
        let value = match self {
            Magnitude::Number(n) => *n,
            Magnitude::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("{field}: cannot parse {s:?}: {e}"))?,
        };
        non_negative(field, value)
    }
}

fn non_negative(field: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{field}: expected a non-negative number, got {value}"))
    }
}

/// Turns one object descriptor into a record.
fn extract_record(object: &Value) -> Result<AsteroidRecord, String> {
    let neo = NeoObject::deserialize(object).map_err(|e| e.to_string())?;

    let first = neo
        .close_approach_data
        .first()
        .ok_or_else(|| "close_approach_data is empty".to_string())?;
    let approach = CloseApproach::deserialize(first)
        .map_err(|e| format!("close_approach_data[0]: {e}"))?;

    Ok(AsteroidRecord {
        diameter_m: non_negative(
            "estimated_diameter_max",
            neo.estimated_diameter.meters.estimated_diameter_max,
        )?,
        speed_kmh: approach
            .relative_velocity
            .kilometers_per_hour
            .parse("kilometers_per_hour")?,
        distance_km: approach.miss_distance.kilometers.parse("miss_distance")?,
        orbiting_body: approach.orbiting_body,
        hazardous: neo.is_potentially_hazardous_asteroid,
        name: neo.name,
    })
}

/// Flattens a feed response, preserving date-key order and then object order.
pub fn extract(response: &FeedResponse) -> Extraction {
    let mut records = Vec::new();
    let mut failures = Vec::new();

    for (date, objects) in &response.near_earth_objects {
        let Some(objects) = objects.as_array() else {
            warn!("Feed date {} is not a list of objects; skipping it.", date);
            failures.push(ExtractionError {
                date: date.clone(),
                index: None,
                reason: "date entry is not a list".to_string(),
            });
            continue;
        };

        for (index, object) in objects.iter().enumerate() {
            match extract_record(object) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    warn!("Skipping object #{} on {}: {}", index, date, reason);
                    failures.push(ExtractionError {
                        date: date.clone(),
                        index: Some(index),
                        reason,
                    });
                }
            }
        }
    }

    debug!(
        "Extracted {} records ({} skipped)",
        records.len(),
        failures.len()
    );

    Extraction {
        dataset: Dataset::new(records),
        failures,
    }
}
