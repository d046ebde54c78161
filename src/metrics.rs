//! Aggregate statistics over a dataset and the per-selection impact simulation.

use crate::error::{Error, Result};
use crate::models::{AsteroidRecord, Dataset};
use rand::Rng;

/// Headline numbers for the metrics row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateMetrics {
    pub count: usize,
    pub mean_diameter: f64,
    pub mean_speed: f64,
}

impl AggregateMetrics {
    /// Count and arithmetic means over the whole dataset.
    ///
    /// Returns [`Error::EmptyDataset`] rather than a NaN mean when there is
    /// nothing to average.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let count = dataset.len();
        let n = count as f64;
        let (diameter_sum, speed_sum) = dataset
            .iter()
            .fold((0.0, 0.0), |(d, s), r| (d + r.diameter_m, s + r.speed_kmh));

        Ok(Self {
            count,
            mean_diameter: diameter_sum / n,
            mean_speed: speed_sum / n,
        })
    }
}

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Decorative impact figures for one selected record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactSimulation {
    pub impact_radius: f64,
    pub impact_speed: f64,
    pub impact_location: GeoPoint,
}

const RADIUS_SCALE: std::ops::Range<f64> = 2.0..7.0;
const LOCATION_JITTER: std::ops::Range<f64> = -50.0..50.0;
const LOCATION_CENTER: GeoPoint = GeoPoint {
    latitude: 20.0,
    longitude: 0.0,
};

fn positive(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::invalid_magnitude(field, value))
    }
}

/// Simulates an impact for `record`, drawing from `rng`.
///
/// Radius is `ln(diameter) * U[2, 7)`, speed `ln(speed) * 10`, and the
/// location is a uniform jitter of ±50° around (20, 0). Draws happen in that
/// order: radius multiplier, latitude, longitude. The location has nothing to
/// do with the object's trajectory.
///
/// # Errors
///
/// [`Error::InvalidMagnitude`] if the diameter or the speed is not > 0.
pub fn simulate_impact<R: Rng>(
    record: &AsteroidRecord,
    rng: &mut R,
) -> Result<ImpactSimulation> {
    let diameter = positive("diameter_m", record.diameter_m)?;
    let speed = positive("speed_kmh", record.speed_kmh)?;

    let impact_radius = diameter.ln() * rng.gen_range(RADIUS_SCALE);
    let impact_speed = speed.ln() * 10.0;
    let impact_location = GeoPoint {
        latitude: LOCATION_CENTER.latitude + rng.gen_range(LOCATION_JITTER),
        longitude: LOCATION_CENTER.longitude + rng.gen_range(LOCATION_JITTER),
    };

    Ok(ImpactSimulation {
        impact_radius,
        impact_speed,
        impact_location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(diameter_m: f64, speed_kmh: f64) -> AsteroidRecord {
        AsteroidRecord {
            name: "test".to_string(),
            diameter_m,
            speed_kmh,
            distance_km: 1000.0,
            orbiting_body: "Earth".to_string(),
            hazardous: false,
        }
    }

    #[test]
    fn aggregates_are_arithmetic_means() {
        let dataset = Dataset::from(vec![record(50.0, 36000.0), record(200.0, 72000.0)]);
        let metrics = AggregateMetrics::from_dataset(&dataset).unwrap();
        assert_eq!(metrics.count, 2);
        assert_eq!(metrics.mean_diameter, 125.0);
        assert_eq!(metrics.mean_speed, 54000.0);
    }

    #[test]
    fn aggregates_do_not_depend_on_order() {
        let records = vec![record(3.0, 10.0), record(7.0, 20.0), record(11.0, 60.0)];
        let mut reversed = records.clone();
        reversed.reverse();
        let a = AggregateMetrics::from_dataset(&Dataset::from(records)).unwrap();
        let b = AggregateMetrics::from_dataset(&Dataset::from(reversed)).unwrap();
        assert!((a.mean_diameter - 7.0).abs() < 1e-12);
        assert!((a.mean_speed - 30.0).abs() < 1e-12);
        assert!((a.mean_diameter - b.mean_diameter).abs() < 1e-12);
        assert!((a.mean_speed - b.mean_speed).abs() < 1e-12);
    }

    #[test]
    fn empty_dataset_has_no_aggregates() {
        assert!(matches!(
            AggregateMetrics::from_dataset(&Dataset::default()),
            Err(Error::EmptyDataset)
        ));
    }

    #[test]
    fn simulation_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let target = record(100.0, 50_000.0);
        for _ in 0..200 {
            let sim = simulate_impact(&target, &mut rng).unwrap();
            let ln_d = 100f64.ln();
            assert!(sim.impact_radius >= ln_d * 2.0 && sim.impact_radius < ln_d * 7.0);
            assert!((sim.impact_speed - 50_000f64.ln() * 10.0).abs() < 1e-9);
            assert!((-30.0..70.0).contains(&sim.impact_location.latitude));
            assert!((-50.0..50.0).contains(&sim.impact_location.longitude));
        }
    }

    #[test]
    fn same_seed_same_simulation() {
        let target = record(80.0, 20_000.0);
        let a = simulate_impact(&target, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = simulate_impact(&target, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn radius_and_speed_increase_with_magnitude() {
        let magnitudes = [0.5, 1.0, 2.0, 50.0, 200.0, 10_000.0];
        let sims: Vec<_> = magnitudes
            .iter()
            .map(|&m| simulate_impact(&record(m, m), &mut StdRng::seed_from_u64(3)).unwrap())
            .collect();
        for pair in sims.windows(2) {
            assert!(pair[0].impact_radius < pair[1].impact_radius);
            assert!(pair[0].impact_speed < pair[1].impact_speed);
        }
    }

    #[test]
    fn zero_or_negative_magnitudes_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        for (diameter, speed, field) in [
            (0.0, 100.0, "diameter_m"),
            (10.0, 0.0, "speed_kmh"),
            (-1.0, 100.0, "diameter_m"),
            (f64::NAN, 100.0, "diameter_m"),
        ] {
            match simulate_impact(&record(diameter, speed), &mut rng) {
                Err(Error::InvalidMagnitude { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected InvalidMagnitude, got {other:?}"),
            }
        }
    }
}
