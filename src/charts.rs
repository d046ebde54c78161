//! Declarative chart descriptors for the dashboard.
//!
//! Nothing here draws anything. The assembler splits a [`Dataset`] by the
//! hazardous flag and produces plain data (titles, axes, colors, values)
//! which the terminal UI turns into widgets.

use crate::metrics::ImpactSimulation;
use crate::models::{AsteroidRecord, Dataset};

/// RGBA color carried by descriptors; alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }
}

pub const HAZARDOUS_COLOR: Rgba = Rgba::opaque(0xff, 0x66, 0x66);
pub const SAFE_COLOR: Rgba = Rgba::opaque(0x66, 0xb3, 0xff);
pub const SCATTER_COLOR: Rgba = Rgba::new(255, 99, 132, 0.8);
pub const SPREAD_COLOR: Rgba = Rgba::new(54, 162, 235, 0.7);
pub const IMPACT_COLOR: Rgba = Rgba::new(255, 0, 0, 0.7);

/// Records split by the hazardous flag, each side in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition<'a> {
    pub hazardous: Vec<&'a AsteroidRecord>,
    pub non_hazardous: Vec<&'a AsteroidRecord>,
}

/// Stable split of `dataset` by `hazardous`. Every record lands on exactly one side.
pub fn partition(dataset: &Dataset) -> Partition<'_> {
    let (hazardous, non_hazardous): (Vec<_>, Vec<_>) =
        dataset.iter().partition(|r| r.hazardous);
    Partition {
        hazardous,
        non_hazardous,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: &'static str,
    pub count: usize,
    pub color: Rgba,
}

/// Hazardous vs non-hazardous counts.
#[derive(Debug, Clone, PartialEq)]
pub struct ProportionChart {
    pub title: &'static str,
    pub slices: [Slice; 2],
}

impl ProportionChart {
    pub fn total(&self) -> usize {
        self.slices.iter().map(|s| s.count).sum()
    }

    /// Share of slice `index` in percent; 0 when the chart is empty.
    pub fn percent(&self, index: usize) -> f64 {
        let total = self.total();
        match self.slices.get(index) {
            Some(slice) if total > 0 => slice.count as f64 * 100.0 / total as f64,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub label: String,
    pub value: f64,
}

/// Hazardous objects, name against speed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub title: &'static str,
    pub x_title: &'static str,
    pub y_title: &'static str,
    pub points: Vec<ScatterPoint>,
    pub color: Rgba,
}

/// Five-number summary used for the box shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumber {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Diameter distribution over the hazardous subset.
///
/// `mean`, `std_dev` and `summary` are `None` when there are no hazardous
/// objects; `std_dev` is the population standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadChart {
    pub title: &'static str,
    pub y_title: &'static str,
    pub values: Vec<f64>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub summary: Option<FiveNumber>,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Charts {
    pub proportion: ProportionChart,
    pub scatter: ScatterChart,
    pub spread: SpreadChart,
}

/// What the charts tab should show.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSet {
    /// No objects in the window; draw placeholders.
    Empty,
    Ready(Charts),
}

/// Builds every chart descriptor for `dataset`.
pub fn assemble(dataset: &Dataset) -> ChartSet {
    if dataset.is_empty() {
        return ChartSet::Empty;
    }
    let parts = partition(dataset);

    let proportion = ProportionChart {
        title: "Hazardous vs Non-Hazardous Asteroids",
        slices: [
            Slice {
                label: "Hazardous",
                count: parts.hazardous.len(),
                color: HAZARDOUS_COLOR,
            },
            Slice {
                label: "Non-Hazardous",
                count: parts.non_hazardous.len(),
                color: SAFE_COLOR,
            },
        ],
    };

    let scatter = ScatterChart {
        title: "Speed Distribution of Hazardous Asteroids",
        x_title: "Asteroid Name",
        y_title: "Speed (km/h)",
        points: parts
            .hazardous
            .iter()
            .map(|r| ScatterPoint {
                label: r.name.clone(),
                value: r.speed_kmh,
            })
            .collect(),
        color: SCATTER_COLOR,
    };

    let values: Vec<f64> = parts.hazardous.iter().map(|r| r.diameter_m).collect();
    let (mean, std_dev) = match mean_and_std_dev(&values) {
        Some((m, s)) => (Some(m), Some(s)),
        None => (None, None),
    };
    let spread = SpreadChart {
        title: "Diameter Distribution of Hazardous Asteroids",
        y_title: "Diameter (meters)",
        summary: five_number(&values),
        values,
        mean,
        std_dev,
        color: SPREAD_COLOR,
    };

    ChartSet::Ready(Charts {
        proportion,
        scatter,
        spread,
    })
}

fn mean_and_std_dev(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

// Linear interpolation between closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn five_number(values: &[f64]) -> Option<FiveNumber> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(FiveNumber {
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Map marker for a simulated impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactMarker {
    pub title: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    /// Marker size; the raw radius floored at 1 so tiny objects stay visible.
    pub size: f64,
    pub color: Rgba,
}

impl ImpactMarker {
    pub fn from_simulation(sim: &ImpactSimulation) -> Self {
        Self {
            title: "Asteroid Impact Simulation",
            latitude: sim.impact_location.latitude,
            longitude: sim.impact_location.longitude,
            size: sim.impact_radius.max(1.0),
            color: IMPACT_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::GeoPoint;

    fn record(name: &str, diameter_m: f64, speed_kmh: f64, hazardous: bool) -> AsteroidRecord {
        AsteroidRecord {
            name: name.to_string(),
            diameter_m,
            speed_kmh,
            distance_km: 10_000.0,
            orbiting_body: "Earth".to_string(),
            hazardous,
        }
    }

    fn mixed() -> Dataset {
        Dataset::from(vec![
            record("a", 10.0, 100.0, false),
            record("b", 20.0, 200.0, true),
            record("c", 30.0, 300.0, false),
            record("d", 40.0, 400.0, true),
            record("e", 60.0, 500.0, true),
        ])
    }

    #[test]
    fn partition_is_total_disjoint_and_stable() {
        let dataset = mixed();
        let parts = partition(&dataset);
        assert_eq!(parts.hazardous.len() + parts.non_hazardous.len(), dataset.len());
        let h: Vec<_> = parts.hazardous.iter().map(|r| r.name.as_str()).collect();
        let n: Vec<_> = parts.non_hazardous.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(h, vec!["b", "d", "e"]);
        assert_eq!(n, vec!["a", "c"]);
        assert!(parts.hazardous.iter().all(|r| r.hazardous));
        assert!(parts.non_hazardous.iter().all(|r| !r.hazardous));
    }

    #[test]
    fn empty_dataset_is_a_placeholder_state() {
        assert_eq!(assemble(&Dataset::default()), ChartSet::Empty);
    }

    #[test]
    fn assembles_all_three_charts() {
        let ChartSet::Ready(charts) = assemble(&mixed()) else {
            panic!("expected charts");
        };

        assert_eq!(charts.proportion.slices[0].count, 3);
        assert_eq!(charts.proportion.slices[1].count, 2);
        assert_eq!(charts.proportion.total(), 5);
        assert!((charts.proportion.percent(0) - 60.0).abs() < 1e-9);
        assert_eq!(charts.proportion.percent(7), 0.0);

        let labels: Vec<_> = charts.scatter.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "d", "e"]);
        assert_eq!(charts.scatter.points[2].value, 500.0);

        assert_eq!(charts.spread.values, vec![20.0, 40.0, 60.0]);
        assert_eq!(charts.spread.mean, Some(40.0));
        let sd = charts.spread.std_dev.unwrap();
        assert!((sd - (800.0f64 / 3.0).sqrt()).abs() < 1e-9);
        let summary = charts.spread.summary.unwrap();
        assert_eq!(summary.min, 20.0);
        assert_eq!(summary.q1, 30.0);
        assert_eq!(summary.median, 40.0);
        assert_eq!(summary.q3, 50.0);
        assert_eq!(summary.max, 60.0);
    }

    #[test]
    fn no_hazardous_objects_leaves_spread_statistics_undefined() {
        let dataset = Dataset::from(vec![record("a", 10.0, 100.0, false)]);
        let ChartSet::Ready(charts) = assemble(&dataset) else {
            panic!("expected charts");
        };
        assert!(charts.scatter.points.is_empty());
        assert!(charts.spread.values.is_empty());
        assert_eq!(charts.spread.mean, None);
        assert_eq!(charts.spread.std_dev, None);
        assert_eq!(charts.spread.summary, None);
    }

    #[test]
    fn marker_size_is_floored() {
        let sim = ImpactSimulation {
            impact_radius: -0.4,
            impact_speed: 10.0,
            impact_location: GeoPoint {
                latitude: 12.5,
                longitude: -40.0,
            },
        };
        let marker = ImpactMarker::from_simulation(&sim);
        assert_eq!(marker.size, 1.0);
        assert_eq!(marker.latitude, 12.5);
        assert_eq!(marker.longitude, -40.0);
        assert_eq!(marker.color, IMPACT_COLOR);
    }
}
