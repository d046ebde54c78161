use crate::cache::CachedFetch;
use crate::charts::{self, ChartSet, ImpactMarker};
use crate::error::Result;
use crate::extract::extract;
use crate::metrics::{simulate_impact, AggregateMetrics, ImpactSimulation};
use crate::models::{AsteroidRecord, Dataset, QueryWindow};
use crate::session::FeedCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum ViewMode {
    #[default]
    Dashboard,
    Charts,
}

impl ViewMode {
    /// Parses the `ui.default_view` setting; unknown names fall back to the dashboard.
    pub fn from_setting(value: &str) -> Self {
        if value.eq_ignore_ascii_case("charts") {
            ViewMode::Charts
        } else {
            ViewMode::Dashboard
        }
    }
}

/// Where the current render pass stands with the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Fetch failed; payload is the message shown to the user.
    Unavailable(String),
}

pub struct App {
    pub view_mode: ViewMode,
    pub window: QueryWindow,
    pub load_state: LoadState,
    pub tick_count: usize,
    pub should_quit: bool,

    // Current dataset and everything derived from it
    pub dataset: Dataset,
    pub names: Vec<String>,
    pub selected_index: usize,
    pub aggregates: Option<AggregateMetrics>,
    pub charts: ChartSet,
    pub simulation: Option<Result<ImpactSimulation>>,
    pub skipped_objects: usize,

    // Feed telemetry
    pub last_update: Option<Instant>,

    commands: mpsc::UnboundedSender<FeedCommand>,
    rng: StdRng,
}

impl App {
    pub fn new(
        window: QueryWindow,
        view_mode: ViewMode,
        commands: mpsc::UnboundedSender<FeedCommand>,
        rng: StdRng,
    ) -> Self {
        Self {
            view_mode,
            window,
            load_state: LoadState::Loading,
            tick_count: 0,
            should_quit: false,
            dataset: Dataset::default(),
            names: Vec::new(),
            selected_index: 0,
            aggregates: None,
            charts: ChartSet::Empty,
            simulation: None,
            skipped_objects: 0,
            last_update: None,
            commands,
            rng,
        }
    }

    /// Kicks off the first fetch for the configured window.
    pub fn start(&mut self) {
        self.send(FeedCommand::Load(self.window));
    }

    fn send(&mut self, command: FeedCommand) {
        self.load_state = LoadState::Loading;
        if self.commands.send(command).is_err() {
            warn!("Session worker is gone; cannot fetch {}", self.window);
            self.load_state = LoadState::Unavailable("Feed worker stopped".to_string());
        }
    }

    pub fn on_tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    /// Replaces the dataset with the outcome of a fetch.
    ///
    /// Outcomes for a window other than the current one are stale and ignored.
    pub fn on_feed_loaded(&mut self, window: QueryWindow, outcome: CachedFetch, at: Instant) {
        if window != self.window {
            return;
        }
        self.last_update = Some(at);

        match outcome {
            Ok(response) => {
                let extraction = extract(&response);
                self.skipped_objects = extraction.failures.len();
                self.set_dataset(extraction.dataset);
                self.load_state = LoadState::Ready;
                info!(
                    "Loaded {} objects for {} ({} skipped)",
                    self.dataset.len(),
                    window,
                    self.skipped_objects
                );
            }
            Err(e) => {
                self.set_dataset(Dataset::default());
                self.skipped_objects = 0;
                self.load_state = LoadState::Unavailable(e.to_string());
            }
        }
    }

    fn set_dataset(&mut self, dataset: Dataset) {
        self.names = dataset.unique_names().into_iter().map(str::to_string).collect();
        self.aggregates = AggregateMetrics::from_dataset(&dataset).ok();
        self.charts = charts::assemble(&dataset);
        self.dataset = dataset;
        self.selected_index = 0;
        self.resimulate();
    }

    /// The record behind the selected name (first occurrence).
    pub fn selected_record(&self) -> Option<&AsteroidRecord> {
        self.names
            .get(self.selected_index)
            .and_then(|name| self.dataset.find_by_name(name))
    }

    /// Draws a fresh simulation for the current selection.
    pub fn resimulate(&mut self) {
        self.simulation = match self.names.get(self.selected_index) {
            Some(name) => self
                .dataset
                .find_by_name(name)
                .map(|record| simulate_impact(record, &mut self.rng)),
            None => None,
        };
    }

    pub fn impact_marker(&self) -> Option<ImpactMarker> {
        match &self.simulation {
            Some(Ok(sim)) => Some(ImpactMarker::from_simulation(sim)),
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.view_mode = ViewMode::Dashboard,
            KeyCode::Char('2') => self.view_mode = ViewMode::Charts,
            KeyCode::Tab => {
                self.view_mode = match self.view_mode {
                    ViewMode::Dashboard => ViewMode::Charts,
                    ViewMode::Charts => ViewMode::Dashboard,
                }
            }
            // One fetch at a time: ignore reloads until the current one lands.
            KeyCode::Char('r') if self.load_state != LoadState::Loading => {
                self.send(FeedCommand::Reload(self.window));
            }
            KeyCode::Char(' ') => self.resimulate(),
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.names.is_empty() {
                    self.selected_index = (self.selected_index + 1) % self.names.len();
                    self.resimulate();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.names.is_empty() {
                    self.selected_index = self
                        .selected_index
                        .checked_sub(1)
                        .unwrap_or(self.names.len() - 1);
                    self.resimulate();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, FeedError};
    use crate::models::FeedResponse;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use serde_json::json;
    use std::sync::Arc;

    fn window() -> QueryWindow {
        QueryWindow::starting_on(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), 7).unwrap()
    }

    fn app() -> (App, mpsc::UnboundedReceiver<FeedCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(window(), ViewMode::Dashboard, tx, StdRng::seed_from_u64(9));
        (app, rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn neo(name: &str, diameter: f64, kmh: &str, hazardous: bool) -> serde_json::Value {
        json!({
            "name": name,
            "estimated_diameter": { "meters": { "estimated_diameter_max": diameter } },
            "is_potentially_hazardous_asteroid": hazardous,
            "close_approach_data": [{
                "relative_velocity": { "kilometers_per_hour": kmh },
                "miss_distance": { "kilometers": "1000" },
                "orbiting_body": "Earth"
            }]
        })
    }

    fn loaded(objects: Vec<serde_json::Value>) -> CachedFetch {
        let response: FeedResponse =
            serde_json::from_value(json!({ "near_earth_objects": { "2024-05-01": objects } }))
                .unwrap();
        Ok(Arc::new(response))
    }

    #[test]
    fn start_requests_the_window() {
        let (mut app, mut rx) = app();
        app.start();
        assert_eq!(rx.try_recv().unwrap(), FeedCommand::Load(window()));
        assert_eq!(app.load_state, LoadState::Loading);
    }

    #[test]
    fn loaded_feed_populates_metrics_and_selection() {
        let (mut app, _rx) = app();
        app.on_feed_loaded(
            window(),
            loaded(vec![
                neo("A", 50.0, "36000", false),
                neo("B", 200.0, "72000", true),
                json!({ "name": "broken" }),
            ]),
            Instant::now(),
        );

        assert_eq!(app.load_state, LoadState::Ready);
        assert_eq!(app.skipped_objects, 1);
        assert_eq!(app.names, vec!["A", "B"]);
        let metrics = app.aggregates.unwrap();
        assert_eq!(metrics.count, 2);
        assert_eq!(metrics.mean_diameter, 125.0);
        assert!(matches!(app.charts, ChartSet::Ready(_)));
        assert_eq!(app.selected_record().unwrap().name, "A");
        assert!(matches!(app.simulation, Some(Ok(_))));
        assert!(app.impact_marker().is_some());

        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected_record().unwrap().name, "B");
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected_record().unwrap().name, "A");
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected_record().unwrap().name, "B");
    }

    #[test]
    fn invalid_magnitude_only_affects_that_selection() {
        let (mut app, _rx) = app();
        app.on_feed_loaded(
            window(),
            loaded(vec![neo("zero", 0.0, "100", false), neo("fine", 10.0, "100", true)]),
            Instant::now(),
        );

        assert_eq!(app.load_state, LoadState::Ready);
        assert!(matches!(
            app.simulation,
            Some(Err(Error::InvalidMagnitude { field: "diameter_m", .. }))
        ));
        assert!(app.impact_marker().is_none());

        app.handle_key(key(KeyCode::Char('j')));
        assert!(matches!(app.simulation, Some(Ok(_))));
    }

    #[test]
    fn empty_window_shows_placeholders() {
        let (mut app, _rx) = app();
        app.on_feed_loaded(window(), loaded(vec![]), Instant::now());
        assert_eq!(app.load_state, LoadState::Ready);
        assert!(app.aggregates.is_none());
        assert_eq!(app.charts, ChartSet::Empty);
        assert!(app.simulation.is_none());

        // Navigation on an empty list is a no-op.
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn failed_fetch_marks_feed_unavailable() {
        let (mut app, _rx) = app();
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        app.on_feed_loaded(
            window(),
            Err(Arc::new(FeedError::unavailable(window(), err))),
            Instant::now(),
        );
        match &app.load_state {
            LoadState::Unavailable(msg) => assert!(msg.contains("feed unavailable")),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn stale_window_is_ignored() {
        let (mut app, _rx) = app();
        let other_start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let other = QueryWindow::starting_on(other_start, 7).unwrap();
        app.on_feed_loaded(other, loaded(vec![neo("A", 1.0, "1", false)]), Instant::now());
        assert_eq!(app.load_state, LoadState::Loading);
        assert!(app.dataset.is_empty());
    }

    #[test]
    fn reload_waits_for_the_current_fetch() {
        let (mut app, mut rx) = app();
        app.start();
        let _ = rx.try_recv();

        app.handle_key(key(KeyCode::Char('r')));
        assert!(rx.try_recv().is_err());

        app.on_feed_loaded(window(), loaded(vec![]), Instant::now());
        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(rx.try_recv().unwrap(), FeedCommand::Reload(window()));
        assert_eq!(app.load_state, LoadState::Loading);
    }

    #[test]
    fn view_switching() {
        let (mut app, _rx) = app();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.view_mode, ViewMode::Charts);
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.view_mode, ViewMode::Dashboard);
        assert_eq!(ViewMode::from_setting("charts"), ViewMode::Charts);
        assert_eq!(ViewMode::from_setting("radar"), ViewMode::Dashboard);

        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
