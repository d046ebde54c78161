//! TUI rendering for the NEO dashboard
//!
//! This module turns [`App`] state and the chart descriptors from
//! [`crate::charts`] into `ratatui` widgets: the metrics row, the object list,
//! the impact map, record details and the three statistics charts.

use crate::app::{App, LoadState, ViewMode};
use crate::charts::{
    ChartSet, ProportionChart, Rgba, ScatterChart, SpreadChart, HAZARDOUS_COLOR,
};
use ratatui::{
    prelude::*,
    widgets::{canvas::*, *}, // Imports Map, Circle, Chart, BarChart, etc.
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const HEADING: Color = Color::Rgb(0xf5, 0x65, 0x31);

/// Renders one frame of the TUI based on current application state.
///
/// While the first fetch is in flight a loading screen is drawn; a failed
/// fetch gets the "data unavailable" screen. Otherwise the header, the view
/// chosen by [`App::view_mode`] and the key help are drawn.
///
/// # Arguments
///
/// * `f` - The ratatui frame to draw into (from `terminal.draw()`).
/// * `app` - Current application state (dataset, selection, view mode, etc.).
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.size());

    render_header(f, app, chunks[0]);
    render_help(f, chunks[2]);

    match &app.load_state {
        LoadState::Loading if app.last_update.is_none() => {
            render_loading_screen(f, app, chunks[1])
        }
        LoadState::Unavailable(reason) => render_unavailable(f, reason, chunks[1]),
        _ => match app.view_mode {
            ViewMode::Dashboard => render_dashboard_view(f, app, chunks[1]),
            ViewMode::Charts => render_charts_view(f, app, chunks[1]),
        },
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let tab = |label: &'static str, mode: ViewMode| {
        if app.view_mode == mode {
            Span::styled(label, Style::default().fg(Color::Black).bg(Color::Cyan))
        } else {
            Span::styled(label, Style::default().fg(Color::DarkGray))
        }
    };

    let status = match app.load_state {
        LoadState::Loading => Span::styled(
            format!(" {} fetching ", SPINNER[app.tick_count % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        ),
        LoadState::Ready => Span::styled(" LIVE ", Style::default().fg(Color::Green)),
        LoadState::Unavailable(_) => Span::styled(" OFFLINE ", Style::default().fg(Color::Red)),
    };

    let line = Line::from(vec![
        Span::styled(
            " Asteroid Impact Simulator ",
            Style::default().fg(HEADING).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        tab(" 1 Dashboard ", ViewMode::Dashboard),
        Span::raw(" "),
        tab(" 2 Charts ", ViewMode::Charts),
        Span::raw(" │ "),
        Span::styled(app.window.to_string(), Style::default().fg(Color::Magenta)),
        Span::raw(" │"),
        status,
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        " ↑/↓ select   Space re-roll impact   Tab/1/2 views   r reload   q quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, area);
}

/// Shown until the first fetch for the window comes back.
fn render_loading_screen(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let msg = Paragraph::new(format!(
        "{} Fetching near-Earth objects for {}",
        SPINNER[app.tick_count % SPINNER.len()],
        app.window
    ))
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::Cyan))
    .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(msg, chunks[1]);
}

/// Fatal-to-the-pass feed failure: say so instead of drawing empty widgets.
fn render_unavailable(f: &mut Frame, reason: &str, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "Asteroid data unavailable",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(reason, Style::default().fg(Color::DarkGray))),
        Line::from(""),
        Line::from("Press r to try again."),
    ];
    let p = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Feed ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .padding(Padding::new(2, 2, 1, 1)),
        );
    f.render_widget(p, area);
}

/// Dashboard view: metrics row on top, object list (30%) beside the impact
/// map and the selected object's details (70%).
fn render_dashboard_view(f: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);
    render_metrics(f, app, rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[1]);
    render_object_list(f, app, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(10)])
        .split(chunks[1]);
    render_impact_map(f, app, main_chunks[0]);
    render_details(f, app, main_chunks[1]);
}

fn render_metrics(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let values = match &app.aggregates {
        Some(m) => [
            m.count.to_string(),
            format!("{:.2}", m.mean_diameter),
            format!("{:.2}", m.mean_speed),
        ],
        // Means over nothing are undefined, not zero.
        None => ["0".to_string(), "n/a".to_string(), "n/a".to_string()],
    };
    let labels = [
        " Total Asteroids ",
        " Average Diameter (m) ",
        " Average Speed (km/h) ",
    ];

    for ((label, value), area) in labels.iter().zip(values).zip(columns.iter()) {
        let p = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(*label)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
        f.render_widget(p, *area);
    }
}

fn render_object_list(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .names
        .iter()
        .map(|name| {
            let hazardous = app
                .dataset
                .find_by_name(name)
                .map(|r| r.hazardous)
                .unwrap_or(false);
            let marker = if hazardous {
                Span::styled(" ▲ ", Style::default().fg(rgb(HAZARDOUS_COLOR)))
            } else {
                Span::styled(" · ", Style::default().fg(Color::DarkGray))
            };
            ListItem::new(Line::from(vec![marker, Span::raw(name.as_str())]))
        })
        .collect();

    let mut title = format!(" Near-Earth Objects ({}) ", app.names.len());
    if app.skipped_objects > 0 {
        title.push_str(&format!("⚠ {} skipped ", app.skipped_objects));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .bg(Color::Rgb(30, 30, 60))
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default().with_selected(if app.names.is_empty() {
        None
    } else {
        Some(app.selected_index)
    });
    f.render_stateful_widget(list, area, &mut state);
}

fn render_impact_map(f: &mut Frame, app: &App, area: Rect) {
    let marker = app.impact_marker();
    let title = match &app.simulation {
        Some(Err(e)) => Line::from(Span::styled(
            format!(" Impact simulation failed: {} ", e),
            Style::default().fg(Color::Red),
        )),
        _ => Line::from(Span::styled(
            format!(
                " {} ",
                marker.map_or("Asteroid Impact Simulation", |m| m.title)
            ),
            Style::default().fg(Color::Rgb(0xdb, 0x60, 0x60)),
        )),
    };

    let canvas = Canvas::default()
        .block(Block::bordered().title(title))
        .marker(symbols::Marker::Braille)
        .x_bounds([-180.0, 180.0])
        .y_bounds([-90.0, 90.0])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::Rgb(80, 80, 80),
                resolution: MapResolution::High,
            });
            ctx.layer();

            if let Some(m) = &marker {
                // Marker size is in screen points; halve it for degrees.
                ctx.draw(&Circle {
                    x: m.longitude,
                    y: m.latitude,
                    radius: m.size / 2.0,
                    color: rgb(m.color),
                });
                ctx.print(
                    m.longitude,
                    m.latitude,
                    Line::from(Span::styled(
                        "✸",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )),
                );
            }
        });
    f.render_widget(canvas, area);
}

fn render_details(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Asteroid Details ")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1));

    let Some(record) = app.selected_record() else {
        let p = Paragraph::new("No near-Earth objects in this window.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let field = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, bold), Span::raw(value)])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            record.name.as_str(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        field("Diameter:              ", format!("{} meters", record.diameter_m)),
        field("Speed:                 ", format!("{} km/h", record.speed_kmh)),
        field("Distance from Earth:   ", format!("{} km", record.distance_km)),
        field("Orbiting Body:         ", record.orbiting_body.clone()),
        field(
            "Potentially Hazardous: ",
            if record.hazardous { "Yes" } else { "No" }.to_string(),
        ),
    ];
    if let Some(Ok(sim)) = &app.simulation {
        lines.push(field(
            "Impact:                ",
            format!(
                "radius {:.2} │ speed factor {:.2} │ at ({:.1}, {:.1})",
                sim.impact_radius,
                sim.impact_speed,
                sim.impact_location.latitude,
                sim.impact_location.longitude
            ),
        ));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Charts view: proportion and diameter spread side by side, speed scatter below.
fn render_charts_view(f: &mut Frame, app: &App, area: Rect) {
    let charts = match &app.charts {
        ChartSet::Ready(charts) => charts,
        ChartSet::Empty => {
            let p = Paragraph::new("No near-Earth objects in this window; nothing to chart.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::bordered().title(" Charts "));
            f.render_widget(p, area);
            return;
        }
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    render_proportion(f, &charts.proportion, top[0]);
    render_spread(f, &charts.spread, top[1]);
    render_scatter(f, &charts.scatter, rows[1]);
}

fn render_proportion(f: &mut Frame, chart: &ProportionChart, area: Rect) {
    let bars: Vec<Bar> = chart
        .slices
        .iter()
        .enumerate()
        .map(|(i, slice)| {
            Bar::default()
                .value(slice.count as u64)
                .label(Line::from(slice.label))
                .text_value(format!("{} ({:.1}%)", slice.count, chart.percent(i)))
                .style(Style::default().fg(rgb(slice.color)))
                .value_style(Style::default().fg(Color::Black).bg(rgb(slice.color)))
        })
        .collect();

    let bar_chart = BarChart::default()
        .block(Block::bordered().title(chart.title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(14)
        .bar_gap(3);
    f.render_widget(bar_chart, area);
}

fn render_scatter(f: &mut Frame, chart: &ScatterChart, area: Rect) {
    let block = Block::bordered().title(chart.title);
    if chart.points.is_empty() {
        let p = Paragraph::new("No hazardous objects in this window.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let data: Vec<(f64, f64)> = chart
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect();
    let (lo, hi) = bounds(chart.points.iter().map(|p| p.value));
    let last = chart.points.len() - 1;

    let x_labels: Vec<Span> = [0, last / 2, last]
        .iter()
        .map(|&i| Span::raw(short(&chart.points[i].label, 14)))
        .collect();

    let datasets = vec![Dataset::default()
        .name(chart.y_title)
        .marker(symbols::Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(rgb(chart.color)))
        .data(&data)];

    let widget = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(chart.x_title)
                .bounds([-0.5, last as f64 + 0.5])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_title)
                .bounds([lo, hi])
                .labels(axis_labels(lo, hi)),
        );
    f.render_widget(widget, area);
}

fn render_spread(f: &mut Frame, chart: &SpreadChart, area: Rect) {
    let block = Block::bordered().title(chart.title);
    let (Some(s), Some(mean), Some(sd)) = (chart.summary, chart.mean, chart.std_dev) else {
        let p = Paragraph::new("No hazardous objects in this window.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    };

    let box_outline = [
        (-0.3, s.q1),
        (0.3, s.q1),
        (0.3, s.q3),
        (-0.3, s.q3),
        (-0.3, s.q1),
    ];
    let median = [(-0.3, s.median), (0.3, s.median)];
    let lower_whisker = [(0.0, s.min), (0.0, s.q1)];
    let upper_whisker = [(0.0, s.q3), (0.0, s.max)];
    let sd_span = [(0.55, mean - sd), (0.55, mean + sd)];
    let mean_point = [(0.55, mean)];
    let values: Vec<(f64, f64)> = chart.values.iter().map(|&v| (-0.6, v)).collect();

    let color = rgb(chart.color);

    let datasets = vec![
        Dataset::default()
            .name(format!("box {:.1}–{:.1}", s.q1, s.q3))
            .graph_type(GraphType::Line)
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(color))
            .data(&box_outline),
        Dataset::default()
            .name(format!("median {:.1}", s.median))
            .graph_type(GraphType::Line)
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(Color::White))
            .data(&median),
        Dataset::default()
            .graph_type(GraphType::Line)
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(color))
            .data(&lower_whisker),
        Dataset::default()
            .graph_type(GraphType::Line)
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(color))
            .data(&upper_whisker),
        Dataset::default()
            .name(format!("mean {:.1} ± {:.1}", mean, sd))
            .graph_type(GraphType::Line)
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(Color::Yellow))
            .data(&sd_span),
        Dataset::default()
            .graph_type(GraphType::Scatter)
            .marker(symbols::Marker::Block)
            .style(Style::default().fg(Color::Yellow))
            .data(&mean_point),
        Dataset::default()
            .graph_type(GraphType::Scatter)
            .marker(symbols::Marker::Dot)
            .style(Style::default().fg(color))
            .data(&values),
    ];

    let (lo, hi) = bounds([s.min, s.max, mean - sd, mean + sd].into_iter());
    let widget = Chart::new(datasets)
        .block(block)
        .x_axis(Axis::default().bounds([-1.0, 1.0]))
        .y_axis(
            Axis::default()
                .title(chart.y_title)
                .bounds([lo, hi])
                .labels(axis_labels(lo, hi)),
        );
    f.render_widget(widget, area);
}

/// Padded axis bounds around a set of values.
fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let pad = ((hi - lo) * 0.1).max(1.0);
    ((lo - pad).max(0.0), hi + pad)
}

fn axis_labels(lo: f64, hi: f64) -> Vec<Span<'static>> {
    [lo, (lo + hi) / 2.0, hi]
        .iter()
        .map(|v| Span::raw(format!("{:.0}", v)))
        .collect()
}

fn short(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let mut s: String = label.chars().take(max - 1).collect();
        s.push('…');
        s
    }
}

fn rgb(c: Rgba) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}
