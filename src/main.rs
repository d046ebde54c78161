use color_eyre::Result;
use neo_dash::{
    api::NeoWsClient,
    app::{App, ViewMode},
    config::Config,
    events::{Event, EventHandler},
    logging,
    models::QueryWindow,
    session, ui,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    color_eyre::install()?;
    // After color-eyre so its report hook runs once the terminal is restored.
    install_panic_hook();

    let config = Config::load();
    let client = NeoWsClient::from_config(&config.feed, config.api_key()?)?;
    let window = QueryWindow::starting_today(config.feed.window_days)?;
    info!("Starting NEO dashboard for {}", window);

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut event_handler = EventHandler::new(config.ui.tick_rate_ms);
    let session = session::spawn(client, event_handler.tx.clone());
    let mut app = App::new(
        window,
        ViewMode::from_setting(&config.ui.default_view),
        session.commands.clone(),
        StdRng::from_entropy(),
    );
    app.start();

    // Main loop
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &app))?;

        match event_handler.next().await {
            Some(Event::Tick) => app.on_tick(),
            Some(Event::Input(key)) => app.handle_key(key),
            Some(Event::FeedLoaded {
                window,
                outcome,
                timestamp,
            }) => app.on_feed_loaded(window, outcome, timestamp),
            None => break,
        }
    }

    restore_terminal(terminal)?;
    info!("Shutting down.");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        )
        .ok();
        original_hook(panic_info);
    }));
}
