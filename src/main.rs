use color_eyre::Result;
use lifeline_tui::{
    api::ResourceClient,
    app::App,
    config::Config,
    connectivity::{self, ConnectivityProbe, TcpProbe},
    events::EventHandler,
    location::LocationProvider,
    logging,
    runtime::{self, Services},
    ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc, time::Duration};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    color_eyre::install()?;
    install_panic_hook();

    let config = Config::load();
    let services = Services {
        location: Arc::new(LocationProvider::from_config(&config.location)),
        client: Arc::new(ResourceClient::from_config(&config.api)?),
    };

    // Startup connectivity check happens before anything can issue a request.
    let probe: Arc<dyn ConnectivityProbe> = Arc::new(TcpProbe::from_config(&config.connectivity));
    let mut app = App::new();
    let startup = runtime::startup(probe.as_ref(), &services, &mut app).await;

    // Ready terminal and event stream
    let mut terminal = setup_terminal()?;
    let mut events = EventHandler::new(config.ui.tick_rate_ms);

    let _monitor = connectivity::spawn_monitor(
        probe,
        Duration::from_secs(config.connectivity.probe_interval_seconds),
        startup.online,
        events.tx.clone(),
    );

    // Main loop
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &app))?;

        match events.next().await {
            Some(event) => {
                if let Some(effect) = app.update(event) {
                    runtime::dispatch(effect, &services, &events.tx);
                }
            }
            None => break,
        }
    }

    restore_terminal(terminal)?;
    info!("Shut down cleanly.");
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
        // Lookup tasks run on worker threads and are reported as TaskFailed;
        // only a panic on the UI thread tears the terminal down.
        if std::thread::current().name() != Some("main") {
            error!("Background task panicked: {}", panic_info);
            return;
        }
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
