use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";

/// Routes `tracing` output to `logs/lifeline.log`, rolled daily.
///
/// The terminal belongs to the TUI, so nothing is written to stdout. Keep the
/// returned guard alive for the life of the process or buffered lines are lost.
pub fn initialize_logging() -> WorkerGuard {
    // Create 'logs' directory if it doesn't exist
    let dir_result = std::fs::create_dir_all(LOG_DIR);

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, "lifeline.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    match dir_result {
        Ok(()) => tracing::info!("Logging initialized successfully."),
        Err(e) => tracing::warn!("Could not create {} directory: {}", LOG_DIR, e),
    }
    guard
}
