//! Event types and the main event loop driver for Lifeline.
//!
//! This module defines the [`Event`] enum (keyboard input, ticks, results of
//! background lookups and connectivity signals) and the [`EventHandler`],
//! which runs a background task that polls crossterm for key events and
//! emits periodic [`Event::Tick`]s. The main loop in `main.rs` receives events
//! via [`EventHandler::next`]; lookup tasks and the connectivity monitor send
//! events via [`EventHandler::tx`].

use crate::api::FetchError;
use crate::connectivity::ConnectivitySignal;
use crate::location::LocationError;
use crate::models::{Coordinates, ResourceQueryResult};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::error;

/// Events processed by the application event loop.
///
/// Lookup results carry the generation of the user action that started them
/// so [`App`](crate::app::App) can drop stale ones.
#[derive(Debug)]
pub enum Event {
    /// Periodic tick used for the loading spinner.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// The location request finished.
    LocationResolved {
        generation: u64,
        result: Result<Coordinates, LocationError>,
    },
    /// The resource lookup finished.
    ResourcesResolved {
        generation: u64,
        result: Result<ResourceQueryResult, FetchError>,
    },
    /// A lookup task died before it could report back.
    TaskFailed { generation: u64, detail: String },
    /// Reachability changed.
    Connectivity(ConnectivitySignal),
}

/// Multiplexes terminal input and ticks into a single event stream.
///
/// Holds an unbounded channel: the sender ([`tx`](EventHandler::tx)) can be
/// cloned and given to other tasks, while the receiver is consumed by
/// [`next`](EventHandler::next) in the main loop. A background task polls
/// crossterm with a timeout and sends [`Event::Input`] on key press and
/// [`Event::Tick`] at the configured interval.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

/// Where terminal input comes from. [`CrosstermInput`] reads the real
/// terminal; both calls may block the calling thread.
pub trait InputSource: Send + 'static {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read(&mut self) -> io::Result<CrosstermEvent>;
}

pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<CrosstermEvent> {
        event::read()
    }
}

impl EventHandler {
    /// Creates a new event handler reading the terminal.
    ///
    /// # Arguments
    ///
    /// * `tick_rate_ms` - Interval in milliseconds between [`Event::Tick`] emissions.
    pub fn new(tick_rate_ms: u64) -> Self {
        Self::with_source(tick_rate_ms, CrosstermInput)
    }

    /// Creates a new event handler and starts the input/tick loop.
    ///
    /// Polling blocks, so the loop runs on tokio's blocking pool and never
    /// holds a runtime worker. It stops when the input source fails or when
    /// the receiving side has been dropped.
    pub fn with_source(tick_rate_ms: u64, source: impl InputSource) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();
        let tick_rate = Duration::from_millis(tick_rate_ms);

        tokio::task::spawn_blocking(move || pump(source, tick_rate, event_tx));

        Self { tx, rx }
    }

    /// Receives the next event from the channel.
    ///
    /// Returns `None` when all senders have been dropped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

fn pump(mut source: impl InputSource, tick_rate: Duration, event_tx: mpsc::UnboundedSender<Event>) {
    let mut last_tick = Instant::now();
    loop {
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_secs(0));
        match source.poll(timeout) {
            Ok(true) => match source.read() {
                Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    if event_tx.send(Event::Input(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Terminal read failed: {}", e);
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                error!("Terminal poll failed: {}", e);
                break;
            }
        }
        if last_tick.elapsed() >= tick_rate {
            if event_tx.send(Event::Tick).is_err() {
                break;
            }
            last_tick = Instant::now();
        }
    }
}
