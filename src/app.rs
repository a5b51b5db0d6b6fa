use crate::connectivity::ConnectivitySignal;
use crate::events::Event;
use crate::models::Coordinates;
use crate::render::{present, RenderedList};
use crate::state::{transition, Command, UiState, ViewEvent};
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, error, info};

/// Outside work the main loop must start on behalf of [`App`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    AcquireLocation { generation: u64 },
    FetchResources { generation: u64, coords: Coordinates },
}

/// The view controller: owns the [`UiState`] and turns events into state
/// transitions and effects.
#[derive(Default)]
pub struct App {
    pub state: UiState,
    /// Cards for the current results, rebuilt whenever results arrive.
    pub rendered: Option<RenderedList>,
    pub selected_index: usize,
    pub tick_count: usize,
    pub should_quit: bool,

    pub last_coords: Option<Coordinates>,
    pub last_lookup: Option<DateTime<Local>>,

    // Bumped by every user action and by connection loss. Resolutions
    // tagged with an older value are dropped.
    generation: u64,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Feeds one event through the state machine.
    pub fn update(&mut self, event: Event) -> Option<Effect> {
        match event {
            Event::Tick => {
                self.tick_count = self.tick_count.wrapping_add(1);
                None
            }
            Event::Input(key) => self.handle_key(key),
            Event::LocationResolved { generation, result } => {
                if self.is_stale(generation) {
                    return None;
                }
                let event = match result {
                    Ok(coords) => {
                        self.last_coords = Some(coords);
                        ViewEvent::LocationAcquired(coords)
                    }
                    Err(e) => ViewEvent::LocationFailed(e),
                };
                self.apply(event)
            }
            Event::ResourcesResolved { generation, result } => {
                if self.is_stale(generation) {
                    return None;
                }
                let event = match result {
                    Ok(resources) => {
                        info!("Lookup returned {} resources", resources.len());
                        self.last_lookup = Some(Local::now());
                        ViewEvent::ResourcesLoaded(resources)
                    }
                    Err(e) => {
                        error!("Resource lookup failed: {}", e);
                        ViewEvent::ResourcesFailed(e)
                    }
                };
                self.apply(event)
            }
            Event::TaskFailed { generation, detail } => {
                if self.is_stale(generation) {
                    return None;
                }
                error!("Lookup task failed: {}", detail);
                self.apply(ViewEvent::TaskFailed)
            }
            Event::Connectivity(signal) => match signal {
                ConnectivitySignal::AbsentAtLoad => self.apply(ViewEvent::NoConnectionAtLoad),
                ConnectivitySignal::Lost => {
                    self.generation += 1;
                    self.apply(ViewEvent::ConnectionLost)
                }
                ConnectivitySignal::Restored => self.apply(ViewEvent::ConnectionRestored),
            },
        }
    }

    /// Starts a new lookup chain, superseding any in flight.
    pub fn trigger(&mut self) -> Option<Effect> {
        self.generation += 1;
        info!("Lookup requested (generation {})", self.generation);
        self.apply(ViewEvent::ActionTriggered)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Effect> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('e') => return self.trigger(),
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.card_count();
                if len > 0 {
                    self.selected_index = (self.selected_index + 1) % len;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let len = self.card_count();
                if len > 0 {
                    self.selected_index = self.selected_index.checked_sub(1).unwrap_or(len - 1);
                }
            }
            _ => {}
        }
        None
    }

    fn card_count(&self) -> usize {
        self.rendered.as_ref().map_or(0, |r| r.cards().len())
    }

    fn is_stale(&self, generation: u64) -> bool {
        let stale = generation != self.generation;
        if stale {
            debug!(
                "Dropping result from generation {} (current {})",
                generation, self.generation
            );
        }
        stale
    }

    fn apply(&mut self, event: ViewEvent) -> Option<Effect> {
        let (next, command) = transition(&self.state, event);

        if next != self.state {
            if let UiState::Offline { reason } = &next {
                info!("Switched to offline mode: {}", reason);
            }
            self.rendered = match &next {
                UiState::Results(result) => Some(present(result)),
                _ => None,
            };
            self.selected_index = 0;
            self.state = next;
        }

        let generation = self.generation;
        command.map(|cmd| match cmd {
            Command::AcquireLocation => Effect::AcquireLocation { generation },
            Command::FetchResources(coords) => Effect::FetchResources { generation, coords },
        })
    }
}
