//! The view state machine.
//!
//! [`transition`] is a pure function of (current state, event). It yields the
//! next [`UiState`] and, when the flow has to reach outside, a [`Command`] for
//! the controller to execute. Banner text and panel visibility derive from
//! the state alone, so the whole machine can be tested without a terminal.

use crate::api::FetchError;
use crate::location::LocationError;
use crate::models::{Coordinates, ResourceQueryResult};

pub const NO_CONNECTION_AT_LOAD: &str = "No internet connection";
pub const CONNECTION_LOST: &str = "Connection lost";
pub const TASK_FAILED: &str = "Something went wrong. Press Enter to try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingPhase {
    Locating,
    Fetching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum UiState {
    #[default]
    Idle,
    Loading(LoadingPhase),
    Results(ResourceQueryResult),
    Offline { reason: String },
    ErrorMessage { text: String, severity: Severity },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusBanner {
    pub text: String,
    pub severity: Severity,
}

impl StatusBanner {
    fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

/// Which content panels are visible. At most one is set; the status banner
/// is not a panel and can show next to loading or results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Panels {
    pub loading: bool,
    pub results: bool,
    pub offline: bool,
}

#[derive(Debug)]
pub enum ViewEvent {
    ActionTriggered,
    LocationAcquired(Coordinates),
    LocationFailed(LocationError),
    ResourcesLoaded(ResourceQueryResult),
    ResourcesFailed(FetchError),
    TaskFailed,
    NoConnectionAtLoad,
    ConnectionLost,
    ConnectionRestored,
}

/// Outside work a transition asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    AcquireLocation,
    FetchResources(Coordinates),
}

pub fn offline_message(reason: &str) -> String {
    format!("{} - Switched to offline mode", reason)
}

impl UiState {
    fn offline(reason: impl Into<String>) -> Self {
        UiState::Offline {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> Option<StatusBanner> {
        match self {
            UiState::Idle => None,
            UiState::Loading(LoadingPhase::Locating) => {
                Some(StatusBanner::new("Getting your location...", Severity::Info))
            }
            UiState::Loading(LoadingPhase::Fetching) => Some(StatusBanner::new(
                "Location obtained. Fetching resources...",
                Severity::Info,
            )),
            UiState::Results(result) => Some(StatusBanner::new(
                format!("Found {} resources nearby", result.len()),
                Severity::Success,
            )),
            UiState::Offline { reason } => {
                Some(StatusBanner::new(offline_message(reason), Severity::Error))
            }
            UiState::ErrorMessage { text, severity } => {
                Some(StatusBanner::new(text.clone(), *severity))
            }
        }
    }

    pub fn panels(&self) -> Panels {
        match self {
            UiState::Loading(_) => Panels {
                loading: true,
                ..Panels::default()
            },
            UiState::Results(_) => Panels {
                results: true,
                ..Panels::default()
            },
            UiState::Offline { .. } => Panels {
                offline: true,
                ..Panels::default()
            },
            UiState::Idle | UiState::ErrorMessage { .. } => Panels::default(),
        }
    }
}

pub fn transition(state: &UiState, event: ViewEvent) -> (UiState, Option<Command>) {
    match event {
        ViewEvent::ActionTriggered => (
            UiState::Loading(LoadingPhase::Locating),
            Some(Command::AcquireLocation),
        ),
        ViewEvent::LocationAcquired(coords) => (
            UiState::Loading(LoadingPhase::Fetching),
            Some(Command::FetchResources(coords)),
        ),
        ViewEvent::LocationFailed(err) => (UiState::offline(err.reason()), None),
        ViewEvent::ResourcesLoaded(result) => (UiState::Results(result), None),
        ViewEvent::ResourcesFailed(err) => (UiState::offline(err.reason()), None),
        ViewEvent::TaskFailed => (
            UiState::ErrorMessage {
                text: TASK_FAILED.to_string(),
                severity: Severity::Error,
            },
            None,
        ),
        ViewEvent::NoConnectionAtLoad => (UiState::offline(NO_CONNECTION_AT_LOAD), None),
        ViewEvent::ConnectionLost => (UiState::offline(CONNECTION_LOST), None),
        // Reconnecting never leaves offline mode on its own.
        ViewEvent::ConnectionRestored => (state.clone(), None),
    }
}
