//! Lifeline: find nearby emergency resources from the terminal.
//!
//! The flow is: acquire a position ([`location`]), POST it to the lookup
//! service ([`api`]), turn the answer into cards ([`render`]) and show them.
//! [`state`] holds the pure view state machine and [`app`] the controller
//! that drives it; any failure lands in offline mode.

pub mod api;
pub mod app;
pub mod config;
pub mod connectivity;
pub mod events;
pub mod location;
pub mod logging;
pub mod models;
pub mod render;
pub mod runtime;
pub mod state;
pub mod ui;
