//! Real-time WebSocket message relay.
//!
//! Clients connect to `/ws`, and every message one client sends is fanned out
//! to every connected client by a single broadcast dispatcher.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod bootstrap;
pub mod config;

pub use bootstrap::bootstrap;
pub use config::{Args, ServerConfig};
