//! Shared utilities for the Hiroba relay: logging setup and time helpers.

pub mod logger;
pub mod time;
