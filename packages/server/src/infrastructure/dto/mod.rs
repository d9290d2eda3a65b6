//! Data Transfer Objects (DTOs) for the relay.
//!
//! - `http`: HTTP API response DTOs
//! - `conversion`: Domain Model → DTO conversions

pub mod conversion;
pub mod http;
