//! Server configuration.
//!
//! Every setting can be given on the command line or through the environment.
//! `PORT` is read without a prefix so the relay runs unchanged on hosts that
//! assign the listening port that way.

use std::{num::NonZeroUsize, time::Duration};

use clap::Parser;

use crate::{
    domain::PayloadMode,
    infrastructure::dispatcher::{DEFAULT_WRITE_TIMEOUT, DispatcherConfig},
};

/// Port used when neither `--port` nor `PORT` is given
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "WebSocket message relay with broadcast fan-out", long_about = None)]
pub struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HIROBA_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Payload shape relayed by this deployment ("text" or "document")
    #[arg(long, env = "HIROBA_PAYLOAD", default_value_t = PayloadMode::Text)]
    pub payload: PayloadMode,

    /// Bound the broadcast queue; producers wait when it is full (unbounded if unset)
    #[arg(long, env = "HIROBA_QUEUE_CAPACITY")]
    pub queue_capacity: Option<NonZeroUsize>,

    /// Per-member write timeout during fan-out, in milliseconds
    #[arg(
        long,
        env = "HIROBA_WRITE_TIMEOUT_MS",
        default_value_t = DEFAULT_WRITE_TIMEOUT.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub write_timeout_ms: u64,
}

/// Resolved server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub payload_mode: PayloadMode,
    pub dispatcher: DispatcherConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            payload_mode: PayloadMode::default(),
            dispatcher: DispatcherConfig::default(),
        }
    }
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            payload_mode: args.payload,
            dispatcher: DispatcherConfig {
                queue_capacity: args.queue_capacity.map(NonZeroUsize::get),
                write_timeout: Duration::from_millis(args.write_timeout_ms),
            },
        }
    }
}
