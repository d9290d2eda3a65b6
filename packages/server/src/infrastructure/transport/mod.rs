//! Transport adapters implementing the connection seam.

pub mod websocket;

pub use websocket::{WebSocketConnection, WebSocketReader, split_socket};
