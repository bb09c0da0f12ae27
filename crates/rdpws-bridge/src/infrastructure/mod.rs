//! WebSocket glue around the application layer.

pub mod ws_server;

pub use ws_server::{run_server, WsPeer};
