//! Configuration and browser-facing request types.  No I/O, no async.

pub mod config;
pub mod connect;

pub use config::BridgeConfig;
pub use connect::{ConnectParams, ConnectRequest, PerfPreset};
