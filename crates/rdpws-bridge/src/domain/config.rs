//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for the server's runtime
//! settings.  Keeping it a plain struct (no global state, no environment
//! variable reads inside the domain) makes the bridge easy to embed in tests
//! and in whatever process hosts it.

use std::net::SocketAddr;
use std::time::Duration;

/// Runtime configuration for the WebSocket server.
///
/// Build this once at startup and share it across session tasks via `Arc`.
///
/// # Example
///
/// ```rust
/// use rdpws_bridge::domain::BridgeConfig;
///
/// let cfg = BridgeConfig::default();
/// assert_eq!(cfg.ws_bind_addr.port(), 8765);
/// ```
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// The address and port the WebSocket server binds to.
    ///
    /// `0.0.0.0` accepts connections from any interface.  Set to `127.0.0.1`
    /// when the bridge sits behind a reverse proxy.
    pub ws_bind_addr: SocketAddr,

    /// How long the accept loop waits for a connection before re-checking the
    /// shutdown flag.
    pub accept_poll: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            // Safe: a compile-time-known valid socket address string.
            ws_bind_addr: "0.0.0.0:8765".parse().unwrap(),
            accept_poll: Duration::from_millis(200),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
