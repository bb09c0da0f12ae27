//! WebSocket ↔ RDP session bridge.
//!
//! Each browser WebSocket connection is paired with one RDP engine instance.
//! Inbound binary frames (mouse, keyboard) are translated into engine input
//! calls; engine callbacks (pointer lifecycle, connection milestones) are
//! translated into outbound frames and text notices.
//!
//! # Layers
//!
//! - `domain` — configuration and the browser's JSON connect request.
//! - `application` — the session state machine, the engine/transport/encoder
//!   trait seams, and the event dispatch logic.  No sockets.
//! - `infrastructure` — the tokio-tungstenite WebSocket server that wires a
//!   real peer to a session.
//! - `testing` — recording test doubles shared by unit and integration tests.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod testing;

pub use application::engine::{
    EngineError, EngineFactory, EngineHandler, EngineSettings, NegotiationProfile, PointerData,
    RdpEngine,
};
pub use application::event_bridge::EventBridge;
pub use application::session::{RdpSession, SessionError, SessionState};
pub use domain::config::BridgeConfig;
pub use domain::connect::{ConnectParams, ConnectRequest, PerfPreset};
