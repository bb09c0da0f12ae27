//! Session logic: trait seams, the event dispatcher, and the state machine.
//!
//! Nothing in this layer opens a socket or knows about WebSockets.  The
//! engine, the wire peer, and the cursor encoder are all trait objects, so
//! every path here is testable with the doubles in [`crate::testing`].

pub mod encoder;
pub mod engine;
pub mod event_bridge;
pub mod session;
pub mod transport;

pub use encoder::CursorEncoder;
pub use engine::{EngineError, EngineFactory, EngineHandler, EngineSettings, RdpEngine};
pub use event_bridge::{dispatch_input, EventBridge};
pub use session::{RdpSession, SessionError, SessionState};
pub use transport::{TransportError, WirePeer};
