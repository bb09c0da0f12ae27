//! Browser-facing binary wire protocol.
//!
//! Every binary frame starts with a 4-byte little-endian operation code.
//! The remaining bytes form a fixed layout keyed by that code.  Text frames
//! (session banner, error lines, terminal notice) are plain UTF-8 and are
//! produced by the bridge directly; only binary frames go through the codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_input, encode_event, ProtocolError};
pub use messages::{BrowserInput, ServerEvent};
