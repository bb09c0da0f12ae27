//! The outbound peer seam.
//!
//! Engine callbacks run on whatever thread the engine polls from, so the
//! send methods are synchronous; the WebSocket implementation queues frames
//! into a channel drained by an async writer task.

use thiserror::Error;

/// Errors surfaced by a wire peer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer is gone; queued frames can no longer be delivered.
    #[error("peer disconnected")]
    PeerGone,
}

/// A connected browser peer the bridge can push frames to.
///
/// `send_text` carries the line-oriented notices (`S:`, `E:`, `T:`);
/// `send_binary` carries encoded pointer events.
pub trait WirePeer: Send + Sync {
    /// Sends one text message to the peer.
    fn send_text(&self, text: &str) -> Result<(), TransportError>;

    /// Sends one binary frame to the peer.
    fn send_binary(&self, data: Vec<u8>) -> Result<(), TransportError>;
}
