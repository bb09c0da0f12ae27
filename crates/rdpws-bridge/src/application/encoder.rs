//! The cursor image encoder seam.

/// Encodes a straight-ARGB cursor bitmap into the image format the browser
/// fetches (PNG in production).
///
/// Pure function of its inputs; implementations must be callable from engine
/// callback context.
pub trait CursorEncoder: Send + Sync {
    /// Encodes `argb` (row-major, `width * height * 4` bytes) into the
    /// browser-facing image format.
    fn encode(&self, width: u32, height: u32, argb: &[u8]) -> Vec<u8>;
}
