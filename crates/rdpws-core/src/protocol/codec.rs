//! Binary codec for the browser wire protocol.
//!
//! Wire format:
//! ```text
//! [op:4][payload:N]
//! ```
//! All integers are little-endian `u32` and fields are 4-byte aligned.
//! Unlike a stream codec there is no length header: one WebSocket frame is
//! exactly one message, so the codec works on whole buffers.

use thiserror::Error;

use crate::protocol::messages::{
    BrowserInput, ServerEvent, OP_KEY_PRESS, OP_KEY_UPDOWN, OP_MOUSE,
};

/// Errors that can occur while decoding an inbound frame.
///
/// Both variants are expected in normal operation — late or malformed input
/// from a browser is dropped, not treated as a session failure — so callers
/// typically log at debug level and move on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The frame is shorter than the layout for its operation code requires
    /// (including frames shorter than the 4-byte op code itself).
    #[error("truncated frame: need at least {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    /// The leading 4 bytes are not a recognized inbound operation code.
    #[error("unknown operation code: {0}")]
    UnknownOpCode(u32),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one [`BrowserInput`] from a complete binary frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Truncated`] if the frame is shorter than 4 bytes
/// or shorter than the fixed payload of its operation code, and
/// [`ProtocolError::UnknownOpCode`] for codes outside the inbound space.
///
/// # Examples
///
/// ```rust
/// use rdpws_core::protocol::{decode_input, BrowserInput};
///
/// let mut frame = Vec::new();
/// frame.extend_from_slice(&0u32.to_le_bytes()); // OP_MOUSE
/// frame.extend_from_slice(&0x1000u32.to_le_bytes());
/// frame.extend_from_slice(&200u32.to_le_bytes());
/// frame.extend_from_slice(&300u32.to_le_bytes());
/// let input = decode_input(&frame).unwrap();
/// assert_eq!(input, BrowserInput::Mouse { flags: 0x1000, x: 200, y: 300 });
/// ```
pub fn decode_input(frame: &[u8]) -> Result<BrowserInput, ProtocolError> {
    let op = read_u32(frame, 0)?;
    match op {
        OP_MOUSE => {
            let flags = read_u32(frame, 4)?;
            let x = read_u32(frame, 8)?;
            let y = read_u32(frame, 12)?;
            Ok(BrowserInput::Mouse { flags, x, y })
        }
        OP_KEY_UPDOWN => {
            let down = read_u32(frame, 4)? != 0;
            let code = read_u32(frame, 8)?;
            Ok(BrowserInput::KeyUpDown { down, code })
        }
        OP_KEY_PRESS => {
            let shift_state = read_u32(frame, 4)?;
            let code = read_u32(frame, 8)?;
            Ok(BrowserInput::KeyPress { shift_state, code })
        }
        other => Err(ProtocolError::UnknownOpCode(other)),
    }
}

/// Encodes a [`ServerEvent`] into a binary frame ready for `send_binary`.
///
/// The two payload-less events (`PointerSetNull`, `PointerSetDefault`)
/// produce a bare 4-byte op code.
pub fn encode_event(event: &ServerEvent) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16);
    buf.extend_from_slice(&event.op_code().to_le_bytes());
    match event {
        ServerEvent::PointerNew { id, hot_x, hot_y } => {
            buf.extend_from_slice(&id.to_le_bytes());
            buf.extend_from_slice(&hot_x.to_le_bytes());
            buf.extend_from_slice(&hot_y.to_le_bytes());
        }
        ServerEvent::PointerFree { id } | ServerEvent::PointerSet { id } => {
            buf.extend_from_slice(&id.to_le_bytes());
        }
        ServerEvent::PointerSetNull | ServerEvent::PointerSetDefault => {}
    }
    buf
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn read_u32(buf: &[u8], offset: usize) -> Result<u32, ProtocolError> {
    if buf.len() < offset + 4 {
        return Err(ProtocolError::Truncated {
            needed: offset + 4,
            available: buf.len(),
        });
    }
    Ok(u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ]))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{
        OP_PTR_FREE, OP_PTR_NEW, OP_PTR_SET, OP_PTR_SETDEFAULT, OP_PTR_SETNULL,
    };

    fn frame(words: &[u32]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(words.len() * 4);
        for w in words {
            buf.extend_from_slice(&w.to_le_bytes());
        }
        buf
    }

    // ── decode_input ──────────────────────────────────────────────────────────

    #[test]
    fn test_decode_mouse_event() {
        let input = decode_input(&frame(&[OP_MOUSE, 0x0800, 640, 480])).unwrap();
        assert_eq!(
            input,
            BrowserInput::Mouse {
                flags: 0x0800,
                x: 640,
                y: 480
            }
        );
    }

    #[test]
    fn test_decode_key_updown_down() {
        let input = decode_input(&frame(&[OP_KEY_UPDOWN, 1, 16])).unwrap();
        assert_eq!(input, BrowserInput::KeyUpDown { down: true, code: 16 });
    }

    #[test]
    fn test_decode_key_updown_up() {
        let input = decode_input(&frame(&[OP_KEY_UPDOWN, 0, 17])).unwrap();
        assert_eq!(input, BrowserInput::KeyUpDown { down: false, code: 17 });
    }

    #[test]
    fn test_decode_key_press() {
        let input = decode_input(&frame(&[OP_KEY_PRESS, 1, 0x41])).unwrap();
        assert_eq!(
            input,
            BrowserInput::KeyPress {
                shift_state: 1,
                code: 0x41
            }
        );
    }

    #[test]
    fn test_decode_empty_frame_is_truncated() {
        let result = decode_input(&[]);
        assert!(matches!(result, Err(ProtocolError::Truncated { .. })));
    }

    #[test]
    fn test_decode_three_byte_frame_is_truncated() {
        let result = decode_input(&[0x00, 0x00, 0x00]);
        assert!(matches!(
            result,
            Err(ProtocolError::Truncated {
                needed: 4,
                available: 3
            })
        ));
    }

    #[test]
    fn test_decode_mouse_with_short_payload_is_truncated() {
        // Op code plus only two of the three payload words.
        let result = decode_input(&frame(&[OP_MOUSE, 1, 2]));
        assert!(matches!(result, Err(ProtocolError::Truncated { .. })));
    }

    #[test]
    fn test_decode_unknown_op_code() {
        let result = decode_input(&frame(&[0xDEAD_BEEF]));
        assert_eq!(result, Err(ProtocolError::UnknownOpCode(0xDEAD_BEEF)));
    }

    #[test]
    fn test_decode_outbound_op_code_is_rejected() {
        // Outbound codes must never be accepted on the inbound path.
        let result = decode_input(&frame(&[OP_PTR_NEW, 1, 2, 3]));
        assert_eq!(result, Err(ProtocolError::UnknownOpCode(OP_PTR_NEW)));
    }

    // ── encode_event ──────────────────────────────────────────────────────────

    #[test]
    fn test_encode_pointer_new_layout() {
        let bytes = encode_event(&ServerEvent::PointerNew {
            id: 7,
            hot_x: 3,
            hot_y: 5,
        });
        assert_eq!(bytes, frame(&[OP_PTR_NEW, 7, 3, 5]));
    }

    #[test]
    fn test_encode_pointer_free_layout() {
        let bytes = encode_event(&ServerEvent::PointerFree { id: 9 });
        assert_eq!(bytes, frame(&[OP_PTR_FREE, 9]));
    }

    #[test]
    fn test_encode_pointer_set_layout() {
        let bytes = encode_event(&ServerEvent::PointerSet { id: 2 });
        assert_eq!(bytes, frame(&[OP_PTR_SET, 2]));
    }

    #[test]
    fn test_encode_pointer_set_null_is_bare_op_code() {
        let bytes = encode_event(&ServerEvent::PointerSetNull);
        assert_eq!(bytes, frame(&[OP_PTR_SETNULL]));
        assert_eq!(bytes.len(), 4);
    }

    #[test]
    fn test_encode_pointer_set_default_is_bare_op_code() {
        let bytes = encode_event(&ServerEvent::PointerSetDefault);
        assert_eq!(bytes, frame(&[OP_PTR_SETDEFAULT]));
        assert_eq!(bytes.len(), 4);
    }

    #[test]
    fn test_encoded_integers_are_little_endian() {
        let bytes = encode_event(&ServerEvent::PointerFree { id: 0x0102_0304 });
        assert_eq!(&bytes[4..], &[0x04, 0x03, 0x02, 0x01]);
    }
}
