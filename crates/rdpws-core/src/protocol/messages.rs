//! Typed representations of browser wire messages.
//!
//! Two directions exist:
//!
//! - **Inbound** ([`BrowserInput`]): input events the browser client sends to
//!   drive the remote session (mouse, modifier key up/down, key press).
//! - **Outbound** ([`ServerEvent`]): pointer lifecycle events the bridge
//!   mirrors back to the browser so it can render the correct cursor.
//!
//! Operation codes occupy the leading `u32` of every binary frame.  The
//! inbound and outbound code spaces are disjoint so a frame can never be
//! misread if it is accidentally reflected.

/// Operation code of an inbound mouse event.
pub const OP_MOUSE: u32 = 0;
/// Operation code of an inbound modifier key up/down event.
pub const OP_KEY_UPDOWN: u32 = 1;
/// Operation code of an inbound key press event.
pub const OP_KEY_PRESS: u32 = 2;

/// Operation code announcing a newly created pointer bitmap.
pub const OP_PTR_NEW: u32 = 16;
/// Operation code announcing that a pointer bitmap has been freed.
pub const OP_PTR_FREE: u32 = 17;
/// Operation code selecting a previously announced pointer.
pub const OP_PTR_SET: u32 = 18;
/// Operation code hiding the pointer entirely.
pub const OP_PTR_SETNULL: u32 = 19;
/// Operation code restoring the default system pointer.
pub const OP_PTR_SETDEFAULT: u32 = 20;

/// An input message received from the browser.
///
/// Payload layouts (after the 4-byte op code, all fields little-endian u32):
///
/// | Variant      | Payload                 |
/// |--------------|-------------------------|
/// | `Mouse`      | flags, x, y             |
/// | `KeyUpDown`  | down (0/1), code        |
/// | `KeyPress`   | shift_state, code       |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserInput {
    /// Pointer-device event.  `flags` carries the engine's native mouse event
    /// flags unmodified; x/y are later narrowed to the engine's 16-bit
    /// coordinate space without clamping.
    Mouse { flags: u32, x: u32, y: u32 },

    /// Modifier key transition.  Used by the browser only for modifier keys;
    /// `code` is a browser key code, not a character.
    KeyUpDown { down: bool, code: u32 },

    /// Key press carrying a character code or a control-key code.
    /// `shift_state` bit 0 is Shift, bits 1–2 are Ctrl/Alt combined.
    KeyPress { shift_state: u32, code: u32 },
}

/// A pointer lifecycle event sent to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEvent {
    /// A new cursor bitmap exists under `id`; its encoded image is served
    /// out-of-band through the cursor cache accessor.
    PointerNew { id: u32, hot_x: u32, hot_y: u32 },
    /// The cursor bitmap `id` has been released and must be forgotten.
    PointerFree { id: u32 },
    /// The cursor bitmap `id` becomes the active pointer.
    PointerSet { id: u32 },
    /// Hide the pointer.
    PointerSetNull,
    /// Show the platform default pointer.
    PointerSetDefault,
}

impl ServerEvent {
    /// Returns the operation code this event is framed with.
    pub fn op_code(&self) -> u32 {
        match self {
            Self::PointerNew { .. } => OP_PTR_NEW,
            Self::PointerFree { .. } => OP_PTR_FREE,
            Self::PointerSet { .. } => OP_PTR_SET,
            Self::PointerSetNull => OP_PTR_SETNULL,
            Self::PointerSetDefault => OP_PTR_SETDEFAULT,
        }
    }
}
