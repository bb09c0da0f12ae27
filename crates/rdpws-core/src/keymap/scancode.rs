//! RDP keyboard scancodes and input-event wire flags.
//!
//! Scancodes are PC/AT set-1 make codes.  Keys on the "extended" cluster
//! (navigation block, right-side modifiers, the Windows keys) carry an
//! E0 prefix on a real keyboard; RDP models that as a separate flag bit in
//! the keyboard event rather than as part of the code itself.

/// A protocol scancode: a set-1 make code plus the extended-key marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scancode {
    /// The set-1 make code sent to the engine.
    pub code: u16,
    /// Whether the key requires [`KBD_FLAGS_EXTENDED`] on the wire.
    pub extended: bool,
}

impl Scancode {
    /// Plain (non-extended) scancode.
    pub const fn new(code: u16) -> Self {
        Self {
            code,
            extended: false,
        }
    }

    /// Extended scancode (E0-prefixed key).
    pub const fn extended(code: u16) -> Self {
        Self {
            code,
            extended: true,
        }
    }

    /// Returns [`KBD_FLAGS_EXTENDED`] when this scancode is extended, else 0.
    pub fn extended_flag(&self) -> u16 {
        if self.extended {
            KBD_FLAGS_EXTENDED
        } else {
            0
        }
    }
}

// ── Keyboard event wire flags ─────────────────────────────────────────────────

/// The scancode is on the extended (E0-prefixed) cluster.
pub const KBD_FLAGS_EXTENDED: u16 = 0x0100;
/// Key transition: pressed.
pub const KBD_FLAGS_DOWN: u16 = 0x4000;
/// Key transition: released.
pub const KBD_FLAGS_RELEASE: u16 = 0x8000;

// ── Named scancodes used by the translation tables ────────────────────────────

pub const SC_ESCAPE: Scancode = Scancode::new(0x01);
pub const SC_BACKSPACE: Scancode = Scancode::new(0x0E);
pub const SC_TAB: Scancode = Scancode::new(0x0F);
pub const SC_RETURN: Scancode = Scancode::new(0x1C);
pub const SC_LCONTROL: Scancode = Scancode::new(0x1D);
pub const SC_LSHIFT: Scancode = Scancode::new(0x2A);
pub const SC_LALT: Scancode = Scancode::new(0x38);
pub const SC_SPACE: Scancode = Scancode::new(0x39);
/// Pause is make code 0x45 without the E0 prefix; the engine expands it to
/// the E1 sequence itself.  E0 0x46 would be Ctrl+Break instead.
pub const SC_PAUSE: Scancode = Scancode::new(0x45);
pub const SC_HOME: Scancode = Scancode::extended(0x47);
pub const SC_UP: Scancode = Scancode::extended(0x48);
pub const SC_PAGEUP: Scancode = Scancode::extended(0x49);
pub const SC_LEFT: Scancode = Scancode::extended(0x4B);
pub const SC_RIGHT: Scancode = Scancode::extended(0x4D);
pub const SC_END: Scancode = Scancode::extended(0x4F);
pub const SC_DOWN: Scancode = Scancode::extended(0x50);
pub const SC_PAGEDOWN: Scancode = Scancode::extended(0x51);
pub const SC_INSERT: Scancode = Scancode::extended(0x52);
pub const SC_DELETE: Scancode = Scancode::extended(0x53);
pub const SC_PRINTSCREEN: Scancode = Scancode::extended(0x37);
pub const SC_LWIN: Scancode = Scancode::extended(0x5B);

// ── Tests ─────────────────────────────────────────────────────────────────────
