//! Browser key code → RDP scancode translation tables.
//!
//! Browser key codes here are the legacy `KeyboardEvent.keyCode` values the
//! web client reports.  Every table is total over `u32` and returns `None`
//! for unmapped codes — callers drop those events rather than guessing.

use super::scancode::{self, Scancode};

/// Translates a modifier key code from a key up/down message.
///
/// Only the left-hand variants are mapped; the browser does not distinguish
/// sides for these codes.  CapsLock (20), NumLock (144) and ScrollLock (145)
/// are intentionally unmapped: forwarding lock-key state from a browser
/// would desynchronize it from the remote desktop's own lock state.
pub fn modifier_scancode(code: u32) -> Option<Scancode> {
    match code {
        8 => Some(scancode::SC_BACKSPACE),
        16 => Some(scancode::SC_LSHIFT),
        17 => Some(scancode::SC_LCONTROL),
        18 => Some(scancode::SC_LALT),
        93 => Some(scancode::SC_LWIN),
        _ => None,
    }
}

/// Translates a control/navigation key press (codes ≤ 0x20 plus the
/// nav cluster the browser folds into that range).
///
/// Codes not in this table are dropped.
pub fn control_scancode(code: u32) -> Option<Scancode> {
    match code {
        0x09 => Some(scancode::SC_TAB),
        0x0D => Some(scancode::SC_RETURN),
        0x13 => Some(scancode::SC_PAUSE),
        0x1B => Some(scancode::SC_ESCAPE),
        0x20 => Some(scancode::SC_SPACE),
        0x21 => Some(scancode::SC_PAGEUP),
        0x22 => Some(scancode::SC_PAGEDOWN),
        0x23 => Some(scancode::SC_END),
        0x24 => Some(scancode::SC_HOME),
        0x25 => Some(scancode::SC_LEFT),
        0x26 => Some(scancode::SC_UP),
        0x27 => Some(scancode::SC_RIGHT),
        0x28 => Some(scancode::SC_DOWN),
        0x2C => Some(scancode::SC_PRINTSCREEN),
        0x2D => Some(scancode::SC_INSERT),
        0x2E => Some(scancode::SC_DELETE),
        _ => None,
    }
}

/// Resolves a virtual key code to its scancode, as the platform keyboard
/// layer would.
///
/// Used on the Ctrl/Alt key-press path, where unicode events cannot express
/// the chord and the letter must be sent positionally.  Covers the letter
/// and digit rows; everything else resolves to `None` and is dropped.
pub fn virtual_key_scancode(vk: u32) -> Option<Scancode> {
    let code: u16 = match vk {
        // Digit row (VK '0'..'9')
        0x30 => 0x0B,
        0x31 => 0x02,
        0x32 => 0x03,
        0x33 => 0x04,
        0x34 => 0x05,
        0x35 => 0x06,
        0x36 => 0x07,
        0x37 => 0x08,
        0x38 => 0x09,
        0x39 => 0x0A,
        // Letters (VK 'A'..'Z'), QWERTY set-1 positions
        0x41 => 0x1E, // A
        0x42 => 0x30, // B
        0x43 => 0x2E, // C
        0x44 => 0x20, // D
        0x45 => 0x12, // E
        0x46 => 0x21, // F
        0x47 => 0x22, // G
        0x48 => 0x23, // H
        0x49 => 0x17, // I
        0x4A => 0x24, // J
        0x4B => 0x25, // K
        0x4C => 0x26, // L
        0x4D => 0x32, // M
        0x4E => 0x31, // N
        0x4F => 0x18, // O
        0x50 => 0x19, // P
        0x51 => 0x10, // Q
        0x52 => 0x13, // R
        0x53 => 0x1F, // S
        0x54 => 0x14, // T
        0x55 => 0x16, // U
        0x56 => 0x2F, // V
        0x57 => 0x11, // W
        0x58 => 0x2D, // X
        0x59 => 0x15, // Y
        0x5A => 0x2C, // Z
        _ => return None,
    };
    Some(Scancode::new(code))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::scancode::{
        SC_BACKSPACE, SC_LALT, SC_LCONTROL, SC_LSHIFT, SC_LWIN, SC_PAUSE, SC_RETURN,
    };

    // ── modifier_scancode ─────────────────────────────────────────────────────

    #[test]
    fn test_modifier_table_maps_all_five_modifiers() {
        assert_eq!(modifier_scancode(8), Some(SC_BACKSPACE));
        assert_eq!(modifier_scancode(16), Some(SC_LSHIFT));
        assert_eq!(modifier_scancode(17), Some(SC_LCONTROL));
        assert_eq!(modifier_scancode(18), Some(SC_LALT));
        assert_eq!(modifier_scancode(93), Some(SC_LWIN));
    }

    #[test]
    fn test_lock_keys_are_intentionally_unmapped() {
        assert_eq!(modifier_scancode(20), None); // CapsLock
        assert_eq!(modifier_scancode(144), None); // NumLock
        assert_eq!(modifier_scancode(145), None); // ScrollLock
    }

    #[test]
    fn test_windows_key_is_extended() {
        assert!(modifier_scancode(93).unwrap().extended);
    }

    #[test]
    fn test_unknown_modifier_code_returns_none() {
        assert_eq!(modifier_scancode(0), None);
        assert_eq!(modifier_scancode(255), None);
    }

    // ── control_scancode ──────────────────────────────────────────────────────

    #[test]
    fn test_return_key_is_plain_scancode() {
        let sc = control_scancode(0x0D).unwrap();
        assert_eq!(sc, SC_RETURN);
        assert!(!sc.extended);
    }

    #[test]
    fn test_arrow_keys_are_extended() {
        for code in [0x25, 0x26, 0x27, 0x28] {
            let sc = control_scancode(code).unwrap();
            assert!(sc.extended, "arrow key {code:#x} must be extended");
        }
    }

    #[test]
    fn test_pause_key_mapping() {
        assert_eq!(control_scancode(0x13), Some(SC_PAUSE));
    }

    #[test]
    fn test_unmapped_control_code_returns_none() {
        assert_eq!(control_scancode(0x00), None);
        assert_eq!(control_scancode(0x0A), None);
        assert_eq!(control_scancode(0x2F), None);
    }

    // ── virtual_key_scancode ──────────────────────────────────────────────────

    #[test]
    fn test_letter_a_resolves_to_qwerty_position() {
        let sc = virtual_key_scancode(0x41).unwrap();
        assert_eq!(sc.code, 0x1E);
        assert!(!sc.extended);
    }

    #[test]
    fn test_all_letters_resolve() {
        for vk in 0x41..=0x5A {
            assert!(
                virtual_key_scancode(vk).is_some(),
                "letter VK {vk:#x} must resolve"
            );
        }
    }

    #[test]
    fn test_all_letter_scancodes_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for vk in 0x41..=0x5A {
            let sc = virtual_key_scancode(vk).unwrap();
            assert!(seen.insert(sc.code), "duplicate scancode for VK {vk:#x}");
        }
    }

    #[test]
    fn test_digits_resolve_to_top_row() {
        assert_eq!(virtual_key_scancode(0x31).unwrap().code, 0x02); // '1'
        assert_eq!(virtual_key_scancode(0x30).unwrap().code, 0x0B); // '0'
    }

    #[test]
    fn test_lowercase_codes_do_not_resolve() {
        // The caller normalizes case before resolution; lowercase input is
        // outside the VK space and must be dropped.
        assert_eq!(virtual_key_scancode(0x61), None);
        assert_eq!(virtual_key_scancode(0x7A), None);
    }
}
