//! Key code translation tables for browser-to-RDP input mapping.
//!
//! Browsers report *key codes* (the legacy `KeyboardEvent.keyCode` space) or
//! character codes; the RDP engine consumes *scancodes* — hardware keyboard
//! positions, some of which carry an "extended" prefix on the wire.  This
//! module holds the fixed tables translating between the two.
//!
//! Three tables exist, matching the three inbound key paths:
//!
//! - [`browser::modifier_scancode`] — the handful of modifier keys the
//!   browser sends as explicit up/down transitions.
//! - [`browser::control_scancode`] — control/navigation keys delivered as
//!   key presses with codes ≤ 0x20.
//! - [`browser::virtual_key_scancode`] — virtual-key → scancode resolution
//!   for letters pressed with Ctrl or Alt held.

pub mod browser;
pub mod scancode;

pub use scancode::Scancode;
