//! # rdpws-core
//!
//! Shared library for the RDP web bridge containing the browser wire-protocol
//! codec, keycode translation tables, and the cursor image cache.
//!
//! This crate is used by the bridge service and by anything that needs to
//! speak the browser-facing binary protocol.  It has zero dependencies on OS
//! APIs, network sockets, or the RDP engine itself.
//!
//! The crate defines:
//!
//! - **`protocol`** – How bytes travel over the browser WebSocket.  Inbound
//!   input messages and outbound pointer events use a compact binary format
//!   (little-endian, 4-byte operation code + fixed payload) and are decoded
//!   into typed Rust values.
//!
//! - **`keymap`** – Translation tables that convert the key codes a browser
//!   reports into RDP keyboard scancodes, including the extended-key flag
//!   some scancodes carry.
//!
//! - **`domain`** – Pure session state with no I/O: the cursor cache mapping
//!   pointer ids to encoded cursor images.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::cursor::{CursorCache, CursorEntry};
pub use keymap::scancode::Scancode;
pub use protocol::codec::{decode_input, encode_event, ProtocolError};
pub use protocol::messages::{BrowserInput, ServerEvent};
