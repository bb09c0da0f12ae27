//! Event translation between the wire protocol and the engine.
//!
//! Two directions live here:
//!
//! - **Inbound** ([`dispatch_input`]): a binary frame from the browser is
//!   decoded and turned into engine input calls.  Late, short, or unknown
//!   frames are dropped silently; a browser tab misbehaving is not a session
//!   failure.
//! - **Outbound** ([`EventBridge`]): engine callbacks become pointer frames
//!   and text notices for the browser.  The bridge owns pointer id allocation
//!   and the cursor image cache.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use uuid::Uuid;

use rdpws_core::domain::cursor::{CursorCache, CursorEntry};
use rdpws_core::keymap::browser::{control_scancode, modifier_scancode, virtual_key_scancode};
use rdpws_core::keymap::scancode::{KBD_FLAGS_DOWN, KBD_FLAGS_RELEASE};
use rdpws_core::protocol::{decode_input, encode_event, BrowserInput, ServerEvent};

use crate::application::encoder::CursorEncoder;
use crate::application::engine::{
    EngineError, EngineHandler, NegotiationProfile, PointerData, RdpEngine,
};
use crate::application::transport::WirePeer;

// ── Inbound dispatch ──────────────────────────────────────────────────────────

/// Translates one binary frame from the browser into engine input calls.
///
/// Frames that fail to decode are logged at debug level and ignored.  Key
/// codes outside the translation tables are dropped without any engine call.
///
/// # Errors
///
/// Propagates [`EngineError`] from the injectors (e.g. the input channel
/// disappeared mid-session).
pub fn dispatch_input(engine: &dyn RdpEngine, frame: &[u8]) -> Result<(), EngineError> {
    let input = match decode_input(frame) {
        Ok(input) => input,
        Err(e) => {
            debug!("dropping undecodable frame: {e}");
            return Ok(());
        }
    };

    match input {
        BrowserInput::Mouse { flags, x, y } => {
            engine.send_mouse_event(flags as u16, x as u16, y as u16)
        }

        BrowserInput::KeyUpDown { down, code } => {
            let Some(sc) = modifier_scancode(code) else {
                debug!("unmapped modifier code {code}");
                return Ok(());
            };
            let transition = if down { KBD_FLAGS_DOWN } else { KBD_FLAGS_RELEASE };
            engine.send_keyboard_event(transition | sc.extended_flag(), sc.code)
        }

        BrowserInput::KeyPress { shift_state, code } => {
            dispatch_key_press(engine, shift_state, code)
        }
    }
}

/// The key-press translation, split by character class.
///
/// Printable characters become a unicode down/release pair, except under
/// Ctrl or Alt where unicode events cannot carry the chord: letters are then
/// case-normalized to their virtual key and sent as a scancode pair.
/// Control characters go through the control table.
fn dispatch_key_press(engine: &dyn RdpEngine, shift_state: u32, code: u32) -> Result<(), EngineError> {
    if code > 0x20 {
        // Bit 1 = Ctrl, bit 2 = Alt.
        if shift_state & 6 != 0 {
            if (65..91).contains(&code) || (97..123).contains(&code) {
                // Without Shift the character arrives lowercase; the virtual
                // key space is uppercase.
                let vk = if shift_state & 1 != 0 { code } else { code - 32 };
                if let Some(sc) = virtual_key_scancode(vk) {
                    engine.send_keyboard_event(KBD_FLAGS_DOWN | sc.extended_flag(), sc.code)?;
                    engine.send_keyboard_event(KBD_FLAGS_RELEASE | sc.extended_flag(), sc.code)?;
                }
            }
            Ok(())
        } else {
            engine.send_unicode_keyboard_event(KBD_FLAGS_DOWN, code as u16)?;
            engine.send_unicode_keyboard_event(KBD_FLAGS_RELEASE, code as u16)
        }
    } else {
        let Some(sc) = control_scancode(code) else {
            debug!("unmapped control code {code:#x}");
            return Ok(());
        };
        let ext = sc.extended_flag();
        engine.send_keyboard_event(KBD_FLAGS_DOWN | ext, sc.code)?;
        engine.send_keyboard_event(KBD_FLAGS_RELEASE | ext, sc.code)
    }
}

// ── Outbound event bridge ─────────────────────────────────────────────────────

/// Translates engine callbacks into browser frames.
///
/// One instance per session, registered as the engine's handler.  Pointer
/// ids are allocated from 1 and never reused within a session, so a browser
/// can never confuse a freed cursor with a new one.
pub struct EventBridge {
    session_id: Uuid,
    peer: Arc<dyn WirePeer>,
    encoder: Arc<dyn CursorEncoder>,
    cursors: Mutex<CursorCache>,
    next_pointer_id: AtomicU32,
    context_ready: AtomicBool,
}

impl EventBridge {
    pub fn new(session_id: Uuid, peer: Arc<dyn WirePeer>, encoder: Arc<dyn CursorEncoder>) -> Self {
        Self {
            session_id,
            peer,
            encoder,
            cursors: Mutex::new(CursorCache::new()),
            next_pointer_id: AtomicU32::new(1),
            context_ready: AtomicBool::new(false),
        }
    }

    /// Whether the engine context currently exists.
    pub fn context_ready(&self) -> bool {
        self.context_ready.load(Ordering::SeqCst)
    }

    /// Fetches a cached cursor image for the auxiliary image channel.
    pub fn cursor(&self, id: u32) -> Option<CursorEntry> {
        self.lock_cursors().get(id).cloned()
    }

    /// Number of live cached cursors.
    pub fn cursor_count(&self) -> usize {
        self.lock_cursors().len()
    }

    fn lock_cursors(&self) -> MutexGuard<'_, CursorCache> {
        // A poisoned lock only means another callback panicked; the cache
        // itself is still structurally sound.
        self.cursors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send_event(&self, event: &ServerEvent) {
        if self.peer.send_binary(encode_event(event)).is_err() {
            warn!("session {}: peer gone, dropping pointer event", self.session_id);
        }
    }
}

impl EngineHandler for EventBridge {
    fn context_created(&self) {
        debug!("session {}: engine context created", self.session_id);
        self.context_ready.store(true, Ordering::SeqCst);
    }

    fn context_destroyed(&self) {
        // Engines may fire this twice during teardown.
        if self.context_ready.swap(false, Ordering::SeqCst) {
            debug!("session {}: engine context destroyed", self.session_id);
        }
        self.lock_cursors().clear();
    }

    fn pre_connect(&self) -> NegotiationProfile {
        NegotiationProfile::default()
    }

    fn post_connect(&self) {
        info!("session {}: connection established", self.session_id);
        if self.peer.send_text(&format!("S:{}", self.session_id)).is_err() {
            warn!("session {}: peer gone at session start", self.session_id);
        }
    }

    fn authenticate(&self) -> bool {
        // Credentials were fixed at connect time; there is nothing to prompt.
        true
    }

    fn verify_certificate(&self, subject: &str, issuer: &str, fingerprint: &str) -> bool {
        info!(
            "session {}: accepting certificate subject={subject} issuer={issuer} fp={fingerprint}",
            self.session_id
        );
        true
    }

    fn pointer_new(&self, pointer: &PointerData) {
        let id = self.next_pointer_id.fetch_add(1, Ordering::SeqCst);
        pointer.id.store(id, Ordering::SeqCst);

        // A pointer without pixels still needs a cache entry so the browser's
        // image fetch cannot 404; encode a fully transparent bitmap.
        let blank;
        let argb = match &pointer.argb {
            Some(pixels) => pixels.as_slice(),
            None => {
                blank = vec![0u8; (pointer.width * pointer.height * 4) as usize];
                blank.as_slice()
            }
        };
        let image = self.encoder.encode(pointer.width, pointer.height, argb);
        self.lock_cursors().insert(id, image);

        self.send_event(&ServerEvent::PointerNew {
            id,
            hot_x: pointer.hot_x,
            hot_y: pointer.hot_y,
        });
    }

    fn pointer_free(&self, pointer: &PointerData) {
        let id = pointer.id.load(Ordering::SeqCst);
        if id == 0 {
            // Never registered (or already freed); nothing to tell the browser.
            return;
        }
        pointer.id.store(0, Ordering::SeqCst);
        self.lock_cursors().remove(id);
        self.send_event(&ServerEvent::PointerFree { id });
    }

    fn pointer_set(&self, pointer: &PointerData) {
        let id = pointer.id.load(Ordering::SeqCst);
        self.send_event(&ServerEvent::PointerSet { id });
    }

    fn pointer_set_null(&self) {
        self.send_event(&ServerEvent::PointerSetNull);
    }

    fn pointer_set_default(&self) {
        self.send_event(&ServerEvent::PointerSetDefault);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
