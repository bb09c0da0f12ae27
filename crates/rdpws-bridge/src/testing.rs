//! Recording test doubles for the engine, peer, and encoder seams.
//!
//! Compiled into the library (not behind `cfg(test)`) so both the unit tests
//! and the `tests/` integration tests can share them.  Nothing here is used
//! by production code paths.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::application::encoder::CursorEncoder;
use crate::application::engine::{
    EngineError, EngineFactory, EngineHandler, EngineSettings, RdpEngine,
};
use crate::application::transport::{TransportError, WirePeer};

// ── Mock engine ───────────────────────────────────────────────────────────────

/// One recorded injector call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedEvent {
    Synchronize { flags: u32 },
    Keyboard { flags: u16, code: u16 },
    Unicode { flags: u16, code: u16 },
    Mouse { flags: u16, x: u16, y: u16 },
    ExtendedMouse { flags: u16, x: u16, y: u16 },
}

/// A scriptable [`RdpEngine`] that records every injector call.
///
/// Like the real engine, it fires `context_created` on handler registration
/// and `pre_connect`/`post_connect` during a successful `connect`.
pub struct MockEngine {
    handler: Mutex<Option<Arc<dyn EngineHandler>>>,
    injected: Mutex<Vec<InjectedEvent>>,
    applied: Mutex<Option<EngineSettings>>,
    connect_result: AtomicBool,
    error_code: AtomicU32,
    disconnect_requested: AtomicBool,
    pending_work_ok: AtomicBool,
    should_fail: AtomicBool,
    connect_calls: AtomicU32,
    disconnect_calls: AtomicU32,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            handler: Mutex::new(None),
            injected: Mutex::new(Vec::new()),
            applied: Mutex::new(None),
            connect_result: AtomicBool::new(true),
            error_code: AtomicU32::new(0),
            disconnect_requested: AtomicBool::new(false),
            pending_work_ok: AtomicBool::new(true),
            should_fail: AtomicBool::new(false),
            connect_calls: AtomicU32::new(0),
            disconnect_calls: AtomicU32::new(0),
        }
    }

    /// Scripts the result of the next `connect` calls.
    pub fn set_connect_result(&self, ok: bool) {
        self.connect_result.store(ok, Ordering::SeqCst);
    }

    /// Scripts the server-reported error code.
    pub fn set_error_code(&self, code: u32) {
        self.error_code.store(code, Ordering::SeqCst);
    }

    /// Scripts the engine deciding the connection must end.
    pub fn set_shall_disconnect(&self, yes: bool) {
        self.disconnect_requested.store(yes, Ordering::SeqCst);
    }

    /// Makes `apply_settings` and every injector fail.
    pub fn set_should_fail(&self, yes: bool) {
        self.should_fail.store(yes, Ordering::SeqCst);
    }

    /// Every injector call recorded so far.
    pub fn injected(&self) -> Vec<InjectedEvent> {
        lock(&self.injected).clone()
    }

    /// The handler currently registered, as the real engine would hold it.
    pub fn registered_handler(&self) -> Option<Arc<dyn EngineHandler>> {
        lock(&self.handler).clone()
    }

    /// The settings last passed to `apply_settings`.
    pub fn applied_settings(&self) -> Option<EngineSettings> {
        lock(&self.applied).clone()
    }

    pub fn connect_calls(&self) -> u32 {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> u32 {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    fn record(&self, event: InjectedEvent) -> Result<(), EngineError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(EngineError::InputUnavailable);
        }
        lock(&self.injected).push(event);
        Ok(())
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RdpEngine for MockEngine {
    fn register_handler(&self, handler: Arc<dyn EngineHandler>) {
        handler.context_created();
        *lock(&self.handler) = Some(handler);
    }

    fn apply_settings(&self, settings: &EngineSettings) -> Result<(), EngineError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(EngineError::InvalidSettings("scripted failure".to_string()));
        }
        *lock(&self.applied) = Some(settings.clone());
        Ok(())
    }

    fn connect(&self) -> bool {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let ok = self.connect_result.load(Ordering::SeqCst);
        if ok {
            if let Some(handler) = lock(&self.handler).clone() {
                let _profile = handler.pre_connect();
                handler.post_connect();
            }
        }
        ok
    }

    fn disconnect(&self) -> bool {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn check_pending_work(&self) -> bool {
        self.pending_work_ok.load(Ordering::SeqCst)
    }

    fn error_info(&self) -> u32 {
        self.error_code.load(Ordering::SeqCst)
    }

    fn shall_disconnect(&self) -> bool {
        self.disconnect_requested.load(Ordering::SeqCst)
    }

    fn send_synchronize_event(&self, flags: u32) -> Result<(), EngineError> {
        self.record(InjectedEvent::Synchronize { flags })
    }

    fn send_keyboard_event(&self, flags: u16, code: u16) -> Result<(), EngineError> {
        self.record(InjectedEvent::Keyboard { flags, code })
    }

    fn send_unicode_keyboard_event(&self, flags: u16, code: u16) -> Result<(), EngineError> {
        self.record(InjectedEvent::Unicode { flags, code })
    }

    fn send_mouse_event(&self, flags: u16, x: u16, y: u16) -> Result<(), EngineError> {
        self.record(InjectedEvent::Mouse { flags, x, y })
    }

    fn send_extended_mouse_event(&self, flags: u16, x: u16, y: u16) -> Result<(), EngineError> {
        self.record(InjectedEvent::ExtendedMouse { flags, x, y })
    }
}

/// Hands out pre-built mock engines, one per `create` call.
pub struct MockEngineFactory {
    engines: Mutex<Vec<Arc<MockEngine>>>,
}

impl MockEngineFactory {
    pub fn new(engines: Vec<Arc<MockEngine>>) -> Self {
        Self {
            engines: Mutex::new(engines),
        }
    }
}

impl EngineFactory for MockEngineFactory {
    fn create(&self) -> Result<Arc<dyn RdpEngine>, EngineError> {
        lock(&self.engines)
            .pop()
            .map(|e| e as Arc<dyn RdpEngine>)
            .ok_or_else(|| EngineError::InvalidSettings("no engine scripted".to_string()))
    }
}

// ── Recording peer ────────────────────────────────────────────────────────────

/// One frame captured by [`RecordingPeer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// A [`WirePeer`] that records everything sent to it.
pub struct RecordingPeer {
    frames: Mutex<Vec<PeerFrame>>,
    should_fail: AtomicBool,
}

impl RecordingPeer {
    pub fn new() -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
            should_fail: AtomicBool::new(false),
        }
    }

    /// Makes every send fail with [`TransportError::PeerGone`].
    pub fn set_should_fail(&self, yes: bool) {
        self.should_fail.store(yes, Ordering::SeqCst);
    }

    /// Every frame sent so far, in order.
    pub fn frames(&self) -> Vec<PeerFrame> {
        lock(&self.frames).clone()
    }

    /// Only the text frames, in order.
    pub fn texts(&self) -> Vec<String> {
        lock(&self.frames)
            .iter()
            .filter_map(|f| match f {
                PeerFrame::Text(t) => Some(t.clone()),
                PeerFrame::Binary(_) => None,
            })
            .collect()
    }
}

impl Default for RecordingPeer {
    fn default() -> Self {
        Self::new()
    }
}

impl WirePeer for RecordingPeer {
    fn send_text(&self, text: &str) -> Result<(), TransportError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(TransportError::PeerGone);
        }
        lock(&self.frames).push(PeerFrame::Text(text.to_string()));
        Ok(())
    }

    fn send_binary(&self, data: Vec<u8>) -> Result<(), TransportError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(TransportError::PeerGone);
        }
        lock(&self.frames).push(PeerFrame::Binary(data));
        Ok(())
    }
}

// ── Stub encoder ──────────────────────────────────────────────────────────────

/// A [`CursorEncoder`] producing a deterministic length-tagged pseudo image.
pub struct StubEncoder;

impl CursorEncoder for StubEncoder {
    fn encode(&self, width: u32, height: u32, argb: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(12);
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&(argb.len() as u32).to_le_bytes());
        out
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_engine_records_injections_in_order() {
        let engine = MockEngine::new();
        engine.send_keyboard_event(1, 2).unwrap();
        engine.send_mouse_event(3, 4, 5).unwrap();

        assert_eq!(
            engine.injected(),
            vec![
                InjectedEvent::Keyboard { flags: 1, code: 2 },
                InjectedEvent::Mouse { flags: 3, x: 4, y: 5 },
            ]
        );
    }

    #[test]
    fn test_mock_engine_should_fail_rejects_injections() {
        let engine = MockEngine::new();
        engine.set_should_fail(true);
        assert!(engine.send_keyboard_event(1, 2).is_err());
        assert!(engine.injected().is_empty());
    }

    #[test]
    fn test_recording_peer_captures_both_frame_kinds() {
        let peer = RecordingPeer::new();
        peer.send_text("hello").unwrap();
        peer.send_binary(vec![1, 2]).unwrap();

        assert_eq!(
            peer.frames(),
            vec![
                PeerFrame::Text("hello".to_string()),
                PeerFrame::Binary(vec![1, 2]),
            ]
        );
        assert_eq!(peer.texts(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_stub_encoder_is_deterministic() {
        let a = StubEncoder.encode(2, 2, &[0; 16]);
        let b = StubEncoder.encode(2, 2, &[0; 16]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
    }
}
