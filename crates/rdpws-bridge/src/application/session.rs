//! The per-connection session: state machine, pump task, and facade.
//!
//! One [`RdpSession`] pairs one browser peer with one engine instance.  A
//! background pump task drives the engine (connect, pending work, error
//! polling) on a 100 µs quantum; the WebSocket read path calls into the
//! facade (`connect`, `on_message`, `disconnect`).
//!
//! State machine: `Initial → Connecting → Connected → Closed`, with `Closed`
//! terminal.  A failed connect attempt drops back to `Initial` so the browser
//! may retry with new parameters on the same session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use rdpws_core::domain::cursor::CursorEntry;

use crate::application::encoder::CursorEncoder;
use crate::application::engine::{EngineError, EngineSettings, RdpEngine};
use crate::application::event_bridge::{dispatch_input, EventBridge};
use crate::application::transport::WirePeer;
use crate::domain::connect::ConnectRequest;

/// Pump poll quantum.
const PUMP_TICK: Duration = Duration::from_micros(100);

/// Server error codes that mean an orderly, user-initiated session end
/// (e.g. Disconnect from the remote Start menu).  No error text is shown.
const BENIGN_ERROR_CODES: [u32; 4] = [1, 2, 7, 9];

/// Server error code for a competing login kicking this session off.
const ERROR_LOGOFF_BY_OTHER: u32 = 5;

/// Lifecycle states of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection attempted (or the last attempt failed).
    Initial,
    /// Connect parameters applied; the pump will dial on its next tick.
    Connecting,
    /// The remote desktop is active.
    Connected,
    /// Terminal; the session will never connect again.
    Closed,
}

/// Errors surfaced by the session facade.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The engine context does not exist, so settings cannot be applied.
    #[error("engine settings unavailable")]
    SettingsUnavailable,

    /// The pump task has already stopped.
    #[error("session worker stopped")]
    WorkerStopped,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// State shared between the facade and the pump task.
///
/// One mutex covers all of it; every transition and the error text queue are
/// observed atomically together.
struct SessionShared {
    state: SessionState,
    /// De-duplication latch for server error codes.
    last_error: u32,
    /// Error lines queued for the next pump flush.
    pending_text: Vec<String>,
}

/// One browser-to-RDP session.
pub struct RdpSession {
    id: Uuid,
    engine: Arc<dyn RdpEngine>,
    bridge: Arc<EventBridge>,
    shared: Arc<Mutex<SessionShared>>,
    running: Arc<AtomicBool>,
    worker: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl RdpSession {
    /// Creates the session, registers the event bridge with the engine, and
    /// starts the pump task.
    ///
    /// Must run inside a tokio runtime.
    pub fn start(
        engine: Arc<dyn RdpEngine>,
        peer: Arc<dyn WirePeer>,
        encoder: Arc<dyn CursorEncoder>,
    ) -> Arc<Self> {
        let id = Uuid::new_v4();
        let bridge = Arc::new(EventBridge::new(id, peer.clone(), encoder));
        engine.register_handler(bridge.clone());

        let shared = Arc::new(Mutex::new(SessionShared {
            state: SessionState::Initial,
            last_error: 0,
            pending_text: Vec::new(),
        }));
        let running = Arc::new(AtomicBool::new(true));

        let handle = tokio::spawn(pump(
            id,
            engine.clone(),
            peer,
            shared.clone(),
            running.clone(),
        ));

        debug!("session {id}: pump started");
        Arc::new(Self {
            id,
            engine,
            bridge,
            shared,
            running,
            worker: tokio::sync::Mutex::new(Some(handle)),
        })
    }

    /// The opaque identifier announced to the browser as `S:<id>`.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.lock_shared().state
    }

    /// Fetches a cached cursor image by pointer id.
    pub fn cursor(&self, id: u32) -> Option<CursorEntry> {
        self.bridge.cursor(id)
    }

    /// Applies connect parameters and arms the pump to dial.
    ///
    /// # Errors
    ///
    /// [`SessionError::SettingsUnavailable`] before the engine context
    /// exists, [`SessionError::WorkerStopped`] once the pump has ended, and
    /// engine errors from `apply_settings`.
    pub fn connect(&self, request: &ConnectRequest) -> Result<(), SessionError> {
        if !self.bridge.context_ready() {
            return Err(SessionError::SettingsUnavailable);
        }
        if !self.running.load(Ordering::SeqCst) {
            return Err(SessionError::WorkerStopped);
        }

        let settings = EngineSettings::from_request(request);
        info!(
            "session {}: connecting to {}:{} as {:?}",
            self.id, settings.hostname, settings.port, settings.username
        );
        self.engine.apply_settings(&settings)?;

        self.lock_shared().state = SessionState::Connecting;
        Ok(())
    }

    /// Dispatches one binary input frame from the browser.
    ///
    /// Input arriving outside the `Connected` state is ignored; the browser
    /// keeps sending briefly after a close and that is not an error.
    pub fn on_message(&self, data: &[u8]) -> Result<(), SessionError> {
        if self.lock_shared().state != SessionState::Connected {
            return Ok(());
        }
        dispatch_input(self.engine.as_ref(), data)?;
        Ok(())
    }

    /// Ends the session.
    ///
    /// When a connection is active the engine is told to tear it down and the
    /// pump exits on its own; otherwise the pump task is awaited so the caller
    /// observes a fully stopped worker.
    pub async fn disconnect(&self) {
        self.running.store(false, Ordering::SeqCst);

        let was_connected = {
            let mut shared = self.lock_shared();
            if shared.state == SessionState::Connected {
                shared.state = SessionState::Closed;
                true
            } else {
                false
            }
        };

        if was_connected {
            self.engine.disconnect();
            return;
        }

        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            if handle.await.is_err() {
                warn!("session {}: pump task panicked", self.id);
            }
        }
    }

    fn lock_shared(&self) -> MutexGuard<'_, SessionShared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Pump task ─────────────────────────────────────────────────────────────────

/// Drives one engine until the session ends.
///
/// Per tick: poll the server error code, flush queued error text as a single
/// `E:` message, honor the engine's disconnect verdict, then run the state
/// step.  A successful dial skips the sleep so the first frame of work starts
/// immediately.
async fn pump(
    id: Uuid,
    engine: Arc<dyn RdpEngine>,
    peer: Arc<dyn WirePeer>,
    shared: Arc<Mutex<SessionShared>>,
    running: Arc<AtomicBool>,
) {
    loop {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        poll_error_info(engine.as_ref(), &shared, &running);
        flush_pending_text(&peer, &shared);

        if engine.shall_disconnect() {
            break;
        }

        let state = lock(&shared).state;
        match state {
            SessionState::Connected => {
                engine.check_pending_work();
            }
            SessionState::Connecting => {
                if engine.connect() {
                    lock(&shared).state = SessionState::Connected;
                    continue;
                }
                let mut s = lock(&shared);
                s.state = SessionState::Initial;
                s.pending_text
                    .push("Could not connect to RDP backend.".to_string());
            }
            SessionState::Initial | SessionState::Closed => {}
        }

        tokio::time::sleep(PUMP_TICK).await;
    }

    debug!("session {id}: pump terminated");
    flush_pending_text(&peer, &shared);

    let mut s = lock(&shared);
    if s.state == SessionState::Connected {
        // The server ended the session; tell the browser it is over.
        if peer.send_text("T:").is_err() {
            debug!("session {id}: peer already gone at termination");
        }
        s.state = SessionState::Closed;
    }
}

/// Reads the server error code and queues user-facing text for new codes.
///
/// The benign codes are an orderly session end: the pump stops without any
/// message.
fn poll_error_info(
    engine: &dyn RdpEngine,
    shared: &Arc<Mutex<SessionShared>>,
    running: &Arc<AtomicBool>,
) {
    let code = engine.error_info();
    if code == 0 {
        return;
    }
    let mut s = lock(shared);
    if s.last_error == code {
        return;
    }
    s.last_error = code;

    if BENIGN_ERROR_CODES.contains(&code) {
        running.store(false, Ordering::SeqCst);
    } else if code == ERROR_LOGOFF_BY_OTHER {
        s.pending_text.push(
            "Another user connected to the server,\nforcing the disconnection of the current connection."
                .to_string(),
        );
    } else {
        s.pending_text.push(format!("Server reported error 0x{code:x}"));
    }
}

/// Sends all queued error lines as one `E:`-prefixed, newline-joined message.
fn flush_pending_text(peer: &Arc<dyn WirePeer>, shared: &Arc<Mutex<SessionShared>>) {
    let pending = {
        let mut s = lock(shared);
        if s.pending_text.is_empty() {
            return;
        }
        std::mem::take(&mut s.pending_text)
    };

    let message = pending
        .iter()
        .map(|line| format!("E:{line}"))
        .collect::<Vec<_>>()
        .join("\n");
    debug!("{message}");
    if peer.send_text(&message).is_err() {
        debug!("peer gone, dropping error text");
    }
}

fn lock<'a>(shared: &'a Arc<Mutex<SessionShared>>) -> MutexGuard<'a, SessionShared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
