//! WebSocket server: accept loop and per-session task management.
//!
//! Responsibilities:
//!
//! 1. Bind a TCP listener on the configured address.
//! 2. Upgrade each accepted connection to a WebSocket session.
//! 3. Create one engine per session via the [`EngineFactory`].
//! 4. Treat the first text frame as the JSON [`ConnectRequest`], then feed
//!    every binary frame into the session.
//! 5. Tear the session down when the browser goes away or the shutdown flag
//!    is cleared.
//!
//! Each browser session runs in its own tokio task; the accept loop never
//! blocks on session I/O.  Outbound traffic goes through [`WsPeer`], an
//! unbounded channel drained by a writer task that owns the sink, so the
//! engine's synchronous callbacks never touch the socket directly.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};

use crate::application::encoder::CursorEncoder;
use crate::application::engine::EngineFactory;
use crate::application::session::RdpSession;
use crate::application::transport::{TransportError, WirePeer};
use crate::domain::config::BridgeConfig;
use crate::domain::connect::ConnectRequest;

// ── Wire peer over a channel ──────────────────────────────────────────────────

/// [`WirePeer`] backed by an unbounded channel into the WebSocket writer task.
///
/// Sends never block; they fail only once the writer task is gone.
pub struct WsPeer {
    tx: mpsc::UnboundedSender<WsMessage>,
}

impl WsPeer {
    /// Creates the peer and the receiving end for the writer task.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<WsMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl WirePeer for WsPeer {
    fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.tx
            .send(WsMessage::Text(text.to_string()))
            .map_err(|_| TransportError::PeerGone)
    }

    fn send_binary(&self, data: Vec<u8>) -> Result<(), TransportError> {
        self.tx
            .send(WsMessage::Binary(data))
            .map_err(|_| TransportError::PeerGone)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Runs the accept loop until `running` is set to `false`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound.
pub async fn run_server(
    config: BridgeConfig,
    factory: Arc<dyn EngineFactory>,
    encoder: Arc<dyn CursorEncoder>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.ws_bind_addr)
        .await
        .with_context(|| {
            format!(
                "failed to bind WebSocket listener on {}",
                config.ws_bind_addr
            )
        })?;

    info!("RDP WebSocket bridge listening on {}", config.ws_bind_addr);

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // A short accept timeout keeps the loop responsive to the shutdown
        // flag even when no browsers are connecting.
        let accept_result = timeout(config.accept_poll, listener.accept()).await;

        match accept_result {
            Ok(Ok((stream, peer_addr))) => {
                info!("new browser connection from {peer_addr}");
                let factory = Arc::clone(&factory);
                let encoder = Arc::clone(&encoder);
                tokio::spawn(async move {
                    handle_browser_session(stream, peer_addr, factory, encoder).await;
                });
            }
            Ok(Err(e)) => {
                // Transient accept error; keep the bridge alive.
                error!("accept error: {e}");
            }
            Err(_) => {
                // Timeout; loop back to check the flag.
            }
        }
    }

    Ok(())
}

// ── Per-session handler ───────────────────────────────────────────────────────

/// Entry point of each per-session task; wraps [`run_session`] and logs the
/// outcome so `?` stays usable inside.
async fn handle_browser_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    factory: Arc<dyn EngineFactory>,
    encoder: Arc<dyn CursorEncoder>,
) {
    match run_session(raw_stream, peer_addr, factory, encoder).await {
        Ok(()) => info!("session {peer_addr} closed normally"),
        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
    }
}

/// Runs the complete lifecycle of one browser WebSocket session.
async fn run_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    factory: Arc<dyn EngineFactory>,
    encoder: Arc<dyn CursorEncoder>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(raw_stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    // Writer task: drains the peer channel into the sink.  Owning the sink
    // here means no lock is ever held across a socket write.
    let (peer, mut out_rx) = WsPeer::channel();
    let peer: Arc<dyn WirePeer> = Arc::new(peer);
    let writer_task = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            if ws_tx.send(msg).await.is_err() {
                debug!("browser sink closed, writer task exiting");
                break;
            }
        }
    });

    // The first text frame carries the connect request; nothing else is
    // meaningful before it.
    let request = match read_connect_request(&mut ws_rx).await {
        Some(request) => request,
        None => {
            debug!("session {peer_addr}: closed before a connect request arrived");
            writer_task.abort();
            return Ok(());
        }
    };

    let engine = factory
        .create()
        .with_context(|| format!("session {peer_addr}: engine creation failed"))?;
    let session = RdpSession::start(engine, peer.clone(), encoder);

    if let Err(e) = session.connect(&request) {
        let _ = peer.send_text(&format!("E:{e}"));
        session.disconnect().await;
        writer_task.abort();
        return Err(e).with_context(|| format!("session {peer_addr}: connect failed"));
    }

    // Input loop: binary frames are input events, everything else is
    // WebSocket housekeeping.
    loop {
        let ws_msg = match ws_rx.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                debug!("session {peer_addr}: browser WebSocket closed");
                break;
            }
            Some(Err(e)) => {
                warn!("session {peer_addr}: browser WebSocket error: {e}");
                break;
            }
            None => {
                debug!("session {peer_addr}: browser stream ended");
                break;
            }
        };

        match ws_msg {
            WsMessage::Binary(data) => {
                if let Err(e) = session.on_message(&data) {
                    warn!("session {peer_addr}: input dispatch failed: {e}");
                    break;
                }
            }
            WsMessage::Text(_) => {
                // Only the connect request is textual; later text is noise.
                debug!("session {peer_addr}: unexpected text frame (ignored)");
            }
            WsMessage::Ping(data) => {
                debug!("session {peer_addr}: WebSocket ping ({} bytes)", data.len());
            }
            WsMessage::Pong(_) => {
                debug!("session {peer_addr}: WebSocket pong received");
            }
            WsMessage::Close(_) => {
                debug!("session {peer_addr}: WebSocket Close frame received");
                break;
            }
            WsMessage::Frame(_) => {
                debug!("session {peer_addr}: raw frame (ignored)");
            }
        }
    }

    session.disconnect().await;
    writer_task.abort();
    Ok(())
}

/// Reads frames until the first text frame and parses it as a
/// [`ConnectRequest`].  Returns `None` if the stream ends first.
async fn read_connect_request<S>(ws_rx: &mut S) -> Option<ConnectRequest>
where
    S: futures_util::Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            WsMessage::Text(json) => match serde_json::from_str::<ConnectRequest>(&json) {
                Ok(request) => return Some(request),
                Err(e) => {
                    warn!("invalid connect request: {e}");
                    return None;
                }
            },
            WsMessage::Close(_) => return None,
            other => {
                // Binary input before a connect request has nothing to act on.
                debug!("frame before connect request ignored: {other:?}");
            }
        }
    }
    None
}
