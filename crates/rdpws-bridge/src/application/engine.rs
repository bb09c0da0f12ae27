//! The RDP engine seam.
//!
//! [`RdpEngine`] abstracts the protocol engine driving one remote desktop
//! connection; [`EngineHandler`] is the callback surface the engine invokes
//! for lifecycle milestones and pointer events.  Each session gets its own
//! engine instance and registers exactly one handler, so callbacks always
//! carry their context explicitly and no global instance registry is needed.
//!
//! The injector methods mirror the engine's input channel one-to-one; they
//! fail with [`EngineError::InputUnavailable`] if called before the input
//! channel exists (i.e. before the context was created).

use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::connect::{ConnectRequest, PerfPreset};

/// Errors reported by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine's input channel does not exist yet.
    #[error("engine input channel unavailable")]
    InputUnavailable,

    /// The engine rejected the supplied settings.
    #[error("invalid engine settings: {0}")]
    InvalidSettings(String),
}

// ── Performance flags ─────────────────────────────────────────────────────────

/// Suppress desktop wallpaper.
pub const PERF_DISABLE_WALLPAPER: u32 = 0x01;
/// Suppress full-window drag.
pub const PERF_DISABLE_FULLWINDOWDRAG: u32 = 0x02;
/// Suppress menu animations.
pub const PERF_DISABLE_MENUANIMATIONS: u32 = 0x04;
/// Suppress desktop theming.
pub const PERF_DISABLE_THEMING: u32 = 0x08;

/// The server port the engine dials.  The deployment targets sit behind a
/// broker listening here; the pre-connection blob selects the actual target.
pub const RDP_SERVER_PORT: u16 = 2179;

/// Connection type hint passed to the server for bandwidth-dependent tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    Lan,
    BroadbandHigh,
    Modem,
}

impl From<PerfPreset> for ConnectionType {
    fn from(preset: PerfPreset) -> Self {
        match preset {
            PerfPreset::Lan => ConnectionType::Lan,
            PerfPreset::Broadband => ConnectionType::BroadbandHigh,
            PerfPreset::Modem => ConnectionType::Modem,
        }
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// Everything the engine needs to dial one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    /// Windows logon domain; `None` means not set.
    pub domain: Option<String>,
    /// `None` disables password authentication entirely (the server prompts).
    pub password: Option<String>,
    pub width: u32,
    pub height: u32,
    /// OR of the `PERF_DISABLE_*` flags.
    pub perf_flags: u32,
    pub connection_type: ConnectionType,
    /// When false, only legacy RDP security is offered.
    pub tls_security: bool,
    /// Server certificates are accepted without a trust store.
    pub ignore_certificate: bool,
    /// The security-layer negotiation is skipped; the layer is fixed up front.
    pub negotiate_security_layer: bool,
    /// Pre-connection blob identifying a brokered target.
    pub pcb: Option<String>,
}

impl EngineSettings {
    /// Builds settings from a browser connect request.
    ///
    /// The preset picks a base set of performance flags (Broadband drops the
    /// wallpaper, Modem drops all four effects); the individual toggles OR
    /// on top of that.  Empty strings become `None` so the engine never sees
    /// an empty credential as a real one.
    pub fn from_request(req: &ConnectRequest) -> Self {
        let p = &req.params;
        let mut perf_flags = match p.perf {
            PerfPreset::Lan => 0,
            PerfPreset::Broadband => PERF_DISABLE_WALLPAPER,
            PerfPreset::Modem => {
                PERF_DISABLE_WALLPAPER
                    | PERF_DISABLE_FULLWINDOWDRAG
                    | PERF_DISABLE_MENUANIMATIONS
                    | PERF_DISABLE_THEMING
            }
        };
        if p.nowallp {
            perf_flags |= PERF_DISABLE_WALLPAPER;
        }
        if p.nowdrag {
            perf_flags |= PERF_DISABLE_FULLWINDOWDRAG;
        }
        if p.nomani {
            perf_flags |= PERF_DISABLE_MENUANIMATIONS;
        }
        if p.notheme {
            perf_flags |= PERF_DISABLE_THEMING;
        }

        Self {
            hostname: req.host.clone(),
            port: RDP_SERVER_PORT,
            username: req.user.clone(),
            domain: non_empty(&req.domain),
            password: non_empty(&req.password),
            width: p.width,
            height: p.height,
            perf_flags,
            connection_type: p.perf.into(),
            tls_security: !p.notls,
            ignore_certificate: true,
            negotiate_security_layer: false,
            pcb: p.pcb.clone(),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// ── Pre-connect capability profile ────────────────────────────────────────────

/// The capability set offered to the server before the connection sequence.
///
/// The drawing-order selection matches what the browser-side renderer can
/// actually draw; everything it cannot is turned off so the server never
/// sends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationProfile {
    pub order_dstblt: bool,
    pub order_patblt: bool,
    pub order_scrblt: bool,
    pub order_opaque_rect: bool,
    pub order_multi_opaque_rect: bool,
    pub order_line_to: bool,
    pub order_polyline: bool,
    pub order_glyph_index: bool,
    pub order_fast_index: bool,
    pub order_fast_glyph: bool,
    pub order_memblt: bool,
    pub order_mem3blt: bool,
    pub order_save_bitmap: bool,
    pub order_polygon: bool,
    pub order_ellipse: bool,
    pub order_nine_grid: bool,
    pub order_multi_blt_family: bool,
    pub color_depth: u32,
    pub fast_path_output: bool,
    pub frame_acknowledge: bool,
    pub large_pointer: bool,
    pub bitmap_cache_v3: bool,
    pub persistent_bitmap_cache: bool,
    pub glyph_cache: bool,
    /// Color conversion: emit an alpha channel.
    pub clrconv_alpha: bool,
    /// Color conversion: invert the channel order.
    pub clrconv_invert: bool,
}

impl Default for NegotiationProfile {
    fn default() -> Self {
        Self {
            order_dstblt: true,
            order_patblt: true,
            order_scrblt: true,
            order_opaque_rect: true,
            order_multi_opaque_rect: true,
            order_line_to: true,
            order_polyline: true,
            order_glyph_index: true,
            order_fast_index: true,
            order_fast_glyph: true,
            order_memblt: false,
            order_mem3blt: false,
            order_save_bitmap: false,
            order_polygon: false,
            order_ellipse: false,
            order_nine_grid: false,
            order_multi_blt_family: false,
            color_depth: 16,
            fast_path_output: true,
            frame_acknowledge: true,
            large_pointer: true,
            bitmap_cache_v3: false,
            persistent_bitmap_cache: false,
            glyph_cache: false,
            clrconv_alpha: true,
            clrconv_invert: true,
        }
    }
}

// ── Pointer data ──────────────────────────────────────────────────────────────

/// A pointer bitmap handed over by an engine callback.
///
/// `id` is a slot owned by the engine for the lifetime of the pointer; the
/// handler writes its allocated id into it on `pointer_new` and reads it back
/// on `pointer_set` / `pointer_free`.  A value of zero means "never
/// registered".
#[derive(Debug)]
pub struct PointerData {
    /// Bridge-assigned pointer id.  Zero until `pointer_new` assigns one.
    pub id: AtomicU32,
    pub width: u32,
    pub height: u32,
    pub hot_x: u32,
    pub hot_y: u32,
    /// Straight-ARGB pixels, already converted from the engine's mask pair.
    /// `None` when the engine delivered no image data.
    pub argb: Option<Vec<u8>>,
}

impl PointerData {
    /// A pointer with image data.
    pub fn new(width: u32, height: u32, hot_x: u32, hot_y: u32, argb: Vec<u8>) -> Self {
        Self {
            id: AtomicU32::new(0),
            width,
            height,
            hot_x,
            hot_y,
            argb: Some(argb),
        }
    }

    /// A pointer the engine announced without pixels.
    pub fn without_image(width: u32, height: u32, hot_x: u32, hot_y: u32) -> Self {
        Self {
            id: AtomicU32::new(0),
            width,
            height,
            hot_x,
            hot_y,
            argb: None,
        }
    }
}

// ── Traits ────────────────────────────────────────────────────────────────────

/// One protocol engine instance, driving one remote desktop connection.
///
/// `connect`, `check_pending_work` and `disconnect` are polled from the
/// session's pump task; the injectors are called from the WebSocket read
/// path.  Implementations must therefore be internally synchronized.
pub trait RdpEngine: Send + Sync {
    /// Registers the callback handler.  The engine creates its context as
    /// part of registration and fires `context_created` before returning.
    fn register_handler(&self, handler: Arc<dyn EngineHandler>);

    /// Applies connection settings.  Must be called before `connect`.
    fn apply_settings(&self, settings: &EngineSettings) -> Result<(), EngineError>;

    /// Performs the blocking connection sequence.  Returns whether the
    /// connection reached the active stage.
    fn connect(&self) -> bool;

    /// Tears the connection down.  Returns whether a connection was active.
    fn disconnect(&self) -> bool;

    /// Processes pending engine work (one poll quantum).  Returns `false`
    /// when the engine can no longer make progress.
    fn check_pending_work(&self) -> bool;

    /// Last server-reported error code; zero means none.
    fn error_info(&self) -> u32;

    /// Whether the engine has decided the connection must end.
    fn shall_disconnect(&self) -> bool;

    // ── Input injectors ──────────────────────────────────────────────────────

    fn send_synchronize_event(&self, flags: u32) -> Result<(), EngineError>;
    fn send_keyboard_event(&self, flags: u16, code: u16) -> Result<(), EngineError>;
    fn send_unicode_keyboard_event(&self, flags: u16, code: u16) -> Result<(), EngineError>;
    fn send_mouse_event(&self, flags: u16, x: u16, y: u16) -> Result<(), EngineError>;
    fn send_extended_mouse_event(&self, flags: u16, x: u16, y: u16) -> Result<(), EngineError>;
}

/// Callbacks the engine fires into the session.
///
/// All methods run on the engine's polling thread and must not block.
pub trait EngineHandler: Send + Sync {
    /// The engine context now exists; injectors may be used.
    fn context_created(&self);

    /// The engine context is gone.  Must be idempotent; engines may fire it
    /// more than once during teardown.
    fn context_destroyed(&self);

    /// Called before the connection sequence; returns the capability profile
    /// to offer.
    fn pre_connect(&self) -> NegotiationProfile;

    /// Called when the connection reached the active stage.
    fn post_connect(&self);

    /// Credential prompt.  Returning `false` aborts the connection.
    fn authenticate(&self) -> bool;

    /// Certificate trust prompt.  Returning `false` aborts the connection.
    fn verify_certificate(&self, subject: &str, issuer: &str, fingerprint: &str) -> bool;

    // ── Pointer lifecycle ────────────────────────────────────────────────────

    fn pointer_new(&self, pointer: &PointerData);
    fn pointer_free(&self, pointer: &PointerData);
    fn pointer_set(&self, pointer: &PointerData);
    fn pointer_set_null(&self);
    fn pointer_set_default(&self);
}

/// Creates one engine per accepted browser session.
pub trait EngineFactory: Send + Sync {
    fn create(&self) -> Result<Arc<dyn RdpEngine>, EngineError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
