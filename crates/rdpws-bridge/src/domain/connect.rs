//! The browser's JSON connect request.
//!
//! The first WebSocket text frame of every session carries one
//! [`ConnectRequest`].  Everything after it is binary input frames.  All
//! fields except `host` are optional so a minimal client can send
//! `{"host":"10.0.0.5"}` and get sensible defaults.

use serde::{Deserialize, Serialize};

/// Connection parameters sent by the browser before any input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// Hostname or IP of the remote desktop server.
    pub host: String,
    /// Login user name.  May be empty for servers that prompt.
    #[serde(default)]
    pub user: String,
    /// Windows logon domain.  Empty means none.
    #[serde(default)]
    pub domain: String,
    /// Password.  Empty disables password authentication entirely.
    #[serde(default)]
    pub password: String,
    /// Desktop and tuning parameters.
    #[serde(default)]
    pub params: ConnectParams,
}

/// Desktop geometry and protocol tuning knobs.
///
/// The boolean names follow the query-string parameters the web client has
/// always used, so the JSON stays compatible with existing front-ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectParams {
    /// Desktop width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Desktop height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Bandwidth preset controlling the experience flags the server applies.
    #[serde(default)]
    pub perf: PerfPreset,
    /// Disable wallpaper on the remote desktop.
    #[serde(default)]
    pub nowallp: bool,
    /// Disable full-window drag.
    #[serde(default)]
    pub nowdrag: bool,
    /// Disable menu animations.
    #[serde(default)]
    pub nomani: bool,
    /// Disable desktop theming.
    #[serde(default)]
    pub notheme: bool,
    /// Disable TLS security (legacy RDP security only).
    #[serde(default)]
    pub notls: bool,
    /// Pre-connection blob for brokered targets.  When set, the engine
    /// connects to the broker port instead of the standard RDP port.
    #[serde(default)]
    pub pcb: Option<String>,
}

fn default_width() -> u32 {
    1024
}

fn default_height() -> u32 {
    768
}

impl Default for ConnectParams {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            perf: PerfPreset::default(),
            nowallp: false,
            nowdrag: false,
            nomani: false,
            notheme: false,
            notls: false,
            pcb: None,
        }
    }
}

/// Bandwidth presets the browser can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerfPreset {
    /// Local network: everything on.
    #[default]
    Lan,
    /// High-speed broadband.
    Broadband,
    /// Low-bandwidth link.
    Modem,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_request_uses_defaults() {
        let req: ConnectRequest = serde_json::from_str(r#"{"host":"10.0.0.5"}"#).unwrap();

        assert_eq!(req.host, "10.0.0.5");
        assert!(req.user.is_empty());
        assert!(req.domain.is_empty());
        assert!(req.password.is_empty());
        assert_eq!(req.params, ConnectParams::default());
    }

    #[test]
    fn test_default_geometry_is_1024x768() {
        let params = ConnectParams::default();
        assert_eq!(params.width, 1024);
        assert_eq!(params.height, 768);
    }

    #[test]
    fn test_full_request_round_trips() {
        let req = ConnectRequest {
            host: "ts.example.com".to_string(),
            user: "alice".to_string(),
            domain: "CORP".to_string(),
            password: "hunter2".to_string(),
            params: ConnectParams {
                width: 1920,
                height: 1080,
                perf: PerfPreset::Broadband,
                nowallp: true,
                nowdrag: true,
                nomani: false,
                notheme: true,
                notls: false,
                pcb: Some("vm-guid".to_string()),
            },
        };

        let json = serde_json::to_string(&req).unwrap();
        let parsed: ConnectRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn test_perf_preset_parses_from_lowercase_names() {
        let req: ConnectRequest =
            serde_json::from_str(r#"{"host":"h","params":{"perf":"modem"}}"#).unwrap();
        assert_eq!(req.params.perf, PerfPreset::Modem);
    }

    #[test]
    fn test_missing_host_is_an_error() {
        let result = serde_json::from_str::<ConnectRequest>(r#"{"user":"bob"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_perf_preset_is_lan() {
        assert_eq!(PerfPreset::default(), PerfPreset::Lan);
    }
}
