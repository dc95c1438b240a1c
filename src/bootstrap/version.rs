//! Debugging metadata document.
//!
//! Served by the host at `GET /json/version`:
//!
//! ```json
//! {
//!   "Browser": "Chrome/78.0.3904.130",
//!   "Protocol-Version": "1.3",
//!   "User-Agent": "Mozilla/5.0 ...",
//!   "V8-Version": "7.8.279.23",
//!   "WebKit-Version": "537.36 (...)",
//!   "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/browser/<id>"
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// VersionInfo
// ============================================================================

/// Parsed `/json/version` response.
///
/// Only the websocket URL is required; the descriptive fields default to
/// empty strings when a host omits them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    /// Product name and version.
    #[serde(rename = "Browser", default)]
    pub browser: String,

    /// DevTools protocol version.
    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: String,

    /// User agent string.
    #[serde(rename = "User-Agent", default)]
    pub user_agent: String,

    /// JavaScript engine version.
    #[serde(rename = "V8-Version", default)]
    pub v8_version: String,

    /// Rendering engine version.
    #[serde(rename = "WebKit-Version", default)]
    pub webkit_version: String,

    /// Browser-level websocket endpoint.
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: String,
}

impl VersionInfo {
    /// Returns the validated websocket endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the URL is missing or not `ws`/`wss`.
    pub fn websocket_endpoint(&self) -> Result<Url> {
        if self.web_socket_debugger_url.is_empty() {
            return Err(Error::protocol(
                "Debugging metadata has no webSocketDebuggerUrl",
            ));
        }

        let url = Url::parse(&self.web_socket_debugger_url)?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            scheme => Err(Error::protocol(format!(
                "Unexpected websocket endpoint scheme '{scheme}'"
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
