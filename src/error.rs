//! Error types for the DevTools bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use devtools_bridge::{Bridge, Result};
//!
//! async fn example(bridge: &Bridge, process: &dyn HostProcess) -> Result<()> {
//!     bridge.initialize(process, 0).await?;
//!     let connection = bridge.connect(process).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Precondition | [`Error::MissingArgument`], [`Error::InvalidPort`], [`Error::AlreadyReady`], [`Error::AlreadyInitialized`], [`Error::NotInitialized`], [`Error::PortMismatch`], [`Error::InvalidSwitch`], [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`], [`Error::EndpointUnreachable`] |
//! | Protocol | [`Error::Protocol`] |
//! | Correlation | [`Error::ContentNotLoaded`], [`Error::PageNotFound`], [`Error::AmbiguousPage`] |
//! | Execution | [`Error::ScriptError`], [`Error::Navigation`], [`Error::Timeout`], [`Error::RequestTimeout`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`], [`Error::Http`], [`Error::Url`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Precondition Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when bridge options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// A required collaborator was not supplied.
    #[error("The parameter '{name}' was not passed in")]
    MissingArgument {
        /// Name of the missing argument.
        name: &'static str,
    },

    /// Requested debugging port is outside `0..=65535`.
    #[error("Invalid port {port}")]
    InvalidPort {
        /// The rejected port value.
        port: u32,
    },

    /// The host process already reached readiness.
    ///
    /// Configuration switches are only honoured before the host is ready.
    #[error("Must be called before the host process is ready")]
    AlreadyReady,

    /// The host process already carries a remote-debugging configuration.
    #[error("Remote debugging is already configured on port {existing}")]
    AlreadyInitialized {
        /// Raw value of the existing port switch.
        existing: String,
    },

    /// No remote-debugging configuration found on the host process.
    #[error("Remote debugging port not configured; initialize was never called")]
    NotInitialized,

    /// The configured port changed between two connects on the same process.
    #[error("Port mismatch: previously connected on {expected}, now configured for {actual}")]
    PortMismatch {
        /// Port used by the earlier connect.
        expected: u16,
        /// Port currently configured.
        actual: u16,
    },

    /// A configuration switch holds a value that cannot be used.
    #[error("Invalid value for switch '{name}': {value}")]
    InvalidSwitch {
        /// Switch name.
        name: String,
        /// Offending value.
        value: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Timeout waiting for the host process or the remote end.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// WebSocket connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The debugging metadata resource never answered within the retry budget.
    #[error("Debugging endpoint {url} unreachable after {attempts} attempts: {message}")]
    EndpointUnreachable {
        /// URL of the metadata resource.
        url: String,
        /// Number of attempts made.
        attempts: u32,
        /// Last failure observed.
        message: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or unexpected response.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Correlation Errors
    // ========================================================================
    /// The window has no loaded content and blank navigation was not allowed.
    #[error("Cannot correlate a window without loaded content")]
    ContentNotLoaded,

    /// No remote page carried the correlation token.
    #[error("No corresponding remote page found")]
    PageNotFound,

    /// More than one remote page carried the correlation token.
    #[error("Correlation matched {count} remote pages")]
    AmbiguousPage {
        /// Number of matching pages.
        count: usize,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// JavaScript execution error.
    #[error("Script error: {message}")]
    ScriptError {
        /// Error message from script execution.
        message: String,
    },

    /// Window navigation failed.
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// Target location.
        url: String,
        /// Failure description.
        message: String,
    },

    /// Operation timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Command request timeout.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a missing argument error.
    #[inline]
    pub fn missing_argument(name: &'static str) -> Self {
        Self::MissingArgument { name }
    }

    /// Creates an invalid switch error.
    #[inline]
    pub fn invalid_switch(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidSwitch {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates an endpoint unreachable error.
    #[inline]
    pub fn endpoint_unreachable(
        url: impl Into<String>,
        attempts: u32,
        message: impl Into<String>,
    ) -> Self {
        Self::EndpointUnreachable {
            url: url.into(),
            attempts,
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a script error.
    #[inline]
    pub fn script_error(message: impl Into<String>) -> Self {
        Self::ScriptError {
            message: message.into(),
        }
    }

    /// Creates a navigation error.
    #[inline]
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::Timeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::EndpointUnreachable { .. }
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this error reports a violated precondition.
    ///
    /// Precondition errors are never retried.
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::MissingArgument { .. }
                | Self::InvalidPort { .. }
                | Self::AlreadyReady
                | Self::AlreadyInitialized { .. }
                | Self::NotInitialized
                | Self::PortMismatch { .. }
                | Self::InvalidSwitch { .. }
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ConnectionTimeout { .. }
            | Self::Timeout { .. }
            | Self::RequestTimeout { .. } => true,
            Self::Http(e) => !(e.is_builder() || e.is_decode() || e.is_redirect()),
            _ => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
