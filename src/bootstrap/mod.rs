//! Remote-debugging bootstrap.
//!
//! Two steps, run in order:
//!
//! 1. [`Configurator::initialize`] - before the host is ready, write the
//!    debugging port and loopback address onto the host command line
//! 2. [`Connector::connect`] - after readiness, probe the metadata resource
//!    and open an automation connection
//!
//! ```text
//! ┌──────────────┐  switches   ┌──────────────┐  GET /json/version  ┌──────────────┐
//! │ Configurator │────────────►│ Host process │◄────────────────────│  Connector   │
//! └──────────────┘             │ (pre-ready)  │   ws endpoint       │ (retry loop) │
//!                              └──────────────┘────────────────────►└──────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | [`ConnectionConfig`] read/write on the command line |
//! | `configurator` | [`Configurator`] |
//! | `connector` | [`Connector`], [`BridgeConnection`] |
//! | `port` | [`PortAllocator`] |
//! | `retry` | [`RetryPolicy`] |
//! | `version` | [`VersionInfo`] |

// ============================================================================
// Submodules
// ============================================================================

/// Connection configuration stored on the host command line.
pub mod config;

/// Pre-readiness configuration of the host.
pub mod configurator;

/// Metadata probe and automation connect.
pub mod connector;

/// Ephemeral port allocation.
pub mod port;

/// Retry schedule.
pub mod retry;

/// `/json/version` document.
pub mod version;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ConnectionConfig;
pub use configurator::Configurator;
pub use connector::{BridgeConnection, Connector};
pub use port::PortAllocator;
pub use retry::RetryPolicy;
pub use version::VersionInfo;
