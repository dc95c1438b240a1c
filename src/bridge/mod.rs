//! Bridge facade.
//!
//! [`Bridge`] ties the bootstrap and correlation components to one
//! automation controller and one set of [`BridgeOptions`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | [`BridgeBuilder`] with collaborator validation |
//! | `core` | [`Bridge`] operations |
//! | `options` | Timeouts, retry policy, blank navigation |

// ============================================================================
// Submodules
// ============================================================================

/// Builder pattern for bridge configuration.
pub mod builder;

/// Bridge coordinator.
pub mod core;

/// Bridge options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::BridgeBuilder;
pub use core::Bridge;
pub use options::BridgeOptions;
