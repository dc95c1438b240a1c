//! Host window to remote page correlation.
//!
//! Correlation is a point-in-time query: nothing is cached between calls
//! and every call uses a fresh marker.

// ============================================================================
// Submodules
// ============================================================================

/// Marker global scripts.
pub mod binding;

/// Correlation algorithm.
pub mod correlator;

// ============================================================================
// Re-exports
// ============================================================================

pub use binding::MarkerBinding;
pub use correlator::Correlator;
