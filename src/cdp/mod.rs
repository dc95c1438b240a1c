//! DevTools protocol implementation of the automation traits.
//!
//! [`CdpAutomation`] connects to the browser-level websocket advertised by
//! `/json/version`, enables target discovery, and exposes each `page`
//! target as a [`CdpPage`]. Page URLs are kept live from discovery events;
//! evaluation goes through a flat session attached on first use.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `automation` | Connect and discovery |
//! | `browser` | Page enumeration |
//! | `page` | Session attach and evaluation |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::identifiers::TargetId;
use crate::protocol::TargetInfo;

// ============================================================================
// Submodules
// ============================================================================

/// Connect and discovery.
pub mod automation;

/// Page enumeration.
pub mod browser;

/// Session attach and evaluation.
pub mod page;

// ============================================================================
// Re-exports
// ============================================================================

pub use automation::CdpAutomation;
pub use browser::CdpBrowser;
pub use page::CdpPage;

// ============================================================================
// Types
// ============================================================================

/// Latest known info per target, fed by discovery events.
pub(crate) type TargetMap = Arc<RwLock<FxHashMap<TargetId, TargetInfo>>>;
