//! Launch switches of the host process.
//!
//! Switches are `name` / optional `value` pairs applied before the host is
//! ready, the equivalent of `--name=value` on a command line.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

// ============================================================================
// Constants
// ============================================================================

/// Port the debugging endpoint listens on.
pub const REMOTE_DEBUGGING_PORT: &str = "remote-debugging-port";

/// Address the debugging endpoint binds to.
pub const REMOTE_DEBUGGING_ADDRESS: &str = "remote-debugging-address";

/// Comma-separated list of host features to enable.
pub const ENABLE_FEATURES: &str = "enable-features";

// ============================================================================
// CommandLine
// ============================================================================

/// Read/write access to the launch switches of a host process.
///
/// Implementations use interior mutability: the host hands out shared
/// references and switches are appended in place.
pub trait CommandLine: Send + Sync {
    /// Sets a switch, replacing any previous value.
    fn append_switch(&self, name: &str, value: Option<&str>);

    /// Returns `true` if the switch is present.
    fn has_switch(&self, name: &str) -> bool;

    /// Returns the switch value. Empty string for a valueless switch,
    /// `None` if absent.
    fn switch_value(&self, name: &str) -> Option<String>;
}

// ============================================================================
// Switches
// ============================================================================

/// In-memory switch store.
///
/// Embedders that keep their own command line can implement
/// [`CommandLine`] directly; everyone else can hold one of these.
#[derive(Default)]
pub struct Switches {
    /// Switch name to optional value.
    entries: RwLock<FxHashMap<String, Option<String>>>,
}

impl Switches {
    /// Creates an empty switch store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of switches set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no switch is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Renders the switches as `--name[=value]` arguments, sorted by name.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let entries = self.entries.read();
        let mut args: Vec<String> = entries
            .iter()
            .map(|(name, value)| match value {
                Some(value) => format!("--{name}={value}"),
                None => format!("--{name}"),
            })
            .collect();
        args.sort();
        args
    }
}

impl CommandLine for Switches {
    fn append_switch(&self, name: &str, value: Option<&str>) {
        self.entries
            .write()
            .insert(name.to_string(), value.map(str::to_string));
    }

    fn has_switch(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    fn switch_value(&self, name: &str) -> Option<String> {
        self.entries
            .read()
            .get(name)
            .map(|value| value.clone().unwrap_or_default())
    }
}

impl fmt::Debug for Switches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_args()).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
