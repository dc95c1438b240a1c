//! WebSocket transport layer.
//!
//! This module handles communication between the bridge and the host's
//! DevTools endpoint via WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Bridge (Rust)  │                              │  Host process   │
//! │                 │         WebSocket            │                 │
//! │  Connection     │─────────────────────────────►│  DevTools       │
//! │  (client)       │   127.0.0.1:PORT/devtools    │  endpoint       │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::connect` - Open the socket advertised by `/json/version`
//! 2. `Connection::send` - Send commands, receive responses and events
//! 3. `Connection::shutdown` - Close the socket

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, EventHandler};
