//! Ephemeral port allocation.
//!
//! Binds a listener to port 0, reads back the OS-assigned port and releases
//! the socket. The port is free at the time of the call; the host binds it
//! shortly afterwards.

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpListener;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// PortAllocator
// ============================================================================

/// Obtains unused local ports.
///
/// # Example
///
/// ```ignore
/// use std::net::{IpAddr, Ipv4Addr};
/// use devtools_bridge::bootstrap::PortAllocator;
///
/// let port = PortAllocator::allocate(IpAddr::V4(Ipv4Addr::LOCALHOST)).await?;
/// assert!(port > 0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PortAllocator;

impl PortAllocator {
    /// Allocates a free port on the given address.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if binding fails (no free ports, permission denied)
    /// - [`Error::Config`] if the address is not a loopback address
    pub async fn allocate(ip: IpAddr) -> Result<u16> {
        if !ip.is_loopback() {
            return Err(Error::config(format!(
                "Refusing to allocate a debugging port on non-loopback address {ip}"
            )));
        }

        let listener = TcpListener::bind(SocketAddr::new(ip, 0)).await?;
        let port = listener.local_addr()?.port();
        drop(listener);

        debug!(%ip, port, "Allocated ephemeral port");

        Ok(port)
    }
}

// ============================================================================
// Tests
// ============================================================================
