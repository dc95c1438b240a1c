//! Remote-debugging connection configuration.
//!
//! A [`ConnectionConfig`] is written onto the host command line once, before
//! readiness, and read back by every connect. Both directions validate the
//! value so a hand-edited or corrupted switch is reported rather than used.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::{Error, Result};
use crate::host::CommandLine;
use crate::host::switches::{REMOTE_DEBUGGING_ADDRESS, REMOTE_DEBUGGING_PORT};

// ============================================================================
// Constants
// ============================================================================

/// Address the debugging endpoint is bound to.
pub const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Path of the debugging metadata resource.
pub const METADATA_PATH: &str = "/json/version";

// ============================================================================
// ConnectionConfig
// ============================================================================

/// Port and address of the host debugging endpoint.
///
/// The address is always loopback; exposing the endpoint on a wildcard or
/// public address is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Debugging port (never 0 once applied).
    port: u16,
    /// Bind address.
    address: IpAddr,
}

impl ConnectionConfig {
    /// Creates a loopback configuration for `port`.
    #[inline]
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self {
            port,
            address: LOOPBACK,
        }
    }

    /// Returns the debugging port.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the bind address.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> IpAddr {
        self.address
    }

    /// Returns the socket address of the debugging endpoint.
    #[inline]
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// Returns the URL of the debugging metadata resource.
    ///
    /// Format: `http://127.0.0.1:{port}/json/version`
    #[inline]
    #[must_use]
    pub fn metadata_url(&self) -> String {
        format!("http://{}{}", self.socket_addr(), METADATA_PATH)
    }

    /// Writes this configuration onto a command line.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyInitialized`] if a port or address switch is already
    ///   present, whatever its value
    /// - [`Error::Config`] if the configuration itself is unusable
    pub fn apply(&self, command_line: &dyn CommandLine) -> Result<()> {
        self.validate()?;
        Self::ensure_unconfigured(command_line)?;

        command_line.append_switch(REMOTE_DEBUGGING_PORT, Some(&self.port.to_string()));
        command_line.append_switch(REMOTE_DEBUGGING_ADDRESS, Some(&self.address.to_string()));

        Ok(())
    }

    /// Fails if either remote-debugging switch is already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInitialized`] carrying the existing value.
    pub fn ensure_unconfigured(command_line: &dyn CommandLine) -> Result<()> {
        let existing = command_line
            .switch_value(REMOTE_DEBUGGING_PORT)
            .or_else(|| command_line.switch_value(REMOTE_DEBUGGING_ADDRESS));

        match existing {
            Some(existing) => Err(Error::AlreadyInitialized { existing }),
            None => Ok(()),
        }
    }

    /// Reads the configuration back from a command line.
    ///
    /// Returns `None` if no port switch is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSwitch`] if either switch holds an unusable value.
    pub fn read(command_line: &dyn CommandLine) -> Result<Option<Self>> {
        let Some(raw_port) = command_line.switch_value(REMOTE_DEBUGGING_PORT) else {
            return Ok(None);
        };

        let port = raw_port
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| Error::invalid_switch(REMOTE_DEBUGGING_PORT, raw_port.clone()))?;

        let raw_address = command_line
            .switch_value(REMOTE_DEBUGGING_ADDRESS)
            .ok_or_else(|| Error::invalid_switch(REMOTE_DEBUGGING_ADDRESS, "<missing>"))?;

        let address = raw_address
            .trim()
            .parse::<IpAddr>()
            .ok()
            .filter(IpAddr::is_loopback)
            .ok_or_else(|| Error::invalid_switch(REMOTE_DEBUGGING_ADDRESS, raw_address.clone()))?;

        Ok(Some(Self { port, address }))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for port 0 or a non-loopback address.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::config("Debugging port must be resolved before it is applied"));
        }
        if !self.address.is_loopback() {
            return Err(Error::config(format!(
                "Debugging address must be loopback, got {}",
                self.address
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

// ============================================================================
// Tests
// ============================================================================
