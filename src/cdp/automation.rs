//! Browser-level connect.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::automation::{Automation, ConnectOptions, RemoteConnection};
use crate::error::{Error, Result};
use crate::protocol::{Command, Event, ParsedEvent, Request, TargetCommand};
use crate::transport::Connection;

use super::{CdpBrowser, TargetMap};

// ============================================================================
// Constants
// ============================================================================

/// Default per-request deadline in milliseconds.
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// CdpAutomation
// ============================================================================

/// Automation controller speaking the DevTools protocol over websocket.
///
/// # Example
///
/// ```ignore
/// use devtools_bridge::cdp::CdpAutomation;
///
/// let automation = CdpAutomation::new().with_request_timeout(Duration::from_secs(2));
/// let bridge = Bridge::builder().automation(automation).build()?;
/// ```
#[derive(Debug, Clone)]
pub struct CdpAutomation {
    /// Deadline for the handshake and every command.
    request_timeout: Duration,
}

impl Default for CdpAutomation {
    fn default() -> Self {
        Self::new()
    }
}

impl CdpAutomation {
    /// Creates a controller with the default request deadline.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Sets the handshake and per-command deadline.
    #[inline]
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the per-command deadline.
    #[inline]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Applies one discovery event to the target map.
    fn track(targets: &TargetMap, event: Event) {
        match event.parse() {
            ParsedEvent::TargetCreated(info) | ParsedEvent::TargetInfoChanged(info) => {
                trace!(target_id = %info.target_id, url = %info.url, "Target updated");
                targets.write().insert(info.target_id.clone(), info);
            }
            ParsedEvent::TargetDestroyed { target_id } => {
                trace!(%target_id, "Target destroyed");
                targets.write().remove(&target_id);
            }
            ParsedEvent::Unknown { .. } => {}
        }
    }
}

#[async_trait]
impl Automation for CdpAutomation {
    async fn connect(&self, options: ConnectOptions) -> Result<Arc<dyn RemoteConnection>> {
        let endpoint = &options.websocket_endpoint;
        if !matches!(endpoint.scheme(), "ws" | "wss") {
            return Err(Error::config(format!(
                "websocket endpoint must use ws or wss: {endpoint}"
            )));
        }

        let connection = Connection::connect(endpoint, self.request_timeout).await?;

        let targets: TargetMap = Arc::new(RwLock::new(FxHashMap::default()));
        let tracked = Arc::clone(&targets);
        connection.set_event_handler(Box::new(move |event| Self::track(&tracked, event)));

        let discover = Request::new(Command::Target(TargetCommand::SetDiscoverTargets {
            discover: true,
        }));
        if let Err(e) = connection
            .send_with_timeout(discover, self.request_timeout)
            .await
            .and_then(|response| response.into_result())
        {
            connection.shutdown();
            return Err(e);
        }

        debug!(%endpoint, "Target discovery enabled");

        Ok(Arc::new(CdpBrowser::new(
            connection,
            targets,
            options.default_viewport,
            self.request_timeout,
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================
