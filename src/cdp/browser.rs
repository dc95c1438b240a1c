//! Browser-level session and page enumeration.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::debug;

use crate::automation::{RemoteConnection, RemotePage, Viewport};
use crate::error::Result;
use crate::identifiers::TargetId;
use crate::protocol::{Command, Request, TargetCommand, TargetInfo};
use crate::transport::Connection;

use super::{CdpPage, TargetMap};

// ============================================================================
// Types
// ============================================================================

/// Result of `Target.getTargets`.
#[derive(Debug, Deserialize)]
struct TargetList {
    #[serde(rename = "targetInfos", default)]
    target_infos: Vec<TargetInfo>,
}

// ============================================================================
// CdpBrowser
// ============================================================================

/// A browser-level DevTools session.
///
/// Page handles are cached per target so a page keeps its attached session
/// across [`RemoteConnection::pages`] calls.
pub struct CdpBrowser {
    /// Shared websocket connection.
    connection: Connection,
    /// Live target info.
    targets: TargetMap,
    /// Cached page handles.
    pages: Mutex<FxHashMap<TargetId, Arc<CdpPage>>>,
    /// Viewport applied when a page session is attached.
    viewport: Option<Viewport>,
    /// Per-command deadline.
    request_timeout: Duration,
}

impl fmt::Debug for CdpBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpBrowser")
            .field("targets", &self.targets.read().len())
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl CdpBrowser {
    /// Wraps a connection with discovery already enabled.
    pub(crate) fn new(
        connection: Connection,
        targets: TargetMap,
        viewport: Option<Viewport>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            connection,
            targets,
            pages: Mutex::new(FxHashMap::default()),
            viewport,
            request_timeout,
        }
    }

    /// Closes the websocket. Page handles stop working afterwards.
    pub fn close(&self) {
        self.connection.shutdown();
    }

    /// Returns `true` once the websocket is closed.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.connection.is_closed()
    }

    /// Lists targets and refreshes the live map.
    async fn list_targets(&self) -> Result<Vec<TargetInfo>> {
        let request = Request::new(Command::Target(TargetCommand::GetTargets));
        let result = self
            .connection
            .send_with_timeout(request, self.request_timeout)
            .await?
            .into_result()?;

        let list: TargetList = serde_json::from_value(result)?;

        let mut targets = self.targets.write();
        for info in &list.target_infos {
            targets.insert(info.target_id.clone(), info.clone());
        }

        Ok(list.target_infos)
    }
}

#[async_trait]
impl RemoteConnection for CdpBrowser {
    async fn pages(&self) -> Result<Vec<Arc<dyn RemotePage>>> {
        let infos = self.list_targets().await?;

        let mut cache = self.pages.lock();
        cache.retain(|id, _| infos.iter().any(|info| &info.target_id == id));

        let pages: Vec<Arc<dyn RemotePage>> = infos
            .into_iter()
            .filter(TargetInfo::is_page)
            .map(|info| {
                let page = cache.entry(info.target_id.clone()).or_insert_with(|| {
                    Arc::new(CdpPage::new(
                        info.target_id,
                        self.connection.clone(),
                        Arc::clone(&self.targets),
                        self.viewport,
                        self.request_timeout,
                    ))
                });
                Arc::clone(page) as Arc<dyn RemotePage>
            })
            .collect();

        debug!(count = pages.len(), "Listed remote pages");
        Ok(pages)
    }
}

// ============================================================================
// Tests
// ============================================================================
