//! Window to page correlation.
//!
//! No protocol field links a host window to its remote page, so the
//! correlator plants a unique marker in the window and asks every remote
//! page whether it sees it.
//!
//! # Sequence
//!
//! 1. Ensure the window has content (optionally navigate to a blank page)
//! 2. Install the marker global in the window
//! 3. Probe every remote page concurrently
//! 4. Remove the marker global, whatever the outcome
//! 5. Return the single matching page
//!
//! Steps 2 to 4 are strictly ordered; only the probes inside step 3 overlap.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::automation::{RemoteConnection, RemotePage};
use crate::bridge::BridgeOptions;
use crate::error::{Error, Result};
use crate::host::HostWindow;
use crate::identifiers::CorrelationToken;

use super::binding::MarkerBinding;

// ============================================================================
// PageProbe
// ============================================================================

/// Outcome of probing one remote page.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PageProbe {
    /// The page sees the marker.
    Match,
    /// The page answered without the marker.
    NoMatch,
    /// The page could not be evaluated (context gone, timeout).
    Unavailable(String),
}

// ============================================================================
// Correlator
// ============================================================================

/// Finds the remote page backing a host window.
pub struct Correlator {
    /// Deadlines and blank navigation settings.
    options: BridgeOptions,
}

impl fmt::Debug for Correlator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Correlator")
            .field("evaluate_timeout_ms", &self.options.evaluate_timeout_ms)
            .field("blank_url", &self.options.blank_url)
            .finish_non_exhaustive()
    }
}

impl Correlator {
    /// Creates a correlator.
    #[inline]
    #[must_use]
    pub fn new(options: BridgeOptions) -> Self {
        Self { options }
    }

    /// Returns the remote page that corresponds to `window`.
    ///
    /// # Arguments
    ///
    /// * `connection` - Live automation connection
    /// * `window` - Host window to locate
    /// * `allow_blank_navigate` - Navigate an empty window to a blank page first
    ///
    /// # Errors
    ///
    /// - [`Error::ContentNotLoaded`] if the window is empty and navigation is not allowed
    /// - [`Error::PageNotFound`] if no page carries the marker
    /// - [`Error::AmbiguousPage`] if several pages carry it
    /// - [`Error::Timeout`] if a window script, navigation or the page listing
    ///   exceeds its deadline
    pub async fn get_page(
        &self,
        connection: &dyn RemoteConnection,
        window: &dyn HostWindow,
        allow_blank_navigate: bool,
    ) -> Result<Arc<dyn RemotePage>> {
        self.ensure_content(window, allow_blank_navigate).await?;

        let binding = MarkerBinding::new(CorrelationToken::generate());
        debug!(binding = %binding.name(), "Correlating window");

        let outcome = match self
            .run_in_window(window, "install marker", &binding.install_script())
            .await
        {
            Ok(_) => self.search(connection, &binding).await,
            Err(e) => Err(e),
        };

        let cleanup = self
            .run_in_window(window, "remove marker", &binding.remove_script())
            .await;

        match (outcome, cleanup) {
            (Ok(page), Ok(_)) => {
                debug!(url = %page.url(), "Window correlated");
                Ok(page)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(cleanup_err)) => {
                warn!(error = %cleanup_err, "Failed to remove marker after failed correlation");
                Err(e)
            }
        }
    }

    /// Navigates an empty window to the blank location if allowed.
    async fn ensure_content(&self, window: &dyn HostWindow, allow_blank_navigate: bool) -> Result<()> {
        if window.has_content() {
            return Ok(());
        }
        if !allow_blank_navigate {
            return Err(Error::ContentNotLoaded);
        }

        let url = self.options.blank_url.as_str();
        debug!(%url, "Window has no content, navigating to blank page");
        self.with_deadline(
            "blank navigation",
            self.options.script_timeout(),
            window.load_url(url),
        )
        .await
    }

    /// Probes every page and selects the single match.
    async fn search(
        &self,
        connection: &dyn RemoteConnection,
        binding: &MarkerBinding,
    ) -> Result<Arc<dyn RemotePage>> {
        let pages = self
            .with_deadline("list pages", self.options.request_timeout(), connection.pages())
            .await?;
        let expression = binding.probe_expression();

        let probes = join_all(
            pages
                .iter()
                .map(|page| self.probe(page.as_ref(), binding, &expression)),
        )
        .await;

        let mut matches: Vec<Arc<dyn RemotePage>> = pages
            .into_iter()
            .zip(probes)
            .filter_map(|(page, probe)| match probe {
                PageProbe::Match => Some(page),
                PageProbe::NoMatch => None,
                PageProbe::Unavailable(reason) => {
                    trace!(url = %page.url(), %reason, "Page unavailable during correlation");
                    None
                }
            })
            .collect();

        if matches.len() > 1 {
            return Err(Error::AmbiguousPage {
                count: matches.len(),
            });
        }
        matches.pop().ok_or(Error::PageNotFound)
    }

    /// Evaluates the marker in one page. Never fails.
    async fn probe(&self, page: &dyn RemotePage, binding: &MarkerBinding, expression: &str) -> PageProbe {
        let deadline = self.options.evaluate_timeout();
        match timeout(deadline, page.evaluate(expression)).await {
            Ok(Ok(value)) if binding.matches(&value) => PageProbe::Match,
            Ok(Ok(_)) => PageProbe::NoMatch,
            Ok(Err(e)) => PageProbe::Unavailable(e.to_string()),
            Err(_) => PageProbe::Unavailable(format!(
                "evaluation timed out after {}ms",
                deadline.as_millis()
            )),
        }
    }

    /// Runs a script in the window under the script deadline.
    async fn run_in_window(
        &self,
        window: &dyn HostWindow,
        operation: &str,
        script: &str,
    ) -> Result<Value> {
        self.with_deadline(operation, self.options.script_timeout(), window.execute_script(script))
            .await
    }

    /// Applies `deadline` to `future`.
    async fn with_deadline<T>(
        &self,
        operation: &str,
        deadline: Duration,
        future: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        timeout(deadline, future)
            .await
            .map_err(|_| Error::timeout(operation, deadline.as_millis() as u64))?
    }
}

// ============================================================================
// Tests
// ============================================================================
