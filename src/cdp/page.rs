//! Page targets.
//!
//! A [`CdpPage`] attaches a flat session to its target on first evaluation
//! and reuses it afterwards. Its URL comes from the live target map, so it
//! follows navigations reported by discovery events.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::automation::{RemotePage, Viewport};
use crate::error::{Error, Result};
use crate::identifiers::{CdpSessionId, TargetId};
use crate::protocol::{Command, EmulationCommand, Request, RuntimeCommand, TargetCommand};
use crate::transport::Connection;

use super::TargetMap;

// ============================================================================
// CdpPage
// ============================================================================

/// A `page` target reachable through the browser connection.
pub struct CdpPage {
    /// Target this page wraps.
    target_id: TargetId,
    /// Shared websocket connection.
    connection: Connection,
    /// Live target info.
    targets: TargetMap,
    /// Flat session, attached on first use.
    session: OnceCell<CdpSessionId>,
    /// Viewport applied right after attaching.
    viewport: Option<Viewport>,
    /// Per-command deadline.
    request_timeout: Duration,
}

impl fmt::Debug for CdpPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpPage")
            .field("target_id", &self.target_id)
            .field("session", &self.session.get())
            .field("url", &self.url())
            .finish_non_exhaustive()
    }
}

impl CdpPage {
    pub(crate) fn new(
        target_id: TargetId,
        connection: Connection,
        targets: TargetMap,
        viewport: Option<Viewport>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            target_id,
            connection,
            targets,
            session: OnceCell::new(),
            viewport,
            request_timeout,
        }
    }

    /// Returns the target ID.
    #[inline]
    #[must_use]
    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    /// Returns the attached session, if any.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> Option<&CdpSessionId> {
        self.session.get()
    }

    /// Sends one command and unwraps its result.
    async fn call(&self, request: Request) -> Result<Value> {
        self.connection
            .send_with_timeout(request, self.request_timeout)
            .await?
            .into_result()
    }

    /// Returns the flat session, attaching on first call.
    async fn session(&self) -> Result<&CdpSessionId> {
        self.session.get_or_try_init(|| self.attach()).await
    }

    /// Attaches a flat session and applies the viewport override.
    async fn attach(&self) -> Result<CdpSessionId> {
        let result = self
            .call(Request::new(Command::Target(TargetCommand::AttachToTarget {
                target_id: self.target_id.clone(),
                flatten: true,
            })))
            .await?;

        let session_id = result
            .get("sessionId")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(CdpSessionId::new)
            .ok_or_else(|| Error::protocol("attachToTarget returned no sessionId"))?;

        debug!(target_id = %self.target_id, %session_id, "Attached to page");

        if let Some(viewport) = self.viewport {
            self.call(Request::for_session(
                session_id.clone(),
                Command::Emulation(EmulationCommand::SetDeviceMetricsOverride {
                    width: viewport.width,
                    height: viewport.height,
                    device_scale_factor: 0.0,
                    mobile: false,
                }),
            ))
            .await?;
        }

        Ok(session_id)
    }
}

#[async_trait]
impl RemotePage for CdpPage {
    fn url(&self) -> String {
        self.targets
            .read()
            .get(&self.target_id)
            .map(|info| info.url.clone())
            .unwrap_or_default()
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        let session_id = self.session().await?.clone();

        let result = self
            .call(Request::for_session(
                session_id,
                Command::Runtime(RuntimeCommand::Evaluate {
                    expression: expression.to_string(),
                    return_by_value: true,
                    await_promise: true,
                }),
            ))
            .await?;

        if let Some(details) = result.get("exceptionDetails") {
            let message = details
                .pointer("/exception/description")
                .or_else(|| details.get("text"))
                .and_then(Value::as_str)
                .unwrap_or("evaluation threw");
            return Err(Error::script_error(message));
        }

        Ok(result
            .pointer("/result/value")
            .cloned()
            .unwrap_or(Value::Null))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tokio::time::{Instant, sleep};

    use crate::automation::{Automation, ConnectOptions, RemoteConnection, Viewport};
    use crate::cdp::CdpAutomation;
    use crate::error::Error;
    use crate::host::HostWindow;
    use crate::testing::{DevToolsServer, init_tracing};

    async fn connect(server: &DevToolsServer, viewport: Option<Viewport>) -> Arc<dyn RemoteConnection> {
        let mut options = ConnectOptions::new(server.ws_url());
        options.default_viewport = viewport;
        CdpAutomation::new()
            .connect(options)
            .await
            .expect("connect")
    }

    #[tokio::test]
    async fn test_evaluate_reads_window_globals() {
        init_tracing();
        let server = DevToolsServer::start().await;
        let window = server.browser().open_window();
        window.load_url("app://index.html").await.expect("load");
        window
            .execute_script(r#"globalThis["probe"] = "hello";"#)
            .await
            .expect("set");

        let connection = connect(&server, None).await;
        let pages = connection.pages().await.expect("pages");
        assert_eq!(pages.len(), 1);

        let value = pages[0].evaluate(r#"globalThis["probe"]"#).await.expect("evaluate");
        assert_eq!(value, json!("hello"));

        let missing = pages[0].evaluate(r#"globalThis["other"]"#).await.expect("evaluate");
        assert_eq!(missing, serde_json::Value::Null);
        assert_eq!(server.attach_count(), 1);
    }

    #[tokio::test]
    async fn test_exception_is_script_error() {
        let server = DevToolsServer::start().await;
        server.add_page("app://index.html");

        let connection = connect(&server, None).await;
        let pages = connection.pages().await.expect("pages");

        let err = pages[0].evaluate("throw boom").await.expect_err("throws");
        assert!(matches!(err, Error::ScriptError { ref message } if message.contains("boom")));
    }

    #[tokio::test]
    async fn test_broken_page_is_protocol_error() {
        let server = DevToolsServer::start().await;
        server.browser().open_broken_page();

        let connection = connect(&server, None).await;
        let pages = connection.pages().await.expect("pages");

        let err = pages[0].evaluate("1").await.expect_err("destroyed");
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[tokio::test]
    async fn test_viewport_applied_on_attach() {
        let server = DevToolsServer::start().await;
        server.add_page("app://index.html");

        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let connection = connect(&server, Some(viewport)).await;
        let pages = connection.pages().await.expect("pages");
        pages[0].evaluate("1").await.expect("evaluate");

        let viewports = server.viewports();
        assert_eq!(viewports.len(), 1);
        assert_eq!(viewports[0]["width"], 800);
        assert_eq!(viewports[0]["height"], 600);
    }

    #[tokio::test]
    async fn test_url_follows_navigation() {
        init_tracing();
        let server = DevToolsServer::start().await;
        let window = server.browser().open_window();
        window.load_url("app://first.html").await.expect("load");

        let connection = connect(&server, None).await;
        let pages = connection.pages().await.expect("pages");
        assert_eq!(pages[0].url(), "app://first.html");

        window.load_url("app://second.html").await.expect("load");

        let deadline = Instant::now() + std::time::Duration::from_secs(2);
        while pages[0].url() != "app://second.html" && Instant::now() < deadline {
            sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(pages[0].url(), "app://second.html");
    }
}
