//! In-process fakes shared by the unit tests.
//!
//! | Fake | Stands in for |
//! |------|---------------|
//! | [`FakeHost`] | Host process with switches and readiness |
//! | [`FakeBrowser`] | Set of documents, windows and remote targets |
//! | [`FakeWindow`] | Host window over one document |
//! | [`FakeConnection`] / [`FakePage`] | Automation session over the same documents |
//! | [`FakeAutomation`] | Controller returning [`FakeConnection`]s |
//! | [`MetadataServer`] | `/json/version` endpoint that can stall its first answers |
//! | [`DevToolsServer`] | Metadata plus websocket DevTools endpoint |
//!
//! Windows and pages share documents, so a marker written through a window
//! is visible to every page backed by the same document.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::sleep;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::automation::{Automation, ConnectOptions, RemoteConnection, RemotePage};
use crate::bootstrap::config::METADATA_PATH;
use crate::error::{Error, Result};
use crate::host::{CommandLine, HostProcess, HostWindow, Switches};
use crate::identifiers::TargetId;

// ============================================================================
// Tracing
// ============================================================================

/// Installs a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// FakeHost
// ============================================================================

/// Host process whose readiness is flipped by the test.
pub(crate) struct FakeHost {
    version: String,
    switches: Switches,
    ready: watch::Sender<bool>,
}

impl FakeHost {
    pub(crate) fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            switches: Switches::new(),
            ready: watch::Sender::new(false),
        }
    }

    pub(crate) fn set_ready(&self) {
        self.ready.send_replace(true);
    }
}

#[async_trait]
impl HostProcess for FakeHost {
    fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    async fn when_ready(&self) {
        let mut rx = self.ready.subscribe();
        let _ = rx.wait_for(|ready| *ready).await;
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    fn command_line(&self) -> &dyn CommandLine {
        &self.switches
    }
}

// ============================================================================
// Script interpreter
// ============================================================================

static SET_GLOBAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^globalThis\["([^"]+)"\] = "([^"]*)";$"#).expect("set regex")
});

static DELETE_GLOBAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^delete globalThis\["([^"]+)"\];$"#).expect("delete regex"));

static GET_GLOBAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^globalThis\["([^"]+)"\]$"#).expect("get regex"));

/// What a script did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptKind {
    Set,
    Delete,
    Get,
    Other,
}

impl ScriptKind {
    fn log_name(self, prefix: &str) -> String {
        let op = match self {
            Self::Set => "set",
            Self::Delete => "delete",
            Self::Get => "get",
            Self::Other => "script",
        };
        format!("{prefix}:{op}")
    }
}

/// One content document: a location plus its globals.
#[derive(Debug, Default)]
pub(crate) struct FakeDocument {
    url: String,
    globals: FxHashMap<String, Value>,
}

impl FakeDocument {
    fn with_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            globals: FxHashMap::default(),
        }
    }

    /// Interprets the handful of marker scripts the bridge produces.
    fn run(&mut self, script: &str) -> (ScriptKind, Result<Value>) {
        let script = script.trim();

        if let Some(caps) = SET_GLOBAL.captures(script) {
            let value = Value::String(caps[2].to_string());
            self.globals.insert(caps[1].to_string(), value.clone());
            return (ScriptKind::Set, Ok(value));
        }
        if let Some(caps) = DELETE_GLOBAL.captures(script) {
            self.globals.remove(&caps[1]);
            return (ScriptKind::Delete, Ok(Value::Bool(true)));
        }
        if let Some(caps) = GET_GLOBAL.captures(script) {
            let value = self.globals.get(&caps[1]).cloned().unwrap_or(Value::Null);
            return (ScriptKind::Get, Ok(value));
        }
        if let Some(message) = script.strip_prefix("throw ") {
            return (ScriptKind::Other, Err(Error::script_error(message)));
        }
        if let Ok(value) = serde_json::from_str::<Value>(script) {
            return (ScriptKind::Other, Ok(value));
        }
        (ScriptKind::Other, Ok(Value::Null))
    }
}

type SharedDocument = Arc<Mutex<FakeDocument>>;

// ============================================================================
// FakeBrowser
// ============================================================================

/// How a page answers evaluations.
#[derive(Debug, Clone, Copy)]
enum PageBehavior {
    Normal,
    Broken,
    Slow(Duration),
}

/// Target lifecycle notifications.
#[derive(Debug, Clone)]
pub(crate) enum TargetChange {
    Created(TargetId),
    Changed(TargetId),
    Destroyed(TargetId),
}

#[derive(Debug)]
struct FakeTarget {
    id: TargetId,
    kind: String,
    document: SharedDocument,
    behavior: PageBehavior,
    exposed: bool,
}

#[derive(Debug, Default)]
struct BrowserState {
    targets: Vec<FakeTarget>,
    operations: Vec<String>,
    next_id: u32,
}

/// A set of documents seen both from host windows and remote pages.
#[derive(Clone)]
pub(crate) struct FakeBrowser {
    state: Arc<Mutex<BrowserState>>,
    changes: broadcast::Sender<TargetChange>,
}

impl FakeBrowser {
    pub(crate) fn new() -> Self {
        let (changes, _) = broadcast::channel(256);
        Self {
            state: Arc::new(Mutex::new(BrowserState::default())),
            changes,
        }
    }

    fn add(
        &self,
        kind: &str,
        document: SharedDocument,
        behavior: PageBehavior,
        exposed: bool,
    ) -> TargetId {
        let id = {
            let mut state = self.state.lock();
            state.next_id += 1;
            let id = TargetId::new(format!("TARGET-{}", state.next_id));
            state.targets.push(FakeTarget {
                id: id.clone(),
                kind: kind.to_string(),
                document,
                behavior,
                exposed,
            });
            id
        };
        if exposed {
            let _ = self.changes.send(TargetChange::Created(id.clone()));
        }
        id
    }

    fn window_over(&self, document: SharedDocument) -> FakeWindow {
        FakeWindow {
            browser: self.clone(),
            document,
            scripts: Mutex::new(Vec::new()),
            navigations: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Opens an empty window with a matching remote page.
    pub(crate) fn open_window(&self) -> FakeWindow {
        let document: SharedDocument = Arc::default();
        self.add("page", Arc::clone(&document), PageBehavior::Normal, true);
        self.window_over(document)
    }

    /// Opens a window that no remote page exposes.
    pub(crate) fn open_hidden_window(&self) -> FakeWindow {
        let document: SharedDocument = Arc::default();
        self.add("page", Arc::clone(&document), PageBehavior::Normal, false);
        self.window_over(document)
    }

    /// Adds a remote page with no host window.
    pub(crate) fn open_detached_page(&self, url: &str) -> TargetId {
        self.open_target("page", url)
    }

    /// Adds a remote target of any type.
    pub(crate) fn open_target(&self, kind: &str, url: &str) -> TargetId {
        let document = Arc::new(Mutex::new(FakeDocument::with_url(url)));
        self.add(kind, document, PageBehavior::Normal, true)
    }

    /// Adds a page whose evaluations always fail.
    pub(crate) fn open_broken_page(&self) -> TargetId {
        let document = Arc::new(Mutex::new(FakeDocument::with_url("https://broken.test/")));
        self.add("page", document, PageBehavior::Broken, true)
    }

    /// Adds a page whose evaluations take `delay`.
    pub(crate) fn open_slow_page(&self, delay: Duration) -> TargetId {
        let document = Arc::new(Mutex::new(FakeDocument::with_url("https://slow.test/")));
        self.add("page", document, PageBehavior::Slow(delay), true)
    }

    /// Adds a second remote page over `window`'s document.
    pub(crate) fn mirror_window(&self, window: &FakeWindow) -> TargetId {
        self.add("page", Arc::clone(&window.document), PageBehavior::Normal, true)
    }

    /// Removes a target.
    pub(crate) fn close_target(&self, id: &TargetId) {
        self.state.lock().targets.retain(|target| &target.id != id);
        let _ = self.changes.send(TargetChange::Destroyed(id.clone()));
    }

    /// Current URL of a target's document.
    pub(crate) fn url_of(&self, id: &TargetId) -> String {
        self.state
            .lock()
            .targets
            .iter()
            .find(|target| &target.id == id)
            .map(|target| target.document.lock().url.clone())
            .unwrap_or_default()
    }

    /// Returns a fresh automation session over this browser.
    pub(crate) fn connection(&self) -> FakeConnection {
        FakeConnection {
            browser: self.clone(),
            pages_calls: AtomicUsize::new(0),
            pages_delay: None,
        }
    }

    /// Ordered log of window and remote operations.
    pub(crate) fn operations(&self) -> Vec<String> {
        self.state.lock().operations.clone()
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<TargetChange> {
        self.changes.subscribe()
    }

    fn record(&self, operation: String) {
        self.state.lock().operations.push(operation);
    }

    fn exposed_pages(&self) -> Vec<FakePage> {
        self.state
            .lock()
            .targets
            .iter()
            .filter(|target| target.exposed && target.kind == "page")
            .map(|target| self.page_for(target))
            .collect()
    }

    fn page_for(&self, target: &FakeTarget) -> FakePage {
        FakePage {
            id: target.id.clone(),
            document: Arc::clone(&target.document),
            behavior: target.behavior,
            browser: self.clone(),
        }
    }

    /// Remote page handle for `id`.
    pub(crate) fn page(&self, id: &TargetId) -> Option<FakePage> {
        self.state
            .lock()
            .targets
            .iter()
            .find(|target| target.exposed && &target.id == id)
            .map(|target| self.page_for(target))
    }

    /// DevTools `TargetInfo` objects of all exposed targets.
    pub(crate) fn target_infos(&self) -> Vec<Value> {
        self.state
            .lock()
            .targets
            .iter()
            .filter(|target| target.exposed)
            .map(Self::info_json)
            .collect()
    }

    /// DevTools `TargetInfo` of one exposed target.
    pub(crate) fn target_info(&self, id: &TargetId) -> Option<Value> {
        self.state
            .lock()
            .targets
            .iter()
            .find(|target| target.exposed && &target.id == id)
            .map(Self::info_json)
    }

    fn info_json(target: &FakeTarget) -> Value {
        json!({
            "targetId": target.id.as_str(),
            "type": target.kind,
            "title": "",
            "url": target.document.lock().url,
            "attached": false
        })
    }

    fn notify_navigation(&self, document: &SharedDocument) {
        let ids: Vec<TargetId> = self
            .state
            .lock()
            .targets
            .iter()
            .filter(|target| target.exposed && Arc::ptr_eq(&target.document, document))
            .map(|target| target.id.clone())
            .collect();
        for id in ids {
            let _ = self.changes.send(TargetChange::Changed(id));
        }
    }
}

// ============================================================================
// FakeWindow
// ============================================================================

/// Host window over a shared document.
pub(crate) struct FakeWindow {
    browser: FakeBrowser,
    document: SharedDocument,
    scripts: Mutex<Vec<String>>,
    navigations: AtomicUsize,
    fail_next: AtomicBool,
}

impl FakeWindow {
    /// Every script passed to `execute_script`, failed ones included.
    pub(crate) fn executed_scripts(&self) -> Vec<String> {
        self.scripts.lock().clone()
    }

    /// Snapshot of the document globals.
    pub(crate) fn globals(&self) -> FxHashMap<String, Value> {
        self.document.lock().globals.clone()
    }

    /// Number of `load_url` calls.
    pub(crate) fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    /// Makes the next `execute_script` fail.
    pub(crate) fn fail_next_script(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl HostWindow for FakeWindow {
    fn url(&self) -> String {
        self.document.lock().url.clone()
    }

    async fn load_url(&self, url: &str) -> Result<()> {
        {
            let mut document = self.document.lock();
            document.url = url.to_string();
            document.globals.clear();
        }
        self.navigations.fetch_add(1, Ordering::SeqCst);
        self.browser.record("window:load".to_string());
        self.browser.notify_navigation(&self.document);
        Ok(())
    }

    async fn execute_script(&self, script: &str) -> Result<Value> {
        self.scripts.lock().push(script.to_string());
        if self.fail_next.swap(false, Ordering::SeqCst) {
            self.browser.record("window:failed".to_string());
            return Err(Error::script_error("injected window failure"));
        }

        let (kind, result) = self.document.lock().run(script);
        self.browser.record(kind.log_name("window"));
        result
    }
}

// ============================================================================
// FakeConnection / FakePage
// ============================================================================

/// Automation session listing the browser's exposed pages.
pub(crate) struct FakeConnection {
    browser: FakeBrowser,
    pages_calls: AtomicUsize,
    pages_delay: Option<Duration>,
}

impl FakeConnection {
    /// Delays every `pages` answer by `delay`.
    pub(crate) fn with_pages_delay(mut self, delay: Duration) -> Self {
        self.pages_delay = Some(delay);
        self
    }

    /// Number of `pages` calls.
    pub(crate) fn pages_calls(&self) -> usize {
        self.pages_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteConnection for FakeConnection {
    async fn pages(&self) -> Result<Vec<Arc<dyn RemotePage>>> {
        self.pages_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.pages_delay {
            sleep(delay).await;
        }
        self.browser.record("remote:pages".to_string());
        Ok(self
            .browser
            .exposed_pages()
            .into_iter()
            .map(|page| Arc::new(page) as Arc<dyn RemotePage>)
            .collect())
    }
}

/// Remote view of one target's document.
pub(crate) struct FakePage {
    id: TargetId,
    document: SharedDocument,
    behavior: PageBehavior,
    browser: FakeBrowser,
}

impl FakePage {
    fn run(&self, expression: &str) -> (ScriptKind, Result<Value>) {
        self.document.lock().run(expression)
    }
}

impl std::fmt::Debug for FakePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakePage")
            .field("id", &self.id)
            .field("behavior", &self.behavior)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RemotePage for FakePage {
    fn url(&self) -> String {
        self.document.lock().url.clone()
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        if let PageBehavior::Slow(delay) = self.behavior {
            sleep(delay).await;
        }
        let (kind, result) = match self.behavior {
            PageBehavior::Broken => (
                ScriptKind::Other,
                Err(Error::protocol("Execution context was destroyed.")),
            ),
            PageBehavior::Normal | PageBehavior::Slow(_) => self.run(expression),
        };
        self.browser.record(kind.log_name("remote"));
        result
    }
}

// ============================================================================
// FakeAutomation
// ============================================================================

/// Controller handing out [`FakeConnection`]s.
pub(crate) struct FakeAutomation {
    browser: FakeBrowser,
    connects: Mutex<Vec<ConnectOptions>>,
}

impl FakeAutomation {
    pub(crate) fn new(browser: FakeBrowser) -> Self {
        Self {
            browser,
            connects: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn connect_count(&self) -> usize {
        self.connects.lock().len()
    }

    pub(crate) fn last_connect(&self) -> Option<ConnectOptions> {
        self.connects.lock().last().cloned()
    }
}

#[async_trait]
impl Automation for FakeAutomation {
    async fn connect(&self, options: ConnectOptions) -> Result<Arc<dyn RemoteConnection>> {
        self.connects.lock().push(options);
        Ok(Arc::new(self.browser.connection()))
    }
}

// ============================================================================
// MetadataServer
// ============================================================================

/// How long a stalled metadata answer is held back. Tests keep the request
/// deadline well below it.
pub(crate) const METADATA_STALL: Duration = Duration::from_secs(1);

/// Body of `/json/version`.
fn version_body(ws_url: &str) -> Value {
    json!({
        "Browser": "FakeHost/1.0",
        "Protocol-Version": "1.3",
        "User-Agent": "FakeHost",
        "V8-Version": "7.0.0",
        "WebKit-Version": "537.36",
        "webSocketDebuggerUrl": ws_url
    })
}

/// Mounts a `GET /json/version` answer on `server`.
async fn mount_version(server: &MockServer, ws_url: &str) {
    Mock::given(method("GET"))
        .and(path(METADATA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_body(ws_url)))
        .mount(server)
        .await;
}

/// `/json/version` endpoint whose first `stall_first` answers arrive after
/// [`METADATA_STALL`]. `usize::MAX` stalls every answer.
pub(crate) struct MetadataServer {
    server: MockServer,
}

impl MetadataServer {
    pub(crate) async fn start(stall_first: usize, ws_url: &str) -> Self {
        let server = MockServer::start().await;

        if stall_first > 0 {
            let stalled = ResponseTemplate::new(200)
                .set_body_json(version_body(ws_url))
                .set_delay(METADATA_STALL);
            let mock = Mock::given(method("GET"))
                .and(path(METADATA_PATH))
                .respond_with(stalled)
                .with_priority(1);
            let mock = if stall_first == usize::MAX {
                mock
            } else {
                mock.up_to_n_times(stall_first as u64)
            };
            mock.mount(&server).await;
        }
        mount_version(&server, ws_url).await;

        Self { server }
    }

    pub(crate) fn port(&self) -> u16 {
        self.server.address().port()
    }

    /// Number of metadata requests received, stalled ones included.
    pub(crate) async fn hits(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}

// ============================================================================
// DevToolsServer
// ============================================================================

/// Metadata and websocket DevTools endpoint over a [`FakeBrowser`].
///
/// `/json/version` is served by a mock HTTP server on [`port`](Self::port);
/// its answer points at a separate websocket listener. The websocket side
/// implements the `Target`, `Runtime.evaluate` and
/// `Emulation.setDeviceMetricsOverride` commands the bridge uses. Flat
/// sessions are named `session-<targetId>`.
pub(crate) struct DevToolsServer {
    metadata: MockServer,
    ws_port: u16,
    browser: FakeBrowser,
    shared: Arc<ServerShared>,
}

#[derive(Default)]
struct ServerShared {
    discovery: AtomicBool,
    attaches: AtomicUsize,
    viewports: Mutex<Vec<Value>>,
}

impl DevToolsServer {
    /// Starts a server over a new browser.
    pub(crate) async fn start() -> Self {
        Self::serve(FakeBrowser::new()).await
    }

    /// Starts a server over `browser`.
    pub(crate) async fn serve(browser: FakeBrowser) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let ws_port = listener.local_addr().expect("addr").port();
        let shared = Arc::new(ServerShared::default());

        let served = browser.clone();
        let state = Arc::clone(&shared);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let browser = served.clone();
                let shared = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Ok(ws) = accept_async(stream).await {
                        Self::run_session(ws, browser, shared).await;
                    }
                });
            }
        });

        let metadata = MockServer::start().await;
        mount_version(&metadata, &Self::browser_endpoint(ws_port)).await;

        Self {
            metadata,
            ws_port,
            browser,
            shared,
        }
    }

    /// Port of the metadata endpoint, the one written onto the host.
    pub(crate) fn port(&self) -> u16 {
        self.metadata.address().port()
    }

    pub(crate) fn browser(&self) -> &FakeBrowser {
        &self.browser
    }

    pub(crate) fn ws_url(&self) -> Url {
        Url::parse(&Self::browser_endpoint(self.ws_port)).expect("ws url")
    }

    pub(crate) fn add_page(&self, url: &str) -> TargetId {
        self.browser.open_detached_page(url)
    }

    pub(crate) fn add_target(&self, kind: &str, url: &str) -> TargetId {
        self.browser.open_target(kind, url)
    }

    pub(crate) fn close_target(&self, id: &TargetId) {
        self.browser.close_target(id);
    }

    pub(crate) fn url_of(&self, id: &TargetId) -> String {
        self.browser.url_of(id)
    }

    pub(crate) fn discovery_enabled(&self) -> bool {
        self.shared.discovery.load(Ordering::SeqCst)
    }

    pub(crate) fn attach_count(&self) -> usize {
        self.shared.attaches.load(Ordering::SeqCst)
    }

    /// Params of every `Emulation.setDeviceMetricsOverride` received.
    pub(crate) fn viewports(&self) -> Vec<Value> {
        self.shared.viewports.lock().clone()
    }

    fn browser_endpoint(port: u16) -> String {
        format!("ws://127.0.0.1:{port}/devtools/browser/fake")
    }

    /// Serves one websocket client.
    async fn run_session(
        ws: tokio_tungstenite::WebSocketStream<TcpStream>,
        browser: FakeBrowser,
        shared: Arc<ServerShared>,
    ) {
        let (mut write, mut read) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Value>();
        let mut changes = browser.subscribe();
        let mut discovering = false;

        tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                if write.send(Message::Text(message.to_string().into())).await.is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                message = read.next() => {
                    let Some(Ok(Message::Text(text))) = message else { break };
                    let Ok(request) = serde_json::from_str::<Value>(&text) else { continue };

                    if request["method"] == "Target.setDiscoverTargets" {
                        discovering = request["params"]["discover"].as_bool().unwrap_or(false);
                        shared.discovery.store(discovering, Ordering::SeqCst);
                        let _ = out_tx.send(json!({"id": request["id"], "result": {}}));
                        if discovering {
                            for info in browser.target_infos() {
                                let _ = out_tx.send(json!({
                                    "method": "Target.targetCreated",
                                    "params": {"targetInfo": info}
                                }));
                            }
                        }
                        continue;
                    }

                    let browser = browser.clone();
                    let shared = Arc::clone(&shared);
                    let out_tx = out_tx.clone();
                    tokio::spawn(async move {
                        let reply = Self::dispatch(&request, &browser, &shared).await;
                        let _ = out_tx.send(reply);
                    });
                }

                change = changes.recv() => {
                    let change = match change {
                        Ok(change) => change,
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    };
                    if !discovering {
                        continue;
                    }
                    let event = match change {
                        TargetChange::Created(id) => browser.target_info(&id).map(|info| {
                            json!({"method": "Target.targetCreated", "params": {"targetInfo": info}})
                        }),
                        TargetChange::Changed(id) => browser.target_info(&id).map(|info| {
                            json!({"method": "Target.targetInfoChanged", "params": {"targetInfo": info}})
                        }),
                        TargetChange::Destroyed(id) => Some(json!({
                            "method": "Target.targetDestroyed",
                            "params": {"targetId": id.as_str()}
                        })),
                    };
                    if let Some(event) = event {
                        let _ = out_tx.send(event);
                    }
                }
            }
        }
    }

    /// Answers one command.
    async fn dispatch(request: &Value, browser: &FakeBrowser, shared: &ServerShared) -> Value {
        let id = request["id"].clone();
        let params = &request["params"];
        let session = request["sessionId"].as_str().unwrap_or_default();
        let error = |code: i64, message: &str| {
            json!({"id": id, "error": {"code": code, "message": message}})
        };

        match request["method"].as_str().unwrap_or_default() {
            "Target.getTargets" => {
                json!({"id": id, "result": {"targetInfos": browser.target_infos()}})
            }

            "Target.attachToTarget" => {
                let target = TargetId::new(params["targetId"].as_str().unwrap_or_default());
                if browser.target_info(&target).is_none() {
                    return error(-32602, "No target with given id found");
                }
                shared.attaches.fetch_add(1, Ordering::SeqCst);
                json!({"id": id, "result": {"sessionId": format!("session-{target}")}})
            }

            "Runtime.evaluate" => {
                let Some(page) = session
                    .strip_prefix("session-")
                    .and_then(|target| browser.page(&TargetId::new(target)))
                else {
                    return error(-32001, "Session with given id not found.");
                };
                let expression = params["expression"].as_str().unwrap_or_default();
                match page.evaluate(expression).await {
                    Ok(Value::Null) => json!({"id": id, "result": {"result": {"type": "undefined"}}}),
                    Ok(value) => json!({"id": id, "result": {"result": {"type": "string", "value": value}}}),
                    Err(Error::ScriptError { message }) => json!({
                        "id": id,
                        "result": {
                            "result": {"type": "object", "subtype": "error"},
                            "exceptionDetails": {
                                "text": "Uncaught",
                                "exception": {"description": format!("Error: {message}")}
                            }
                        }
                    }),
                    Err(e) => error(-32000, &e.to_string()),
                }
            }

            "Emulation.setDeviceMetricsOverride" => {
                shared.viewports.lock().push(params.clone());
                json!({"id": id, "result": {}})
            }

            _ => error(-32601, "method not found"),
        }
    }
}
