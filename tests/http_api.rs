//! End-to-end exchanges against the API router over in-memory sockets

use std::cell::RefCell;
use std::convert::Infallible;

use embassy_futures::block_on;
use embedded_io_async::{ErrorType, Read, Write};
use serde_json::{Value, json};

use pixelstrip::app::{ConfigStore, EngineMetrics};
use pixelstrip::config::{HTTP, STRIP};
use pixelstrip::controllers::{ApiContext, api_router};
use pixelstrip::core::net::http::{
    Connection,
    ConnectionError,
    ConnectionErrorKind,
    Error,
    HandlerError,
    HandlerResult,
    HttpMethod,
    HttpServer,
    Listener,
    Outcome,
    Request,
    Response,
    Router,
    StaticFiles,
};
use pixelstrip::domain::entity::Config;
use pixelstrip::domain::ports::{ConfigStorage, StorageError};
use pixelstrip::infrastructure::assets::EmbeddedAssets;

/// Replays a request and captures whatever is written back
struct MemorySocket<'d> {
    input: &'d [u8],
    output: Vec<u8>,
}

impl<'d> MemorySocket<'d> {
    fn new(input: &'d [u8]) -> Self {
        Self {
            input,
            output: Vec::new(),
        }
    }
}

impl ErrorType for MemorySocket<'_> {
    type Error = Infallible;
}

impl Read for MemorySocket<'_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.input.len());
        buf[..n].copy_from_slice(&self.input[..n]);
        self.input = &self.input[n..];
        Ok(n)
    }
}

impl Write for MemorySocket<'_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }
}

#[derive(Default)]
struct MemoryStorage {
    document: Option<Vec<u8>>,
    saves: usize,
}

impl ConfigStorage for MemoryStorage {
    fn load(&mut self) -> Result<Vec<u8>, StorageError> {
        self.document.clone().ok_or(StorageError::InvalidMagicHeader)
    }

    fn save(&mut self, document: &[u8]) -> Result<(), StorageError> {
        self.document = Some(document.to_vec());
        self.saves += 1;
        Ok(())
    }
}

type Context<'a> = ApiContext<'a, MemoryStorage, EmbeddedAssets>;

struct Device {
    store: ConfigStore,
    metrics: EngineMetrics,
    assets: EmbeddedAssets,
}

impl Device {
    fn new() -> Self {
        Self {
            store: ConfigStore::new(Config::default()),
            metrics: EngineMetrics::new(),
            assets: EmbeddedAssets::web_ui(),
        }
    }

    fn context(&self) -> Context<'_> {
        let static_files = StaticFiles::new(&self.assets, HTTP.static_base_dir, HTTP.index_file);
        ApiContext::new(&self.store, MemoryStorage::default(), &self.metrics, static_files)
    }
}

struct Reply {
    status: u16,
    head: String,
    body: Vec<u8>,
}

impl Reply {
    fn parse(raw: &[u8]) -> Self {
        let split = raw
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .expect("response has no head");
        let head = String::from_utf8(raw[..split].to_vec()).unwrap();
        let status = head.split(' ').nth(1).unwrap().parse().unwrap();
        Self {
            status,
            head,
            body: raw[split + 4..].to_vec(),
        }
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn has_header(&self, line: &str) -> bool {
        self.head.lines().any(|header| header.eq_ignore_ascii_case(line))
    }
}

fn exchange<C>(
    server: &HttpServer<'_, C>,
    raw: &[u8],
) -> (Result<Outcome, ConnectionError>, Vec<u8>) {
    let mut socket = MemorySocket::new(raw);
    let outcome = block_on(server.serve_connection(&mut socket));
    (outcome, socket.output)
}

fn post(path: &str, body: &str) -> Vec<u8> {
    format!(
        "POST {path} HTTP/1.1\r\n\
         Host: strip\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

#[test]
fn version_reports_app_and_version() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    let (outcome, raw) = exchange(&server, b"GET /api/v1/version HTTP/1.1\r\n\r\n");
    assert_eq!(outcome, Ok(Outcome::Served(200)));

    let reply = Reply::parse(&raw);
    assert!(reply.has_header("Content-Type: application/json"));
    assert!(reply.has_header("Connection: close"));
    assert_eq!(
        reply.json(),
        json!({"app": "pixelstrip", "version": env!("CARGO_PKG_VERSION")})
    );
}

#[test]
fn config_returns_defaults() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    let (_, raw) = exchange(&server, b"GET /api/v1/config HTTP/1.1\r\n\r\n");
    let reply = Reply::parse(&raw);
    assert_eq!(reply.status, 200);
    assert_eq!(
        reply.json(),
        json!({
            "colors": ["#000000"],
            "spread": 1,
            "space_between": 1,
            "crawl": 1,
            "fade": 1,
            "period_ms": 250,
            "random": 5,
            "pin": STRIP.default_pin,
            "nleds": STRIP.default_led_count,
        })
    );
}

#[test]
fn metrics_start_at_zero() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    let (_, raw) = exchange(&server, b"GET /api/v1/metrics HTTP/1.1\r\n\r\n");
    let reply = Reply::parse(&raw);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.json()["avgtick_ms"].as_f64(), Some(0.0));
}

#[test]
fn post_config_clamps_merges_and_persists() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    let body = r##"{"period_ms": 1, "colors": ["#ff0000", "#00ff00"],
                   "spread": 4, "brightness": 9}"##;
    let (outcome, raw) = exchange(&server, &post("/api/v1/config", body));
    assert_eq!(outcome, Ok(Outcome::Served(200)));

    let reply = Reply::parse(&raw);
    let config = reply.json();
    assert_eq!(config["period_ms"], 10);
    assert_eq!(config["spread"], 4);
    assert_eq!(config["colors"], json!(["#ff0000", "#00ff00"]));
    assert_eq!(config["random"], 5);
    assert!(config.get("brightness").is_none());

    let storage = context.storage.borrow();
    assert_eq!(storage.saves, 1);
    let persisted: Value = serde_json::from_slice(storage.document.as_deref().unwrap()).unwrap();
    assert_eq!(persisted, config);

    assert_eq!(device.store.snapshot().period_ms, 10);
}

#[test]
fn post_without_content_length_uses_the_whole_body() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    let raw = b"POST /api/v1/config HTTP/1.1\r\nHost: strip\r\n\r\n{\"period_ms\": 40}";
    let (outcome, raw) = exchange(&server, raw);
    assert_eq!(outcome, Ok(Outcome::Served(200)));
    assert_eq!(Reply::parse(&raw).json()["period_ms"], 40);
    assert_eq!(device.store.snapshot().period_ms, 40);
    assert_eq!(context.storage.borrow().saves, 1);
}

#[test]
fn unparseable_body_returns_current_config() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    for body in ["not json", "[1, 2, 3]", ""] {
        let (outcome, raw) = exchange(&server, &post("/api/v1/config", body));
        assert_eq!(outcome, Ok(Outcome::Served(200)), "body {body:?}");
        assert_eq!(Reply::parse(&raw).json()["period_ms"], 250);
    }
    assert_eq!(context.storage.borrow().saves, 0);
}

#[test]
fn persisted_config_survives_reload() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    exchange(&server, &post("/api/v1/config", r#"{"nleds": 120, "crawl": -5}"#));

    let mut storage = context.storage.borrow_mut();
    let reloaded = ConfigStore::load(&mut *storage).snapshot();
    assert_eq!(reloaded.nleds, 120);
    assert_eq!(reloaded.crawl, -1);
}

#[test]
fn root_serves_the_web_ui() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    let (outcome, raw) = exchange(&server, b"GET / HTTP/1.1\r\n\r\n");
    assert_eq!(outcome, Ok(Outcome::Served(200)));
    let reply = Reply::parse(&raw);
    assert!(reply.has_header("Content-Type: text/html; charset=utf-8"));
    assert!(reply.body.starts_with(b"<!doctype html>"));

    let (_, raw) = exchange(&server, b"GET /app.js?v=1 HTTP/1.1\r\n\r\n");
    let reply = Reply::parse(&raw);
    assert_eq!(reply.status, 200);
    assert!(reply.has_header("Content-Type: application/javascript; charset=utf-8"));
}

#[test]
fn traversal_and_missing_files_are_not_found() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    for path in ["/../../secret", "/missing.txt", "/api/v1/nope"] {
        let request = format!("GET {path} HTTP/1.1\r\n\r\n");
        let (outcome, raw) = exchange(&server, request.as_bytes());
        assert_eq!(outcome, Ok(Outcome::Served(404)), "path {path}");
        assert_eq!(Reply::parse(&raw).status, 404);
    }
}

#[test]
fn static_files_only_answer_get() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    let (outcome, raw) = exchange(&server, &post("/index.html", "{}"));
    assert_eq!(outcome, Ok(Outcome::Served(405)));
    assert!(Reply::parse(&raw).has_header("Allow: GET"));
}

#[test]
fn malformed_request_line_is_bad_request() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    let (outcome, raw) = exchange(&server, b"HELLO\r\n\r\n");
    assert_eq!(outcome, Err(ConnectionError::Parse));
    assert_eq!(Reply::parse(&raw).status, 400);
}

#[test]
fn empty_connection_is_idle() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    let (outcome, raw) = exchange(&server, b"");
    assert_eq!(outcome, Ok(Outcome::Idle));
    assert!(raw.is_empty());

    let (outcome, raw) = exchange(&server, b"\r\n\r\n");
    assert_eq!(outcome, Ok(Outcome::Idle));
    assert!(raw.is_empty());
}

#[test]
fn oversized_request_is_rejected() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    let body = " ".repeat(8 * 1024);
    let (outcome, raw) = exchange(&server, &post("/api/v1/config", &body));
    assert_eq!(outcome.map_err(|err| err.kind()), Err(ConnectionErrorKind::TooLarge));
    assert_eq!(Reply::parse(&raw).status, 413);
    assert_eq!(context.storage.borrow().saves, 0);
}

fn failing(
    _ctx: &(),
    _request: &Request<'_>,
    _response: &mut Response<'_>,
) -> HandlerResult {
    Err(HandlerError::Internal("boom"))
}

#[test]
fn handler_failure_is_internal_error() {
    let router: Router<()> = Router::new().get("/boom", failing);
    let server = HttpServer::new(&router, &());

    let (outcome, raw) = exchange(&server, b"GET /boom HTTP/1.1\r\n\r\n");
    assert_eq!(
        outcome,
        Err(ConnectionError::Handler(HandlerError::Internal("boom")))
    );
    let reply = Reply::parse(&raw);
    assert_eq!(reply.status, 500);
    assert!(String::from_utf8(reply.body).unwrap().contains("<code>boom</code>"));
}

fn plain_text_error(err: &HandlerError, response: &mut Response<'_>) {
    response
        .status(503)
        .header("Retry-After", "1")
        .send(format!("Error: {}", err.message()));
}

#[test]
fn error_handler_replaces_default_page() {
    let router: Router<()> = Router::new().get("/boom", failing);
    let server = HttpServer::new(&router, &()).on_error(plain_text_error);

    let (outcome, raw) = exchange(&server, b"GET /boom HTTP/1.1\r\n\r\n");
    assert_eq!(
        outcome,
        Err(ConnectionError::Handler(HandlerError::Internal("boom")))
    );
    let reply = Reply::parse(&raw);
    assert_eq!(reply.status, 503);
    assert!(reply.has_header("Retry-After: 1"));
    assert_eq!(reply.body, b"Error: boom");
}

fn read_only(
    _ctx: &Context<'_>,
    request: &Request<'_>,
    response: &mut Response<'_>,
) -> bool {
    if request.method() == HttpMethod::Get {
        return true;
    }
    response.error(403, "read only");
    false
}

#[test]
fn request_filter_short_circuits_routing() {
    let device = Device::new();
    let context = device.context();
    let router = api_router().on_request(read_only);
    let server = HttpServer::new(&router, &context);

    let (outcome, raw) = exchange(&server, &post("/api/v1/config", r#"{"spread": 9}"#));
    assert_eq!(outcome, Ok(Outcome::Served(403)));
    assert!(Reply::parse(&raw).body.ends_with(b"<code>read only</code></body></html>"));
    assert_eq!(device.store.snapshot().spread, 1);
    assert_eq!(context.storage.borrow().saves, 0);

    let (outcome, _) = exchange(&server, b"GET /api/v1/config HTTP/1.1\r\n\r\n");
    assert_eq!(outcome, Ok(Outcome::Served(200)));
}

/// Hands out queued requests, then fails to bind
struct QueueListener {
    requests: Vec<&'static [u8]>,
    replies: RefCell<Vec<Vec<u8>>>,
}

struct QueuedConnection<'l> {
    socket: MemorySocket<'static>,
    replies: &'l RefCell<Vec<Vec<u8>>>,
}

impl ErrorType for QueuedConnection<'_> {
    type Error = Infallible;
}

impl Read for QueuedConnection<'_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.socket.read(buf).await
    }
}

impl Write for QueuedConnection<'_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.socket.write(buf).await
    }
}

impl Connection for QueuedConnection<'_> {
    async fn close(&mut self) {
        let output = core::mem::take(&mut self.socket.output);
        self.replies.borrow_mut().push(output);
    }
}

impl Listener for QueueListener {
    type Connection<'c>
        = QueuedConnection<'c>
    where
        Self: 'c;

    async fn accept(&mut self) -> Result<Self::Connection<'_>, Error> {
        if self.requests.is_empty() {
            return Err(Error::Bind);
        }
        let input = self.requests.remove(0);
        if input.is_empty() {
            return Err(Error::Closed);
        }
        Ok(QueuedConnection {
            socket: MemorySocket::new(input),
            replies: &self.replies,
        })
    }
}

#[test]
fn listener_serves_until_bind_failure() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    let mut listener = QueueListener {
        requests: vec![
            b"GET /api/v1/version HTTP/1.1\r\n\r\n".as_slice(),
            b"".as_slice(),
            b"BROKEN\r\n\r\n".as_slice(),
            b"GET /api/v1/config HTTP/1.1\r\n\r\n".as_slice(),
        ],
        replies: RefCell::new(Vec::new()),
    };
    assert_eq!(block_on(server.listen_and_serve(&mut listener)), Err(Error::Bind));

    let statuses: Vec<u16> = listener
        .replies
        .borrow()
        .iter()
        .map(|raw| Reply::parse(raw).status)
        .collect();
    assert_eq!(statuses, [200, 400, 200]);
}

/// Never yields a connection
struct SilentListener;

impl Listener for SilentListener {
    type Connection<'c>
        = MemorySocket<'static>
    where
        Self: 'c;

    async fn accept(&mut self) -> Result<Self::Connection<'_>, Error> {
        core::future::pending().await
    }
}

impl Connection for MemorySocket<'_> {}

#[test]
fn stop_ends_listen_and_serve() {
    let device = Device::new();
    let context = device.context();
    let router = api_router();
    let server = HttpServer::new(&router, &context);

    server.stop();
    assert_eq!(block_on(server.listen_and_serve(&mut SilentListener)), Ok(()));
}
