// slog_scope's macros expand to slog's ones
#[macro_use]
extern crate slog;

use actix_web::http::{header, HeaderMap, StatusCode};
use actix_web::{web, App, HttpRequest, HttpResponse};
use places::SearchConfig;
use serde_json::{json, Value};
use slog_scope::info;
use std::convert::TryFrom;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake search backend received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query_string: String,
    pub body: Value,
}

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Raw(String),
}

#[derive(Clone)]
struct BackendState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    reply: Arc<Mutex<Reply>>,
}

fn fake_search(state: web::Data<BackendState>, req: HttpRequest, body: String) -> HttpResponse {
    let recorded = RecordedRequest {
        method: req.method().to_string(),
        path: req.path().to_string(),
        query_string: req.query_string().to_string(),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    };
    info!("fake search backend got {:?}", recorded);
    state.requests.lock().unwrap().push(recorded);

    match *state.reply.lock().unwrap() {
        Reply::Json(ref value) => HttpResponse::Ok().json(value),
        Reply::Raw(ref text) => HttpResponse::Ok()
            .content_type("text/html")
            .body(text.clone()),
    }
}

/// A search backend answering every request with a canned reply,
/// and keeping all the requests it got.
pub struct FakeSearchBackend {
    srv: actix_http_test::TestServerRuntime,
    state: BackendState,
}

impl FakeSearchBackend {
    pub fn new() -> FakeSearchBackend {
        let state = BackendState {
            requests: Arc::new(Mutex::new(vec![])),
            reply: Arc::new(Mutex::new(Reply::Json(hits(vec![])))),
        };
        let app_state = state.clone();
        let srv = actix_http_test::TestServer::new(move || {
            actix_http::HttpService::new(
                App::new()
                    .data(app_state.clone())
                    .default_service(web::route().to(fake_search)),
            )
        });
        FakeSearchBackend { srv, state }
    }

    pub fn reply(&self, value: Value) {
        *self.state.reply.lock().unwrap() = Reply::Json(value);
    }

    /// answer with something that is not json
    pub fn reply_raw(&self, text: &str) {
        *self.state.reply.lock().unwrap() = Reply::Raw(text.to_string());
    }

    /// answer with a search response made of these documents
    pub fn reply_hits(&self, docs: Vec<Value>) {
        self.reply(hits(docs));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn host(&self) -> String {
        self.srv.addr().ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.srv.addr().port()
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::new(self.host(), self.port())
    }
}

impl Default for FakeSearchBackend {
    fn default() -> Self {
        FakeSearchBackend::new()
    }
}

/// A search response wrapping `docs`
pub fn hits(docs: Vec<Value>) -> Value {
    json!({
        "took": 1,
        "timed_out": false,
        "hits": {
            "total": docs.len(),
            "max_score": 1.0,
            "hits": docs,
        }
    })
}

/// A search hit for a who's on first like document
pub fn place_doc(id: u64, name: &str, placetype: &str) -> Value {
    json!({
        "_index": "whosonfirst",
        "_type": placetype,
        "_id": id.to_string(),
        "_score": 1.0,
        "_source": {
            "wof:id": id,
            "wof:name": name,
            "wof:placetype": placetype,
        }
    })
}

pub struct PlacesHandler {
    app: actix_http_test::TestServerRuntime,
}

impl PlacesHandler {
    /// The whole application, searching in `backend`
    pub fn new(backend: &FakeSearchBackend) -> PlacesHandler {
        PlacesHandler::with_args(www::Args {
            search_host: Some(backend.host()),
            search_port: Some(backend.port()),
            search_index: Some("whosonfirst".to_string()),
            nb_threads: Some(1),
            ..Default::default()
        })
    }

    pub fn with_args(args: www::Args) -> PlacesHandler {
        let ctx = www::Context::try_from(&args).expect("failed to create places Context");

        let prometheus =
            www::prometheus_middleware::PrometheusMetrics::new(www::server::METRICS_PATH);
        let srv = actix_http_test::TestServer::new(move || {
            actix_http::HttpService::new(
                App::new()
                    .data(ctx.clone())
                    .wrap(actix_cors::Cors::new().allowed_methods(vec!["GET"]))
                    .wrap(prometheus.clone())
                    .wrap(actix_web::middleware::Logger::default())
                    .configure(www::server::configure_server)
                    .default_service(web::route().to(www::routes::default_404)),
            )
        });

        PlacesHandler { app: srv }
    }

    /// status, headers and body of a GET on `path`
    fn send(&mut self, path: &str) -> (StatusCode, HeaderMap, bytes::Bytes) {
        // Use a long timeout to prevent timeout error in DNS resolution:
        let req = self.app.get(path).timeout(Duration::from_secs(10));
        let mut resp = self
            .app
            .block_on(req.send())
            .unwrap_or_else(|e| panic!("impossible to query places: {}", e));

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = self.app.block_on(resp.body()).unwrap();
        (status, headers, body)
    }

    /// status, `Location` header and body of a GET on `path`
    pub fn raw_get(&mut self, path: &str) -> (StatusCode, Option<String>, bytes::Bytes) {
        let (status, headers, body) = self.send(path);
        (status, header_value(&headers, header::LOCATION), body)
    }

    /// status and `Content-Type` of a GET on `path`
    pub fn get_content_type(&mut self, path: &str) -> (StatusCode, Option<String>) {
        let (status, headers, _) = self.send(path);
        (status, header_value(&headers, header::CONTENT_TYPE))
    }

    pub fn get_status(&mut self, path: &str) -> StatusCode {
        self.raw_get(path).0
    }

    /// the `Location` of a redirection
    pub fn get_redirect(&mut self, path: &str) -> (StatusCode, String) {
        let (status, location, _) = self.raw_get(path);
        assert!(status.is_redirection(), "not a redirection: {}", status);
        (status, location.expect("no location header in redirection"))
    }

    pub fn get_json(&mut self, path: &str) -> Value {
        let (status, value) = self.get_unchecked_json(path);
        assert!(status.is_success(), "invalid status: {}", status);
        value
    }

    pub fn get_unchecked_json(&mut self, path: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.raw_get(path);
        (status, as_json(&body))
    }

    pub fn get_text(&mut self, path: &str) -> (StatusCode, String) {
        let (status, _, body) = self.raw_get(path);
        (status, String::from_utf8_lossy(&body).into_owned())
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn as_json(body: &[u8]) -> Value {
    let body = std::str::from_utf8(body).unwrap();
    serde_json::from_str(body).unwrap_or_else(|e| panic!("invalid json {}: {}", body, e))
}
