#![allow(dead_code)]

use serde_json::Value as Json;
use stancer_core::{
    Client, Config, Fault, Field, HttpClient, HttpRequest, HttpResponse, Result, Rule, Schema,
    TypeKind, Value, ValueKind,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;
use wiremock::{Mock, MockServer};

pub const STEST: &str = "stest_1234567890abcdefghijklmn";
pub const PTEST: &str = "ptest_1234567890abcdefghijklmn";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Schemas ──────────────────────────────────────────────────────

static PART_FIELDS: [Field; 2] = [
    Field::text("label"),
    Field::integer("quantity").rule(Rule::new().min(1).label("Quantity")),
];

pub static PART: Schema = Schema::new("Part", &PART_FIELDS).endpoint("parts");

pub fn part() -> &'static Schema {
    &PART
}

fn wrap_note(value: Value) -> Result<Option<Value>> {
    match value {
        Value::Bool(false) => Ok(None),
        Value::Str(text) => Ok(Some(Value::Str(format!("note: {text}")))),
        other => Ok(Some(other)),
    }
}

fn reject_forbidden(value: &Value) -> Option<String> {
    (value.as_str() == Some("forbidden")).then(|| "Description is forbidden.".to_string())
}

static WIDGET_FIELDS: [Field; 10] = [
    Field::integer("amount").rule(Rule::new().min(50).throws(Fault::Value(ValueKind::Amount))),
    Field::text("currency").rule(
        Rule::new()
            .allowed(&["eur", "gbp", "usd"])
            .lowercase()
            .throws(Fault::Value(ValueKind::Currency)),
    ),
    Field::text("description").rule(
        Rule::new()
            .between(3, 64)
            .check(reject_forbidden)
            .throws(Fault::Value(ValueKind::PaymentDescription)),
    ),
    Field::boolean("capture").rule(Rule::new().throws(Fault::Type(TypeKind::PaymentCapture))),
    Field::text("note").rule(Rule::new().coerce(wrap_note).silent()),
    Field::datetime("date_shipped"),
    Field::entity("part", part),
    Field::entity("origin", part).by_reference(),
    Field::list("parts", part),
    Field::text("status").read_only(),
];

pub static WIDGET: Schema = Schema::new("Widget", &WIDGET_FIELDS).endpoint("widgets");

pub fn widget() -> &'static Schema {
    &WIDGET
}

static SKETCH_FIELDS: [Field; 1] = [Field::text("title")];

fn sketch_defaults() -> Vec<(&'static str, Value)> {
    vec![("title", Value::from("untitled"))]
}

/// Nested-only object: no endpoint, one default.
pub static SKETCH: Schema = Schema::new("Sketch", &SKETCH_FIELDS).defaults(sketch_defaults);

// ── Recording transport ──────────────────────────────────────────

#[derive(Debug, Default)]
struct FakeState {
    requests: Vec<HttpRequest>,
    responses: VecDeque<HttpResponse>,
}

/// Transport answering from a queue and recording every request.
///
/// With an empty queue it answers `200 OK` with an empty body.
#[derive(Debug, Clone, Default)]
pub struct FakeHttp(Rc<RefCell<FakeState>>);

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.0.borrow_mut().responses.push_back(HttpResponse {
            status,
            reason: Some(reason(status).to_string()),
            body: body.to_string(),
        });
        self
    }

    pub fn respond_json(&self, body: Json) -> &Self {
        self.respond(200, &body.to_string())
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.0.borrow().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.0.borrow().requests.len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.0.borrow().requests.last().cloned().expect("no request sent")
    }
}

impl HttpClient for FakeHttp {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut state = self.0.borrow_mut();
        state.requests.push(request);
        Ok(state.responses.pop_front().unwrap_or(HttpResponse {
            status: 200,
            reason: Some("OK".to_string()),
            body: String::new(),
        }))
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

pub fn test_config() -> Config {
    Config::with_keys([STEST, PTEST]).unwrap()
}

pub fn fake_client(http: &FakeHttp) -> Client {
    Client::with_http(test_config(), http.clone())
}

// ── Mock API server ──────────────────────────────────────────────

/// A wiremock server plus the runtime driving it, for blocking tests.
///
/// `server` is declared first so it is dropped before the runtime.
pub struct MockApi {
    pub server: MockServer,
    runtime: tokio::runtime::Runtime,
}

impl MockApi {
    pub fn start() -> Self {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn config(&self) -> Config {
        let address = self.server.address();
        let mut config = test_config();
        config
            .set_scheme("http")
            .set_host(address.ip().to_string())
            .set_port(address.port());
        config
    }

    pub fn client(&self) -> Client {
        Client::new(self.config()).unwrap()
    }

    pub fn received(&self) -> Vec<wiremock::Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }
}
