#![allow(dead_code)]

use serde_json::Value as Json;
use stancer::{Client, Config, HttpClient, Result};
use stancer_core::{HttpRequest, HttpResponse};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;
use wiremock::{Mock, MockServer};

pub const STEST: &str = "stest_1234567890abcdefghijklmn";
pub const PTEST: &str = "ptest_1234567890abcdefghijklmn";

/// Valid test card and account numbers.
pub const VISA: &str = "4111111111111111";
pub const IBAN: &str = "FR1420041010050500013M02606";
pub const BIC: &str = "DEUTDEFF";

/// Variables read by `Device::hydrate_from_env`.
pub const DEVICE_VARIABLES: [&str; 5] = [
    "SERVER_ADDR",
    "SERVER_PORT",
    "HTTP_ACCEPT",
    "HTTP_ACCEPT_LANGUAGE",
    "HTTP_USER_AGENT",
];

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Replaces the device environment. Tests calling this must be `#[serial]`.
pub fn set_device_env(values: &[(&str, &str)]) {
    for variable in DEVICE_VARIABLES {
        // SAFETY: callers are serialized, no other thread reads the environment.
        unsafe { std::env::remove_var(variable) };
    }
    for (variable, value) in values {
        // SAFETY: as above.
        unsafe { std::env::set_var(variable, value) };
    }
}

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
            reason: None,
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

    /// Body of the last request, parsed.
    pub fn last_body(&self) -> Json {
        let body = self.last_request().body.expect("request without body");
        serde_json::from_str(&body).unwrap()
    }
}

impl HttpClient for FakeHttp {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut state = self.0.borrow_mut();
        state.requests.push(request);
        Ok(state.responses.pop_front().unwrap_or(HttpResponse {
            status: 200,
            reason: None,
            body: String::new(),
        }))
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

    pub fn client(&self) -> Client {
        let address = self.server.address();
        let mut config = test_config();
        config
            .set_scheme("http")
            .set_host(address.ip().to_string())
            .set_port(address.port());
        Client::new(config).unwrap()
    }

    pub fn received(&self) -> Vec<wiremock::Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }
}
