mod common;

use common::{MockApi, STEST, init_tracing, widget};
use pretty_assertions::assert_eq;
use serde_json::json;
use stancer_core::{Entity, Error, HttpClient, HttpRequest, Method, ReqwestClient, Value};
use std::time::Duration;
use wiremock::matchers::{basic_auth, body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn request(api: &MockApi, verb: Method, route: &str) -> HttpRequest {
    HttpRequest {
        method: verb,
        url: format!("{}{route}", api.server.uri()),
        username: STEST.to_string(),
        query: Vec::new(),
        body: None,
    }
}

// ── ReqwestClient ────────────────────────────────────────────────

#[test]
fn sends_credentials_and_content_type() {
    init_tracing();
    let api = MockApi::start();
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/widgets/wdgt_1"))
            .and(basic_auth(STEST, ""))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"wdgt_1"}"#)),
    );

    let http = ReqwestClient::new(None).unwrap();
    let response = http.send(request(&api, Method::Get, "/v1/widgets/wdgt_1")).unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, r#"{"id":"wdgt_1"}"#);
    assert!(response.is_success());

    let received = api.received();
    let agent = received[0].headers.get("user-agent").unwrap().to_str().unwrap();
    assert!(agent.starts_with("stancer-rust/"));
}

#[test]
fn error_statuses_are_responses() {
    let api = MockApi::start();
    api.mount(
        Mock::given(method("GET")).respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"error":{"message":"gone"}}"#),
        ),
    );

    let http = ReqwestClient::new(None).unwrap();
    let response = http.send(request(&api, Method::Get, "/v1/widgets/missing")).unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.reason.as_deref(), Some("Not Found"));
    assert!(!response.is_success());
}

#[test]
fn unreachable_host_is_a_network_error() {
    let http = ReqwestClient::new(Some(Duration::from_secs(2))).unwrap();
    let err = http
        .send(HttpRequest {
            method: Method::Get,
            url: "http://127.0.0.1:1/v1/widgets".to_string(),
            username: STEST.to_string(),
            query: Vec::new(),
            body: None,
        })
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)));
}

#[test]
fn slow_answers_time_out() {
    let api = MockApi::start();
    api.mount(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800))),
    );

    let http = ReqwestClient::new(Some(Duration::from_millis(100))).unwrap();
    let err = http.send(request(&api, Method::Get, "/v1/widgets")).unwrap_err();
    assert!(matches!(err, Error::Network(_)));
}

// ── Client over HTTP ─────────────────────────────────────────────

#[test]
fn entity_round_trip_over_http() {
    let api = MockApi::start();
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/widgets/wdgt_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "wdgt_1",
                "amount": 2500,
                "currency": "usd",
            }))),
    );
    api.mount(
        Mock::given(method("PATCH"))
            .and(path("/v1/widgets/wdgt_1"))
            .and(body_json(json!({"description": "red widget"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "wdgt_1",
                "description": "red widget",
            }))),
    );

    let widget = Entity::with_id(widget(), "wdgt_1").with_client(&api.client());
    assert_eq!(widget.read("amount").unwrap(), Value::Int(2500));

    widget.set("description", "red widget").unwrap();
    widget.send().unwrap();

    assert!(!widget.is_modified());
    assert_eq!(api.received().len(), 2);
}

#[test]
fn create_posts_the_projection() {
    let api = MockApi::start();
    api.mount(
        Mock::given(method("POST"))
            .and(path("/v1/widgets"))
            .and(body_json(json!({"amount": 5000, "currency": "gbp"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "wdgt_new"}))),
    );

    let widget = Entity::new(widget()).with_client(&api.client());
    widget.set("amount", 5000).unwrap();
    widget.set("currency", "GBP").unwrap();
    widget.send().unwrap();

    assert_eq!(widget.id().as_deref(), Some("wdgt_new"));
}

#[test]
fn listing_query_reaches_the_server() {
    let api = MockApi::start();
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/widgets"))
            .and(query_param("limit", "5"))
            .and(query_param("start", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}")),
    );

    let client = api.client();
    let target = Entity::new(widget()).with_client(&client);
    let query = vec![
        ("limit".to_string(), "5".to_string()),
        ("start".to_string(), "10".to_string()),
    ];
    assert_eq!(client.get_raw(&target, &query).unwrap(), "{}");
}

#[test]
fn http_failures_are_classified() {
    let api = MockApi::start();
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/widgets/wdgt_404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"type": "invalid_request_error", "message": "No such widget wdgt_404"}
            }))),
    );
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/widgets/wdgt_401"))
            .respond_with(ResponseTemplate::new(401)),
    );

    let client = api.client();

    let err = Entity::with_id(widget(), "wdgt_404")
        .with_client(&client)
        .populate()
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "No such widget wdgt_404");

    let err = Entity::with_id(widget(), "wdgt_401")
        .with_client(&client)
        .populate()
        .unwrap_err();
    let Error::Http(http) = err else {
        panic!("expected an HTTP error, got {err:?}");
    };
    assert_eq!(http.status, 401);
    assert_eq!(http.message, "Unauthorized");
}
