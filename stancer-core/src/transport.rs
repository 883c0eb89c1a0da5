//! HTTP transport seam.
//!
//! [`Client`](crate::Client) builds [`HttpRequest`]s and interprets
//! [`HttpResponse`]s; the actual exchange goes through an [`HttpClient`].
//! [`ReqwestClient`] is the production implementation, tests plug in their own.

use crate::error::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// HTTP verbs used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// True for the verbs carrying a JSON body.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Method::Post | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Basic auth user name (the secret key). The password is always empty.
    pub username: String,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

/// What came back from the server, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one blocking HTTP exchange.
///
/// Implementations return `Err` only when no status was obtained; non-success
/// statuses are returned as regular responses.
pub trait HttpClient: fmt::Debug {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`HttpClient`] backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Builds a client. `timeout` applies to every call; `None` keeps the
    /// reqwest default.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("stancer-rust/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let inner = builder
            .build()
            .map_err(|e| Error::Network(format!("http client: {e}")))?;
        Ok(Self { inner })
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .inner
            .request(method, &request.url)
            .basic_auth(&request.username, Some(""))
            .header(CONTENT_TYPE, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().map_err(|e| {
            Error::Network(format!("{} {} failed: {e}", request.method, request.url))
        })?;

        let status = response.status();
        let reason = status.canonical_reason().map(str::to_string);
        let body = response
            .text()
            .map_err(|e| Error::Network(format!("read body: {e}")))?;

        debug!(method = %request.method, url = %request.url, status = status.as_u16(), "api call");

        Ok(HttpResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}
