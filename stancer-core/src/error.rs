//! Error taxonomy.
//!
//! Four families, all surfaced through [`Error`]:
//! - local validation failures (`InvalidValue` / `InvalidType`), raised
//!   before any network call
//! - HTTP failures ([`HttpError`]), classified by status code
//! - protocol failures (`InvalidResponse`), for bodies the client cannot make
//!   sense of
//! - preconditions (missing key, missing identifier, detached entity)

use serde_json::Value as Json;
use std::fmt;
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the client.
#[derive(Debug, Error)]
pub enum Error {
    /// A value was rejected by a field rule, or a required value is missing.
    #[error("{message}")]
    InvalidValue { kind: ValueKind, message: String },

    /// A value had the wrong type for a field whose rule reports type errors.
    #[error("{message}")]
    InvalidType { kind: TypeKind, message: String },

    /// The API answered with a non-success status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The API answered with a body the client cannot interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The API does not allow this operation.
    #[error("{0}")]
    NotImplemented(String),

    /// A network operation was needed on an entity with no client attached.
    #[error("entity has no client attached")]
    Detached,

    /// The request never produced an HTTP status (connection, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] stancer_types::Error),
}

impl Error {
    /// Shorthand for an `InvalidValue` error.
    pub fn value(kind: ValueKind, message: impl Into<String>) -> Self {
        Error::InvalidValue {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for an `InvalidType` error.
    pub fn type_error(kind: TypeKind, message: impl Into<String>) -> Self {
        Error::InvalidType {
            kind,
            message: message.into(),
        }
    }

    /// Returns true for the validation families (`InvalidValue`, `InvalidType`).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidValue { .. } | Error::InvalidType { .. })
    }

    /// Returns the value kind, if this is an `InvalidValue` error.
    #[must_use]
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            Error::InvalidValue { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns the HTTP error kind, if this is an HTTP error.
    #[must_use]
    pub fn http_kind(&self) -> Option<HttpErrorKind> {
        match self {
            Error::Http(err) => Some(err.kind),
            _ => None,
        }
    }

    /// Returns true if the API reported the target as missing (404).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.http_kind() == Some(HttpErrorKind::NotFound)
    }
}

/// What a rejected value was meant to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Amount,
    Auth,
    Bic,
    Card,
    CardExpirationMonth,
    CardExpirationYear,
    CardNumber,
    CardVerificationCode,
    Currency,
    Customer,
    CustomerEmail,
    CustomerExternalId,
    CustomerMobile,
    DateMandate,
    Device,
    Iban,
    IpAddress,
    Mandate,
    Name,
    PaymentDescription,
    PaymentOrderId,
    PaymentUniqueId,
    Port,
    SearchFilter,
    Sepa,
    Status,
    Url,
    ZipCode,
    MissingApiKey,
    MissingPaymentId,
    MissingPaymentMethod,
    MissingReturnUrl,
    /// No dedicated kind declared by the field rule.
    Other,
}

/// Type errors raised by rules declared to report them as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    CardTokenize,
    PaymentCapture,
    /// No dedicated kind declared by the field rule.
    Other,
}

/// Which error a field rule raises on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    Value(ValueKind),
    Type(TypeKind),
}

impl Fault {
    /// Builds the error for this fault.
    pub fn error(self, message: impl Into<String>) -> Error {
        match self {
            Fault::Value(kind) => Error::value(kind, message),
            Fault::Type(kind) => Error::type_error(kind, message),
        }
    }
}

// ── HTTP ─────────────────────────────────────────────────────────

/// Status-driven subtype of an HTTP failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpErrorKind {
    BadRequest,
    Unauthorized,
    PaymentRequired,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    ProxyAuthenticationRequired,
    RequestTimeout,
    Conflict,
    Gone,
    /// Any other 4xx status.
    Client,
    InternalServerError,
    /// Any other 5xx status.
    Server,
    /// Any other non-success status.
    Other,
}

impl HttpErrorKind {
    /// Classifies a status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => HttpErrorKind::BadRequest,
            401 => HttpErrorKind::Unauthorized,
            402 => HttpErrorKind::PaymentRequired,
            403 => HttpErrorKind::Forbidden,
            404 => HttpErrorKind::NotFound,
            405 => HttpErrorKind::MethodNotAllowed,
            406 => HttpErrorKind::NotAcceptable,
            407 => HttpErrorKind::ProxyAuthenticationRequired,
            408 => HttpErrorKind::RequestTimeout,
            409 => HttpErrorKind::Conflict,
            410 => HttpErrorKind::Gone,
            500 => HttpErrorKind::InternalServerError,
            501.. => HttpErrorKind::Server,
            400.. => HttpErrorKind::Client,
            _ => HttpErrorKind::Other,
        }
    }

    /// Message used when the response body tells nothing better.
    #[must_use]
    pub const fn default_reason(self) -> &'static str {
        match self {
            HttpErrorKind::BadRequest => "Bad Request",
            HttpErrorKind::Unauthorized => "Unauthorized",
            HttpErrorKind::PaymentRequired => "Payment Required",
            HttpErrorKind::Forbidden => "Forbidden",
            HttpErrorKind::NotFound => "Not Found",
            HttpErrorKind::MethodNotAllowed => "Method Not Allowed",
            HttpErrorKind::NotAcceptable => "Not Acceptable",
            HttpErrorKind::ProxyAuthenticationRequired => "Proxy Authentication Required",
            HttpErrorKind::RequestTimeout => "Request Timeout",
            HttpErrorKind::Conflict => "Conflict",
            HttpErrorKind::Gone => "Gone",
            HttpErrorKind::Client => "Client error",
            HttpErrorKind::InternalServerError => "Internal Server Error",
            HttpErrorKind::Server => "Server error",
            HttpErrorKind::Other => "HTTP error",
        }
    }

    /// True for every 4xx kind.
    #[must_use]
    pub fn is_client_error(self) -> bool {
        !matches!(
            self,
            HttpErrorKind::InternalServerError | HttpErrorKind::Server | HttpErrorKind::Other
        )
    }

    /// True for every 5xx kind.
    #[must_use]
    pub fn is_server_error(self) -> bool {
        matches!(self, HttpErrorKind::InternalServerError | HttpErrorKind::Server)
    }
}

/// A non-success HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub kind: HttpErrorKind,
    pub status: u16,
    /// Reason phrase sent by the server, if any.
    pub reason: Option<String>,
    pub message: String,
    /// `error.type` from the response body, if any.
    pub error_type: Option<String>,
}

impl HttpError {
    /// Builds the error for a response, deriving the message from its body.
    #[must_use]
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let kind = HttpErrorKind::from_status(status);
        let mut message = kind.default_reason().to_string();
        let mut error_type = None;

        if let Ok(parsed) = serde_json::from_str::<Json>(body) {
            if let Some(reason) = reason {
                message = reason.to_string();
            }

            if let Some(err) = parsed.get("error") {
                let (parsed_message, parsed_type) = parse_error(err);
                if let Some(parsed_message) = parsed_message {
                    message = parsed_message;
                }
                error_type = parsed_type;
            }
        }

        Self {
            kind,
            status,
            reason: reason.map(str::to_string),
            message,
            error_type,
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

fn parse_error(err: &Json) -> (Option<String>, Option<String>) {
    let Json::Object(map) = err else {
        return (json_to_string(err), None);
    };

    let error_type = map.get("type").and_then(json_to_string);
    let message = match map.get("message") {
        Some(Json::Object(inner)) => {
            let id = inner.get("id").and_then(json_to_string);
            match inner.get("error").and_then(Json::as_str) {
                Some(text) => match &id {
                    Some(id) => Some(format!("{text} ({id})")),
                    None => Some(text.to_string()),
                },
                None => id,
            }
        }
        Some(other) => json_to_string(other),
        None => None,
    };

    (message, error_type)
}

fn json_to_string(value: &Json) -> Option<String> {
    match value {
        Json::Null => None,
        Json::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
