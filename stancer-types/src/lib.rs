//! Core type definitions for the Stancer client.
//!
//! This crate defines the leaf types every other crate depends on:
//! - [`Config`]: connection, credential and locale settings
//! - [`KeyChain`]: the four API key slots (public/secret, live/test)
//! - [`Mode`]: live or test API mode
//! - Status enumerations returned by the API ([`PaymentStatus`],
//!   [`RefundStatus`], [`AuthStatus`])
//!
//! Nothing here performs I/O. A `Config` is built once and handed to the
//! client, which shares it with every entity it creates.

mod config;
mod keys;
mod status;

pub use config::{Config, Mode, DEFAULT_HOST, DEFAULT_SCHEME, DEFAULT_VERSION};
pub use keys::{KeyChain, KeySlot};
pub use status::{AuthStatus, PaymentStatus, RefundStatus};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building configuration or parsing API enumerations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("\"{0}\" is not a valid API key.")]
    InvalidKey(String),

    #[error("Unknown mode \"{0}\". Please use \"live\" or \"test\".")]
    UnknownMode(String),

    #[error("unknown status \"{0}\"")]
    UnknownStatus(String),

    #[error("invalid timezone offset: {0} seconds")]
    InvalidTimezone(i32),
}
