//! Connection, credential and locale settings.
//!
//! A [`Config`] is an explicit value: build it once, then move it into the
//! client. There is no process-wide instance.

use crate::keys::{KeyChain, KeySlot};
use crate::{Error, Result};
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "api.stancer.com";

/// URL scheme used when none is configured.
pub const DEFAULT_SCHEME: &str = "https";

/// API version used when none is configured.
pub const DEFAULT_VERSION: u32 = 1;

/// API mode, selecting which keys are used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Live,
    #[default]
    Test,
}

impl Mode {
    /// Returns the string form used by the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Live => "live",
            Mode::Test => "test",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "live" => Ok(Mode::Live),
            "test" => Ok(Mode::Test),
            other => Err(Error::UnknownMode(other.to_string())),
        }
    }
}

/// Client configuration.
///
/// Every field can be reset to its default with the matching `reset_*`
/// method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_scheme")]
    scheme: String,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    timeout: Option<Duration>,
    #[serde(default = "utc", with = "offset_seconds")]
    timezone: FixedOffset,
    #[serde(default)]
    mode: Mode,
    #[serde(default, skip_serializing)]
    keys: KeyChain,
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

fn utc() -> FixedOffset {
    Utc.fix()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            port: None,
            version: DEFAULT_VERSION,
            timeout: None,
            timezone: utc(),
            mode: Mode::Test,
            keys: KeyChain::new(),
        }
    }
}

impl Config {
    /// Creates a configuration with every field at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration holding the given keys.
    pub fn with_keys<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        config.set_keys(keys)?;
        Ok(config)
    }

    // ── Scheme ────────────────────────────────────────────────────

    /// URL scheme, `https` unless overridden (plain `http` is only meant for
    /// local mock servers).
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn set_scheme(&mut self, scheme: impl Into<String>) -> &mut Self {
        self.scheme = scheme.into();
        self
    }

    pub fn reset_scheme(&mut self) -> &mut Self {
        self.scheme = default_scheme();
        self
    }

    // ── Host / port / version ─────────────────────────────────────

    /// API host, `api.stancer.com` by default.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_host(&mut self, host: impl Into<String>) -> &mut Self {
        self.host = host.into();
        self
    }

    pub fn reset_host(&mut self) -> &mut Self {
        self.host = default_host();
        self
    }

    /// API port. Unset by default, letting the HTTP client decide.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn set_port(&mut self, port: u16) -> &mut Self {
        self.port = Some(port);
        self
    }

    pub fn reset_port(&mut self) -> &mut Self {
        self.port = None;
        self
    }

    /// Target API version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn set_version(&mut self, version: u32) -> &mut Self {
        self.version = version;
        self
    }

    pub fn reset_version(&mut self) -> &mut Self {
        self.version = DEFAULT_VERSION;
        self
    }

    /// Base location of the API, without trailing slash
    /// (`https://api.stancer.com/v1`).
    #[must_use]
    pub fn base_url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}/v{}", self.scheme, self.host, port, self.version),
            None => format!("{}://{}/v{}", self.scheme, self.host, self.version),
        }
    }

    // ── Timeout ───────────────────────────────────────────────────

    /// Per-call timeout. `None` keeps the HTTP client default.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn reset_timeout(&mut self) -> &mut Self {
        self.timeout = None;
        self
    }

    // ── Timezone ──────────────────────────────────────────────────

    /// Offset applied to every date built from an API timestamp.
    #[must_use]
    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    pub fn set_timezone(&mut self, timezone: FixedOffset) -> &mut Self {
        self.timezone = timezone;
        self
    }

    /// Sets the timezone from an offset in seconds east of UTC.
    pub fn set_timezone_offset(&mut self, seconds: i32) -> Result<&mut Self> {
        let timezone = FixedOffset::east_opt(seconds).ok_or(Error::InvalidTimezone(seconds))?;
        Ok(self.set_timezone(timezone))
    }

    pub fn reset_timezone(&mut self) -> &mut Self {
        self.timezone = utc();
        self
    }

    // ── Mode ──────────────────────────────────────────────────────

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = mode;
        self
    }

    pub fn reset_mode(&mut self) -> &mut Self {
        self.mode = Mode::Test;
        self
    }

    // ── Keys ──────────────────────────────────────────────────────

    #[must_use]
    pub fn keys(&self) -> &KeyChain {
        &self.keys
    }

    /// Adds one key to the chain, in the slot given by its prefix.
    pub fn set_key(&mut self, key: &str) -> Result<&mut Self> {
        self.keys.insert(key)?;
        Ok(self)
    }

    /// Adds several keys to the chain.
    ///
    /// Accepts anything iterable over strings: an array, a `Vec`, or the
    /// values of a map.
    pub fn set_keys<I, S>(&mut self, keys: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keys.extend(keys)?;
        Ok(self)
    }

    pub fn reset_keys(&mut self) -> &mut Self {
        self.keys.clear();
        self
    }

    /// Public key for the current mode.
    #[must_use]
    pub fn public_key(&self) -> Option<&str> {
        match self.mode {
            Mode::Live => self.keys.get(KeySlot::PublicLive),
            Mode::Test => self.keys.get(KeySlot::PublicTest),
        }
    }

    /// Secret key for the current mode.
    #[must_use]
    pub fn secret_key(&self) -> Option<&str> {
        match self.mode {
            Mode::Live => self.keys.get(KeySlot::SecretLive),
            Mode::Test => self.keys.get(KeySlot::SecretTest),
        }
    }

    /// Restores every field to its default.
    pub fn reset_all(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }
}

mod offset_seconds {
    use chrono::FixedOffset;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        offset: &FixedOffset,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(offset.local_minus_utc())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<FixedOffset, D::Error> {
        let seconds = i32::deserialize(deserializer)?;
        FixedOffset::east_opt(seconds)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid offset: {seconds}")))
    }
}
