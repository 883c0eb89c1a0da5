use chrono::FixedOffset;
use pretty_assertions::assert_eq;
use stancer_types::{Config, Error, Mode, DEFAULT_HOST};
use std::time::Duration;

const PPROD: &str = "pprod_1234567890abcdefghijklmn";
const PTEST: &str = "ptest_1234567890abcdefghijklmn";
const SPROD: &str = "sprod_1234567890abcdefghijklmn";
const STEST: &str = "stest_1234567890abcdefghijklmn";

// ── Defaults ─────────────────────────────────────────────────────

#[test]
fn defaults() {
    let config = Config::new();
    assert_eq!(config.host(), DEFAULT_HOST);
    assert_eq!(config.scheme(), "https");
    assert_eq!(config.port(), None);
    assert_eq!(config.version(), 1);
    assert_eq!(config.timeout(), None);
    assert_eq!(config.timezone().local_minus_utc(), 0);
    assert_eq!(config.mode(), Mode::Test);
    assert!(config.keys().is_empty());
}

#[test]
fn base_url_without_port() {
    let config = Config::new();
    assert_eq!(config.base_url(), "https://api.stancer.com/v1");
}

#[test]
fn base_url_with_port_and_version() {
    let mut config = Config::new();
    config.set_host("example.org").set_port(8443).set_version(2);
    assert_eq!(config.base_url(), "https://example.org:8443/v2");
}

// ── Resets ───────────────────────────────────────────────────────

#[test]
fn reset_restores_each_default() {
    let mut config = Config::new();
    config
        .set_host("example.org")
        .set_port(1234)
        .set_version(3)
        .set_timeout(Duration::from_secs(5))
        .set_mode(Mode::Live)
        .set_scheme("http");
    config.set_timezone_offset(3600).unwrap();
    config.set_key(STEST).unwrap();

    config
        .reset_host()
        .reset_port()
        .reset_version()
        .reset_timeout()
        .reset_mode()
        .reset_scheme()
        .reset_timezone()
        .reset_keys();

    assert_eq!(config, Config::new());
}

#[test]
fn reset_all() {
    let mut config = Config::with_keys([STEST, SPROD]).unwrap();
    config.set_host("example.org");
    config.reset_all();
    assert_eq!(config, Config::default());
}

// ── Keys ─────────────────────────────────────────────────────────

#[test]
fn single_key() {
    let mut config = Config::new();
    config.set_key(STEST).unwrap();
    assert_eq!(config.secret_key(), Some(STEST));
    assert_eq!(config.public_key(), None);
}

#[test]
fn key_list_fills_every_slot() {
    let config = Config::with_keys(vec![PPROD, PTEST, SPROD, STEST]).unwrap();
    assert_eq!(config.public_key(), Some(PTEST));
    assert_eq!(config.secret_key(), Some(STEST));
}

#[test]
fn key_map_values() {
    let mut map = std::collections::HashMap::new();
    map.insert("secret", SPROD.to_string());
    map.insert("public", PPROD.to_string());

    let mut config = Config::new();
    config.set_keys(map.values()).unwrap();
    config.set_mode(Mode::Live);

    assert_eq!(config.public_key(), Some(PPROD));
    assert_eq!(config.secret_key(), Some(SPROD));
}

#[test]
fn mode_selects_key() {
    let mut config = Config::with_keys([SPROD, STEST]).unwrap();
    assert_eq!(config.secret_key(), Some(STEST));

    config.set_mode(Mode::Live);
    assert_eq!(config.secret_key(), Some(SPROD));
}

#[test]
fn invalid_key_prefix_rejected() {
    let mut config = Config::new();
    let err = config.set_key("foo_bar_baz").unwrap_err();
    assert_eq!(err, Error::InvalidKey("foo_bar_baz".into()));
    assert_eq!(err.to_string(), "\"foo_bar_baz\" is not a valid API key.");
}

#[test]
fn short_key_rejected() {
    let mut config = Config::new();
    assert!(config.set_key("sp").is_err());
}

// ── Mode ─────────────────────────────────────────────────────────

#[test]
fn mode_from_str() {
    assert_eq!("live".parse::<Mode>().unwrap(), Mode::Live);
    assert_eq!("test".parse::<Mode>().unwrap(), Mode::Test);
    assert_eq!(
        "prod".parse::<Mode>().unwrap_err(),
        Error::UnknownMode("prod".into())
    );
}

// ── Timezone ─────────────────────────────────────────────────────

#[test]
fn timezone_offset() {
    let mut config = Config::new();
    config.set_timezone_offset(-5 * 3600).unwrap();
    assert_eq!(config.timezone(), FixedOffset::west_opt(5 * 3600).unwrap());
}

#[test]
fn timezone_offset_out_of_range() {
    let mut config = Config::new();
    assert_eq!(
        config.set_timezone_offset(86_400).unwrap_err(),
        Error::InvalidTimezone(86_400)
    );
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serialized_config_omits_keys() {
    let config = Config::with_keys([STEST]).unwrap();
    let json = serde_json::to_string(&config).unwrap();
    assert!(!json.contains(STEST));
}

#[test]
fn deserialize_partial_config() {
    let config: Config =
        serde_json::from_str(r#"{"host": "example.org", "timezone": 7200, "mode": "live"}"#)
            .unwrap();
    assert_eq!(config.host(), "example.org");
    assert_eq!(config.timezone().local_minus_utc(), 7200);
    assert_eq!(config.mode(), Mode::Live);
    assert_eq!(config.version(), 1);
    assert_eq!(config.scheme(), "https");
}
