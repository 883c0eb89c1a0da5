//! Customer device, used for fraud detection and authentication.

use stancer_core::{Error, Fault, Field, Result, Rule, Schema, Value, ValueKind};
use std::env;
use std::net::IpAddr;
use tracing::debug;

static FIELDS: [Field; 7] = [
    Field::text("city"),
    Field::text("country"),
    Field::text("http_accept"),
    Field::text("ip").rule(
        Rule::new()
            .label("IP address")
            .check(ip_address)
            .throws(Fault::Value(ValueKind::IpAddress)),
    ),
    Field::text("languages"),
    Field::integer("port").rule(Rule::new().max(65535).throws(Fault::Value(ValueKind::Port))),
    Field::text("user_agent"),
];

pub static SCHEMA: Schema = Schema::new("Device", &FIELDS);

pub fn schema() -> &'static Schema {
    &SCHEMA
}

fn ip_address(value: &Value) -> Option<String> {
    let ip = value.as_str()?;
    ip.parse::<IpAddr>()
        .is_err()
        .then(|| format!("This IP address seems invalid ({ip})"))
}

resource! {
    /// Device of the customer: address, browser headers.
    Device => SCHEMA
}

impl Device {
    getters! {
        city: text,
        country: text,
        http_accept: text,
        /// IPv4 or IPv6 address.
        ip: text,
        /// Accepted languages of the browser.
        languages: text,
        port: int,
        user_agent: text,
    }

    setters! {
        set_city(city: text),
        set_country(country: text),
        set_http_accept(http_accept: text),
        set_ip(ip: text),
        set_languages(languages: text),
        set_port(port: int),
        set_user_agent(user_agent: text),
    }

    /// Fills missing attributes from the CGI-style environment of the
    /// current request (`SERVER_ADDR`, `SERVER_PORT`, `HTTP_ACCEPT`,
    /// `HTTP_ACCEPT_LANGUAGE`, `HTTP_USER_AGENT`).
    ///
    /// Fails when the IP address or the port is still unknown afterwards.
    pub fn hydrate_from_env(&self) -> Result<()> {
        self.fill_from_env("ip", "SERVER_ADDR", |addr| Ok(Value::from(addr)))?;
        self.fill_from_env("port", "SERVER_PORT", |port| {
            port.trim().parse::<i64>().map(Value::from).map_err(|_| {
                Error::value(ValueKind::Port, format!("\"{port}\" is not a valid port."))
            })
        })?;
        self.fill_from_env("http_accept", "HTTP_ACCEPT", |accept| Ok(Value::from(accept)))?;
        self.fill_from_env("languages", "HTTP_ACCEPT_LANGUAGE", |languages| {
            Ok(Value::from(languages))
        })?;
        self.fill_from_env("user_agent", "HTTP_USER_AGENT", |agent| Ok(Value::from(agent)))?;

        if self.get("ip").is_null() {
            return Err(Error::value(ValueKind::IpAddress, "Missing IP address."));
        }
        if self.get("port").is_null() {
            return Err(Error::value(ValueKind::Port, "Missing port."));
        }
        Ok(())
    }

    fn fill_from_env(
        &self,
        name: &str,
        variable: &str,
        parse: impl FnOnce(String) -> Result<Value>,
    ) -> Result<()> {
        if !self.get(name).is_null() {
            return Ok(());
        }
        let Ok(raw) = env::var(variable) else {
            return Ok(());
        };
        debug!(field = name, variable, "device attribute from environment");
        self.set(name, parse(raw)?)
    }
}
