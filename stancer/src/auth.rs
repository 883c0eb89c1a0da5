//! Payment authentication (3-D Secure).

use stancer_core::{Entity, Fault, Field, Result, Rule, Schema, Value, ValueKind};
use stancer_types::AuthStatus;

static FIELDS: [Field; 3] = [
    Field::text("return_url").rule(
        Rule::new()
            .check(https_url)
            .throws(Fault::Value(ValueKind::Url)),
    ),
    Field::text("status"),
    Field::text("redirect_url").read_only(),
];

pub static SCHEMA: Schema = Schema::new("Auth", &FIELDS).defaults(defaults);

pub fn schema() -> &'static Schema {
    &SCHEMA
}

fn defaults() -> Vec<(&'static str, Value)> {
    vec![("status", Value::from(AuthStatus::Request.as_str()))]
}

fn https_url(value: &Value) -> Option<String> {
    crate::fields::https_only(value, "Must be an HTTPS URL")
}

resource! {
    /// Authentication request attached to a payment.
    ///
    /// New objects ask for an authentication (status "request"); the API
    /// answers with the page the customer must visit.
    Auth => SCHEMA
}

impl Auth {
    /// A new authentication request, sending the customer back to
    /// `return_url` once done.
    pub fn with_return_url(return_url: impl Into<String>) -> Result<Self> {
        let auth = Self::detached();
        auth.set_return_url(return_url)?;
        Ok(auth)
    }

    getters! {
        /// Page starting the authentication process.
        redirect_url: text,
        /// Page receiving the authentication result.
        return_url: text,
        status: text,
    }

    setters! {
        set_return_url(return_url: text),
    }

    pub fn set_status(&self, status: AuthStatus) -> Result<()> {
        self.set("status", status.as_str())
    }

    /// Builds an authentication from loose input: a return URL, `true` for a
    /// bare request, or a map of attributes. `false` means no authentication.
    pub(crate) fn coerce(value: Value) -> Result<Option<Value>> {
        match value {
            Value::Str(url) => Ok(Some(Self::with_return_url(url)?.into())),
            Value::Bool(true) => Ok(Some(Self::detached().into())),
            Value::Bool(false) => Ok(None),
            Value::Map(params) => Ok(Some(Entity::with_params(&SCHEMA, None, params)?.into())),
            other => Ok(Some(other)),
        }
    }
}
