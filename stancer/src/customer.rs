//! Customers.

use crate::fields;
use stancer_core::{Fault, Field, Result, Rule, Schema, ValueKind};

static FIELDS: [Field; 5] = [
    Field::text("email").rule(
        Rule::new()
            .between(5, 64)
            .throws(Fault::Value(ValueKind::CustomerEmail)),
    ),
    Field::text("mobile").rule(
        Rule::new()
            .between(8, 16)
            .label("Mobile phone")
            .throws(Fault::Value(ValueKind::CustomerMobile)),
    ),
    Field::text("external_id").rule(
        Rule::new()
            .max(36)
            .label("External ID")
            .throws(Fault::Value(ValueKind::CustomerExternalId)),
    ),
    fields::NAME,
    Field::text("country").read_only(),
];

pub static SCHEMA: Schema = Schema::new("Customer", &FIELDS).endpoint("customers");

pub fn schema() -> &'static Schema {
    &SCHEMA
}

resource! {
    /// A customer, identified by an email address or a mobile phone number.
    Customer => SCHEMA
}

impl Customer {
    getters! {
        country: text,
        email: text,
        /// Identifier of the customer in your own system.
        external_id: text,
        mobile: text,
        name: text,
    }

    setters! {
        set_email(email: text),
        set_external_id(external_id: ident),
        set_mobile(mobile: text),
        set_name(name: text),
    }

    /// Returns true when an email address or a mobile number is known. May
    /// fetch the customer.
    pub fn is_complete(&self) -> Result<bool> {
        Ok(self.email()?.is_some() || self.mobile()?.is_some())
    }
}
