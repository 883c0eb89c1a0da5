//! Fields shared by several resources.

use stancer_core::{Fault, Field, Rule, ValueKind};

pub(crate) const CURRENCIES: &[&str] = &["eur", "gbp", "usd"];

/// Amount in the smallest currency unit, 50 at least.
pub(crate) const AMOUNT: Field =
    Field::integer("amount").rule(Rule::new().min(50).throws(Fault::Value(ValueKind::Amount)));

pub(crate) const CURRENCY: Field = Field::text("currency").rule(
    Rule::new()
        .allowed(CURRENCIES)
        .lowercase()
        .throws(Fault::Value(ValueKind::Currency)),
);

pub(crate) const NAME: Field =
    Field::text("name").rule(Rule::new().between(4, 64).throws(Fault::Value(ValueKind::Name)));

/// Checks that a value is an `https://` URL.
pub(crate) fn https_only(value: &stancer_core::Value, message: &str) -> Option<String> {
    match value.as_str() {
        Some(url) if !url.starts_with("https://") => Some(message.to_string()),
        _ => None,
    }
}
