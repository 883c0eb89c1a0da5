//! Payment cards.

use crate::fields;
use stancer_core::{Derived, Fault, Field, Rule, Schema, TypeKind, Value, ValueKind};

static FIELDS: [Field; 13] = [
    Field::text("number").hidden().rule(
        Rule::new()
            .coerce(digits_only)
            .check(luhn)
            .derive(last4)
            .throws(Fault::Value(ValueKind::CardNumber)),
    ),
    Field::text("cvc").rule(
        Rule::new()
            .length(3)
            .label("CVC")
            .throws(Fault::Value(ValueKind::CardVerificationCode)),
    ),
    Field::integer("exp_month").rule(
        Rule::new()
            .between(1, 12)
            .label("Expiration month")
            .throws(Fault::Value(ValueKind::CardExpirationMonth)),
    ),
    Field::integer("exp_year").rule(
        Rule::new()
            .label("Expiration year")
            .throws(Fault::Value(ValueKind::CardExpirationYear)),
    ),
    Field::boolean("tokenize").rule(Rule::new().throws(Fault::Type(TypeKind::CardTokenize))),
    Field::text("zip_code").rule(
        Rule::new()
            .between(2, 8)
            .label("Zip code")
            .throws(Fault::Value(ValueKind::ZipCode)),
    ),
    fields::NAME,
    Field::text("brand").read_only(),
    Field::text("country").read_only(),
    Field::text("funding").read_only(),
    Field::text("last4").read_only(),
    Field::text("nature").read_only(),
    Field::text("network").read_only(),
];

pub static SCHEMA: Schema = Schema::new("Card", &FIELDS).endpoint("cards");

pub fn schema() -> &'static Schema {
    &SCHEMA
}

const BRANDS: [(&str, &str); 7] = [
    ("amex", "American Express"),
    ("dankort", "Dankort"),
    ("discover", "Discover"),
    ("jcb", "JCB"),
    ("maestro", "Maestro"),
    ("mastercard", "MasterCard"),
    ("visa", "VISA"),
];

resource! {
    /// A payment card.
    ///
    /// The number is checked with the Luhn algorithm when set; only its last
    /// four digits come back from the API.
    Card => SCHEMA
}

impl Card {
    getters! {
        /// Brand code, as sent by the API ("visa", "amex").
        brand: text,
        /// Issuing country.
        country: text,
        cvc: text,
        exp_month: int,
        exp_year: int,
        /// Funding type ("credit", "debit", "prepaid").
        funding: text,
        last4: text,
        name: text,
        /// "personal" or "corporate".
        nature: text,
        network: text,
        number: text,
        tokenize: bool,
        zip_code: text,
    }

    setters! {
        set_cvc(cvc: text),
        set_exp_month(exp_month: int),
        set_exp_year(exp_year: int),
        set_name(name: text),
        /// Sets the card number. Spaces and dashes are ignored.
        set_number(number: text),
        /// Asks the API to keep the card for later payments.
        set_tokenize(tokenize: bool),
        set_zip_code(zip_code: text),
    }

    /// Brand for display ("American Express" for "amex"). Unknown brands are
    /// returned as sent.
    pub fn brand_name(&self) -> stancer_core::Result<Option<String>> {
        Ok(self.brand()?.map(|brand| {
            BRANDS
                .iter()
                .find(|(code, _)| *code == brand)
                .map_or(brand.clone(), |(_, name)| (*name).to_string())
        }))
    }

    /// Returns true when the card can be used for a payment: it is known to
    /// the API, or every mandatory attribute is set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.has_id()
            || ["cvc", "exp_month", "exp_year", "number"]
                .iter()
                .all(|name| !self.get(name).is_null())
    }
}

fn digits_only(value: Value) -> stancer_core::Result<Option<Value>> {
    Ok(Some(match value {
        Value::Str(number) => Value::Str(number.chars().filter(char::is_ascii_digit).collect()),
        other => other,
    }))
}

fn luhn(value: &Value) -> Option<String> {
    let number = value.as_str()?;
    let sum: u32 = number
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(position, digit)| match (position % 2, digit * 2) {
            (0, _) => digit,
            (_, doubled) if doubled > 9 => doubled - 9,
            (_, doubled) => doubled,
        })
        .sum();

    (number.is_empty() || sum % 10 != 0)
        .then(|| format!("\"{number}\" is not a valid credit card number."))
}

fn last4(value: &Value, derived: &mut Derived) {
    if let Some(number) = value.as_str() {
        let tail = &number[number.len().saturating_sub(4)..];
        derived.push(("last4", Value::from(tail)));
    }
}
