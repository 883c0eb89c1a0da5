//! SEPA bank accounts.

use crate::fields;
use stancer_core::{Derived, Fault, Field, Result, Rule, Schema, Value, ValueKind};

static FIELDS: [Field; 7] = [
    Field::text("bic").rule(
        Rule::new()
            .label("BIC")
            .check(bic)
            .throws(Fault::Value(ValueKind::Bic)),
    ),
    Field::text("iban").hidden().rule(
        Rule::new()
            .label("IBAN")
            .coerce(compact)
            .check(iban)
            .derive(iban_parts)
            .throws(Fault::Value(ValueKind::Iban)),
    ),
    fields::NAME,
    Field::text("mandate")
        .read_only()
        .rule(Rule::new().between(3, 35).throws(Fault::Value(ValueKind::Mandate))),
    Field::datetime("date_mandate")
        .read_only()
        .rule(Rule::new().throws(Fault::Value(ValueKind::DateMandate))),
    Field::text("country").read_only(),
    Field::text("last4").read_only(),
];

pub static SCHEMA: Schema = Schema::new("Sepa", &FIELDS).endpoint("sepa");

pub fn schema() -> &'static Schema {
    &SCHEMA
}

resource! {
    /// A SEPA bank account, for direct debit payments.
    Sepa => SCHEMA
}

impl Sepa {
    getters! {
        bic: text,
        /// Country of the account, from the IBAN.
        country: text,
        date_mandate: date,
        iban: text,
        last4: text,
        mandate: text,
        name: text,
    }

    setters! {
        set_bic(bic: text),
        set_date_mandate(date_mandate: date),
        /// Sets the IBAN. Spaces are ignored and letters upper-cased.
        set_iban(iban: text),
        /// Sets the mandate reference, signed by the account owner.
        set_mandate(mandate: text),
        set_name(name: text),
    }

    /// IBAN in groups of four characters ("FR14 2004 ..."), when known.
    pub fn formatted_iban(&self) -> Result<Option<String>> {
        Ok(self.iban()?.map(|iban| {
            iban.as_bytes()
                .chunks(4)
                .map(String::from_utf8_lossy)
                .collect::<Vec<_>>()
                .join(" ")
        }))
    }

    /// Returns true when the account can be used for a payment.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.has_id() || (!self.get("bic").is_null() && !self.get("iban").is_null())
    }
}

fn bic(value: &Value) -> Option<String> {
    let bic = value.as_str()?;
    (![8, 11].contains(&bic.chars().count())).then(|| format!("\"{bic}\" is not a valid BIC."))
}

fn compact(value: Value) -> Result<Option<Value>> {
    Ok(Some(match value {
        Value::Str(iban) => Value::Str(
            iban.chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_uppercase(),
        ),
        other => other,
    }))
}

fn iban(value: &Value) -> Option<String> {
    let iban = value.as_str()?;
    let valid = iban.len() > 4
        && iban.chars().all(|c| c.is_ascii_alphanumeric())
        && mod97(iban) == 1;

    (!valid).then(|| format!("\"{iban}\" is not a valid IBAN."))
}

/// ISO 7064 remainder of an alphanumeric IBAN: the first four characters are
/// moved to the end and letters count as two digits (A = 10).
fn mod97(iban: &str) -> u32 {
    let (head, tail) = iban.split_at(4);
    tail.chars().chain(head.chars()).fold(0, |remainder, c| {
        let digit = c.to_digit(36).unwrap_or(0);
        let shift = if digit < 10 { 10 } else { 100 };
        (remainder * shift + digit) % 97
    })
}

fn iban_parts(value: &Value, derived: &mut Derived) {
    if let Some(iban) = value.as_str() {
        derived.push(("last4", Value::from(&iban[iban.len().saturating_sub(4)..])));
        derived.push(("country", Value::from(iban[..2.min(iban.len())].to_lowercase())));
    }
}
