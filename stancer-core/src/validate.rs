//! Generic interpreter for [`Rule`] descriptors.

use crate::error::{Fault, Result, TypeKind, ValueKind};
use crate::schema::{Field, FieldKind, Rule};
use crate::value::Value;
use chrono::FixedOffset;

/// Checks `value` against the rule of `field`.
///
/// Returns the value to store (possibly coerced, lower-cased or converted
/// from an epoch timestamp), or `None` when coercion dropped the write.
/// Integers given for date fields are converted in `timezone`.
pub fn apply(
    field: &Field,
    rule: &Rule,
    value: Value,
    timezone: FixedOffset,
) -> Result<Option<Value>> {
    let optional = rule.optional && value.is_null();

    let mut value = match rule.coerce {
        Some(coerce) => match coerce(value)? {
            Some(value) => value,
            None => return Ok(None),
        },
        None => value,
    };

    if let (FieldKind::DateTime, Value::Int(seconds)) = (field.kind, &value) {
        if let Some(date) = Value::timestamp(*seconds, timezone) {
            value = date;
        }
    }

    let label = field.label();
    let mut message = None;
    let mut type_failure = false;

    if !field.kind.accepts(&value) {
        type_failure = true;
        message = Some(type_message(field.kind, &label));
    }

    if message.is_none() && field.kind.is_standard() {
        let (checked, failure) = check_standard(field, rule, &label, value);
        value = checked;
        message = failure;
    }

    if message.is_none() {
        if let Some(check) = rule.check {
            message = check(&value);
        }
    }

    match message {
        Some(message) if !optional => {
            let fault = rule.throws.unwrap_or(if type_failure {
                Fault::Type(TypeKind::Other)
            } else {
                Fault::Value(ValueKind::Other)
            });
            Err(fault.error(message))
        }
        _ => Ok(Some(value)),
    }
}

fn type_message(kind: FieldKind, label: &str) -> String {
    match kind {
        FieldKind::Entity(schema) => {
            format!("You must provide a valid instance of {}.", schema().name)
        }
        FieldKind::DateTime => "You must provide a valid instance of datetime.".to_string(),
        kind => format!("{label} must be {}.", kind.type_name()),
    }
}

/// Length, bounds and allow-list checks. The last failing check wins.
fn check_standard(
    field: &Field,
    rule: &Rule,
    label: &str,
    value: Value,
) -> (Value, Option<String>) {
    let mut message = None;

    let (probe, suffix) = match &value {
        Value::Str(s) => (s.chars().count() as i64, " characters"),
        Value::Int(i) => (*i, ""),
        Value::Bool(b) => (i64::from(*b), ""),
        _ => (0, ""),
    };

    if let Some(length) = rule.length {
        if probe != length as i64 {
            message = Some(format!("{label} must have {length} characters."));
        }
    }

    match (rule.min, rule.max) {
        (Some(min), Some(max)) if probe < min || probe > max => {
            message = Some(format!("{label} must be between {min} and {max}{suffix}."));
        }
        (Some(min), None) if probe < min => {
            message = Some(format!("{label} must be greater than or equal to {min}{suffix}."));
        }
        (None, Some(max)) if probe > max => {
            message = Some(format!("{label} must be {max}{suffix} maximum."));
        }
        _ => {}
    }

    let folded = match &value {
        Value::Str(s) if rule.lowercase => Value::Str(s.to_lowercase()),
        other => other.clone(),
    };

    if !rule.allowed.is_empty() {
        let known = folded
            .as_str()
            .is_some_and(|candidate| rule.allowed.contains(&candidate));
        if !known {
            let shown = match &value {
                Value::Str(s) => s.clone(),
                other => other.to_json().to_string(),
            };
            message = Some(format!(
                "\"{shown}\" is not a valid {}, please use one of following: {}",
                rule.label.unwrap_or(field.name),
                rule.allowed.join(", "),
            ));
        }
    }

    (folded, message)
}
