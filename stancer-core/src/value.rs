//! Attribute values.
//!
//! One enum serves both directions: values stored on an entity, and values
//! handed to `hydrate` (which may additionally be plain maps or `Null`).

use crate::entity::Entity;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde_json::Value as Json;
use stancer_types::{AuthStatus, PaymentStatus, RefundStatus};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    DateTime(DateTime<FixedOffset>),
    Entity(Entity),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Values skipped by `hydrate`: null, zero, and empty strings, lists and
    /// maps. `false` is never blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Str(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::Bool(_) | Value::DateTime(_) | Value::Entity(_) => false,
        }
    }

    /// Values that make a lazy getter fetch the entity: blank values and `false`.
    #[must_use]
    pub fn is_falsy(&self) -> bool {
        matches!(self, Value::Bool(false)) || self.is_blank()
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Entities held by this value: itself, or the entity members of a list.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        let (single, list) = match self {
            Value::Entity(entity) => (Some(entity), None),
            Value::List(items) => (None, Some(items.iter().filter_map(Value::as_entity))),
            _ => (None, None),
        };
        single.into_iter().chain(list.into_iter().flatten())
    }

    /// Short name of the variant, used in messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Int(_) => "an integer",
            Value::Float(_) => "a float",
            Value::Str(_) => "a string",
            Value::DateTime(_) => "a date",
            Value::Entity(_) => "an entity",
            Value::List(_) => "a list",
            Value::Map(_) => "an object",
        }
    }

    /// Converts an epoch timestamp into a date in `timezone`.
    #[must_use]
    pub fn timestamp(seconds: i64, timezone: FixedOffset) -> Option<Value> {
        timezone
            .timestamp_opt(seconds, 0)
            .single()
            .map(Value::DateTime)
    }

    /// Wire form of the value.
    ///
    /// Dates become epoch seconds and entities their wire representation.
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::Str(s) => Json::String(s.clone()),
            Value::DateTime(dt) => Json::from(dt.timestamp()),
            Value::Entity(entity) => entity.to_json_repr(),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! int_value {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Value::Int(i64::from(i))
                }
            }
        )+
    };
}

int_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Uuid> for Value {
    fn from(uuid: Uuid) -> Self {
        Value::Str(uuid.to_string())
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt.fixed_offset())
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Value::Entity(entity)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

macro_rules! status_value {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(status: $ty) -> Self {
                    Value::Str(status.as_str().to_string())
                }
            }
        )+
    };
}

status_value!(PaymentStatus, RefundStatus, AuthStatus);
