//! Static description of a resource type.
//!
//! Every resource declares one `static` [`Schema`]: its endpoint and the list
//! of its [`Field`]s. Field kinds are resolved here, once, so that hydration
//! dispatches on a tag instead of inspecting values.

use crate::error::{Fault, Result};
use crate::value::Value;

/// Lazily resolved schema reference, allowing schemas to point at each other.
pub type SchemaRef = fn() -> &'static Schema;

/// Derived attributes written alongside a validated value (e.g. `last4`).
pub type Derived = Vec<(&'static str, Value)>;

/// Storage kind of a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Bool,
    /// Date/time; integers are read as epoch seconds.
    DateTime,
    /// Anything, stored as given.
    Any,
    /// One owned entity. Plain objects and bare identifiers are turned into
    /// an entity of the referenced schema.
    Entity(SchemaRef),
    /// Ordered list of owned entities, reconciled by identifier.
    List(SchemaRef),
}

impl FieldKind {
    /// Schema of the nested entities, for entity and list kinds.
    #[must_use]
    pub fn nested(self) -> Option<&'static Schema> {
        match self {
            FieldKind::Entity(schema) | FieldKind::List(schema) => Some(schema()),
            _ => None,
        }
    }

    /// Kinds subject to length, bound and allow-list checks.
    #[must_use]
    pub fn is_standard(self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Integer | FieldKind::Bool)
    }

    /// How the expected type is named in messages ("a string").
    #[must_use]
    pub fn type_name(self) -> String {
        match self {
            FieldKind::Text => "a string".to_string(),
            FieldKind::Integer => "an integer".to_string(),
            FieldKind::Bool => "a boolean".to_string(),
            FieldKind::Float => "a float".to_string(),
            FieldKind::DateTime => "a datetime".to_string(),
            FieldKind::Any => "a value".to_string(),
            FieldKind::Entity(schema) => format!("a {}", schema().name),
            FieldKind::List(schema) => format!("a list of {}", schema().name),
        }
    }

    /// Returns true if `value` is acceptable as is.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (FieldKind::Any, _) => true,
            (FieldKind::Text, Value::Str(_))
            | (FieldKind::Integer, Value::Int(_))
            | (FieldKind::Bool, Value::Bool(_))
            | (FieldKind::Float, Value::Float(_) | Value::Int(_))
            | (FieldKind::DateTime, Value::DateTime(_)) => true,
            (FieldKind::Entity(schema), Value::Entity(entity)) => {
                std::ptr::eq(entity.schema(), schema())
            }
            (FieldKind::List(schema), Value::List(items)) => items.iter().all(|item| {
                item.as_entity()
                    .is_some_and(|entity| std::ptr::eq(entity.schema(), schema()))
            }),
            _ => false,
        }
    }
}

/// Validated-property descriptor.
///
/// Interpreted by [`validate::apply`](crate::validate::apply) on every write
/// of the field it is attached to.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Name used at the start of messages. Defaults to the capitalized field
    /// name.
    pub label: Option<&'static str>,
    /// Error raised on failure. Defaults to a generic type or value error.
    pub throws: Option<Fault>,
    /// Lower bound: characters for strings, value for integers.
    pub min: Option<i64>,
    /// Upper bound: characters for strings, value for integers.
    pub max: Option<i64>,
    /// Exact character count.
    pub length: Option<usize>,
    pub allowed: &'static [&'static str],
    /// Lower-case the value before the allow-list check (and store it so).
    pub lowercase: bool,
    /// Custom predicate, returning a message on failure. Runs last.
    pub check: Option<fn(&Value) -> Option<String>>,
    /// Applied first. Returning `None` aborts the write without error.
    pub coerce: Option<fn(Value) -> Result<Option<Value>>>,
    /// Computes attributes stored next to the accepted value.
    pub derive: Option<fn(&Value, &mut Derived)>,
    /// Do not flag the field as modified.
    pub silent: bool,
    /// `null` skips every check.
    pub optional: bool,
}

impl Rule {
    pub const fn new() -> Self {
        Self {
            label: None,
            throws: None,
            min: None,
            max: None,
            length: None,
            allowed: &[],
            lowercase: false,
            check: None,
            coerce: None,
            derive: None,
            silent: false,
            optional: false,
        }
    }

    pub const fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub const fn throws(mut self, fault: Fault) -> Self {
        self.throws = Some(fault);
        self
    }

    pub const fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub const fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub const fn between(self, min: i64, max: i64) -> Self {
        self.min(min).max(max)
    }

    pub const fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub const fn allowed(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    pub const fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    pub const fn check(mut self, check: fn(&Value) -> Option<String>) -> Self {
        self.check = Some(check);
        self
    }

    pub const fn coerce(mut self, coerce: fn(Value) -> Result<Option<Value>>) -> Self {
        self.coerce = Some(coerce);
        self
    }

    pub const fn derive(mut self, derive: fn(&Value, &mut Derived)) -> Self {
        self.derive = Some(derive);
        self
    }

    pub const fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::new()
    }
}

/// One attribute of a resource.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Part of the wire contract: serialized, and counted for nested dirtiness.
    pub wire: bool,
    /// Reading a falsy value triggers a fetch of the entity.
    pub lazy: bool,
    /// A nested entity is sent as its identifier only.
    pub by_reference: bool,
    /// Left out of `Debug` output (card numbers, IBANs).
    pub hidden: bool,
    pub rule: Option<Rule>,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            wire: true,
            lazy: true,
            by_reference: false,
            hidden: false,
            rule: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub const fn float(name: &'static str) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub const fn datetime(name: &'static str) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    pub const fn any(name: &'static str) -> Self {
        Self::new(name, FieldKind::Any)
    }

    pub const fn entity(name: &'static str, schema: SchemaRef) -> Self {
        Self::new(name, FieldKind::Entity(schema))
    }

    pub const fn list(name: &'static str, schema: SchemaRef) -> Self {
        Self::new(name, FieldKind::List(schema))
    }

    /// Filled by the server only; never sent.
    pub const fn read_only(mut self) -> Self {
        self.wire = false;
        self
    }

    /// Reads never trigger a fetch.
    pub const fn eager(mut self) -> Self {
        self.lazy = false;
        self
    }

    pub const fn by_reference(mut self) -> Self {
        self.by_reference = true;
        self
    }

    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub const fn rule(mut self, rule: Rule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Returns true if the rule converts raw values itself.
    #[must_use]
    pub fn coerces(&self) -> bool {
        self.rule.is_some_and(|rule| rule.coerce.is_some())
    }

    /// Name used in messages when the rule has no label.
    #[must_use]
    pub fn label(&self) -> String {
        if let Some(label) = self.rule.and_then(|rule| rule.label) {
            return label.to_string();
        }

        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Fields every resource carries.
pub static BASE_FIELDS: [Field; 2] = [
    Field::datetime("created").read_only(),
    Field::boolean("live_mode").read_only(),
];

/// Description of a resource type.
#[derive(Debug)]
pub struct Schema {
    /// Type name, used in messages ("Card").
    pub name: &'static str,
    /// Path segment under the API root. `None` for objects that only exist
    /// nested in others.
    pub endpoint: Option<&'static str>,
    pub fields: &'static [Field],
    /// Values written into every new instance (and flagged as modified).
    pub defaults: fn() -> Vec<(&'static str, Value)>,
}

fn no_defaults() -> Vec<(&'static str, Value)> {
    Vec::new()
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Self {
            name,
            endpoint: None,
            fields,
            defaults: no_defaults,
        }
    }

    pub const fn endpoint(mut self, endpoint: &'static str) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub const fn defaults(mut self, defaults: fn() -> Vec<(&'static str, Value)>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Looks a field up, base fields included.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields
            .iter()
            .chain(BASE_FIELDS.iter())
            .find(|field| field.name == name)
    }

    /// Declared fields followed by the base fields.
    pub fn all_fields(&self) -> impl Iterator<Item = &'static Field> {
        self.fields.iter().chain(BASE_FIELDS.iter())
    }

    /// Returns true if `name` is part of the wire contract.
    #[must_use]
    pub fn is_wire(&self, name: &str) -> bool {
        self.field(name).is_some_and(|field| field.wire)
    }

    /// Returns true if the field holds a date.
    #[must_use]
    pub fn is_datetime(&self, name: &str) -> bool {
        self.field(name)
            .is_some_and(|field| matches!(field.kind, FieldKind::DateTime))
    }
}
