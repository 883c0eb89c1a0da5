//! Merging partial data into entities.
//!
//! Used both for local bulk updates and for responses from the API. Reads
//! here are raw: merging never triggers a fetch.

use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::schema::{Field, FieldKind, Rule, Schema};
use crate::validate;
use crate::value::Value;
use serde_json::Value as Json;
use std::collections::{BTreeMap, HashMap};

impl Entity {
    /// Merges `params` into the entity.
    ///
    /// Blank values (null, zero, empty string, list or map) are skipped;
    /// `false` is not. For each remaining pair:
    /// - lists of entities are reconciled by identifier
    /// - a nested entity already in place absorbs the incoming object (or
    ///   identifier) without being replaced
    /// - an empty nested entity field is filled with the incoming entity, or
    ///   with one built from the incoming object or identifier
    /// - integers on date fields are read as epoch seconds
    /// - `id` sets the identifier
    /// - everything else goes through the field rule, if any, and is flagged
    ///   as modified
    ///
    /// Rule failures are returned, unless the entity is in bypass mode.
    pub fn hydrate<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> Result<()>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (name, value) in params {
            self.hydrate_field(name.as_ref(), value.into())?;
        }
        Ok(())
    }

    /// Merges a JSON object into the entity.
    pub fn hydrate_json(&self, json: Json) -> Result<()> {
        match Value::from(json) {
            Value::Map(map) => self.hydrate(map),
            other => Err(Error::InvalidResponse(format!(
                "expected an object for {}, got {}",
                self.schema().name,
                other.type_name()
            ))),
        }
    }

    fn hydrate_field(&self, name: &str, value: Value) -> Result<()> {
        if value.is_blank() {
            return Ok(());
        }

        if name == "id" {
            let id = match value {
                Value::Str(id) => id,
                other => other.to_json().to_string(),
            };
            self.set_id(Some(id));
            return Ok(());
        }

        let field = self.schema().field(name);
        let mut modify = true;
        let mut value = value;

        if let Some(field) = field {
            match field.kind {
                FieldKind::List(nested) => {
                    if let Value::List(items) = value {
                        value = Value::List(self.reconcile(name, items, nested())?);
                        modify = false;
                    }
                }
                FieldKind::Entity(nested) => {
                    let incoming_is_raw = !matches!(value, Value::Entity(_) | Value::Map(_));
                    if !(incoming_is_raw && field.coerces()) {
                        value = match (self.get(name), value) {
                            (Value::Entity(target), incoming)
                                if !matches!(incoming, Value::Entity(_)) =>
                            {
                                merge_into(&target, incoming)?;
                                modify = false;
                                Value::Entity(target)
                            }
                            (Value::Null, Value::Entity(incoming)) => {
                                modify = false;
                                Value::Entity(incoming)
                            }
                            (Value::Null, incoming) => {
                                modify = false;
                                Value::Entity(self.build_child(nested(), incoming)?)
                            }
                            (_, incoming) => incoming,
                        };
                    }
                }
                FieldKind::DateTime => {
                    if let Value::Int(seconds) = value {
                        value = Value::timestamp(seconds, self.timezone())
                            .unwrap_or(Value::Int(seconds));
                    }
                }
                _ => {}
            }
        }

        self.write(name, field, value, modify)
    }

    /// Keyed merge of `incoming` into the entity list held by `name`.
    ///
    /// Existing members keep their position and identity and absorb the
    /// matching incoming item; unmatched items are appended in input order.
    /// Items without an identifier never match.
    fn reconcile(
        &self,
        name: &str,
        incoming: Vec<Value>,
        schema: &'static Schema,
    ) -> Result<Vec<Value>> {
        let mut members: Vec<Entity> = self
            .get(name)
            .as_list()
            .map(|items| items.iter().filter_map(Value::as_entity).cloned().collect())
            .unwrap_or_default();

        let mut index: HashMap<String, usize> = members
            .iter()
            .enumerate()
            .filter_map(|(position, member)| member.id().map(|id| (id, position)))
            .collect();

        for item in incoming {
            let id = match &item {
                Value::Str(id) => Some(id.clone()),
                Value::Entity(entity) => entity.id(),
                Value::Map(map) => map.get("id").and_then(Value::as_str).map(str::to_string),
                _ => None,
            };

            let matched = id.as_ref().and_then(|id| index.get(id).copied());
            match matched {
                Some(position) => {
                    let payload = match item {
                        Value::Entity(entity) => snapshot(&entity),
                        Value::Map(map) => map,
                        _ => BTreeMap::new(),
                    };
                    members[position].hydrate(payload)?;
                }
                None => {
                    let member = match item {
                        Value::Entity(entity) => entity,
                        other => self.build_child(schema, other)?,
                    };
                    if let Some(id) = id {
                        index.insert(id, members.len());
                    }
                    if !members.iter().any(|existing| existing.ptr_eq(&member)) {
                        members.push(member);
                    }
                }
            }
        }

        Ok(members.into_iter().map(Value::Entity).collect())
    }

    /// Turns a value handed to [`set`](Self::set) into its stored form.
    ///
    /// Objects and identifiers given for entity fields become entities.
    /// Fields without a rule still get their type checked.
    pub(crate) fn construct(&self, field: &'static Field, value: Value) -> Result<Value> {
        let value = match (field.kind, value) {
            (FieldKind::Entity(nested), value @ (Value::Map(_) | Value::Str(_))) => {
                Value::Entity(self.build_child(nested(), value)?)
            }
            (FieldKind::List(nested), Value::List(items)) => Value::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Map(_) | Value::Str(_) => {
                            self.build_child(nested(), item).map(Value::Entity)
                        }
                        other => Ok(other),
                    })
                    .collect::<Result<_>>()?,
            ),
            (_, value) => value,
        };

        if field.rule.is_some() || value.is_null() {
            return Ok(value);
        }

        let checked = validate::apply(field, &Rule::new(), value, self.timezone())?;
        Ok(checked.unwrap_or_default())
    }

    /// Builds a nested entity from a plain object or a bare identifier.
    ///
    /// The child shares the client and bypass state of its parent.
    fn build_child(&self, schema: &'static Schema, value: Value) -> Result<Entity> {
        let (child, payload) = match value {
            Value::Entity(entity) => return Ok(entity),
            Value::Map(map) => (Entity::new(schema), Some(map)),
            Value::Str(id) => (Entity::with_id(schema, id), None),
            other => (Entity::with_id(schema, other.to_json().to_string()), None),
        };

        if let Some(client) = self.client() {
            child.attach(&client);
        }
        child.set_bypass(self.is_bypassed());

        if let Some(payload) = payload {
            child.hydrate(payload)?;
            if child.has_id() {
                child.set_populated(false);
            }
        }

        Ok(child)
    }
}

/// Merges an object (or a bare identifier) into an existing entity without
/// letting it fetch itself meanwhile.
fn merge_into(target: &Entity, incoming: Value) -> Result<()> {
    let payload = match incoming {
        Value::Map(map) => map,
        other => BTreeMap::from([("id".to_string(), other)]),
    };

    let populated = target.is_populated();
    target.set_populated(true);
    let merged = target.hydrate(payload);
    target.set_populated(populated);
    merged
}

/// Identifier and attributes of an entity, as a merge payload.
fn snapshot(entity: &Entity) -> BTreeMap<String, Value> {
    let inner = entity.0.borrow();
    let mut payload = inner.attrs.clone();
    if let Some(id) = &inner.id {
        payload.insert("id".to_string(), Value::Str(id.clone()));
    }
    payload
}
