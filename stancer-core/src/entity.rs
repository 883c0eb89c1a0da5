//! Entity core.
//!
//! An [`Entity`] mirrors one remote resource. It holds:
//! - an optional identifier, assigned by the server
//! - an attribute map, keyed by field name
//! - the set of fields modified locally since the last send or fetch
//! - a `populated` flag, set once remote state has been fetched (or is known
//!   not to exist)
//! - a `bypass` flag, set while server data is merged, under which field
//!   validation failures are ignored
//!
//! Entities are handles: cloning one gives another handle to the same
//! object. Nested entities are owned by the attribute map of their parent;
//! the two flags cascade through that ownership tree.
//!
//! Merging (`hydrate`) lives in `hydrate.rs`.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::schema::{Field, Schema};
use crate::validate;
use crate::value::Value;
use chrono::{FixedOffset, Offset, Utc};
use serde_json::Value as Json;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

pub(crate) struct Inner {
    pub(crate) schema: &'static Schema,
    pub(crate) id: Option<String>,
    pub(crate) attrs: BTreeMap<String, Value>,
    pub(crate) modified: BTreeSet<String>,
    pub(crate) populated: bool,
    pub(crate) bypass: bool,
    pub(crate) client: Option<Client>,
}

/// Handle to a local mirror of an API object.
#[derive(Clone)]
pub struct Entity(pub(crate) Rc<RefCell<Inner>>);

impl Entity {
    /// Creates a new object, unknown to the API.
    ///
    /// Schema defaults are written and flagged as modified. A new object has
    /// nothing to fetch, so it starts populated.
    #[must_use]
    pub fn new(schema: &'static Schema) -> Self {
        let mut inner = Inner {
            schema,
            id: None,
            attrs: BTreeMap::new(),
            modified: BTreeSet::new(),
            populated: true,
            bypass: false,
            client: None,
        };

        for (name, value) in (schema.defaults)() {
            inner.attrs.insert(name.to_string(), value);
            inner.modified.insert(name.to_string());
        }

        Self(Rc::new(RefCell::new(inner)))
    }

    /// Creates a handle on an existing object. Nothing is fetched until a
    /// lazy field is read or [`populate`](Self::populate) is called.
    #[must_use]
    pub fn with_id(schema: &'static Schema, id: impl Into<String>) -> Self {
        let entity = Self::new(schema);
        {
            let mut inner = entity.0.borrow_mut();
            inner.id = Some(id.into());
            inner.populated = false;
        }
        entity
    }

    /// Creates an object and hydrates it with `params`.
    pub fn with_params<K, V>(
        schema: &'static Schema,
        id: Option<&str>,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let entity = match id {
            Some(id) => Self::with_id(schema, id),
            None => Self::new(schema),
        };
        entity.hydrate(params)?;
        Ok(entity)
    }

    /// Attaches `client` to this entity and to every nested entity without
    /// one.
    #[must_use]
    pub fn with_client(self, client: &Client) -> Self {
        self.attach(client);
        self
    }

    pub fn attach(&self, client: &Client) {
        self.0.borrow_mut().client = Some(client.clone());
        for child in self.children() {
            if child.client().is_none() {
                child.attach(client);
            }
        }
    }

    // ── State ────────────────────────────────────────────────────

    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.0.borrow().id.clone()
    }

    #[must_use]
    pub fn has_id(&self) -> bool {
        self.0.borrow().id.is_some()
    }

    pub(crate) fn set_id(&self, id: Option<String>) {
        self.0.borrow_mut().id = id;
    }

    pub(crate) fn clear_id(&self) {
        self.set_id(None);
    }

    #[must_use]
    pub fn schema(&self) -> &'static Schema {
        self.0.borrow().schema
    }

    #[must_use]
    pub fn client(&self) -> Option<Client> {
        self.0.borrow().client.clone()
    }

    pub(crate) fn require_client(&self) -> Result<Client> {
        self.client().ok_or(Error::Detached)
    }

    /// Timezone applied to epoch timestamps: the client's, UTC when detached.
    #[must_use]
    pub fn timezone(&self) -> FixedOffset {
        self.0
            .borrow()
            .client
            .as_ref()
            .map_or_else(|| Utc.fix(), |client| client.config().timezone())
    }

    /// Returns true if both handles point to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Entity) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.0.borrow().populated
    }

    #[must_use]
    pub fn is_bypassed(&self) -> bool {
        self.0.borrow().bypass
    }

    /// Sets `populated` on this entity and every entity it owns.
    pub fn set_populated(&self, populated: bool) {
        self.0.borrow_mut().populated = populated;
        for child in self.children() {
            child.set_populated(populated);
        }
    }

    /// Sets `bypass` on this entity and every entity it owns.
    pub fn set_bypass(&self, bypass: bool) {
        self.0.borrow_mut().bypass = bypass;
        for child in self.children() {
            child.set_bypass(bypass);
        }
    }

    /// Entities held directly by an attribute, list members included.
    pub(crate) fn children(&self) -> Vec<Entity> {
        self.0
            .borrow()
            .attrs
            .values()
            .flat_map(Value::entities)
            .cloned()
            .collect()
    }

    // ── Modification tracking ─────────────────────────────────────

    /// Fields modified locally, in name order.
    #[must_use]
    pub fn modified_fields(&self) -> Vec<String> {
        self.0.borrow().modified.iter().cloned().collect()
    }

    pub fn mark_modified(&self, name: &str) {
        self.0.borrow_mut().modified.insert(name.to_string());
    }

    /// Forgets local modifications here and in every owned entity.
    pub fn clear_modified(&self) {
        self.0.borrow_mut().modified.clear();
        for child in self.children() {
            child.clear_modified();
        }
    }

    /// True if a field was modified locally, or if an entity held by a wire
    /// field was.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        let inner = self.0.borrow();
        if !inner.modified.is_empty() {
            return true;
        }

        inner
            .attrs
            .iter()
            .filter(|(name, _)| inner.schema.is_wire(name))
            .any(|(_, value)| value.entities().any(Entity::is_modified))
    }

    // ── Attributes ────────────────────────────────────────────────

    /// Raw attribute value, without fetching anything.
    #[must_use]
    pub fn get(&self, name: &str) -> Value {
        self.0.borrow().attrs.get(name).cloned().unwrap_or_default()
    }

    /// Attribute value, fetching the entity first when a lazy field holds a
    /// falsy value. At most one fetch happens per entity.
    pub fn read(&self, name: &str) -> Result<Value> {
        let value = self.get(name);
        let lazy = self.schema().field(name).is_none_or(|field| field.lazy);

        if lazy && value.is_falsy() && !self.is_populated() {
            self.populate()?;
            return Ok(self.get(name));
        }

        Ok(value)
    }

    /// Writes one field through its rule.
    ///
    /// Unlike [`hydrate`](Self::hydrate), blank values are written (`Null`
    /// clears the field) and nothing is merged into an existing nested
    /// entity.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();

        if name == "id" {
            self.set_id(value.as_str().map(str::to_string));
            return Ok(());
        }

        let field = self.schema().field(name);
        let value = match field {
            Some(field) if !field.coerces() => self.construct(field, value)?,
            _ => value,
        };

        self.write(name, field, value, true)
    }

    /// Stores a value, running the field rule when there is one.
    ///
    /// `modify` tells whether a write that bypasses the rule flags the field.
    pub(crate) fn write(
        &self,
        name: &str,
        field: Option<&'static Field>,
        value: Value,
        modify: bool,
    ) -> Result<()> {
        if let Some(field) = field {
            if let Some(rule) = field.rule {
                match validate::apply(field, &rule, value.clone(), self.timezone()) {
                    Ok(Some(accepted)) => {
                        let mut derived = Vec::new();
                        if let Some(derive) = rule.derive {
                            derive(&accepted, &mut derived);
                        }

                        self.adopt(&accepted);
                        let mut inner = self.0.borrow_mut();
                        store(&mut inner.attrs, name, accepted);
                        for (derived_name, derived_value) in derived {
                            store(&mut inner.attrs, derived_name, derived_value);
                        }
                        if !rule.silent {
                            inner.modified.insert(name.to_string());
                        }
                        return Ok(());
                    }
                    Ok(None) => return Ok(()),
                    Err(err) if err.is_validation() && self.is_bypassed() => {
                        debug!(
                            resource = self.schema().name,
                            field = name,
                            error = %err,
                            "keeping unchecked server value"
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        self.adopt(&value);
        let mut inner = self.0.borrow_mut();
        store(&mut inner.attrs, name, value);
        if modify {
            inner.modified.insert(name.to_string());
        }
        Ok(())
    }

    /// Gives entities about to be owned the client and bypass state of their
    /// new parent, when they have no client of their own.
    fn adopt(&self, value: &Value) {
        let (client, bypass) = {
            let inner = self.0.borrow();
            (inner.client.clone(), inner.bypass)
        };

        for entity in value.entities() {
            if entity.ptr_eq(self) {
                continue;
            }
            if let (Some(client), None) = (&client, entity.client()) {
                entity.attach(client);
            }
            if bypass {
                entity.set_bypass(true);
            }
        }
    }

    // ── Wire representation ───────────────────────────────────────

    /// JSON projection sent to the API.
    ///
    /// An unmodified entity with an identifier is represented by its
    /// identifier. Otherwise, every wire field that was modified (or holds a
    /// modified entity) is included, and a new entity also carries every
    /// entity list it holds. Nested projections that are empty are left out.
    #[must_use]
    pub fn to_json_repr(&self) -> Json {
        if let Some(id) = self.id() {
            if !self.is_modified() {
                return Json::String(id);
            }
        }

        let inner = self.0.borrow();
        let mut map = serde_json::Map::new();

        for (name, value) in &inner.attrs {
            let Some(field) = inner.schema.field(name) else {
                continue;
            };
            if !field.wire || value.is_null() {
                continue;
            }

            let nested_modified = value.entities().any(Entity::is_modified);
            let new_members = inner.id.is_none() && value.entities().next().is_some();
            if !inner.modified.contains(name) && !nested_modified && !new_members {
                continue;
            }

            let json = match value {
                Value::Entity(entity) if field.by_reference => match entity.id() {
                    Some(id) => Json::String(id),
                    None => continue,
                },
                Value::Entity(entity) => {
                    let json = entity.to_json_repr();
                    if is_empty(&json) {
                        continue;
                    }
                    json
                }
                Value::List(items) if items.iter().any(|item| item.as_entity().is_some()) => {
                    let members: Vec<Json> = items
                        .iter()
                        .map(|item| match item {
                            Value::Entity(entity) => entity.to_json_repr(),
                            other => other.to_json(),
                        })
                        .filter(|json| !is_empty(json))
                        .collect();
                    if members.is_empty() {
                        continue;
                    }
                    Json::Array(members)
                }
                other => other.to_json(),
            };

            map.insert(name.clone(), json);
        }

        Json::Object(map)
    }

    /// Compact JSON body for create and update calls.
    #[must_use]
    pub fn to_json(&self) -> String {
        self.to_json_repr().to_string()
    }

    // ── Remote operations ─────────────────────────────────────────

    /// Location of this entity on the API.
    pub fn uri(&self) -> Result<String> {
        Ok(self.require_client()?.uri(self))
    }

    /// Fetches the entity unless there is nothing to fetch (no identifier, no
    /// endpoint) or it was already fetched.
    ///
    /// Fetched data becomes the unmodified baseline. The entity and its
    /// children are populated afterwards.
    pub fn populate(&self) -> Result<()> {
        let needed = {
            let inner = self.0.borrow();
            inner.id.is_some() && inner.schema.endpoint.is_some() && !inner.populated
        };

        if needed {
            let client = self.require_client()?;
            debug!(resource = self.schema().name, id = ?self.id(), "populating");

            self.set_populated(true);
            if let Err(err) = client.get(self) {
                self.set_populated(false);
                return Err(err);
            }
            self.clear_modified();
        }

        self.set_populated(true);
        Ok(())
    }

    /// Creates (no identifier) or updates the entity when it has local
    /// modifications. Modifications are forgotten afterwards.
    pub fn send(&self) -> Result<()> {
        if self.is_modified() {
            let client = self.require_client()?;
            if self.has_id() {
                client.patch(self)?;
            } else {
                client.post(self)?;
            }
        }

        self.clear_modified();
        Ok(())
    }

    /// Deletes the entity remotely.
    ///
    /// The identifier is cleared and flagged as modified, so the object can
    /// be created again with [`send`](Self::send).
    pub fn delete(&self) -> Result<()> {
        self.require_client()?.delete(self)?;
        self.mark_modified("id");
        Ok(())
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(inner) = self.0.try_borrow() else {
            return f.write_str("Entity(<borrowed>)");
        };
        let attrs: BTreeMap<&str, &Value> = inner
            .attrs
            .iter()
            .filter(|(name, _)| !inner.schema.field(name).is_some_and(|field| field.hidden))
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        f.debug_struct(inner.schema.name)
            .field("id", &inner.id)
            .field("attrs", &attrs)
            .field("modified", &inner.modified)
            .field("populated", &inner.populated)
            .finish()
    }
}

fn store(attrs: &mut BTreeMap<String, Value>, name: &str, value: Value) {
    if value.is_null() {
        attrs.remove(name);
    } else {
        attrs.insert(name.to_string(), value);
    }
}

fn is_empty(json: &Json) -> bool {
    match json {
        Json::Null => true,
        Json::String(s) => s.is_empty(),
        Json::Object(map) => map.is_empty(),
        _ => false,
    }
}
