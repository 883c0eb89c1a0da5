//! Paginated listing.

use crate::client::Client;
use crate::entity::Entity;
use crate::error::{Error, Result, ValueKind};
use crate::resource::Resource;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value as Json;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Envelope keys that are not data.
const METADATA_KEYS: [&str; 2] = ["live_mode", "range"];

/// Filters of a listing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Only objects created at or after this epoch timestamp.
    pub created: Option<i64>,
    /// Page size, 1 to 100.
    pub limit: Option<i64>,
    /// Pagination cursor, starting at 0.
    pub start: Option<i64>,
    pub order_id: Option<String>,
    pub unique_id: Option<String>,
}

impl ListParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn created(mut self, timestamp: i64) -> Self {
        self.created = Some(timestamp);
        self
    }

    #[must_use]
    pub fn created_since<Tz: TimeZone>(self, date: &DateTime<Tz>) -> Self {
        self.created(date.timestamp())
    }

    #[must_use]
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Checks the common filters and appends them to `query`.
    ///
    /// Fails when a filter is out of range, or when no filter at all ends up
    /// in the query.
    pub fn apply(&self, mut query: Vec<(String, String)>) -> Result<Vec<(String, String)>> {
        if let Some(created) = self.created {
            if created < 0 {
                return Err(filter_error(
                    "Created must be a positive integer or a DateTime object.",
                ));
            }
            if created > Utc::now().timestamp() {
                return Err(filter_error("Created must be in the past."));
            }
            query.push(("created".to_string(), created.to_string()));
        }

        if let Some(limit) = self.limit {
            if !(1..=100).contains(&limit) {
                return Err(filter_error("Limit must be between 1 and 100."));
            }
            query.push(("limit".to_string(), limit.to_string()));
        }

        if let Some(start) = self.start {
            if start < 0 {
                return Err(filter_error("Start must be a positive integer."));
            }
            query.push(("start".to_string(), start.to_string()));
        }

        if query.is_empty() {
            return Err(filter_error("Invalid search filters."));
        }

        Ok(query)
    }
}

/// Builds a search filter error.
pub fn filter_error(message: impl Into<String>) -> Error {
    Error::value(ValueKind::SearchFilter, message)
}

/// Resources with a listing endpoint.
pub trait Searchable: Resource {
    /// Resource-specific filters, checked before the common ones.
    fn filter_params(params: &ListParams) -> Result<Vec<(String, String)>> {
        let _ = params;
        Ok(Vec::new())
    }

    /// Lists objects matching `params`, page by page.
    ///
    /// Filters are checked here; nothing is fetched until the first item is
    /// requested.
    fn list(client: &Client, params: &ListParams) -> Result<List<Self>> {
        let query = params.apply(Self::filter_params(params)?)?;
        Ok(List::new(client, query))
    }
}

/// Lazy iterator over a listing.
///
/// Yields `Err` once (then stops) when a page cannot be fetched or read. A
/// "not found" answer ends the listing quietly.
#[derive(Debug)]
pub struct List<T> {
    client: Client,
    target: Entity,
    query: Vec<(String, String)>,
    buffer: VecDeque<T>,
    done: bool,
}

impl<T: Resource> List<T> {
    fn new(client: &Client, query: Vec<(String, String)>) -> Self {
        Self {
            client: client.clone(),
            target: Entity::new(T::schema()).with_client(client),
            query,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// Query sent for the next page.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    fn fetch_page(&mut self) -> Result<()> {
        let body = match self.client.get_raw(&self.target, &self.query) {
            Ok(body) => body,
            Err(err) if err.is_not_found() => {
                debug!(resource = T::schema().name, "listing ended on not found");
                self.done = true;
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let envelope: Json = serde_json::from_str(&body)
            .map_err(|e| Error::InvalidResponse(format!("Invalid results: {e}")))?;
        let Json::Object(mut envelope) = envelope else {
            return Err(Error::InvalidResponse("Invalid results.".to_string()));
        };

        let keys: Vec<String> = envelope
            .keys()
            .filter(|key| !METADATA_KEYS.contains(&key.as_str()))
            .cloned()
            .collect();
        let [key] = keys.as_slice() else {
            warn!(resource = T::schema().name, ?keys, "unexpected listing envelope");
            return Err(Error::InvalidResponse("Results not found.".to_string()));
        };

        let range = envelope.get("range").cloned().unwrap_or(Json::Null);
        let has_more = range.get("has_more").and_then(Json::as_bool).unwrap_or(false);
        let start = range.get("start").and_then(Json::as_i64).unwrap_or(0);
        let limit = range.get("limit").and_then(Json::as_i64).unwrap_or(0);
        self.set_start(start + limit);
        self.done = !has_more;

        let Some(Json::Array(items)) = envelope.remove(key) else {
            return Err(Error::InvalidResponse(format!("\"{key}\" is not a list.")));
        };

        for item in items {
            let entity = Entity::new(T::schema()).with_client(&self.client);
            entity.set_bypass(true);
            let merged = entity.hydrate_json(item);
            entity.set_bypass(false);
            merged?;
            entity.clear_modified();
            self.buffer.push_back(T::from_entity(entity));
        }

        Ok(())
    }

    fn set_start(&mut self, start: i64) {
        let value = start.to_string();
        match self.query.iter_mut().find(|(name, _)| name == "start") {
            Some(entry) => entry.1 = value,
            None => self.query.push(("start".to_string(), value)),
        }
    }
}

impl<T: Resource> Iterator for List<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            if let Err(err) = self.fetch_page() {
                self.done = true;
                return Some(Err(err));
            }
        }
    }
}
