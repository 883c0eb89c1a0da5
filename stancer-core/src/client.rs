//! Request pipeline shared by every entity.

use crate::entity::Entity;
use crate::error::{Error, HttpError, Result, ValueKind};
use crate::transport::{HttpClient, HttpRequest, Method, ReqwestClient};
use stancer_types::Config;
use std::rc::Rc;
use tracing::debug;

/// API client: a configuration plus the transport used to reach the API.
///
/// Cheap to clone. Entities keep a clone to fetch and send themselves.
#[derive(Debug, Clone)]
pub struct Client {
    config: Rc<Config>,
    http: Rc<dyn HttpClient>,
}

impl Client {
    /// Creates a client talking to the API with reqwest.
    pub fn new(config: Config) -> Result<Self> {
        let http = ReqwestClient::new(config.timeout())?;
        Ok(Self::with_http(config, http))
    }

    /// Creates a client using a custom transport.
    pub fn with_http(config: Config, http: impl HttpClient + 'static) -> Self {
        Self {
            config: Rc::new(config),
            http: Rc::new(http),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Location of `entity`: API root, endpoint, then identifier when known.
    #[must_use]
    pub fn uri(&self, entity: &Entity) -> String {
        let mut location = self.config.base_url();

        if let Some(endpoint) = entity.schema().endpoint {
            location.push('/');
            location.push_str(endpoint);
        }

        if let Some(id) = entity.id() {
            location.push('/');
            location.push_str(&id);
        }

        location
    }

    /// Fetches `entity` and merges the response into it.
    pub fn get(&self, entity: &Entity) -> Result<()> {
        self.request(Method::Get, entity)
    }

    /// Fetches `entity`'s location with `query` and returns the body
    /// untouched.
    pub fn get_raw(&self, entity: &Entity, query: &[(String, String)]) -> Result<String> {
        self.exchange(Method::Get, entity, query)
    }

    /// Creates `entity` remotely.
    pub fn post(&self, entity: &Entity) -> Result<()> {
        self.request(Method::Post, entity)
    }

    /// Sends the modified fields of `entity`.
    pub fn patch(&self, entity: &Entity) -> Result<()> {
        self.request(Method::Patch, entity)
    }

    /// Deletes `entity` remotely. Its identifier is cleared on success.
    pub fn delete(&self, entity: &Entity) -> Result<()> {
        self.request(Method::Delete, entity)
    }

    /// Runs one exchange, then merges the response into `entity`.
    fn request(&self, method: Method, entity: &Entity) -> Result<()> {
        let body = self.exchange(method, entity, &[])?;

        if method == Method::Delete {
            entity.clear_id();
        }

        if !body.is_empty() {
            let json = serde_json::from_str(&body).map_err(|e| {
                Error::InvalidResponse(format!("{method} {}: {e}", entity.schema().name))
            })?;

            entity.set_bypass(true);
            let merged = entity.hydrate_json(json);
            entity.set_bypass(false);
            merged?;
        }

        Ok(())
    }

    /// Runs one exchange and returns the body of a successful response.
    fn exchange(
        &self,
        method: Method,
        entity: &Entity,
        query: &[(String, String)],
    ) -> Result<String> {
        let username = self
            .config
            .secret_key()
            .ok_or_else(|| Error::value(ValueKind::MissingApiKey, "No API key found."))?
            .to_string();

        let body = if method.has_body() {
            Some(entity.to_json())
        } else {
            None
        };

        let url = self.uri(entity);
        debug!(%method, %url, "sending request");

        let response = self.http.send(HttpRequest {
            method,
            url,
            username,
            query: query.to_vec(),
            body,
        })?;

        if !response.is_success() {
            let err = HttpError::from_response(
                response.status,
                response.reason.as_deref(),
                &response.body,
            );
            debug!(status = response.status, message = %err.message, "request failed");
            return Err(err.into());
        }

        Ok(response.body)
    }
}
