//! Entity synchronization engine for the Stancer API.
//!
//! - [`Entity`]: local mirror of a remote object, with lazy population,
//!   modification tracking, merging and wire projection
//! - [`Schema`] / [`Field`] / [`Rule`]: static, declarative resource
//!   descriptions interpreted by one generic validator
//! - [`Client`]: request pipeline (auth, body, error classification,
//!   rehydration) over an [`HttpClient`] seam
//! - [`List`]: paginated listing of [`Searchable`] resources
//!
//! Everything here is single-threaded: entities are `Rc` handles.

mod client;
mod entity;
mod error;
mod hydrate;
mod resource;
mod schema;
mod search;
mod transport;
mod value;

pub mod validate;

pub use client::Client;
pub use entity::Entity;
pub use error::{Error, Fault, HttpError, HttpErrorKind, Result, TypeKind, ValueKind};
pub use resource::Resource;
pub use schema::{BASE_FIELDS, Derived, Field, FieldKind, Rule, Schema, SchemaRef};
pub use search::{List, ListParams, Searchable, filter_error};
pub use transport::{HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient};
pub use value::Value;

pub use stancer_types::{Config, Mode};
