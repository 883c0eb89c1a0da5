use crate::client::Client;
use crate::entity::Entity;
use crate::schema::Schema;

/// A typed view over an [`Entity`] of one schema.
pub trait Resource: Sized {
    fn schema() -> &'static Schema;

    /// Wraps an entity. The entity must use [`Self::schema`].
    fn from_entity(entity: Entity) -> Self;

    fn entity(&self) -> &Entity;

    /// A new object, attached to `client`.
    fn create(client: &Client) -> Self {
        Self::from_entity(Entity::new(Self::schema()).with_client(client))
    }

    /// A handle on an existing object. It is fetched on first use.
    fn retrieve(client: &Client, id: &str) -> Self {
        Self::from_entity(Entity::with_id(Self::schema(), id).with_client(client))
    }
}
