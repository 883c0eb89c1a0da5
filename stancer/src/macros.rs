//! Declaration helpers shared by every resource.

/// Declares a resource type: a cheap-clone handle over an [`Entity`] of the
/// given schema, dereferencing to it.
///
/// [`Entity`]: stancer_core::Entity
macro_rules! resource {
    ($(#[$meta:meta])* $name:ident => $schema:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(stancer_core::Entity);

        impl stancer_core::Resource for $name {
            fn schema() -> &'static stancer_core::Schema {
                &$schema
            }

            fn from_entity(entity: stancer_core::Entity) -> Self {
                Self(entity)
            }

            fn entity(&self) -> &stancer_core::Entity {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = stancer_core::Entity;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$name> for stancer_core::Value {
            fn from(resource: $name) -> Self {
                stancer_core::Value::Entity(resource.0)
            }
        }

        impl $name {
            /// Creates a new object attached to `client`. Nothing is sent
            /// until `send` is called.
            #[must_use]
            pub fn new(client: &stancer_core::Client) -> Self {
                <Self as stancer_core::Resource>::create(client)
            }

            /// Creates a new object without a client, meant to be nested in
            /// another one (it picks up the client of its parent).
            #[must_use]
            pub fn detached() -> Self {
                Self(stancer_core::Entity::new(&$schema))
            }
        }
    };
}

/// Typed getters. Each one reads through [`Entity::read`], so it may fetch
/// the object first.
///
/// [`Entity::read`]: stancer_core::Entity::read
macro_rules! getters {
    ($($(#[$meta:meta])* $name:ident: $kind:tt),* $(,)?) => {
        $(getters!(@one $(#[$meta])* $name: $kind);)*
    };

    (@one $(#[$meta:meta])* $name:ident: text) => {
        $(#[$meta])*
        pub fn $name(&self) -> stancer_core::Result<Option<String>> {
            Ok(self.read(stringify!($name))?.as_str().map(str::to_string))
        }
    };

    (@one $(#[$meta:meta])* $name:ident: int) => {
        $(#[$meta])*
        pub fn $name(&self) -> stancer_core::Result<Option<i64>> {
            Ok(self.read(stringify!($name))?.as_i64())
        }
    };

    (@one $(#[$meta:meta])* $name:ident: bool) => {
        $(#[$meta])*
        pub fn $name(&self) -> stancer_core::Result<Option<bool>> {
            Ok(self.read(stringify!($name))?.as_bool())
        }
    };

    (@one $(#[$meta:meta])* $name:ident: date) => {
        $(#[$meta])*
        pub fn $name(&self) -> stancer_core::Result<Option<chrono::DateTime<chrono::FixedOffset>>> {
            Ok(self.read(stringify!($name))?.as_datetime())
        }
    };

    (@one $(#[$meta:meta])* $name:ident: ($resource:ty)) => {
        $(#[$meta])*
        pub fn $name(&self) -> stancer_core::Result<Option<$resource>> {
            Ok(self
                .read(stringify!($name))?
                .as_entity()
                .cloned()
                .map(<$resource as stancer_core::Resource>::from_entity))
        }
    };
}

/// Typed setters, validated by the field rule.
macro_rules! setters {
    ($($(#[$meta:meta])* $set:ident($name:ident: $kind:tt)),* $(,)?) => {
        $(setters!(@one $(#[$meta])* $set($name: $kind));)*
    };

    (@one $(#[$meta:meta])* $set:ident($name:ident: text)) => {
        $(#[$meta])*
        pub fn $set(&self, value: impl Into<String>) -> stancer_core::Result<()> {
            self.set(stringify!($name), value.into())
        }
    };

    // Identifiers from your own system: strings or UUIDs.
    (@one $(#[$meta:meta])* $set:ident($name:ident: ident)) => {
        $(#[$meta])*
        pub fn $set(&self, value: impl Into<stancer_core::Value>) -> stancer_core::Result<()> {
            self.set(stringify!($name), value)
        }
    };

    (@one $(#[$meta:meta])* $set:ident($name:ident: int)) => {
        $(#[$meta])*
        pub fn $set(&self, value: i64) -> stancer_core::Result<()> {
            self.set(stringify!($name), value)
        }
    };

    (@one $(#[$meta:meta])* $set:ident($name:ident: bool)) => {
        $(#[$meta])*
        pub fn $set(&self, value: bool) -> stancer_core::Result<()> {
            self.set(stringify!($name), value)
        }
    };

    (@one $(#[$meta:meta])* $set:ident($name:ident: date)) => {
        $(#[$meta])*
        pub fn $set<Tz: chrono::TimeZone>(
            &self,
            value: chrono::DateTime<Tz>,
        ) -> stancer_core::Result<()> {
            self.set(stringify!($name), value.fixed_offset())
        }
    };

    (@one $(#[$meta:meta])* $set:ident($name:ident: ($resource:ty))) => {
        $(#[$meta])*
        pub fn $set(&self, value: &$resource) -> stancer_core::Result<()> {
            self.set(
                stringify!($name),
                stancer_core::Resource::entity(value).clone(),
            )
        }
    };
}
