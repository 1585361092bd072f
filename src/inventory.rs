//! Inventory entity model.
//!
//! The host automation tool hands us hosts and groups; this module is the
//! closed model of the two kinds plus the mapping to the inventory
//! subdirectory their vars files live under.

use crate::error::VarsError;

/// A host or group whose variables are being resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entity {
    /// An inventory host; vars files live under `host_vars/`.
    Host(String),
    /// An inventory group; vars files live under `group_vars/`.
    Group(String),
}

impl Entity {
    /// Parse an entity spec of the form `host:NAME` or `group:NAME`.
    ///
    /// A bare `NAME` without a kind tag is treated as a host. Any other
    /// kind tag fails with [`VarsError::InvalidEntityType`] naming the kind
    /// received.
    pub fn parse(spec: &str) -> Result<Self, VarsError> {
        match spec.split_once(':') {
            None => Ok(Entity::Host(spec.to_string())),
            Some(("host", name)) => Ok(Entity::Host(name.to_string())),
            Some(("group", name)) => Ok(Entity::Group(name.to_string())),
            Some((kind, _)) => Err(VarsError::InvalidEntityType {
                kind: kind.to_string(),
            }),
        }
    }

    /// The entity's inventory name.
    pub fn name(&self) -> &str {
        match self {
            Entity::Host(name) | Entity::Group(name) => name,
        }
    }

    /// The inventory subdirectory searched for this entity's vars files.
    pub fn subdir(&self) -> &'static str {
        match self {
            Entity::Host(_) => "host_vars",
            Entity::Group(_) => "group_vars",
        }
    }
}

/// Conversion accepted by [`crate::provider::VarsProvider::get_vars`]:
/// a single entity behaves exactly like a one-element sequence.
pub trait IntoEntities {
    fn into_entities(self) -> Vec<Entity>;
}

impl IntoEntities for Entity {
    fn into_entities(self) -> Vec<Entity> {
        vec![self]
    }
}

impl IntoEntities for Vec<Entity> {
    fn into_entities(self) -> Vec<Entity> {
        self
    }
}

impl IntoEntities for &[Entity] {
    fn into_entities(self) -> Vec<Entity> {
        self.to_vec()
    }
}

impl<const N: usize> IntoEntities for [Entity; N] {
    fn into_entities(self) -> Vec<Entity> {
        self.to_vec()
    }
}
