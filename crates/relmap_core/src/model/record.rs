//! Persistence record wrapper and entity state.
//!
//! # Responsibility
//! - Pair an entity with its persistence identity and delete intent.
//! - Keep identity mutation inside the crate so callers cannot forge it.
//!
//! # Invariants
//! - `is_exist()` is true exactly when a non-empty identity is recorded.
//! - Delete intent never performs I/O; only `Mapper::persist` acts on it.

use crate::metadata::EntityType;
use crate::model::entity::{AnyRecord, Entity};
use crate::model::fields::{FieldError, FieldRef, Fields};
use crate::model::value::Value;
use serde::{Serialize, Serializer};
use std::any::Any;
use std::ops::{Deref, DerefMut};

/// Ordered key-column → value pairs designating one stored row.
pub type IdentityKey = Vec<(String, Value)>;

/// Persistence identity and delete intent of one entity instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityState {
    identity: Option<IdentityKey>,
    delete: bool,
}

impl EntityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the instance currently corresponds to a stored row.
    pub fn is_exist(&self) -> bool {
        self.identity.as_ref().is_some_and(|key| !key.is_empty())
    }

    pub fn is_delete(&self) -> bool {
        self.delete
    }

    /// Marks the instance for deletion on the next persist.
    pub fn delete(&mut self) {
        self.delete = true;
    }

    pub(crate) fn identity(&self) -> Option<&[(String, Value)]> {
        self.identity.as_deref().filter(|key| !key.is_empty())
    }

    /// Value of a single-column identity; `None` for composite or missing keys.
    pub(crate) fn identity_value(&self) -> Option<&Value> {
        match self.identity() {
            Some([(_, value)]) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn set_identity(&mut self, key: IdentityKey) {
        self.identity = Some(key);
    }

    pub(crate) fn clear_identity(&mut self) {
        self.identity = None;
    }
}

/// An entity together with its `EntityState`.
///
/// Derefs to the entity so application code reads and writes fields
/// directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<E> {
    entity: E,
    state: EntityState,
}

impl<E: Entity> Record<E> {
    /// Wraps a transient entity (no identity, no delete intent).
    pub fn new(entity: E) -> Self {
        Self {
            entity,
            state: EntityState::new(),
        }
    }

    /// Builds a transient record from a field map via the entity contract.
    pub fn from_fields(fields: Fields) -> Result<Self, FieldError> {
        E::from_fields(fields).map(Self::new)
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn into_inner(self) -> E {
        self.entity
    }

    pub fn state(&self) -> &EntityState {
        &self.state
    }

    pub fn is_exist(&self) -> bool {
        self.state.is_exist()
    }

    pub fn is_delete(&self) -> bool {
        self.state.is_delete()
    }

    pub fn delete(&mut self) {
        self.state.delete();
    }

    /// Flat field values in declaration order, without list-valued fields.
    ///
    /// A reference field reports the referenced record's identity value, or
    /// null when it is absent or not yet stored.
    pub fn data(&self) -> Vec<(&'static str, Value)> {
        self.entity
            .fields()
            .into_iter()
            .filter_map(|(name, field)| match field {
                FieldRef::Value(value) => Some((name, value)),
                FieldRef::Entity(reference) => Some((
                    name,
                    reference
                        .and_then(|record| record.state().identity_value().cloned())
                        .unwrap_or(Value::Null),
                )),
                FieldRef::Collection(_) => None,
            })
            .collect()
    }
}

impl<E: Entity> From<E> for Record<E> {
    fn from(entity: E) -> Self {
        Self::new(entity)
    }
}

impl<E> Deref for Record<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.entity
    }
}

impl<E> DerefMut for Record<E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.entity
    }
}

/// Serializes exactly as the wrapped entity, collections included.
impl<E: Serialize> Serialize for Record<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entity.serialize(serializer)
    }
}

impl<E: Entity> AnyRecord for Record<E> {
    fn entity_type(&self) -> EntityType {
        EntityType::of::<E>()
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }

    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        self.entity.fields()
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        self.entity.set_value(field, value)
    }

    fn collection_mut(&mut self, field: &str) -> Option<Vec<&mut dyn AnyRecord>> {
        self.entity.collection_mut(field)
    }

    fn invoke(&mut self, method: &str) -> Result<(), FieldError> {
        self.entity.invoke(method)
    }

    fn data(&self) -> Vec<(&'static str, Value)> {
        Record::data(self)
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
