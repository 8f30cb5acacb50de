//! Entity contract implemented by every mappable type.
//!
//! # Responsibility
//! - Declare the schema of a type once (`Entity::declare`).
//! - Give the mapper by-name read/write access without runtime reflection.
//! - Build instances from an order-independent field map.
//!
//! # Invariants
//! - Names returned by `Entity::fields` match the names used in `declare`.
//! - `AnyRecord` is only implemented by `Record<E>`.

use crate::metadata::{EntityDecl, EntityType};
use crate::model::fields::{FieldError, FieldRef, Fields};
use crate::model::record::EntityState;
use crate::model::value::Value;
use std::any::Any;
use std::fmt::Debug;

/// Capability required from every persisted domain type.
///
/// Persistence state is not part of the entity itself; it lives in the
/// `Record<E>` wrapper the mapper hands out.
pub trait Entity: Debug + Sized + 'static {
    /// Schema declaration, read once per process by the metadata registry.
    fn declare() -> EntityDecl;

    /// Construction contract: builds the entity from resolved field values.
    fn from_fields(fields: Fields) -> Result<Self, FieldError>;

    /// Current field values in declaration order.
    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)>;

    /// Writes one scalar field (assigned ids, propagated foreign keys).
    fn set_value(&mut self, field: &str, value: Value) -> Result<(), FieldError>;

    /// Mutable access to the records of a collection field.
    fn collection_mut(&mut self, field: &str) -> Option<Vec<&mut dyn AnyRecord>> {
        let _ = field;
        None
    }

    /// Runs a zero-argument method named by the declaration (update hook).
    fn invoke(&mut self, method: &str) -> Result<(), FieldError> {
        Err(FieldError::UnknownMethod(method.to_string()))
    }
}

mod sealed {
    pub trait Sealed {}

    impl<E: super::Entity> Sealed for crate::model::record::Record<E> {}
}

/// Type-erased record the mapper walks when it follows references and
/// collections across entity types.
pub trait AnyRecord: sealed::Sealed + Debug {
    fn entity_type(&self) -> EntityType;

    fn state(&self) -> &EntityState;

    fn state_mut(&mut self) -> &mut EntityState;

    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)>;

    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        self.fields()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), FieldError>;

    fn collection_mut(&mut self, field: &str) -> Option<Vec<&mut dyn AnyRecord>>;

    fn invoke(&mut self, method: &str) -> Result<(), FieldError>;

    /// Flat field values; list-valued fields are left out.
    fn data(&self) -> Vec<(&'static str, Value)>;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}
