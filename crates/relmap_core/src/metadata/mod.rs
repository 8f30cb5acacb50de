//! Schema metadata for entity types.
//!
//! # Responsibility
//! - Turn per-type declarations (`Entity::declare`) into validated,
//!   immutable `EntityMetadata`.
//! - Memoize descriptors process-wide so each type is extracted once.
//!
//! # Invariants
//! - Every descriptor has exactly one identity mechanism (`Id` or
//!   `UniqueId` fields).
//! - Table and column names are plain SQL identifiers; they are spliced
//!   into statement text.
//! - Descriptors never change after insertion into the registry.

use crate::model::entity::{AnyRecord, Entity};
use crate::model::fields::{FieldError, Fields};
use crate::model::record::Record;
use std::any::{type_name, TypeId};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

mod decl;
mod registry;

pub use decl::{EntityDecl, FieldDecl};
pub use registry::{
    global, CollectionMeta, ColumnMeta, EntityMetadata, JoinColumnMeta, MetadataRegistry,
};

pub type MetadataResult<T> = Result<T, MetadataError>;

/// Metadata extraction and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// A name lookup did not match any registered entity type.
    NotEntity(String),
    /// A short name matches more than one registered entity type.
    AmbiguousName {
        name: String,
        candidates: Vec<&'static str>,
    },
    /// Neither an `Id` nor a `UniqueId` field is declared.
    MissingIdentity(&'static str),
    DuplicateId {
        entity: &'static str,
        field: &'static str,
    },
    DuplicateField {
        entity: &'static str,
        field: &'static str,
    },
    InvalidIdentifier {
        entity: &'static str,
        identifier: String,
    },
    /// A collection is declared on a type without a single-column key.
    CollectionWithoutKey {
        entity: &'static str,
        field: &'static str,
    },
    /// The child of a collection points back at the owner through an
    /// entity-typed field instead of a plain key column.
    EntityBackReference {
        entity: &'static str,
        field: &'static str,
        child: &'static str,
    },
}

impl Display for MetadataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotEntity(name) => write!(f, "not an entity type: {name}"),
            Self::AmbiguousName { name, candidates } => write!(
                f,
                "entity name `{name}` is ambiguous: {}",
                candidates.join(", ")
            ),
            Self::MissingIdentity(entity) => write!(f, "entity type is missing a key: {entity}"),
            Self::DuplicateId { entity, field } => {
                write!(f, "entity `{entity}` declares a second id field `{field}`")
            }
            Self::DuplicateField { entity, field } => {
                write!(f, "entity `{entity}` declares field `{field}` twice")
            }
            Self::InvalidIdentifier { entity, identifier } => {
                write!(f, "entity `{entity}` uses invalid SQL identifier `{identifier}`")
            }
            Self::CollectionWithoutKey { entity, field } => write!(
                f,
                "entity `{entity}` declares collection `{field}` without a single-column key"
            ),
            Self::EntityBackReference {
                entity,
                field,
                child,
            } => write!(
                f,
                "collection `{entity}.{field}` needs a key-valued join column on `{child}`, \
                 not an entity-typed one"
            ),
        }
    }
}

impl Error for MetadataError {}

/// Runtime handle to an entity type.
///
/// Carries what the mapper needs to work across types it only knows at
/// runtime: the declaration and a type-erased constructor.
#[derive(Clone, Copy)]
pub struct EntityType {
    type_id: TypeId,
    name: &'static str,
    declare: fn() -> EntityDecl,
    construct: fn(Fields) -> Result<Box<dyn AnyRecord>, FieldError>,
}

impl EntityType {
    pub fn of<E: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            name: type_name::<E>(),
            declare: E::declare,
            construct: construct_record::<E>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name.
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }

    pub(crate) fn declaration(&self) -> EntityDecl {
        (self.declare)()
    }

    /// Builds a transient record of this type from resolved field values.
    pub fn construct(&self, fields: Fields) -> Result<Box<dyn AnyRecord>, FieldError> {
        (self.construct)(fields)
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EntityType {}

impl Hash for EntityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl Debug for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntityType({})", self.name)
    }
}

fn construct_record<E: Entity>(fields: Fields) -> Result<Box<dyn AnyRecord>, FieldError> {
    Record::<E>::from_fields(fields).map(|record| Box::new(record) as Box<dyn AnyRecord>)
}

fn short_type_name(name: &'static str) -> &'static str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::short_type_name;

    #[test]
    fn short_type_name_keeps_last_segment() {
        assert_eq!(short_type_name("app::entity::Basic"), "Basic");
        assert_eq!(short_type_name("Basic"), "Basic");
        assert_eq!(short_type_name("app::Wrapper<app::Inner>"), "Wrapper");
    }
}
