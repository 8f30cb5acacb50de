//! Metadata extraction and the process-wide descriptor cache.

use super::{EntityDecl, EntityType, MetadataError, MetadataResult};
use crate::model::entity::Entity;
use crate::model::value::{Value, ValueType};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

static SQL_IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("sql identifier regex must compile")
});

static GLOBAL_REGISTRY: Lazy<MetadataRegistry> = Lazy::new(MetadataRegistry::new);

/// Process-wide registry shared by every mapper.
pub fn global() -> &'static MetadataRegistry {
    &GLOBAL_REGISTRY
}

/// Storage description of one declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub field: &'static str,
    pub column: String,
    pub value_type: ValueType,
    pub nullable: bool,
    pub default: Option<Value>,
}

/// Foreign-key field referencing a parent entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinColumnMeta {
    pub field: &'static str,
    pub column: String,
    pub parent: EntityType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionMeta {
    pub field: &'static str,
    pub child: EntityType,
}

/// Immutable schema descriptor of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMetadata {
    entity_type: EntityType,
    table: String,
    columns: Vec<ColumnMeta>,
    id_field: Option<&'static str>,
    unique_fields: Vec<&'static str>,
    join_columns: Vec<JoinColumnMeta>,
    collections: Vec<CollectionMeta>,
    update_hook: Option<String>,
}

impl EntityMetadata {
    /// Validates a declaration and builds the descriptor for `entity_type`.
    pub fn extract(entity_type: EntityType, decl: EntityDecl) -> MetadataResult<Self> {
        let entity = entity_type.name();
        let table = decl
            .table
            .unwrap_or_else(|| entity_type.short_name().to_string());
        ensure_identifier(entity, &table)?;

        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(decl.fields.len());
        let mut id_field = None;
        let mut unique_fields = Vec::new();
        let mut join_columns = Vec::new();
        let mut collections = Vec::new();

        for field in decl.fields {
            if !seen.insert(field.name) {
                return Err(MetadataError::DuplicateField {
                    entity,
                    field: field.name,
                });
            }
            let column = field.column.unwrap_or_else(|| field.name.to_string());
            ensure_identifier(entity, &column)?;

            if field.id {
                if id_field.is_some() {
                    return Err(MetadataError::DuplicateId {
                        entity,
                        field: field.name,
                    });
                }
                id_field = Some(field.name);
            }
            if field.unique_id {
                unique_fields.push(field.name);
            }
            if let Some(parent) = field.join_column {
                join_columns.push(JoinColumnMeta {
                    field: field.name,
                    column: column.clone(),
                    parent,
                });
            }
            if let Some(child) = field.collection {
                collections.push(CollectionMeta {
                    field: field.name,
                    child,
                });
            }

            columns.push(ColumnMeta {
                field: field.name,
                column,
                value_type: field.value_type,
                nullable: field.nullable,
                default: field.default,
            });
        }

        if id_field.is_none() && unique_fields.is_empty() {
            return Err(MetadataError::MissingIdentity(entity));
        }

        let metadata = Self {
            entity_type,
            table,
            columns,
            id_field,
            unique_fields,
            join_columns,
            collections,
            update_hook: decl.on_update,
        };

        if metadata.key_field().is_none() {
            if let Some(collection) = metadata.collections.first() {
                return Err(MetadataError::CollectionWithoutKey {
                    entity,
                    field: collection.field,
                });
            }
        }
        for collection in &metadata.collections {
            ensure_key_back_reference(entity_type, collection)?;
        }

        Ok(metadata)
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// All declared fields in declaration order, collections included.
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Fields stored as columns (everything except collections).
    pub fn persisted_columns(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.columns
            .iter()
            .filter(|column| column.value_type != ValueType::List)
    }

    pub fn column(&self, field: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|column| column.field == field)
    }

    pub fn column_name(&self, field: &str) -> Option<&str> {
        self.column(field).map(|column| column.column.as_str())
    }

    pub fn id_field(&self) -> Option<&'static str> {
        self.id_field
    }

    pub fn unique_fields(&self) -> &[&'static str] {
        &self.unique_fields
    }

    /// Single key field: the `Id` field, else the only `UniqueId` field.
    pub fn key_field(&self) -> Option<&'static str> {
        match (self.id_field, self.unique_fields.as_slice()) {
            (Some(id), _) => Some(id),
            (None, [single]) => Some(single),
            _ => None,
        }
    }

    /// Fields forming the identity mapping, in declaration order.
    pub fn key_fields(&self) -> Vec<&'static str> {
        match self.key_field() {
            Some(field) => vec![field],
            None => self.unique_fields.clone(),
        }
    }

    pub fn join_columns(&self) -> &[JoinColumnMeta] {
        &self.join_columns
    }

    pub fn join_column(&self, field: &str) -> Option<&JoinColumnMeta> {
        self.join_columns.iter().find(|join| join.field == field)
    }

    /// Join column of this (child) type that references `parent`.
    pub fn join_column_to(&self, parent: EntityType) -> Option<&JoinColumnMeta> {
        self.join_columns.iter().find(|join| join.parent == parent)
    }

    pub fn collections(&self) -> &[CollectionMeta] {
        &self.collections
    }

    pub fn update_hook(&self) -> Option<&str> {
        self.update_hook.as_deref()
    }
}

/// The child's join column back to the owner must hold a plain key value:
/// the owner's key is written into it on save and read from it on load.
fn ensure_key_back_reference(
    owner: EntityType,
    collection: &CollectionMeta,
) -> MetadataResult<()> {
    let child = collection.child.declaration();
    let back_reference = child
        .fields
        .iter()
        .find(|field| field.join_column == Some(owner));

    match back_reference {
        Some(field) if matches!(field.value_type, ValueType::Entity(_)) => {
            Err(MetadataError::EntityBackReference {
                entity: owner.name(),
                field: collection.field,
                child: collection.child.name(),
            })
        }
        _ => Ok(()),
    }
}

fn ensure_identifier(entity: &'static str, identifier: &str) -> MetadataResult<()> {
    if SQL_IDENTIFIER_RE.is_match(identifier) {
        Ok(())
    } else {
        Err(MetadataError::InvalidIdentifier {
            entity,
            identifier: identifier.to_string(),
        })
    }
}

/// Memoizing descriptor cache keyed by entity type.
///
/// Safe to share between threads; each type's descriptor is inserted once
/// and only read afterwards.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    entries: RwLock<HashMap<TypeId, Arc<EntityMetadata>>>,
    names: RwLock<HashMap<&'static str, Vec<EntityType>>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata<E: Entity>(&self) -> MetadataResult<Arc<EntityMetadata>> {
        self.resolve(EntityType::of::<E>())
    }

    /// Makes `E` resolvable through `resolve_name`.
    pub fn register<E: Entity>(&self) -> MetadataResult<Arc<EntityMetadata>> {
        self.resolve(EntityType::of::<E>())
    }

    /// Returns the cached descriptor, extracting it on first access.
    pub fn resolve(&self, entity_type: EntityType) -> MetadataResult<Arc<EntityMetadata>> {
        if let Some(found) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entity_type.type_id())
        {
            return Ok(Arc::clone(found));
        }

        let extracted = Arc::new(EntityMetadata::extract(
            entity_type,
            entity_type.declaration(),
        )?);

        let stored = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(entity_type.type_id()).or_insert(extracted))
        };

        {
            let mut names = self.names.write().unwrap_or_else(PoisonError::into_inner);
            for name in [entity_type.name(), entity_type.short_name()] {
                let known = names.entry(name).or_default();
                if !known.contains(&entity_type) {
                    known.push(entity_type);
                }
            }
        }

        debug!(
            "event=metadata_extract module=metadata status=ok entity={} table={} columns={}",
            entity_type.short_name(),
            stored.table(),
            stored.columns().len()
        );
        Ok(stored)
    }

    /// Looks a registered type up by qualified or short name.
    ///
    /// A short name shared by several registered types is rejected; the
    /// qualified name still resolves each of them.
    pub fn resolve_name(&self, name: &str) -> MetadataResult<Arc<EntityMetadata>> {
        let known = self
            .names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .unwrap_or_default();

        match known.as_slice() {
            [] => Err(MetadataError::NotEntity(name.to_string())),
            [entity_type] => self.resolve(*entity_type),
            _ => Err(MetadataError::AmbiguousName {
                name: name.to_string(),
                candidates: known.iter().map(EntityType::name).collect(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::SQL_IDENTIFIER_RE;

    #[test]
    fn identifier_regex_accepts_plain_names_only() {
        assert!(SQL_IDENTIFIER_RE.is_match("complex_item"));
        assert!(SQL_IDENTIFIER_RE.is_match("_hidden1"));
        assert!(!SQL_IDENTIFIER_RE.is_match("1table"));
        assert!(!SQL_IDENTIFIER_RE.is_match("name; DROP TABLE x"));
        assert!(!SQL_IDENTIFIER_RE.is_match(""));
    }
}
