//! Entity ↔ row translation engine.
//!
//! # Responsibility
//! - Load entities (with references and collections) from the storage handle.
//! - Write entity graphs back with INSERT / UPDATE / DELETE.
//! - Track each record's persistence identity across those operations.
//!
//! # Invariants
//! - UPDATE and DELETE address the row by the identity recorded at load or
//!   create time, never by possibly edited live values.
//! - A referenced entity must be stored before its referrer is written.
//! - Operations are not atomic; a failure mid-graph leaves earlier
//!   statements applied.
//!
//! # See also
//! - `crate::repo::sql` for statement shapes.

use crate::db::{DbResult, Params, Row, Storage, StorageError};
use crate::logging::sql_for_log;
use crate::metadata::{
    self, CollectionMeta, EntityMetadata, EntityType, MetadataError, MetadataRegistry,
};
use crate::model::entity::{AnyRecord, Entity};
use crate::model::fields::{FieldError, FieldRef, FieldValue, Fields};
use crate::model::record::{IdentityKey, Record};
use crate::model::value::{parse_datetime, Value, ValueType};
use crate::repo::sql;
use log::{debug, trace, warn};
use std::any::type_name;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type MapperResult<T> = Result<T, MapperError>;

#[derive(Debug)]
pub enum MapperError {
    Metadata(MetadataError),
    Field(FieldError),
    Storage(StorageError),
    /// Key form does not match the type's identity declaration.
    KeyShape { entity: &'static str },
    NonexistentKey {
        entity: &'static str,
        column: String,
    },
    /// A referenced entity has not been stored yet.
    UnsavedReference {
        entity: &'static str,
        field: &'static str,
    },
    /// An entity-typed field has no join column.
    InvalidMapping {
        entity: &'static str,
        field: &'static str,
    },
    /// A collection's child type has no join column back to the parent.
    NoForeignKey {
        parent: &'static str,
        child: &'static str,
    },
    NotPersisted { entity: &'static str },
    /// The handle declined a write; the record's state is left unchanged.
    Declined {
        entity: &'static str,
        operation: &'static str,
    },
    InvalidInsertId {
        entity: &'static str,
        value: String,
    },
}

impl Display for MapperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Metadata(err) => write!(f, "{err}"),
            Self::Field(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::KeyShape { entity } => {
                write!(f, "key does not match the declared keys of `{entity}`")
            }
            Self::NonexistentKey { entity, column } => {
                write!(f, "`{column}` is not a unique key of `{entity}`")
            }
            Self::UnsavedReference { entity, field } => {
                write!(f, "`{entity}.{field}` references an entity that must be saved first")
            }
            Self::InvalidMapping { entity, field } => {
                write!(f, "missing join column settings for `{entity}.{field}`")
            }
            Self::NoForeignKey { parent, child } => {
                write!(f, "invalid sub-entity `{child}` for `{parent}`: no join column")
            }
            Self::NotPersisted { entity } => write!(f, "`{entity}` record is not persisted"),
            Self::Declined { entity, operation } => {
                write!(f, "storage declined {operation} of `{entity}`")
            }
            Self::InvalidInsertId { entity, value } => {
                write!(f, "storage reported non-integer insert id `{value}` for `{entity}`")
            }
        }
    }
}

impl Error for MapperError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Metadata(err) => Some(err),
            Self::Field(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MetadataError> for MapperError {
    fn from(value: MetadataError) -> Self {
        Self::Metadata(value)
    }
}

impl From<FieldError> for MapperError {
    fn from(value: FieldError) -> Self {
        Self::Field(value)
    }
}

impl From<StorageError> for MapperError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Lookup key for `Mapper::find`.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// Value of the type's `Id` column.
    Scalar(Value),
    /// Unique-key column name → value pairs.
    Unique(Vec<(String, Value)>),
}

impl From<Value> for Key {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Scalar(Value::Integer(value))
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Scalar(Value::from(value))
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Scalar(Value::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Scalar(Value::Text(value))
    }
}

impl From<Vec<(String, Value)>> for Key {
    fn from(value: Vec<(String, Value)>) -> Self {
        Self::Unique(value)
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Key {
    fn from(value: [(&str, Value); N]) -> Self {
        Self::Unique(
            value
                .into_iter()
                .map(|(column, value)| (column.to_string(), value))
                .collect(),
        )
    }
}

/// Data mapper over an injected storage handle.
pub struct Mapper<S> {
    storage: S,
    registry: &'static MetadataRegistry,
}

impl<S: Storage> Mapper<S> {
    /// Mapper backed by the process-wide metadata registry.
    pub fn new(storage: S) -> Self {
        Self::with_registry(storage, metadata::global())
    }

    pub fn with_registry(storage: S, registry: &'static MetadataRegistry) -> Self {
        Self { storage, registry }
    }

    /// Underlying handle, for custom queries.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn registry(&self) -> &'static MetadataRegistry {
        self.registry
    }

    /// Loads one `E` by id (scalar key) or unique key (column → value pairs).
    ///
    /// `Ok(None)` when no row matched or the handle declined the statement.
    pub fn find<E: Entity>(&self, key: impl Into<Key>) -> MapperResult<Option<Record<E>>> {
        self.find_dyn(EntityType::of::<E>(), key.into())?
            .map(downcast_record::<E>)
            .transpose()
    }

    pub fn find_dyn(
        &self,
        entity_type: EntityType,
        key: Key,
    ) -> MapperResult<Option<Box<dyn AnyRecord>>> {
        let started_at = Instant::now();
        let metadata = self.registry.resolve(entity_type)?;
        let (columns, values) = key_predicate(&metadata, key)?;
        let sql = sql::select_by_key(
            metadata.table(),
            &columns.iter().map(String::as_str).collect::<Vec<_>>(),
        );

        let row = self.fetch_one(&metadata, "find", &sql, &Params::Positional(values))?;
        let record = row
            .map(|row| self.build_record(&metadata, row))
            .transpose()?;

        debug!(
            "event=mapper_find module=repo status=ok entity={} table={} found={} duration_ms={}",
            entity_type.short_name(),
            metadata.table(),
            record.is_some(),
            started_at.elapsed().as_millis()
        );
        Ok(record)
    }

    /// Loads every `E`, optionally paged. A zero limit or offset is ignored.
    ///
    /// `Ok(None)` when the handle returned no cursor for the query.
    pub fn find_all<E: Entity>(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> MapperResult<Option<Vec<Record<E>>>> {
        match self.find_all_dyn(EntityType::of::<E>(), limit, offset)? {
            Some(records) => records
                .into_iter()
                .map(downcast_record::<E>)
                .collect::<MapperResult<Vec<_>>>()
                .map(Some),
            None => Ok(None),
        }
    }

    pub fn find_all_dyn(
        &self,
        entity_type: EntityType,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> MapperResult<Option<Vec<Box<dyn AnyRecord>>>> {
        let started_at = Instant::now();
        let metadata = self.registry.resolve(entity_type)?;
        let sql = sql::select_all(metadata.table(), limit, offset);
        trace!("event=sql module=repo op=find_all sql={}", sql_for_log(&sql));

        let rows = {
            let cursor = self.checked(&metadata, "find_all", self.storage.query(&sql))?;
            let Some(mut cursor) = cursor else {
                warn!(
                    "event=mapper_find_all module=repo status=skip entity={} table={} reason=no_cursor",
                    entity_type.short_name(),
                    metadata.table()
                );
                return Ok(None);
            };
            let mut rows = Vec::new();
            while let Some(row) = self.checked(&metadata, "find_all", cursor.fetch_row())? {
                rows.push(row);
            }
            rows
        };

        let records = rows
            .into_iter()
            .map(|row| self.build_record(&metadata, row))
            .collect::<MapperResult<Vec<_>>>()?;

        debug!(
            "event=mapper_find_all module=repo status=ok entity={} table={} count={} duration_ms={}",
            entity_type.short_name(),
            metadata.table(),
            records.len(),
            started_at.elapsed().as_millis()
        );
        Ok(Some(records))
    }

    /// Stores the record with one INSERT, then its collection children.
    ///
    /// An unset (null) `Id` field receives the handle's last insert id.
    pub fn create(&self, record: &mut dyn AnyRecord) -> MapperResult<()> {
        let started_at = Instant::now();
        let metadata = self.registry.resolve(record.entity_type())?;
        let values = column_values(&metadata, &*record)?;
        let columns = values.iter().map(|(column, _)| column.as_str()).collect::<Vec<_>>();
        let sql = sql::insert(metadata.table(), &columns);

        if !self.execute(&metadata, "create", &sql, &Params::Named(values))? {
            return Err(declined(&metadata, "create"));
        }

        if let Some(id_field) = metadata.id_field() {
            if matches!(record.field(id_field), Some(FieldRef::Value(Value::Null))) {
                let raw = self.checked(&metadata, "create", self.storage.last_insert_id())?;
                let id = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| MapperError::InvalidInsertId {
                        entity: metadata.entity_type().name(),
                        value: raw.clone(),
                    })?;
                record.set_value(id_field, Value::Integer(id))?;
            }
        }

        self.persist_children(&metadata, record)?;
        let identity = identity_of(&metadata, &*record);
        record.state_mut().set_identity(identity);

        debug!(
            "event=mapper_create module=repo status=ok entity={} table={} duration_ms={}",
            metadata.entity_type().short_name(),
            metadata.table(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Persists children, runs the update hook, then rewrites the row.
    pub fn update(&self, record: &mut dyn AnyRecord) -> MapperResult<()> {
        let started_at = Instant::now();
        let metadata = self.registry.resolve(record.entity_type())?;
        let recorded = recorded_identity(&metadata, &*record)?;

        self.persist_children(&metadata, record)?;
        if let Some(hook) = metadata.update_hook() {
            record.invoke(hook)?;
        }

        let values = column_values(&metadata, &*record)?;
        let mut params = values.clone();
        let mut key_binds = Vec::with_capacity(recorded.len());
        for (column, recorded_value) in &recorded {
            let live = values
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, value)| value);
            if live == Some(recorded_value) {
                key_binds.push((column.clone(), column.clone()));
            } else {
                let placeholder = format!("key_{column}");
                params.push((placeholder.clone(), recorded_value.clone()));
                key_binds.push((column.clone(), placeholder));
            }
        }

        let columns = values.iter().map(|(column, _)| column.as_str()).collect::<Vec<_>>();
        let binds = key_binds
            .iter()
            .map(|(column, placeholder)| (column.as_str(), placeholder.as_str()))
            .collect::<Vec<_>>();
        let sql = sql::update(metadata.table(), &columns, &binds);
        if !self.execute(&metadata, "update", &sql, &Params::Named(params))? {
            return Err(declined(&metadata, "update"));
        }

        let identity = identity_of(&metadata, &*record);
        record.state_mut().set_identity(identity);

        debug!(
            "event=mapper_update module=repo status=ok entity={} table={} duration_ms={}",
            metadata.entity_type().short_name(),
            metadata.table(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Removes the row; with `cascade`, stored collection children first.
    pub fn delete(&self, record: &mut dyn AnyRecord, cascade: bool) -> MapperResult<()> {
        let started_at = Instant::now();
        let metadata = self.registry.resolve(record.entity_type())?;
        let recorded = recorded_identity(&metadata, &*record)?;

        if cascade {
            for collection in metadata.collections() {
                let Some(children) = record.collection_mut(collection.field) else {
                    continue;
                };
                for child in children {
                    if child.state().is_exist() {
                        self.delete(child, true)?;
                    }
                }
            }
        }

        let columns = recorded
            .iter()
            .map(|(column, _)| column.as_str())
            .collect::<Vec<_>>();
        let sql = sql::delete(metadata.table(), &columns);
        if !self.execute(&metadata, "delete", &sql, &Params::Named(recorded))? {
            return Err(declined(&metadata, "delete"));
        }
        record.state_mut().clear_identity();

        debug!(
            "event=mapper_delete module=repo status=ok entity={} table={} cascade={} duration_ms={}",
            metadata.entity_type().short_name(),
            metadata.table(),
            cascade,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Creates, updates or deletes depending on the record's state.
    ///
    /// Delete intent on a record that was never stored does nothing.
    pub fn persist(&self, record: &mut dyn AnyRecord) -> MapperResult<()> {
        let state = record.state();
        match (state.is_delete(), state.is_exist()) {
            (true, true) => self.delete(record, true),
            (true, false) => {
                debug!(
                    "event=mapper_persist module=repo status=skip entity={} reason=transient_delete",
                    record.entity_type().short_name()
                );
                Ok(())
            }
            (false, true) => self.update(record),
            (false, false) => self.create(record),
        }
    }

    fn build_record(
        &self,
        metadata: &EntityMetadata,
        row: Row,
    ) -> MapperResult<Box<dyn AnyRecord>> {
        let mut fields = Fields::new();

        for collection in metadata.collections() {
            let children = self.load_children(metadata, collection, &row)?;
            fields.insert(collection.field, FieldValue::Collection(children));
        }

        for column in metadata.columns() {
            match column.value_type {
                ValueType::List => {}
                ValueType::Entity(target) => {
                    let join = metadata.join_column(column.field).ok_or_else(|| {
                        MapperError::InvalidMapping {
                            entity: metadata.entity_type().name(),
                            field: column.field,
                        }
                    })?;
                    let raw = row.get(&join.column).cloned().unwrap_or(Value::Null);
                    let reference = if is_empty_reference(&raw) {
                        None
                    } else {
                        self.find_dyn(target, Key::Scalar(raw))?
                    };
                    fields.insert(column.field, FieldValue::Entity(reference));
                }
                ValueType::DateTime => {
                    let value = match row_value(&row, &column.column, column.default.as_ref()) {
                        Value::Text(text) => parse_datetime(&text)
                            .map(Value::DateTime)
                            .ok_or_else(|| FieldError::invalid(column.field, ValueType::DateTime))?,
                        other => other,
                    };
                    fields.insert(column.field, FieldValue::Value(value));
                }
                _ => {
                    let value = row_value(&row, &column.column, column.default.as_ref());
                    fields.insert(column.field, FieldValue::Value(value));
                }
            }
        }

        let mut record = metadata.entity_type().construct(fields)?;
        let identity = identity_of(metadata, &*record);
        record.state_mut().set_identity(identity);
        Ok(record)
    }

    fn load_children(
        &self,
        parent: &EntityMetadata,
        collection: &CollectionMeta,
        row: &Row,
    ) -> MapperResult<Vec<Box<dyn AnyRecord>>> {
        let child = self.registry.resolve(collection.child)?;
        let join = child
            .join_column_to(parent.entity_type())
            .ok_or_else(|| MapperError::NoForeignKey {
                parent: parent.entity_type().name(),
                child: collection.child.name(),
            })?;
        let key_field = parent
            .key_field()
            .ok_or_else(|| MetadataError::CollectionWithoutKey {
                entity: parent.entity_type().name(),
                field: collection.field,
            })?;
        let key_column = parent.column_name(key_field).unwrap_or(key_field);
        let parent_key = row.get(key_column).cloned().unwrap_or(Value::Null);

        let sql = sql::select_children(child.table(), &join.column);
        let params = Params::Named(vec![(join.column.clone(), parent_key)]);
        let rows = self.fetch_all(&child, "load_children", &sql, &params)?;

        rows.into_iter()
            .map(|row| self.build_record(&child, row))
            .collect()
    }

    fn persist_children(
        &self,
        metadata: &EntityMetadata,
        record: &mut dyn AnyRecord,
    ) -> MapperResult<()> {
        if metadata.collections().is_empty() {
            return Ok(());
        }

        let parent_key = metadata
            .key_field()
            .and_then(|field| field_value(&*record, field));

        for collection in metadata.collections() {
            let child = self.registry.resolve(collection.child)?;
            let foreign_field = child
                .join_column_to(metadata.entity_type())
                .map(|join| join.field)
                .ok_or_else(|| MapperError::NoForeignKey {
                    parent: metadata.entity_type().name(),
                    child: collection.child.name(),
                })?;

            let Some(items) = record.collection_mut(collection.field) else {
                continue;
            };
            for item in items {
                if let Some(key) = parent_key.as_ref() {
                    item.set_value(foreign_field, key.clone())?;
                }
                self.persist(item)?;
            }
        }
        Ok(())
    }

    fn fetch_one(
        &self,
        metadata: &EntityMetadata,
        op: &str,
        sql: &str,
        params: &Params,
    ) -> MapperResult<Option<Row>> {
        trace!("event=sql module=repo op={} sql={}", op, sql_for_log(sql));
        let mut stmt = self.checked(metadata, op, self.storage.prepare(sql))?;
        if !self.checked(metadata, op, stmt.execute(params))? {
            return Ok(None);
        }
        self.checked(metadata, op, stmt.fetch_row())
    }

    fn fetch_all(
        &self,
        metadata: &EntityMetadata,
        op: &str,
        sql: &str,
        params: &Params,
    ) -> MapperResult<Vec<Row>> {
        trace!("event=sql module=repo op={} sql={}", op, sql_for_log(sql));
        let mut stmt = self.checked(metadata, op, self.storage.prepare(sql))?;
        let mut rows = Vec::new();
        if self.checked(metadata, op, stmt.execute(params))? {
            while let Some(row) = self.checked(metadata, op, stmt.fetch_row())? {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    fn execute(
        &self,
        metadata: &EntityMetadata,
        op: &str,
        sql: &str,
        params: &Params,
    ) -> MapperResult<bool> {
        trace!("event=sql module=repo op={} sql={}", op, sql_for_log(sql));
        let mut stmt = self.checked(metadata, op, self.storage.prepare(sql))?;
        self.checked(metadata, op, stmt.execute(params))
    }

    fn checked<T>(&self, metadata: &EntityMetadata, op: &str, result: DbResult<T>) -> MapperResult<T> {
        result.map_err(|err| {
            warn!(
                "event=mapper_{} module=repo status=error entity={} table={} error={}",
                op,
                metadata.entity_type().short_name(),
                metadata.table(),
                err
            );
            MapperError::Storage(err)
        })
    }
}

fn declined(metadata: &EntityMetadata, operation: &'static str) -> MapperError {
    warn!(
        "event=mapper_{} module=repo status=skip entity={} table={} reason=statement_declined",
        operation,
        metadata.entity_type().short_name(),
        metadata.table()
    );
    MapperError::Declined {
        entity: metadata.entity_type().name(),
        operation,
    }
}

fn downcast_record<E: Entity>(record: Box<dyn AnyRecord>) -> MapperResult<Record<E>> {
    record
        .into_any()
        .downcast::<Record<E>>()
        .map(|record| *record)
        .map_err(|_| MapperError::Metadata(MetadataError::NotEntity(type_name::<E>().to_string())))
}

/// Key columns and bound values for a `find`, validated against `metadata`.
fn key_predicate(metadata: &EntityMetadata, key: Key) -> MapperResult<(Vec<String>, Vec<Value>)> {
    let entity = metadata.entity_type().name();
    match (metadata.id_field(), key) {
        (Some(id_field), Key::Scalar(value)) => {
            let column = metadata.column_name(id_field).unwrap_or(id_field);
            Ok((vec![column.to_string()], vec![value]))
        }
        (None, Key::Unique(pairs)) => {
            let unique_columns = metadata
                .unique_fields()
                .iter()
                .map(|field| metadata.column_name(field).unwrap_or(*field))
                .collect::<HashSet<_>>();

            let mut seen = HashSet::new();
            for (column, _) in &pairs {
                if !unique_columns.contains(column.as_str()) {
                    return Err(MapperError::NonexistentKey {
                        entity,
                        column: column.clone(),
                    });
                }
                seen.insert(column.as_str());
            }
            if seen.len() != pairs.len() || seen.len() != unique_columns.len() {
                return Err(MapperError::KeyShape { entity });
            }

            Ok(pairs.into_iter().unzip())
        }
        _ => Err(MapperError::KeyShape { entity }),
    }
}

/// Column → value pairs for INSERT / UPDATE, in declaration order.
fn column_values(
    metadata: &EntityMetadata,
    record: &dyn AnyRecord,
) -> MapperResult<Vec<(String, Value)>> {
    let mut fields = record.fields();
    let mut values = Vec::new();
    for column in metadata.persisted_columns() {
        let Some(position) = fields.iter().position(|(field, _)| *field == column.field) else {
            continue;
        };
        let value = match fields.swap_remove(position).1 {
            FieldRef::Collection(_) => continue,
            FieldRef::Value(value) => value,
            FieldRef::Entity(None) => Value::Null,
            FieldRef::Entity(Some(reference)) => {
                if !reference.state().is_exist() {
                    return Err(MapperError::UnsavedReference {
                        entity: metadata.entity_type().name(),
                        field: column.field,
                    });
                }
                reference
                    .state()
                    .identity_value()
                    .cloned()
                    .unwrap_or(Value::Null)
            }
        };
        values.push((column.column.clone(), value));
    }
    Ok(values)
}

/// Identity mapping computed from the record's live field values.
fn identity_of(metadata: &EntityMetadata, record: &dyn AnyRecord) -> IdentityKey {
    metadata
        .key_fields()
        .into_iter()
        .map(|field| {
            let column = metadata.column_name(field).unwrap_or(field).to_string();
            (column, field_value(record, field).unwrap_or(Value::Null))
        })
        .collect()
}

fn recorded_identity(metadata: &EntityMetadata, record: &dyn AnyRecord) -> MapperResult<IdentityKey> {
    record
        .state()
        .identity()
        .map(<[_]>::to_vec)
        .ok_or(MapperError::NotPersisted {
            entity: metadata.entity_type().name(),
        })
}

fn field_value(record: &dyn AnyRecord, field: &str) -> Option<Value> {
    record
        .data()
        .into_iter()
        .find(|(name, _)| *name == field)
        .map(|(_, value)| value)
}

fn row_value(row: &Row, column: &str, default: Option<&Value>) -> Value {
    row.get(column)
        .or(default)
        .cloned()
        .unwrap_or(Value::Null)
}

fn is_empty_reference(value: &Value) -> bool {
    match value {
        Value::Null | Value::Integer(0) => true,
        Value::Text(text) => text.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_empty_reference, row_value, Key};
    use crate::db::Row;
    use crate::model::value::Value;

    #[test]
    fn key_conversions() {
        assert_eq!(Key::from(99), Key::Scalar(Value::Integer(99)));
        assert_eq!(
            Key::from([("type", Value::Integer(1))]),
            Key::Unique(vec![("type".to_string(), Value::Integer(1))])
        );
    }

    #[test]
    fn missing_column_falls_back_to_default_then_null() {
        let row = Row::from([("name", Value::from("a"))]);
        let default = Value::Integer(7);
        assert_eq!(row_value(&row, "name", Some(&default)), Value::from("a"));
        assert_eq!(row_value(&row, "price", Some(&default)), default);
        assert_eq!(row_value(&row, "price", None), Value::Null);
    }

    #[test]
    fn empty_reference_values() {
        assert!(is_empty_reference(&Value::Null));
        assert!(is_empty_reference(&Value::Integer(0)));
        assert!(is_empty_reference(&Value::from("")));
        assert!(!is_empty_reference(&Value::Integer(3)));
    }
}
