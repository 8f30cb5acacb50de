//! Field maps exchanged between entities and the mapper.
//!
//! # Responsibility
//! - Carry construction input (`Fields`) from loaded rows into entities.
//! - Expose read access to entity fields (`FieldRef`) without reflection.
//! - Validate collection element types at construction time.
//!
//! # Invariants
//! - A collection field only ever yields records of its declared child type;
//!   anything else fails with `FieldError::CollectionType` immediately.

use crate::model::entity::{AnyRecord, Entity};
use crate::model::record::Record;
use crate::model::value::{Value, ValueType};
use chrono::NaiveDateTime;
use std::any::type_name;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Entity construction and field access errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A collection field received an element that is not its child type.
    CollectionType {
        field: String,
        expected: &'static str,
    },
    MissingField(String),
    InvalidValue {
        field: String,
        expected: &'static str,
    },
    UnknownField(String),
    UnknownMethod(String),
}

impl FieldError {
    pub(crate) fn invalid(field: &str, expected: ValueType) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            expected: expected.as_str(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CollectionType { field, expected } => {
                write!(f, "all items in collection `{field}` must be: {expected}")
            }
            Self::MissingField(field) => write!(f, "required field `{field}` has no value"),
            Self::InvalidValue { field, expected } => {
                write!(f, "field `{field}` expects a {expected} value")
            }
            Self::UnknownField(field) => write!(f, "entity has no field `{field}`"),
            Self::UnknownMethod(method) => write!(f, "entity has no method `{method}`"),
        }
    }
}

impl Error for FieldError {}

/// Owned field value used to construct an entity.
#[derive(Debug)]
pub enum FieldValue {
    Value(Value),
    Entity(Option<Box<dyn AnyRecord>>),
    Collection(Vec<Box<dyn AnyRecord>>),
}

/// Borrowed view of one entity field.
#[derive(Debug)]
pub enum FieldRef<'a> {
    Value(Value),
    Entity(Option<&'a dyn AnyRecord>),
    Collection(Vec<&'a dyn AnyRecord>),
}

impl<'a> FieldRef<'a> {
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    pub fn entity<E: Entity>(record: Option<&'a Record<E>>) -> Self {
        Self::Entity(record.map(|record| record as &dyn AnyRecord))
    }

    pub fn collection<E: Entity>(records: &'a [Record<E>]) -> Self {
        Self::Collection(
            records
                .iter()
                .map(|record| record as &dyn AnyRecord)
                .collect(),
        )
    }
}

/// Mutable child access for `Entity::collection_mut`.
pub fn children_mut<E: Entity>(records: &mut [Record<E>]) -> Vec<&mut dyn AnyRecord> {
    records
        .iter_mut()
        .map(|record| record as &mut dyn AnyRecord)
        .collect()
}

/// Order-independent field-name → value map consumed by `Entity::from_fields`.
///
/// Getters remove the value they return; a missing field reads as null.
#[derive(Debug, Default)]
pub struct Fields {
    values: BTreeMap<String, FieldValue>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.values.insert(field.into(), value);
    }

    /// Builder form of `insert` for scalar values.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, FieldValue::Value(value.into()));
        self
    }

    pub fn with_entity<E: Entity>(mut self, field: impl Into<String>, record: Option<Record<E>>) -> Self {
        self.insert(
            field,
            FieldValue::Entity(record.map(|record| Box::new(record) as Box<dyn AnyRecord>)),
        );
        self
    }

    pub fn with_collection<E: Entity>(mut self, field: impl Into<String>, records: Vec<Record<E>>) -> Self {
        self.insert(
            field,
            FieldValue::Collection(
                records
                    .into_iter()
                    .map(|record| Box::new(record) as Box<dyn AnyRecord>)
                    .collect(),
            ),
        );
        self
    }

    /// Inserts an untyped list; element types are checked when the entity
    /// claims the field.
    pub fn with_records(mut self, field: impl Into<String>, records: Vec<Box<dyn AnyRecord>>) -> Self {
        self.insert(field, FieldValue::Collection(records));
        self
    }

    /// Removes and returns the scalar value of `field` (null when absent).
    pub fn value(&mut self, field: &str) -> Result<Value, FieldError> {
        match self.values.remove(field) {
            None => Ok(Value::Null),
            Some(FieldValue::Value(value)) => Ok(value),
            Some(FieldValue::Entity(_)) | Some(FieldValue::Collection(_)) => Err(FieldError::InvalidValue {
                field: field.to_string(),
                expected: "scalar",
            }),
        }
    }

    pub fn integer(&mut self, field: &str) -> Result<i64, FieldError> {
        self.value(field)?.into_integer(field)
    }

    pub fn opt_integer(&mut self, field: &str) -> Result<Option<i64>, FieldError> {
        self.value(field)?.into_opt_integer(field)
    }

    pub fn real(&mut self, field: &str) -> Result<f64, FieldError> {
        self.value(field)?.into_real(field)
    }

    pub fn opt_real(&mut self, field: &str) -> Result<Option<f64>, FieldError> {
        self.value(field)?.into_opt_real(field)
    }

    pub fn text(&mut self, field: &str) -> Result<String, FieldError> {
        self.value(field)?.into_text(field)
    }

    pub fn opt_text(&mut self, field: &str) -> Result<Option<String>, FieldError> {
        self.value(field)?.into_opt_text(field)
    }

    pub fn datetime(&mut self, field: &str) -> Result<NaiveDateTime, FieldError> {
        self.value(field)?.into_datetime(field)
    }

    pub fn opt_datetime(&mut self, field: &str) -> Result<Option<NaiveDateTime>, FieldError> {
        self.value(field)?.into_opt_datetime(field)
    }

    /// Removes a referenced entity; null or absent reads as `None`.
    pub fn entity<E: Entity>(&mut self, field: &str) -> Result<Option<Record<E>>, FieldError> {
        match self.values.remove(field) {
            None | Some(FieldValue::Value(Value::Null)) | Some(FieldValue::Entity(None)) => Ok(None),
            Some(FieldValue::Entity(Some(record))) => downcast::<E>(record)
                .map(Some)
                .ok_or_else(|| FieldError::InvalidValue {
                    field: field.to_string(),
                    expected: type_name::<E>(),
                }),
            Some(_) => Err(FieldError::InvalidValue {
                field: field.to_string(),
                expected: type_name::<E>(),
            }),
        }
    }

    /// Removes a child list, checking every element against `E`.
    ///
    /// Null or absent reads as an empty list.
    pub fn collection<E: Entity>(&mut self, field: &str) -> Result<Vec<Record<E>>, FieldError> {
        let collection_error = || FieldError::CollectionType {
            field: field.to_string(),
            expected: type_name::<E>(),
        };

        match self.values.remove(field) {
            None | Some(FieldValue::Value(Value::Null)) => Ok(Vec::new()),
            Some(FieldValue::Collection(items)) => items
                .into_iter()
                .map(|item| downcast::<E>(item).ok_or_else(collection_error))
                .collect(),
            Some(_) => Err(collection_error()),
        }
    }
}

fn downcast<E: Entity>(record: Box<dyn AnyRecord>) -> Option<Record<E>> {
    record
        .into_any()
        .downcast::<Record<E>>()
        .ok()
        .map(|record| *record)
}
