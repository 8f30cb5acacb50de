//! Scalar cell values and declared field types.
//!
//! # Responsibility
//! - Carry column values between entities and the storage handle.
//! - Convert loosely typed storage values into the shape a field expects.
//!
//! # Invariants
//! - `Value::Null` is the only representation of an absent cell.
//! - Date/time text is read in SQL (`YYYY-MM-DD HH:MM:SS`) or RFC 3339 form.

use crate::metadata::EntityType;
use crate::model::fields::FieldError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Text layout used when a date/time value is written to storage.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const DATETIME_PARSE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// One scalar cell value.
///
/// Serialized as the bare scalar so entity JSON keeps its natural shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    DateTime(NaiveDateTime),
}

/// Declared type of one entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Integer,
    Real,
    Text,
    Blob,
    DateTime,
    /// Field holds a loaded entity of the given type; stored as its identity.
    Entity(EntityType),
    /// Field holds a list of child records; never stored as a column.
    List,
}

impl ValueType {
    /// Stable lowercase name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Text => "text",
            Self::Blob => "blob",
            Self::DateTime => "datetime",
            Self::Entity(_) => "entity",
            Self::List => "list",
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer view; numeric text is accepted because drivers differ.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn into_opt_integer(self, field: &str) -> Result<Option<i64>, FieldError> {
        match self {
            Self::Null => Ok(None),
            other => other
                .as_integer()
                .map(Some)
                .ok_or_else(|| FieldError::invalid(field, ValueType::Integer)),
        }
    }

    pub fn into_integer(self, field: &str) -> Result<i64, FieldError> {
        self.into_opt_integer(field)?
            .ok_or_else(|| FieldError::MissingField(field.to_string()))
    }

    pub fn into_opt_real(self, field: &str) -> Result<Option<f64>, FieldError> {
        match self {
            Self::Null => Ok(None),
            Self::Real(value) => Ok(Some(value)),
            Self::Integer(value) => Ok(Some(value as f64)),
            Self::Text(text) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| FieldError::invalid(field, ValueType::Real)),
            _ => Err(FieldError::invalid(field, ValueType::Real)),
        }
    }

    pub fn into_real(self, field: &str) -> Result<f64, FieldError> {
        self.into_opt_real(field)?
            .ok_or_else(|| FieldError::MissingField(field.to_string()))
    }

    pub fn into_opt_text(self, field: &str) -> Result<Option<String>, FieldError> {
        match self {
            Self::Null => Ok(None),
            Self::Text(text) => Ok(Some(text)),
            Self::Integer(value) => Ok(Some(value.to_string())),
            Self::Real(value) => Ok(Some(value.to_string())),
            _ => Err(FieldError::invalid(field, ValueType::Text)),
        }
    }

    pub fn into_text(self, field: &str) -> Result<String, FieldError> {
        self.into_opt_text(field)?
            .ok_or_else(|| FieldError::MissingField(field.to_string()))
    }

    pub fn into_opt_datetime(self, field: &str) -> Result<Option<NaiveDateTime>, FieldError> {
        match self {
            Self::Null => Ok(None),
            Self::DateTime(value) => Ok(Some(value)),
            Self::Text(text) => parse_datetime(&text)
                .map(Some)
                .ok_or_else(|| FieldError::invalid(field, ValueType::DateTime)),
            Self::Integer(seconds) => DateTime::from_timestamp(seconds, 0)
                .map(|value| Some(value.naive_utc()))
                .ok_or_else(|| FieldError::invalid(field, ValueType::DateTime)),
            _ => Err(FieldError::invalid(field, ValueType::DateTime)),
        }
    }

    pub fn into_datetime(self, field: &str) -> Result<NaiveDateTime, FieldError> {
        self.into_opt_datetime(field)?
            .ok_or_else(|| FieldError::MissingField(field.to_string()))
    }
}

/// Parses storage text into a native date/time.
///
/// Accepts SQL timestamps (optionally with fraction), `T`-separated
/// timestamps, RFC 3339 with offset (normalized to UTC) and bare dates.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    for format in DATETIME_PARSE_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(value);
        }
    }
    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(value.naive_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Formats a date/time the way it is bound into statements.
pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
