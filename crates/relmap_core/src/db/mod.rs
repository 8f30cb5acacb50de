//! Storage handle contract used by the mapper.
//!
//! # Responsibility
//! - Define the minimal surface the mapper needs from a database driver:
//!   prepared statements, plain queries and the last inserted identifier.
//! - Provide the SQLite adapter (`sqlite::SqliteStorage`).
//!
//! # Invariants
//! - Handles never open, pool or configure connections.
//! - Handle errors reach the caller unchanged inside `MapperError::Storage`.
//!
//! # See also
//! - `crate::repo::sql` for the statement shapes sent through this contract.

use crate::model::value::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub use sqlite::SqliteStorage;

pub type DbResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    /// Failure reported by a non-SQLite handle.
    Backend(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Backend(message) => write!(f, "storage backend error: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Backend(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Statement parameters.
///
/// Named parameter names are given without the leading colon.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
    #[default]
    None,
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

impl Params {
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Positional(values) => values.len(),
            Self::Named(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value bound to `:name`, if any.
    pub fn named(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Named(values) => values
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

/// One result row as an ordered column → value list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Row {
    fn from(columns: [(&str, Value); N]) -> Self {
        columns.into_iter().collect()
    }
}

impl<'a> FromIterator<(&'a str, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (&'a str, Value)>>(iter: T) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}

/// A prepared statement bound to its handle.
pub trait Statement {
    /// Executes with `params`; `false` means the handle declined the
    /// statement without raising an error.
    fn execute(&mut self, params: &Params) -> DbResult<bool>;

    /// Next row produced by the last execution.
    fn fetch_row(&mut self) -> DbResult<Option<Row>>;
}

/// Rows of an unparameterized query.
pub trait RowCursor {
    fn fetch_row(&mut self) -> DbResult<Option<Row>>;
}

/// Injected database handle.
pub trait Storage {
    fn prepare(&self, sql: &str) -> DbResult<Box<dyn Statement + '_>>;

    /// Runs an unparameterized read; `None` when the handle could not run it.
    fn query(&self, sql: &str) -> DbResult<Option<Box<dyn RowCursor + '_>>>;

    /// Identifier generated by the most recent insert, as text.
    fn last_insert_id(&self) -> DbResult<String>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn prepare(&self, sql: &str) -> DbResult<Box<dyn Statement + '_>> {
        (**self).prepare(sql)
    }

    fn query(&self, sql: &str) -> DbResult<Option<Box<dyn RowCursor + '_>>> {
        (**self).query(sql)
    }

    fn last_insert_id(&self) -> DbResult<String> {
        (**self).last_insert_id()
    }
}
