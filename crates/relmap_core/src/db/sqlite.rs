//! SQLite storage handle over a borrowed `rusqlite::Connection`.
//!
//! # Responsibility
//! - Adapt rusqlite statements to the `Storage` contract.
//! - Convert between `Value` and SQLite storage classes.
//!
//! # Invariants
//! - Statements that return columns are run eagerly; their rows are buffered
//!   until fetched.
//! - Date/time values are written as `DATETIME_FORMAT` text.
//!
//! # See also
//! - Stock SQLite rejects `LIMIT` on UPDATE/DELETE unless compiled with
//!   `SQLITE_ENABLE_UPDATE_DELETE_LIMIT`.

use super::{DbResult, Params, Row, RowCursor, Statement, Storage};
use crate::model::value::{format_datetime, Value};
use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{Connection, ToSql};
use std::collections::VecDeque;

/// `Storage` implementation for an already-opened SQLite connection.
pub struct SqliteStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStorage<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }
}

impl Storage for SqliteStorage<'_> {
    fn prepare(&self, sql: &str) -> DbResult<Box<dyn Statement + '_>> {
        let stmt = self.conn.prepare(sql)?;
        Ok(Box::new(SqliteStatement {
            stmt,
            rows: VecDeque::new(),
        }))
    }

    fn query(&self, sql: &str) -> DbResult<Option<Box<dyn RowCursor + '_>>> {
        let mut stmt = self.conn.prepare(sql)?;
        bind_params(&mut stmt, &Params::None)?;
        let rows = read_rows(&mut stmt)?;
        Ok(Some(Box::new(BufferedRows { rows })))
    }

    fn last_insert_id(&self) -> DbResult<String> {
        Ok(self.conn.last_insert_rowid().to_string())
    }
}

struct SqliteStatement<'conn> {
    stmt: rusqlite::Statement<'conn>,
    rows: VecDeque<Row>,
}

impl Statement for SqliteStatement<'_> {
    fn execute(&mut self, params: &Params) -> DbResult<bool> {
        self.rows.clear();
        bind_params(&mut self.stmt, params)?;
        if self.stmt.column_count() > 0 {
            self.rows = read_rows(&mut self.stmt)?;
        } else {
            self.stmt.raw_execute()?;
        }
        Ok(true)
    }

    fn fetch_row(&mut self) -> DbResult<Option<Row>> {
        Ok(self.rows.pop_front())
    }
}

struct BufferedRows {
    rows: VecDeque<Row>,
}

impl RowCursor for BufferedRows {
    fn fetch_row(&mut self) -> DbResult<Option<Row>> {
        Ok(self.rows.pop_front())
    }
}

fn bind_params(stmt: &mut rusqlite::Statement<'_>, params: &Params) -> DbResult<()> {
    let expected = stmt.parameter_count();
    if params.len() != expected {
        return Err(rusqlite::Error::InvalidParameterCount(params.len(), expected).into());
    }

    match params {
        Params::None => {}
        Params::Positional(values) => {
            for (index, value) in values.iter().enumerate() {
                stmt.raw_bind_parameter(index + 1, value)?;
            }
        }
        Params::Named(values) => {
            for (name, value) in values {
                let index = stmt
                    .parameter_index(&format!(":{name}"))?
                    .ok_or_else(|| rusqlite::Error::InvalidParameterName(name.clone()))?;
                stmt.raw_bind_parameter(index, value)?;
            }
        }
    }
    Ok(())
}

fn read_rows(stmt: &mut rusqlite::Statement<'_>) -> DbResult<VecDeque<Row>> {
    let names = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut buffered = VecDeque::new();
    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let mut record = Row::new();
        for (index, name) in names.iter().enumerate() {
            record.push(name.as_str(), row.get::<_, Value>(index)?);
        }
        buffered.push_back(record);
    }
    Ok(buffered)
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(SqlValue::Null),
            Self::Integer(value) => ToSqlOutput::from(*value),
            Self::Real(value) => ToSqlOutput::from(*value),
            Self::Text(text) => ToSqlOutput::from(text.as_str()),
            Self::Blob(bytes) => ToSqlOutput::from(bytes.as_slice()),
            Self::DateTime(value) => ToSqlOutput::from(format_datetime(value)),
        })
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(value) => Self::Integer(value),
            ValueRef::Real(value) => Self::Real(value),
            ValueRef::Text(_) => Self::Text(value.as_str()?.to_string()),
            ValueRef::Blob(bytes) => Self::Blob(bytes.to_vec()),
        })
    }
}
