//! Fixed SQL statement templates.
//!
//! # Invariants
//! - Table and column names are pre-validated identifiers; values are
//!   always bound, never spliced.
//! - Predicates are joined with ` AND `; a zero limit or offset is omitted.

/// `SELECT * FROM {table} WHERE {col} = ? [AND ...] LIMIT 1`
pub fn select_by_key(table: &str, key_columns: &[&str]) -> String {
    let predicates = key_columns
        .iter()
        .map(|column| format!("{column} = ?"))
        .collect::<Vec<_>>();
    format!(
        "SELECT * FROM {table} WHERE {} LIMIT 1",
        predicates.join(" AND ")
    )
}

/// `SELECT * FROM {table}[ LIMIT n][ OFFSET m]`
pub fn select_all(table: &str, limit: Option<u64>, offset: Option<u64>) -> String {
    let mut sql = format!("SELECT * FROM {table}");
    if let Some(limit) = limit.filter(|limit| *limit > 0) {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(offset) = offset.filter(|offset| *offset > 0) {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
    sql
}

/// `SELECT * FROM {table} WHERE {fk} = :{fk}`
pub fn select_children(table: &str, foreign_key: &str) -> String {
    format!("SELECT * FROM {table} WHERE {}", bind(foreign_key, foreign_key))
}

/// `INSERT INTO {table} (a, b) VALUES (:a, :b)`
pub fn insert(table: &str, columns: &[&str]) -> String {
    format!(
        "INSERT INTO {table} ({}) VALUES (:{})",
        columns.join(", "),
        columns.join(", :")
    )
}

/// `UPDATE {table} SET a = :a, ... WHERE {key} = :{placeholder} [AND ...] LIMIT 1`
///
/// `key_binds` pairs each key column with its placeholder name.
pub fn update(table: &str, columns: &[&str], key_binds: &[(&str, &str)]) -> String {
    let assignments = columns
        .iter()
        .map(|column| bind(column, column))
        .collect::<Vec<_>>();
    format!(
        "UPDATE {table} SET {} WHERE {} LIMIT 1",
        assignments.join(", "),
        key_predicate(key_binds)
    )
}

/// `DELETE FROM {table} WHERE {key} = :{key} [AND ...] LIMIT 1`
pub fn delete(table: &str, key_columns: &[&str]) -> String {
    let binds = key_columns
        .iter()
        .map(|column| (*column, *column))
        .collect::<Vec<_>>();
    format!(
        "DELETE FROM {table} WHERE {} LIMIT 1",
        key_predicate(&binds)
    )
}

fn key_predicate(key_binds: &[(&str, &str)]) -> String {
    key_binds
        .iter()
        .map(|(column, placeholder)| bind(column, placeholder))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn bind(column: &str, placeholder: &str) -> String {
    format!("{column} = :{placeholder}")
}
