//! Mapping layer between entities and the storage handle.
//!
//! # Responsibility
//! - Own every SQL statement the crate issues (`sql`).
//! - Translate entity graphs to and from rows (`mapper`).
//!
//! # Invariants
//! - Only the mapper assigns or clears record identity.
//! - Storage errors pass through unchanged inside `MapperError::Storage`.

pub mod mapper;
pub mod sql;

pub use mapper::{Key, Mapper, MapperError, MapperResult};
