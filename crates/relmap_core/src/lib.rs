//! Metadata-driven data mapper.
//!
//! Entities declare their schema once (`Entity::declare`); the `Mapper`
//! turns them into rows of an injected storage handle and back, following
//! references and child collections.

pub mod db;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{DbResult, Params, Row, RowCursor, SqliteStorage, Statement, Storage, StorageError};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use metadata::{EntityDecl, EntityMetadata, EntityType, FieldDecl, MetadataError, MetadataRegistry};
pub use model::{
    children_mut, AnyRecord, Entity, EntityState, FieldError, FieldRef, FieldValue, Fields, Record,
    Value, ValueType,
};
pub use repo::{Key, Mapper, MapperError, MapperResult};
pub use service::Dao;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
