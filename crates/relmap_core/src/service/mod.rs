//! Per-type convenience facades over the mapper.
//!
//! # Responsibility
//! - Give callers a typed entry point bound to one entity type.
//! - Keep callers decoupled from mapper key and cascade details.

pub mod dao;

pub use dao::Dao;
