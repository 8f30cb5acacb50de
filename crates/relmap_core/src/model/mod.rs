//! Entity-side model: values, field maps, the entity contract and records.
//!
//! # Responsibility
//! - Define what a mappable type must provide (`Entity`).
//! - Track persistence identity per instance (`Record`, `EntityState`).
//!
//! # Invariants
//! - Identity is only assigned or cleared by the mapper.
//! - Collection fields hold records of exactly one declared child type.
//!
//! # See also
//! - `crate::repo::mapper` for the code that acts on these types.

pub mod entity;
pub mod fields;
pub mod record;
pub mod value;

pub use entity::{AnyRecord, Entity};
pub use fields::{children_mut, FieldError, FieldRef, FieldValue, Fields};
pub use record::{EntityState, IdentityKey, Record};
pub use value::{format_datetime, parse_datetime, Value, ValueType, DATETIME_FORMAT};
