//! Typed CRUD facade for one entity type.

use crate::db::Storage;
use crate::model::entity::Entity;
use crate::model::record::Record;
use crate::repo::mapper::{Mapper, MapperResult};
use std::marker::PhantomData;

/// CRUD entry points for `E`, forwarding to a shared `Mapper`.
///
/// Mixing entity types is rejected at compile time: every method takes or
/// returns `Record<E>`.
pub struct Dao<'m, E, S> {
    mapper: &'m Mapper<S>,
    _entity: PhantomData<fn() -> E>,
}

impl<'m, E: Entity, S: Storage> Dao<'m, E, S> {
    pub fn new(mapper: &'m Mapper<S>) -> Self {
        Self {
            mapper,
            _entity: PhantomData,
        }
    }

    /// Mapper used by this facade, for custom queries.
    pub fn mapper(&self) -> &'m Mapper<S> {
        self.mapper
    }

    /// Loads one record by its `Id` value.
    pub fn find(&self, id: i64) -> MapperResult<Option<Record<E>>> {
        self.mapper.find::<E>(id)
    }

    pub fn find_all(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> MapperResult<Option<Vec<Record<E>>>> {
        self.mapper.find_all::<E>(limit, offset)
    }

    pub fn create(&self, record: &mut Record<E>) -> MapperResult<()> {
        self.mapper.create(record)
    }

    pub fn update(&self, record: &mut Record<E>) -> MapperResult<()> {
        self.mapper.update(record)
    }

    /// Deletes the record and its stored collection children.
    pub fn delete(&self, record: &mut Record<E>) -> MapperResult<()> {
        self.mapper.delete(record, true)
    }

    pub fn persist(&self, record: &mut Record<E>) -> MapperResult<()> {
        self.mapper.persist(record)
    }
}
