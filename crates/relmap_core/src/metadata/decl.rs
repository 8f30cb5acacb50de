//! Declaration builders returned by `Entity::declare`.

use super::EntityType;
use crate::model::value::{Value, ValueType};

/// Schema declaration of one entity type.
#[derive(Debug, Clone)]
pub struct EntityDecl {
    pub(crate) table: Option<String>,
    pub(crate) fields: Vec<FieldDecl>,
    pub(crate) on_update: Option<String>,
}

impl EntityDecl {
    pub fn new() -> Self {
        Self {
            table: None,
            fields: Vec::new(),
            on_update: None,
        }
    }

    /// Explicit table name; defaults to the type's short name.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(name.into());
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Zero-argument method invoked right before every update.
    pub fn on_update(mut self, method: impl Into<String>) -> Self {
        self.on_update = Some(method.into());
        self
    }
}

impl Default for EntityDecl {
    fn default() -> Self {
        Self::new()
    }
}

/// Declaration of one entity field.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub(crate) name: &'static str,
    pub(crate) value_type: ValueType,
    pub(crate) column: Option<String>,
    pub(crate) nullable: bool,
    pub(crate) default: Option<Value>,
    pub(crate) id: bool,
    pub(crate) unique_id: bool,
    pub(crate) join_column: Option<EntityType>,
    pub(crate) collection: Option<EntityType>,
}

impl FieldDecl {
    pub fn new(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            value_type,
            column: None,
            nullable: false,
            default: None,
            id: false,
            unique_id: false,
            join_column: None,
            collection: None,
        }
    }

    /// List of `child` records, loaded and saved together with the owner.
    pub fn collection(name: &'static str, child: EntityType) -> Self {
        let mut field = Self::new(name, ValueType::List);
        field.collection = Some(child);
        field
    }

    /// Column name override; defaults to the field name.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column = Some(name.into());
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Value used when a loaded row has no column for this field.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Single autoincrement primary key.
    pub fn id(mut self) -> Self {
        self.id = true;
        self
    }

    /// Member of the composite natural key.
    pub fn unique_id(mut self) -> Self {
        self.unique_id = true;
        self
    }

    /// Foreign key referencing `parent`.
    pub fn join_column(mut self, parent: EntityType) -> Self {
        self.join_column = Some(parent);
        self
    }
}
