#![allow(dead_code)]

use chrono::NaiveDateTime;
use relmap_core::{
    children_mut, AnyRecord, DbResult, Entity, EntityDecl, EntityType, FieldDecl, FieldError,
    FieldRef, Fields, Params, Record, Row, RowCursor, Statement, Storage, StorageError, Value,
    ValueType,
};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

fn unknown(field: &str) -> FieldError {
    FieldError::UnknownField(field.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Basic {
    pub name: String,
    pub price: i64,
    pub id: Option<i64>,
}

impl Basic {
    pub fn record(name: &str, price: i64, id: Option<i64>) -> Record<Self> {
        Record::new(Self {
            name: name.to_string(),
            price,
            id,
        })
    }
}

impl Entity for Basic {
    fn declare() -> EntityDecl {
        EntityDecl::new()
            .table("basic")
            .field(FieldDecl::new("name", ValueType::Text))
            .field(FieldDecl::new("price", ValueType::Integer))
            .field(FieldDecl::new("id", ValueType::Integer).nullable().id())
    }

    fn from_fields(mut fields: Fields) -> Result<Self, FieldError> {
        Ok(Self {
            name: fields.text("name")?,
            price: fields.integer("price")?,
            id: fields.opt_integer("id")?,
        })
    }

    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        vec![
            ("name", FieldRef::value(self.name.as_str())),
            ("price", FieldRef::value(self.price)),
            ("id", FieldRef::value(self.id)),
        ]
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "name" => self.name = value.into_text(field)?,
            "price" => self.price = value.into_integer(field)?,
            "id" => self.id = value.into_opt_integer(field)?,
            other => return Err(unknown(other)),
        }
        Ok(())
    }
}

/// Collection owner with custom column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Complex {
    pub name: String,
    pub list: Vec<Record<ComplexItem>>,
    pub id: Option<i64>,
}

impl Complex {
    pub fn record(name: &str, list: Vec<Record<ComplexItem>>) -> Record<Self> {
        Record::new(Self {
            name: name.to_string(),
            list,
            id: None,
        })
    }
}

impl Entity for Complex {
    fn declare() -> EntityDecl {
        EntityDecl::new()
            .table("complex")
            .field(FieldDecl::new("name", ValueType::Text).column("custom_name"))
            .field(FieldDecl::collection("list", EntityType::of::<ComplexItem>()))
            .field(
                FieldDecl::new("id", ValueType::Integer)
                    .column("custom_key")
                    .nullable()
                    .id(),
            )
    }

    fn from_fields(mut fields: Fields) -> Result<Self, FieldError> {
        Ok(Self {
            name: fields.text("name")?,
            list: fields.collection::<ComplexItem>("list")?,
            id: fields.opt_integer("id")?,
        })
    }

    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        vec![
            ("name", FieldRef::value(self.name.as_str())),
            ("list", FieldRef::collection(&self.list)),
            ("id", FieldRef::value(self.id)),
        ]
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "name" => self.name = value.into_text(field)?,
            "id" => self.id = value.into_opt_integer(field)?,
            other => return Err(unknown(other)),
        }
        Ok(())
    }

    fn collection_mut(&mut self, field: &str) -> Option<Vec<&mut dyn AnyRecord>> {
        match field {
            "list" => Some(children_mut(&mut self.list)),
            _ => None,
        }
    }
}

/// Child row keyed by a composite natural key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexItem {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub complex_id: Option<i64>,
}

impl ComplexItem {
    pub fn record(value: &str, kind: i64) -> Record<Self> {
        Record::new(Self {
            value: value.to_string(),
            kind,
            complex_id: None,
        })
    }
}

impl Entity for ComplexItem {
    fn declare() -> EntityDecl {
        EntityDecl::new()
            .table("complex_item")
            .field(FieldDecl::new("value", ValueType::Text))
            .field(
                FieldDecl::new("kind", ValueType::Integer)
                    .column("type")
                    .unique_id(),
            )
            .field(
                FieldDecl::new("complex_id", ValueType::Integer)
                    .nullable()
                    .unique_id()
                    .join_column(EntityType::of::<Complex>()),
            )
    }

    fn from_fields(mut fields: Fields) -> Result<Self, FieldError> {
        Ok(Self {
            value: fields.text("value")?,
            kind: fields.integer("kind")?,
            complex_id: fields.opt_integer("complex_id")?,
        })
    }

    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        vec![
            ("value", FieldRef::value(self.value.as_str())),
            ("kind", FieldRef::value(self.kind)),
            ("complex_id", FieldRef::value(self.complex_id)),
        ]
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "value" => self.value = value.into_text(field)?,
            "kind" => self.kind = value.into_integer(field)?,
            "complex_id" => self.complex_id = value.into_opt_integer(field)?,
            other => return Err(unknown(other)),
        }
        Ok(())
    }
}

/// Date/time column plus a loaded reference to a `Basic` customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: Option<i64>,
    pub placed_at: NaiveDateTime,
    pub customer: Option<Record<Basic>>,
}

impl Entity for Order {
    fn declare() -> EntityDecl {
        EntityDecl::new()
            .table("orders")
            .field(FieldDecl::new("id", ValueType::Integer).nullable().id())
            .field(FieldDecl::new("placed_at", ValueType::DateTime))
            .field(
                FieldDecl::new("customer", ValueType::Entity(EntityType::of::<Basic>()))
                    .column("customer_id")
                    .nullable()
                    .join_column(EntityType::of::<Basic>()),
            )
    }

    fn from_fields(mut fields: Fields) -> Result<Self, FieldError> {
        Ok(Self {
            id: fields.opt_integer("id")?,
            placed_at: fields.datetime("placed_at")?,
            customer: fields.entity::<Basic>("customer")?,
        })
    }

    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        vec![
            ("id", FieldRef::value(self.id)),
            ("placed_at", FieldRef::value(self.placed_at)),
            ("customer", FieldRef::entity(self.customer.as_ref())),
        ]
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "id" => self.id = value.into_opt_integer(field)?,
            "placed_at" => self.placed_at = value.into_datetime(field)?,
            other => return Err(unknown(other)),
        }
        Ok(())
    }
}

/// Entity with an update hook bumping `revision`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub title: String,
    pub revision: i64,
    pub id: Option<i64>,
}

impl Entity for Article {
    fn declare() -> EntityDecl {
        EntityDecl::new()
            .table("article")
            .field(FieldDecl::new("title", ValueType::Text))
            .field(FieldDecl::new("revision", ValueType::Integer).default(0))
            .field(FieldDecl::new("id", ValueType::Integer).nullable().id())
            .on_update("touch")
    }

    fn from_fields(mut fields: Fields) -> Result<Self, FieldError> {
        Ok(Self {
            title: fields.text("title")?,
            revision: fields.integer("revision")?,
            id: fields.opt_integer("id")?,
        })
    }

    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        vec![
            ("title", FieldRef::value(self.title.as_str())),
            ("revision", FieldRef::value(self.revision)),
            ("id", FieldRef::value(self.id)),
        ]
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "title" => self.title = value.into_text(field)?,
            "revision" => self.revision = value.into_integer(field)?,
            "id" => self.id = value.into_opt_integer(field)?,
            other => return Err(unknown(other)),
        }
        Ok(())
    }

    fn invoke(&mut self, method: &str) -> Result<(), FieldError> {
        match method {
            "touch" => {
                self.revision += 1;
                Ok(())
            }
            other => Err(FieldError::UnknownMethod(other.to_string())),
        }
    }
}

/// No `Id` and no `UniqueId`.
#[derive(Debug, Clone, PartialEq)]
pub struct FailNoKey {
    pub name: String,
    pub price: i64,
    pub id: Option<i64>,
}

impl Entity for FailNoKey {
    fn declare() -> EntityDecl {
        EntityDecl::new()
            .table("basic")
            .field(FieldDecl::new("name", ValueType::Text))
            .field(FieldDecl::new("price", ValueType::Integer))
            .field(FieldDecl::new("id", ValueType::Integer).nullable())
    }

    fn from_fields(mut fields: Fields) -> Result<Self, FieldError> {
        Ok(Self {
            name: fields.text("name")?,
            price: fields.integer("price")?,
            id: fields.opt_integer("id")?,
        })
    }

    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        vec![
            ("name", FieldRef::value(self.name.as_str())),
            ("price", FieldRef::value(self.price)),
            ("id", FieldRef::value(self.id)),
        ]
    }

    fn set_value(&mut self, field: &str, _value: Value) -> Result<(), FieldError> {
        Err(unknown(field))
    }
}

/// Entity-typed field without a join column.
#[derive(Debug, Clone, PartialEq)]
pub struct Broken {
    pub id: Option<i64>,
    pub owner: Option<Record<Basic>>,
}

impl Entity for Broken {
    fn declare() -> EntityDecl {
        EntityDecl::new()
            .table("broken")
            .field(FieldDecl::new("id", ValueType::Integer).nullable().id())
            .field(FieldDecl::new("owner", ValueType::Entity(EntityType::of::<Basic>())).nullable())
    }

    fn from_fields(mut fields: Fields) -> Result<Self, FieldError> {
        Ok(Self {
            id: fields.opt_integer("id")?,
            owner: fields.entity::<Basic>("owner")?,
        })
    }

    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        vec![
            ("id", FieldRef::value(self.id)),
            ("owner", FieldRef::entity(self.owner.as_ref())),
        ]
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "id" => self.id = value.into_opt_integer(field)?,
            other => return Err(unknown(other)),
        }
        Ok(())
    }
}

/// Collection of a child type that has no join column back to this type.
#[derive(Debug, Clone, PartialEq)]
pub struct Orphan {
    pub id: Option<i64>,
    pub items: Vec<Record<Basic>>,
}

impl Entity for Orphan {
    fn declare() -> EntityDecl {
        EntityDecl::new()
            .table("orphan")
            .field(FieldDecl::new("id", ValueType::Integer).nullable().id())
            .field(FieldDecl::collection("items", EntityType::of::<Basic>()))
    }

    fn from_fields(mut fields: Fields) -> Result<Self, FieldError> {
        Ok(Self {
            id: fields.opt_integer("id")?,
            items: fields.collection::<Basic>("items")?,
        })
    }

    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        vec![
            ("id", FieldRef::value(self.id)),
            ("items", FieldRef::collection(&self.items)),
        ]
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "id" => self.id = value.into_opt_integer(field)?,
            other => return Err(unknown(other)),
        }
        Ok(())
    }

    fn collection_mut(&mut self, field: &str) -> Option<Vec<&mut dyn AnyRecord>> {
        match field {
            "items" => Some(children_mut(&mut self.items)),
            _ => None,
        }
    }
}

#[derive(Default)]
struct MockState {
    results: HashMap<String, VecDeque<Vec<Row>>>,
    declined: HashSet<String>,
    failing: HashSet<String>,
    insert_ids: VecDeque<String>,
    executed: Vec<(String, Params)>,
}

/// Scripted storage handle that records every executed statement.
///
/// Rows are queued per SQL text; each execution of that text consumes one
/// queued result set (an empty one once the queue is exhausted).
#[derive(Default)]
pub struct MockStorage {
    state: RefCell<MockState>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, sql: &str, rows: Vec<Row>) -> &Self {
        self.state
            .borrow_mut()
            .results
            .entry(sql.to_string())
            .or_default()
            .push_back(rows);
        self
    }

    /// Makes every execution of `sql` report `false`.
    pub fn decline(&self, sql: &str) -> &Self {
        self.state.borrow_mut().declined.insert(sql.to_string());
        self
    }

    /// Makes every execution of `sql` fail with a backend error.
    pub fn fail(&self, sql: &str) -> &Self {
        self.state.borrow_mut().failing.insert(sql.to_string());
        self
    }

    pub fn push_insert_id(&self, id: &str) -> &Self {
        self.state.borrow_mut().insert_ids.push_back(id.to_string());
        self
    }

    pub fn executed(&self) -> Vec<(String, Params)> {
        self.state.borrow().executed.clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.state
            .borrow()
            .executed
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    fn run(&self, sql: &str, params: &Params) -> DbResult<Option<VecDeque<Row>>> {
        let mut state = self.state.borrow_mut();
        state.executed.push((sql.to_string(), params.clone()));
        if state.failing.contains(sql) {
            return Err(StorageError::Backend(format!("scripted failure: {sql}")));
        }
        if state.declined.contains(sql) {
            return Ok(None);
        }
        let rows = state
            .results
            .get_mut(sql)
            .and_then(VecDeque::pop_front)
            .unwrap_or_default();
        Ok(Some(rows.into()))
    }
}

struct MockStatement<'a> {
    storage: &'a MockStorage,
    sql: String,
    rows: VecDeque<Row>,
}

impl Statement for MockStatement<'_> {
    fn execute(&mut self, params: &Params) -> DbResult<bool> {
        match self.storage.run(&self.sql, params)? {
            Some(rows) => {
                self.rows = rows;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn fetch_row(&mut self) -> DbResult<Option<Row>> {
        Ok(self.rows.pop_front())
    }
}

struct MockCursor {
    rows: VecDeque<Row>,
}

impl RowCursor for MockCursor {
    fn fetch_row(&mut self) -> DbResult<Option<Row>> {
        Ok(self.rows.pop_front())
    }
}

impl Storage for MockStorage {
    fn prepare(&self, sql: &str) -> DbResult<Box<dyn Statement + '_>> {
        Ok(Box::new(MockStatement {
            storage: self,
            sql: sql.to_string(),
            rows: VecDeque::new(),
        }))
    }

    fn query(&self, sql: &str) -> DbResult<Option<Box<dyn RowCursor + '_>>> {
        Ok(self
            .run(sql, &Params::None)?
            .map(|rows| Box::new(MockCursor { rows }) as Box<dyn RowCursor + '_>))
    }

    fn last_insert_id(&self) -> DbResult<String> {
        self.state
            .borrow_mut()
            .insert_ids
            .pop_front()
            .ok_or_else(|| StorageError::Backend("no insert id scripted".to_string()))
    }
}

pub fn basic_row(name: &str, price: i64, id: i64) -> Row {
    Row::from([
        ("name", Value::from(name)),
        ("price", Value::Integer(price)),
        ("id", Value::Integer(id)),
    ])
}

pub fn item_row(complex_id: i64, kind: i64, value: &str) -> Row {
    Row::from([
        ("complex_id", Value::Integer(complex_id)),
        ("type", Value::Integer(kind)),
        ("value", Value::from(value)),
    ])
}

pub fn named(pairs: &[(&str, Value)]) -> Params {
    Params::Named(
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
    )
}
