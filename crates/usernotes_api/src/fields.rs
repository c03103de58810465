//! Extra computed fields attached to serialized records.
//!
//! # Invariants
//! - Field names are unique and never shadow core record fields.
//! - Fields are read-only projections of the stored record.

use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use usernotes_core::{Record, RequestContext};

/// Boolean field exposing whether a record is a private note.
pub const IS_PRIVATE_FIELD: &str = "is_private";

const CORE_FIELDS: [&str; 7] = [
    "id",
    "item_id",
    "author_id",
    "kind",
    "content",
    "status",
    "created_at",
];

type FieldGetter = Box<dyn Fn(&RequestContext, &Record) -> Value + Send + Sync>;

struct RestField {
    name: String,
    schema_type: &'static str,
    getter: FieldGetter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    EmptyName,
    ReservedName(String),
    DuplicateField(String),
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "field name must not be empty"),
            Self::ReservedName(name) => write!(f, "field `{name}` is a core record field"),
            Self::DuplicateField(name) => write!(f, "field `{name}` is already registered"),
        }
    }
}

impl Error for FieldError {}

/// Ordered registry of computed record fields.
pub struct RestFieldRegistry {
    fields: Vec<RestField>,
}

impl Default for RestFieldRegistry {
    /// Registry with the `is_private` boolean field.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.fields.push(RestField {
            name: IS_PRIVATE_FIELD.to_string(),
            schema_type: "boolean",
            getter: Box::new(|_ctx: &RequestContext, record: &Record| {
                Value::Bool(record.is_private_note())
            }),
        });
        registry
    }
}

impl RestFieldRegistry {
    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn register(
        &mut self,
        name: &str,
        schema_type: &'static str,
        getter: impl Fn(&RequestContext, &Record) -> Value + Send + Sync + 'static,
    ) -> Result<(), FieldError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FieldError::EmptyName);
        }
        if CORE_FIELDS.contains(&name) {
            return Err(FieldError::ReservedName(name.to_string()));
        }
        if self.fields.iter().any(|field| field.name == name) {
            return Err(FieldError::DuplicateField(name.to_string()));
        }
        self.fields.push(RestField {
            name: name.to_string(),
            schema_type,
            getter: Box::new(getter),
        });
        Ok(())
    }

    /// `{ name: { "type": schema_type } }` for every registered field.
    pub fn schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut schema = Map::new();
            schema.insert("type".to_string(), Value::from(field.schema_type));
            properties.insert(field.name.clone(), Value::Object(schema));
        }
        Value::Object(properties)
    }

    /// Serializes one record with every registered field appended.
    pub fn record_json(&self, ctx: &RequestContext, record: &Record) -> Value {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::from(record.id));
        object.insert("item_id".to_string(), Value::from(record.item_id));
        object.insert(
            "author_id".to_string(),
            record.author_id.map(Value::from).unwrap_or(Value::Null),
        );
        object.insert("kind".to_string(), Value::from(record.kind.as_str()));
        object.insert("content".to_string(), Value::from(record.body.as_str()));
        object.insert("status".to_string(), Value::from(record.status.as_str()));
        object.insert("created_at".to_string(), Value::from(record.created_at));
        for field in &self.fields {
            object.insert(field.name.clone(), (field.getter)(ctx, record));
        }
        Value::Object(object)
    }
}
