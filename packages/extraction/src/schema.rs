//! Extraction schemas as data.
//!
//! A schema is a record shape (field name → [`FieldType`]) plus whether the
//! model should answer with a list of records or a single record. Only a small
//! closed set of primitive kinds is supported; anything else is rejected when
//! a JSON-Schema document is read.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::error::SchemaError;

/// Declared type of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    StringArray,
}

impl FieldType {
    fn to_json(self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Number => json!({ "type": "number" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
        }
    }

    fn from_json(field: &str, value: &Value) -> Result<Self, SchemaError> {
        let unsupported = || SchemaError::UnsupportedField {
            field: field.to_string(),
            found: value.to_string(),
        };

        match value.get("type").and_then(Value::as_str) {
            Some("string") => Ok(Self::String),
            Some("number") | Some("integer") => Ok(Self::Number),
            Some("boolean") => Ok(Self::Boolean),
            Some("array") => match value.pointer("/items/type").and_then(Value::as_str) {
                Some("string") => Ok(Self::StringArray),
                _ => Err(unsupported()),
            },
            _ => Err(unsupported()),
        }
    }
}

/// Whether the model returns many records or one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    List,
    Single,
}

/// Field-level description of the records to extract.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSchema {
    shape: Shape,
    fields: IndexMap<String, FieldType>,
    required: Vec<String>,
}

impl ExtractionSchema {
    /// Schema for a list of records.
    pub fn list() -> Self {
        Self {
            shape: Shape::List,
            fields: IndexMap::new(),
            required: Vec::new(),
        }
    }

    /// Schema for a single record.
    pub fn single() -> Self {
        Self {
            shape: Shape::Single,
            ..Self::list()
        }
    }

    /// Declare a field.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    /// Declare a field the model must always fill.
    pub fn required_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.field(name, field_type)
    }

    /// Mark fields as required. Names must already be declared.
    pub fn require<I, S>(mut self, names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.fields.contains_key(&name) {
                return Err(SchemaError::UnknownRequired(name));
            }
            if !self.required.contains(&name) {
                self.required.push(name);
            }
        }
        Ok(self)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Read a JSON-Schema-like document.
    ///
    /// Accepts `{"type": "array", "items": {<object>}}` or a bare
    /// `{"type": "object", "properties": {...}}`.
    pub fn from_json(document: &Value) -> Result<Self, SchemaError> {
        let top = document
            .as_object()
            .ok_or_else(|| SchemaError::Malformed("schema must be a JSON object".into()))?;

        let (shape, record) = match top.get("type").and_then(Value::as_str) {
            Some("array") => {
                let items = top
                    .get("items")
                    .and_then(Value::as_object)
                    .ok_or_else(|| SchemaError::Malformed("array schema without items".into()))?;
                match items.get("type").and_then(Value::as_str) {
                    Some("object") | None => (Shape::List, items),
                    Some(other) => return Err(SchemaError::UnsupportedShape(format!("array of {other}"))),
                }
            }
            Some("object") | None => (Shape::Single, top),
            Some(other) => return Err(SchemaError::UnsupportedShape(other.to_string())),
        };

        let properties = record
            .get("properties")
            .and_then(Value::as_object)
            .filter(|props| !props.is_empty())
            .ok_or(SchemaError::NoProperties)?;

        let mut schema = Self {
            shape,
            fields: IndexMap::with_capacity(properties.len()),
            required: Vec::new(),
        };
        for (name, value) in properties {
            schema
                .fields
                .insert(name.clone(), FieldType::from_json(name, value)?);
        }

        let required: Vec<String> = match record.get("required") {
            None => Vec::new(),
            Some(Value::Array(names)) => names
                .iter()
                .map(|n| {
                    n.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| SchemaError::Malformed("required must list strings".into()))
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(SchemaError::Malformed("required must be an array".into())),
        };

        schema.require(required)
    }

    /// Render back to a JSON-Schema document for the prompt.
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        for (name, ty) in &self.fields {
            properties.insert(name.clone(), ty.to_json());
        }

        let mut record = Map::new();
        record.insert("type".into(), json!("object"));
        record.insert("properties".into(), Value::Object(properties));
        if !self.required.is_empty() {
            record.insert("required".into(), json!(self.required));
        }

        match self.shape {
            Shape::List => json!({ "type": "array", "items": Value::Object(record) }),
            Shape::Single => Value::Object(record),
        }
    }
}
