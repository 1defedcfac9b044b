//! Schema types

use arrow::datatypes::{DataType, Field, Fields, Schema};
use serde_json::{json, Value};
use std::sync::Arc;

/// Logical type of a field in the static schema tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Int,
    Long,
    Double,
    Boolean,
    /// Array of `{name, value}` string pairs (activity attributes)
    NameValueList,
    /// Nested JSON kept as its serialized text
    Json,
}

impl FieldType {
    /// Arrow type used for the columnar output
    pub fn arrow_type(&self) -> DataType {
        match self {
            FieldType::String | FieldType::Json => DataType::Utf8,
            FieldType::Int | FieldType::Long => DataType::Int64,
            FieldType::Double => DataType::Float64,
            FieldType::Boolean => DataType::Boolean,
            FieldType::NameValueList => {
                let pair = Fields::from(vec![
                    Field::new("name", DataType::Utf8, true),
                    Field::new("value", DataType::Utf8, true),
                ]);
                DataType::List(Arc::new(Field::new("item", DataType::Struct(pair), true)))
            }
        }
    }

    /// Record-style type descriptor
    pub fn descriptor(&self) -> Value {
        match self {
            FieldType::String | FieldType::Json => json!(["null", "string"]),
            FieldType::Int => json!(["null", "int"]),
            FieldType::Long => json!(["null", "long"]),
            FieldType::Double => json!(["null", "double"]),
            FieldType::Boolean => json!(["null", "boolean"]),
            FieldType::NameValueList => json!(["null", {
                "type": "array",
                "items": {
                    "name": "attribute",
                    "type": "record",
                    "fields": [
                        {"name": "name", "type": ["null", "string"], "default": null},
                        {"name": "value", "type": ["null", "string"], "default": null}
                    ]
                }
            }]),
        }
    }
}

/// One expected field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub field_type: FieldType,
}

impl FieldSchema {
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self { name, field_type }
    }
}

/// Expected fields for one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSchema],
}

impl EndpointSchema {
    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Arrow schema with every column nullable
    pub fn arrow_schema(&self) -> Schema {
        let fields: Vec<Field> = self
            .fields
            .iter()
            .map(|f| Field::new(f.name, f.field_type.arrow_type(), true))
            .collect();
        Schema::new(fields)
    }

    /// Record-style JSON description of the schema
    pub fn to_json(&self) -> Value {
        let fields: Vec<Value> = self
            .fields
            .iter()
            .map(|f| {
                json!({
                    "name": f.name,
                    "type": f.field_type.descriptor(),
                    "default": null
                })
            })
            .collect();

        json!({
            "name": self.name,
            "type": "record",
            "fields": fields
        })
    }
}
