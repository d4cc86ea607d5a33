//! Schema document layout
//!
//! The on-disk shape of a schema for the serde-driven formats (TOML, JSON,
//! YAML): a `Fields` list of PascalCase records.

use serde::{Deserialize, Deserializer, Serialize};

use crate::schema::{FieldDescriptor, SaveSchema};
use crate::value::{format_float, FieldType};

/// Root of a schema file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SchemaDocument {
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
}

/// One field as written to disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FieldRecord {
    pub name: String,
    #[serde(rename = "Type")]
    pub field_type: String,
    pub is_array: bool,
    #[serde(deserialize_with = "lenient_text")]
    pub default_value: String,
    #[serde(deserialize_with = "lenient_text_list")]
    pub default_array: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub enable_validation: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub min_value: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub max_value: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub regex_pattern: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub validation_error_message: String,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_zero(f: &f64) -> bool {
    *f == 0.0
}

/// Hand-written files often use native scalars for defaults
#[derive(Deserialize)]
#[serde(untagged)]
enum Text {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<Text> for String {
    fn from(text: Text) -> Self {
        match text {
            Text::Str(s) => s,
            Text::Int(i) => i.to_string(),
            Text::Float(f) => format_float(f),
            Text::Bool(b) => b.to_string(),
        }
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Text::deserialize(deserializer)?.into())
}

fn lenient_text_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = Vec::<Text>::deserialize(deserializer)?;
    Ok(items.into_iter().map(String::from).collect())
}

impl From<&FieldDescriptor> for FieldRecord {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            name: field.name.clone(),
            field_type: field.field_type.name().to_string(),
            is_array: field.is_array,
            default_value: field.default_value.clone(),
            default_array: field.default_array.clone(),
            enable_validation: field.enable_validation,
            min_value: field.min_value,
            max_value: field.max_value,
            regex_pattern: field.regex_pattern.clone(),
            validation_error_message: field.validation_error_message.clone(),
        }
    }
}

impl From<FieldRecord> for FieldDescriptor {
    fn from(record: FieldRecord) -> Self {
        Self {
            name: record.name,
            field_type: FieldType::parse(&record.field_type),
            is_array: record.is_array,
            default_value: record.default_value,
            default_array: record.default_array,
            enable_validation: record.enable_validation,
            min_value: record.min_value,
            max_value: record.max_value,
            regex_pattern: record.regex_pattern,
            validation_error_message: record.validation_error_message,
        }
    }
}

impl From<&SaveSchema> for SchemaDocument {
    fn from(schema: &SaveSchema) -> Self {
        Self { fields: schema.iter().map(FieldRecord::from).collect() }
    }
}

impl From<SchemaDocument> for SaveSchema {
    /// Records without a name are dropped
    fn from(doc: SchemaDocument) -> Self {
        doc.fields
            .into_iter()
            .filter(|record| {
                let keep = !record.name.trim().is_empty();
                if !keep {
                    log::warn!("Skipping schema field without a name");
                }
                keep
            })
            .map(FieldDescriptor::from)
            .collect()
    }
}
