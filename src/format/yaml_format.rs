//! YAML documents

use serde_yaml::{Mapping, Number, Value as Yaml};

use super::document::SchemaDocument;
use super::{FormatError, FormatSerializer};
use crate::save::SaveData;
use crate::schema::SaveSchema;
use crate::value::{format_float, parse_bool, parse_float, parse_int, refine_by_key, FieldType, Value};

pub struct YamlFormat;

fn is_integer(n: &Number) -> bool {
    n.is_i64() || n.is_u64()
}

/// Type and text of one YAML scalar
fn scalar_of(item: &Yaml) -> Option<(FieldType, String)> {
    match item {
        Yaml::Bool(b) => Some((FieldType::Bool, b.to_string())),
        Yaml::Number(n) if is_integer(n) => Some((FieldType::Int, n.to_string())),
        Yaml::Number(n) => Some((FieldType::Float, format_float(n.as_f64().unwrap_or_default()))),
        Yaml::String(s) => Some((FieldType::String, s.clone())),
        Yaml::Null => Some((FieldType::String, String::new())),
        _ => None,
    }
}

fn value_of(key: &str, item: &Yaml) -> Option<Value> {
    let value = match item {
        Yaml::Sequence(items) => {
            let mut field_type = FieldType::None;
            let mut texts = Vec::with_capacity(items.len());
            for item in items {
                let (t, text) = scalar_of(item)?;
                field_type = match (field_type, t) {
                    (FieldType::None, t) => t,
                    (FieldType::Int, FieldType::Float) | (FieldType::Float, FieldType::Int) => FieldType::Float,
                    (current, t) if current == t => current,
                    _ => FieldType::String,
                };
                texts.push(text);
            }
            if field_type == FieldType::Float {
                texts = texts.iter().map(|s| format_float(parse_float(s))).collect();
            }
            Value::array(field_type, texts)
        }
        other => {
            let (t, text) = scalar_of(other)?;
            Value::scalar(t, text)
        }
    };
    Some(refine_by_key(key, value))
}

fn yaml_of(field_type: FieldType, text: &str) -> Yaml {
    match field_type {
        FieldType::Int => Yaml::Number(parse_int(text).into()),
        FieldType::Float => Yaml::Number(parse_float(text).into()),
        FieldType::Bool => Yaml::Bool(parse_bool(text)),
        _ => Yaml::String(text.to_string()),
    }
}

/// Mapping keys may be plain scalars of any type
fn key_text(key: &Yaml) -> Option<String> {
    match key {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl FormatSerializer for YamlFormat {
    fn load_config(&self, text: &str) -> Result<SaveData, FormatError> {
        let root: Yaml = serde_yaml::from_str(text)?;
        let map = match root {
            Yaml::Mapping(map) => map,
            Yaml::Null => Mapping::new(),
            _ => return Err(FormatError::UnexpectedRoot("a YAML mapping")),
        };

        let mut data = SaveData::new();
        for (key, item) in &map {
            let Some(key) = key_text(key) else { continue };
            match value_of(&key, item) {
                Some(value) => data.insert(key, value),
                None => log::debug!("Skipping unsupported YAML entry '{}'", key),
            }
        }
        Ok(data)
    }

    fn save_config(&self, data: &SaveData) -> Result<String, FormatError> {
        let mut map = Mapping::new();
        for (key, value) in data.iter() {
            let item = match value.as_array() {
                Some(items) => Yaml::Sequence(items.iter().map(|s| yaml_of(value.field_type, s)).collect()),
                None => yaml_of(value.field_type, value.as_scalar().unwrap_or_default()),
            };
            map.insert(Yaml::String(key.clone()), item);
        }
        Ok(serde_yaml::to_string(&Yaml::Mapping(map))?)
    }

    fn load_schema(&self, text: &str) -> Result<SaveSchema, FormatError> {
        let doc: SchemaDocument = serde_yaml::from_str(text)?;
        Ok(doc.into())
    }

    fn save_schema(&self, schema: &SaveSchema) -> Result<String, FormatError> {
        Ok(serde_yaml::to_string(&SchemaDocument::from(schema))?)
    }
}
