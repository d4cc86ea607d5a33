//! TOML documents
//!
//! Config keys are top-level entries with native TOML types. Vectors and
//! rotators are written as "x,y,z" strings and recognised by key on load.

use toml::{Table, Value as Toml};

use super::document::SchemaDocument;
use super::{FormatError, FormatSerializer};
use crate::save::SaveData;
use crate::schema::SaveSchema;
use crate::value::{format_float, parse_bool, parse_float, parse_int, refine_by_key, FieldType, Value};

pub struct TomlFormat;

/// Map a toml parse error to a message with a 1-based line number
fn parse_error(text: &str, err: toml::de::Error) -> FormatError {
    let line = err
        .span()
        .and_then(|span| text.get(..span.start))
        .map(|before| before.matches('\n').count() + 1)
        .unwrap_or(0);
    FormatError::TomlParse { message: err.message().to_string(), line }
}

/// Type and text of a single TOML item, if it is a supported scalar
fn scalar_of(item: &Toml) -> Option<(FieldType, String)> {
    match item {
        Toml::String(s) => Some((FieldType::String, s.clone())),
        Toml::Integer(i) => Some((FieldType::Int, i.to_string())),
        Toml::Float(f) => Some((FieldType::Float, format_float(*f))),
        Toml::Boolean(b) => Some((FieldType::Bool, b.to_string())),
        _ => None,
    }
}

fn value_of(key: &str, item: &Toml) -> Option<Value> {
    match item {
        Toml::Array(items) => {
            let Some(first) = items.first() else {
                return Some(Value::array(FieldType::None, Vec::new()));
            };
            let (field_type, _) = scalar_of(first)?;
            let texts = items.iter().filter_map(scalar_of).map(|(_, text)| text).collect();
            Some(refine_by_key(key, Value::array(field_type, texts)))
        }
        other => scalar_of(other).map(|(t, text)| refine_by_key(key, Value::scalar(t, text))),
    }
}

fn toml_of(field_type: FieldType, text: &str) -> Toml {
    match field_type {
        FieldType::Int => Toml::Integer(parse_int(text)),
        FieldType::Float => Toml::Float(parse_float(text)),
        FieldType::Bool => Toml::Boolean(parse_bool(text)),
        _ => Toml::String(text.to_string()),
    }
}

impl FormatSerializer for TomlFormat {
    fn load_config(&self, text: &str) -> Result<SaveData, FormatError> {
        let table: Table = text.parse().map_err(|e| parse_error(text, e))?;

        let mut data = SaveData::new();
        for (key, item) in &table {
            match value_of(key, item) {
                Some(value) => data.insert(key.clone(), value),
                None => log::debug!("Skipping unsupported TOML entry '{}'", key),
            }
        }
        Ok(data)
    }

    fn save_config(&self, data: &SaveData) -> Result<String, FormatError> {
        let mut table = Table::new();
        for (key, value) in data.iter() {
            let item = match value.as_array() {
                Some(items) => Toml::Array(items.iter().map(|s| toml_of(value.field_type, s)).collect()),
                None => toml_of(value.field_type, value.as_scalar().unwrap_or_default()),
            };
            table.insert(key.clone(), item);
        }
        Ok(toml::to_string_pretty(&table)?)
    }

    fn load_schema(&self, text: &str) -> Result<SaveSchema, FormatError> {
        let doc: SchemaDocument = toml::from_str(text).map_err(|e| parse_error(text, e))?;
        Ok(doc.into())
    }

    fn save_schema(&self, schema: &SaveSchema) -> Result<String, FormatError> {
        Ok(toml::to_string_pretty(&SchemaDocument::from(schema))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_types() {
        let text = r#"
Level = 5
Speed = 1.5
Alive = true
Name = "Ash"
Spawn_Pos = "1,2,3"
Scores = [1, 2, 3]
Empty = []
"#;
        let data = TomlFormat.load_config(text).unwrap();
        assert_eq!(data.get_int("Level", 0), 5);
        assert_eq!(data.get_float("Speed", 0.0), 1.5);
        assert!(data.get_bool("Alive", false));
        assert_eq!(data.get_string("Name", ""), "Ash");
        assert_eq!(data.get("Spawn_Pos").map(|v| v.field_type), Some(FieldType::Vector));
        assert_eq!(data.get_int_array("Scores"), vec![1, 2, 3]);

        let empty = data.get("Empty").unwrap();
        assert!(empty.is_array());
        assert_eq!(empty.field_type, FieldType::None);
    }

    #[test]
    fn test_tables_are_skipped() {
        let data = TomlFormat.load_config("Gold = 3\n[Nested]\nInner = 1\n").unwrap();
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_parse_error_has_line() {
        let err = TomlFormat.load_config("Good = 1\nBad = = 2\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("TOML parse error:"), "{}", msg);
        assert!(msg.contains("(line 2)"), "{}", msg);
    }

    #[test]
    fn test_schema_without_fields_is_empty() {
        let schema = TomlFormat.load_schema("Version = 1\n").unwrap();
        assert!(schema.is_empty());
    }

    #[test]
    fn test_schema_skips_nameless_fields() {
        let text = r#"
[[Fields]]
Name = "Gold"
Type = "int"
DefaultValue = 100

[[Fields]]
Type = "String"
"#;
        let schema = TomlFormat.load_schema(text).unwrap();
        assert_eq!(schema.len(), 1);
        let gold = schema.get("Gold").unwrap();
        assert_eq!(gold.field_type, FieldType::Int);
        assert_eq!(gold.default_value, "100");
    }
}
