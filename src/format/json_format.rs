//! JSON documents

use serde_json::{Map, Number, Value as Json};

use super::document::SchemaDocument;
use super::{FormatError, FormatSerializer};
use crate::save::SaveData;
use crate::schema::SaveSchema;
use crate::value::{format_float, parse_bool, parse_float, parse_int, refine_by_key, FieldType, Value};

pub struct JsonFormat;

fn is_integer(n: &Number) -> bool {
    n.is_i64() || n.is_u64()
}

fn number_text(n: &Number) -> String {
    if is_integer(n) {
        n.to_string()
    } else {
        format_float(n.as_f64().unwrap_or_default())
    }
}

fn item_text(item: &Json) -> String {
    match item {
        Json::String(s) => s.clone(),
        Json::Number(n) => number_text(n),
        Json::Bool(b) => b.to_string(),
        Json::Null => String::new(),
        other => other.to_string(),
    }
}

/// Element type of a JSON array: the narrowest type every item fits
fn array_type(items: &[Json]) -> FieldType {
    if items.is_empty() {
        FieldType::None
    } else if items.iter().all(|i| matches!(i, Json::Number(n) if is_integer(n))) {
        FieldType::Int
    } else if items.iter().all(Json::is_number) {
        FieldType::Float
    } else if items.iter().all(Json::is_boolean) {
        FieldType::Bool
    } else {
        FieldType::String
    }
}

fn value_of(key: &str, item: &Json) -> Option<Value> {
    let value = match item {
        Json::Bool(b) => Value::bool(*b),
        Json::Number(n) if is_integer(n) => Value::scalar(FieldType::Int, n.to_string()),
        Json::Number(n) => Value::scalar(FieldType::Float, number_text(n)),
        Json::String(s) => Value::string(s.clone()),
        Json::Null => Value::string(""),
        Json::Array(items) => {
            let field_type = array_type(items);
            // ints inside a float list still need the float form
            let texts = items
                .iter()
                .map(|i| match (field_type, i) {
                    (FieldType::Float, Json::Number(n)) => format_float(n.as_f64().unwrap_or_default()),
                    _ => item_text(i),
                })
                .collect();
            Value::array(field_type, texts)
        }
        Json::Object(_) => return None,
    };
    Some(refine_by_key(key, value))
}

fn json_of(field_type: FieldType, text: &str) -> Json {
    match field_type {
        FieldType::Int => Json::Number(parse_int(text).into()),
        FieldType::Float => Number::from_f64(parse_float(text))
            .map(Json::Number)
            .unwrap_or_else(|| Json::String(text.to_string())),
        FieldType::Bool => Json::Bool(parse_bool(text)),
        _ => Json::String(text.to_string()),
    }
}

impl FormatSerializer for JsonFormat {
    fn load_config(&self, text: &str) -> Result<SaveData, FormatError> {
        let root: Json = serde_json::from_str(text)?;
        let Json::Object(map) = root else {
            return Err(FormatError::UnexpectedRoot("a JSON object"));
        };

        let mut data = SaveData::new();
        for (key, item) in &map {
            match value_of(key, item) {
                Some(value) => data.insert(key.clone(), value),
                None => log::debug!("Skipping nested JSON object '{}'", key),
            }
        }
        Ok(data)
    }

    fn save_config(&self, data: &SaveData) -> Result<String, FormatError> {
        let mut map = Map::new();
        for (key, value) in data.iter() {
            let item = match value.as_array() {
                Some(items) => Json::Array(items.iter().map(|s| json_of(value.field_type, s)).collect()),
                None => json_of(value.field_type, value.as_scalar().unwrap_or_default()),
            };
            map.insert(key.clone(), item);
        }
        Ok(serde_json::to_string_pretty(&Json::Object(map))?)
    }

    fn load_schema(&self, text: &str) -> Result<SaveSchema, FormatError> {
        let doc: SchemaDocument = serde_json::from_str(text)?;
        Ok(doc.into())
    }

    fn save_schema(&self, schema: &SaveSchema) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(&SchemaDocument::from(schema))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_typing() {
        let data = JsonFormat
            .load_config(r#"{"Lives": 3, "Speed": 2.5, "Mixed": [1, 2.5], "Ids": [4, 5]}"#)
            .unwrap();
        assert_eq!(data.get_int("Lives", 0), 3);
        assert_eq!(data.get_float("Speed", 0.0), 2.5);
        assert_eq!(data.get_float_array("Mixed"), vec![1.0, 2.5]);
        assert_eq!(data.get_int_array("Ids"), vec![4, 5]);
    }

    #[test]
    fn test_null_and_objects() {
        let data = JsonFormat
            .load_config(r#"{"Nothing": null, "Nested": {"a": 1}, "Tags": ["a", 1, true]}"#)
            .unwrap();
        assert_eq!(data.get_string("Nothing", "x"), "");
        assert!(!data.contains_key("Nested"));
        assert_eq!(data.get_string_array("Tags"), vec!["a", "1", "true"]);
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(
            JsonFormat.load_config("[1, 2]"),
            Err(FormatError::UnexpectedRoot(_))
        ));
        assert!(matches!(JsonFormat.load_config("{oops"), Err(FormatError::Json(_))));
    }
}
