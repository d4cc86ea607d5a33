//! Schema generation and struct capture
//!
//! Any `Serialize` type can be inspected through its serde representation.
//! Top-level fields become save fields; `{x,y,z}` objects are vectors and
//! `{pitch,yaw,roll}` objects are rotators.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value as Json};
use thiserror::Error;

use crate::save::SaveData;
use crate::value::{format_float, parse_bool, parse_float, parse_int, FieldType, Rotator, Value, Vector3};
use super::descriptor::{FieldDescriptor, SaveSchema};

/// Errors from inspecting or rebuilding a struct
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("{type_name} does not serialize as a struct")]
    NotAStruct { type_name: &'static str },

    #[error("{type_name} has no fields that can be saved")]
    NoFields { type_name: &'static str },

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Serialize a value and require a top-level object
fn object_of<T: Serialize>(value: &T) -> Result<Map<String, Json>, SchemaError> {
    match serde_json::to_value(value)? {
        Json::Object(map) => Ok(map),
        _ => Err(SchemaError::NotAStruct { type_name: std::any::type_name::<T>() }),
    }
}

fn number_of(map: &Map<String, Json>, key: &str) -> Option<f64> {
    map.get(key).and_then(Json::as_f64)
}

/// Detect the save type and text of one JSON scalar
fn scalar_of(json: &Json) -> Option<(FieldType, String)> {
    match json {
        Json::Bool(b) => Some((FieldType::Bool, b.to_string())),
        Json::Number(n) if n.is_i64() || n.is_u64() => Some((FieldType::Int, n.to_string())),
        Json::Number(n) => n.as_f64().map(|f| (FieldType::Float, format_float(f))),
        Json::String(s) => Some((FieldType::String, s.clone())),
        Json::Object(map) if map.len() == 3 => {
            if let (Some(x), Some(y), Some(z)) =
                (number_of(map, "x"), number_of(map, "y"), number_of(map, "z"))
            {
                return Some((FieldType::Vector, Vector3::new(x, y, z).to_string()));
            }
            if let (Some(p), Some(y), Some(r)) =
                (number_of(map, "pitch"), number_of(map, "yaw"), number_of(map, "roll"))
            {
                return Some((FieldType::Rotator, Rotator::new(p, y, r).to_string()));
            }
            None
        }
        _ => None,
    }
}

/// Convert one JSON field into a save value. Arrays take their first
/// element's type and must be homogeneous.
fn value_of(json: &Json) -> Option<Value> {
    match json {
        Json::Array(items) => {
            let mut field_type = FieldType::None;
            let mut texts = Vec::with_capacity(items.len());
            for item in items {
                let (t, text) = scalar_of(item)?;
                if field_type == FieldType::None {
                    field_type = t;
                } else if field_type != t {
                    // ints mixed into a float list
                    if field_type == FieldType::Float && t == FieldType::Int {
                        texts.push(format_float(parse_float(&text)));
                        continue;
                    }
                    return None;
                }
                texts.push(text);
            }
            Some(Value::array(field_type, texts))
        }
        other => scalar_of(other).map(|(t, text)| Value::scalar(t, text)),
    }
}

/// Build a schema from the default value of `T`.
///
/// Fields whose type cannot be detected (null, empty arrays, nested
/// structs) are skipped with a warning.
pub fn generate_schema<T: Serialize + Default>() -> Result<SaveSchema, SchemaError> {
    let type_name = std::any::type_name::<T>();
    let object = object_of(&T::default())?;

    let mut schema = SaveSchema::new();
    for (name, json) in &object {
        match value_of(json) {
            Some(value) if value.field_type != FieldType::None => {
                let field = match value.as_array() {
                    Some(items) => FieldDescriptor::array(name.clone(), value.field_type, items.to_vec()),
                    None => FieldDescriptor::scalar(
                        name.clone(),
                        value.field_type,
                        value.as_scalar().unwrap_or_default(),
                    ),
                };
                schema.insert(field);
            }
            _ => log::warn!("Skipping field '{}' of {}: unsupported or unknown type", name, type_name),
        }
    }

    if schema.is_empty() {
        return Err(SchemaError::NoFields { type_name });
    }

    log::info!("Generated schema with {} fields from {}", schema.len(), type_name);
    Ok(schema)
}

/// Write every detectable field of `value` into `data`. Returns the count.
pub fn capture<T: Serialize>(value: &T, data: &mut SaveData) -> Result<usize, SchemaError> {
    let object = object_of(value)?;
    let mut count = 0;
    for (name, json) in &object {
        match value_of(json) {
            Some(v) => {
                data.insert(name.clone(), v);
                count += 1;
            }
            None => log::debug!("Not capturing field '{}'", name),
        }
    }
    Ok(count)
}

/// Convert one save text item back to JSON for its type
fn json_of(field_type: FieldType, text: &str) -> Json {
    match field_type {
        FieldType::Int => Json::Number(parse_int(text).into()),
        FieldType::Float => Number::from_f64(parse_float(text)).map(Json::Number).unwrap_or(Json::Null),
        FieldType::Bool => Json::Bool(parse_bool(text)),
        FieldType::String | FieldType::None => Json::String(text.to_string()),
        FieldType::Vector => {
            let v = Vector3::parse(text).unwrap_or_default();
            serde_json::json!({ "x": v.x, "y": v.y, "z": v.z })
        }
        FieldType::Rotator => {
            let r = Rotator::parse(text).unwrap_or_default();
            serde_json::json!({ "pitch": r.pitch, "yaw": r.yaw, "roll": r.roll })
        }
    }
}

fn json_of_value(value: &Value) -> Json {
    match value.as_array() {
        Some(items) => Json::Array(items.iter().map(|s| json_of(value.field_type, s)).collect()),
        None => json_of(value.field_type, value.as_scalar().unwrap_or_default()),
    }
}

/// Whether a restored JSON value has the same shape as the default
fn same_kind(default: &Json, restored: &Json) -> bool {
    match (default, restored) {
        (Json::Null, _) => true,
        (Json::Bool(_), Json::Bool(_)) => true,
        (Json::Number(_), Json::Number(_)) => true,
        (Json::String(_), Json::String(_)) => true,
        (Json::Array(_), Json::Array(_)) => true,
        (Json::Object(_), Json::Object(_)) => true,
        _ => false,
    }
}

/// Rebuild `T` from `data`, starting from `T::default()`.
///
/// Missing keys and values that do not fit their field keep the default.
/// Each field is accepted only if `T` still deserializes with it in place.
pub fn restore<T: Serialize + DeserializeOwned + Default>(data: &SaveData) -> Result<T, SchemaError> {
    let mut object = object_of(&T::default())?;
    let names: Vec<String> = object.keys().cloned().collect();

    for name in names {
        let Some(value) = data.get(&name) else { continue };
        let restored = json_of_value(value);
        let fits = object.get(&name).is_some_and(|slot| same_kind(slot, &restored)) && {
            let mut trial = object.clone();
            trial.insert(name.clone(), restored.clone());
            serde_json::from_value::<T>(Json::Object(trial)).is_ok()
        };

        if fits {
            object.insert(name, restored);
        } else {
            log::warn!("Keeping default for '{}': saved {} does not fit", name, value.field_type);
        }
    }
    Ok(serde_json::from_value(Json::Object(object))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Hero {
        name: String,
        level: u32,
        health: f32,
        alive: bool,
        spawn: Vector3,
        facing: Rotator,
        scores: Vec<i32>,
        nickname: Option<String>,
    }

    impl Default for Hero {
        fn default() -> Self {
            Self {
                name: "Hero".into(),
                level: 1,
                health: 100.0,
                alive: true,
                spawn: Vector3::new(0.0, 0.0, 100.0),
                facing: Rotator::ZERO,
                scores: vec![0, 0, 0],
                nickname: None,
            }
        }
    }

    #[test]
    fn test_generate_schema_types() {
        let schema = generate_schema::<Hero>().unwrap();
        assert_eq!(schema.get("name").map(|f| f.field_type), Some(FieldType::String));
        assert_eq!(schema.get("level").map(|f| f.field_type), Some(FieldType::Int));
        assert_eq!(schema.get("health").map(|f| f.field_type), Some(FieldType::Float));
        assert_eq!(schema.get("alive").map(|f| f.field_type), Some(FieldType::Bool));
        assert_eq!(schema.get("spawn").map(|f| f.field_type), Some(FieldType::Vector));
        assert_eq!(schema.get("facing").map(|f| f.field_type), Some(FieldType::Rotator));

        let scores = schema.get("scores").unwrap();
        assert!(scores.is_array);
        assert_eq!(scores.default_array.len(), 3);

        // None serializes as null and is skipped
        assert!(schema.get("nickname").is_none());
        assert_eq!(schema.get("health").unwrap().default_value, "100.0");
    }

    #[derive(Debug, Default, Serialize)]
    struct Empty {
        nothing: Option<u8>,
    }

    #[test]
    fn test_generate_schema_without_fields_fails() {
        assert!(matches!(generate_schema::<Empty>(), Err(SchemaError::NoFields { .. })));
        assert!(matches!(generate_schema::<u32>(), Err(SchemaError::NotAStruct { .. })));
    }

    #[test]
    fn test_capture_and_restore() {
        let hero = Hero {
            name: "Mira".into(),
            level: 12,
            health: 42.5,
            alive: false,
            spawn: Vector3::new(1.0, 2.0, 3.0),
            facing: Rotator::new(0.0, 180.0, 0.0),
            scores: vec![5, 10],
            nickname: Some("M".into()),
        };

        let mut data = SaveData::new();
        let count = capture(&hero, &mut data).unwrap();
        assert_eq!(count, 8);
        assert_eq!(data.get_int("level", 0), 12);
        assert_eq!(data.get_vector("spawn", Vector3::ZERO), Vector3::new(1.0, 2.0, 3.0));

        let back: Hero = restore(&data).unwrap();
        assert_eq!(back, hero);
    }

    #[test]
    fn test_restore_keeps_defaults() {
        let mut data = SaveData::new();
        data.set_string("level", "not a number");
        data.set_int("unrelated", 5);

        let hero: Hero = restore(&data).unwrap();
        assert_eq!(hero, Hero::default());
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Stats {
        level: u8,
        name: String,
    }

    impl Default for Stats {
        fn default() -> Self {
            Self { level: 1, name: "Hero".into() }
        }
    }

    #[test]
    fn test_restore_skips_values_that_do_not_fit() {
        let mut data = SaveData::new();
        data.set_float("level", 2.5);
        data.set_string("name", "Mira");
        let stats: Stats = restore(&data).unwrap();
        assert_eq!(stats, Stats { level: 1, name: "Mira".into() });

        // out of range for u8
        data.set_int("level", 300);
        let stats: Stats = restore(&data).unwrap();
        assert_eq!(stats.level, 1);
        assert_eq!(stats.name, "Mira");

        data.set_int("level", 42);
        assert_eq!(restore::<Stats>(&data).unwrap().level, 42);
    }
}
