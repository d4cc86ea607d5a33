//! In-memory save data
//!
//! A typed key/value map. Getters never fail: a missing key, wrong shape or
//! wrong type yields the caller's default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value::{format_float, parse_bool, parse_float, parse_int, FieldType, Rotator, Value, Vector3};

/// Keyed collection of values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveData {
    values: BTreeMap<String, Value>,
}

impl SaveData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Whether a key exists, whatever its type
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Remove a key, returning its old value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Scalar text for a key if it holds the expected type
    fn scalar_of(&self, key: &str, field_type: FieldType) -> Option<&str> {
        self.values
            .get(key)
            .filter(|v| v.field_type == field_type)
            .and_then(Value::as_scalar)
    }

    /// Array items for a key if it holds the expected type
    fn array_of(&self, key: &str, field_type: FieldType) -> Option<&[String]> {
        self.values
            .get(key)
            .filter(|v| v.field_type == field_type)
            .and_then(Value::as_array)
    }

    // ========================================================================
    // Scalars
    // ========================================================================

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.scalar_of(key, FieldType::Int).map(parse_int).unwrap_or(default)
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i64) {
        self.insert(key, Value::int(value));
    }

    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        self.scalar_of(key, FieldType::Float).map(parse_float).unwrap_or(default)
    }

    pub fn set_float(&mut self, key: impl Into<String>, value: f64) {
        self.insert(key, Value::float(value));
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.scalar_of(key, FieldType::Bool).map(parse_bool).unwrap_or(default)
    }

    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.insert(key, Value::bool(value));
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.scalar_of(key, FieldType::String).unwrap_or(default).to_string()
    }

    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, Value::string(value));
    }

    /// Vector value; malformed text also yields the default
    pub fn get_vector(&self, key: &str, default: Vector3) -> Vector3 {
        self.scalar_of(key, FieldType::Vector)
            .and_then(Vector3::parse)
            .unwrap_or(default)
    }

    pub fn set_vector(&mut self, key: impl Into<String>, value: Vector3) {
        self.insert(key, Value::vector(value));
    }

    /// Rotator value; malformed text also yields the default
    pub fn get_rotator(&self, key: &str, default: Rotator) -> Rotator {
        self.scalar_of(key, FieldType::Rotator)
            .and_then(Rotator::parse)
            .unwrap_or(default)
    }

    pub fn set_rotator(&mut self, key: impl Into<String>, value: Rotator) {
        self.insert(key, Value::rotator(value));
    }

    // ========================================================================
    // Arrays
    // ========================================================================

    pub fn get_int_array(&self, key: &str) -> Vec<i64> {
        self.array_of(key, FieldType::Int)
            .map(|items| items.iter().map(|s| parse_int(s)).collect())
            .unwrap_or_default()
    }

    pub fn set_int_array(&mut self, key: impl Into<String>, values: &[i64]) {
        let items = values.iter().map(|v| v.to_string()).collect();
        self.insert(key, Value::array(FieldType::Int, items));
    }

    pub fn get_float_array(&self, key: &str) -> Vec<f64> {
        self.array_of(key, FieldType::Float)
            .map(|items| items.iter().map(|s| parse_float(s)).collect())
            .unwrap_or_default()
    }

    pub fn set_float_array(&mut self, key: impl Into<String>, values: &[f64]) {
        let items = values.iter().map(|v| format_float(*v)).collect();
        self.insert(key, Value::array(FieldType::Float, items));
    }

    pub fn get_bool_array(&self, key: &str) -> Vec<bool> {
        self.array_of(key, FieldType::Bool)
            .map(|items| items.iter().map(|s| parse_bool(s)).collect())
            .unwrap_or_default()
    }

    pub fn set_bool_array(&mut self, key: impl Into<String>, values: &[bool]) {
        let items = values.iter().map(|v| v.to_string()).collect();
        self.insert(key, Value::array(FieldType::Bool, items));
    }

    pub fn get_string_array(&self, key: &str) -> Vec<String> {
        self.array_of(key, FieldType::String)
            .map(|items| items.to_vec())
            .unwrap_or_default()
    }

    pub fn set_string_array<S: AsRef<str>>(&mut self, key: impl Into<String>, values: &[S]) {
        let items = values.iter().map(|v| v.as_ref().to_string()).collect();
        self.insert(key, Value::array(FieldType::String, items));
    }

    /// Vector elements; malformed entries become zero
    pub fn get_vector_array(&self, key: &str) -> Vec<Vector3> {
        self.array_of(key, FieldType::Vector)
            .map(|items| {
                items.iter().map(|s| Vector3::parse(s).unwrap_or(Vector3::ZERO)).collect()
            })
            .unwrap_or_default()
    }

    pub fn set_vector_array(&mut self, key: impl Into<String>, values: &[Vector3]) {
        let items = values.iter().map(|v| v.to_string()).collect();
        self.insert(key, Value::array(FieldType::Vector, items));
    }

    /// Rotator elements; malformed entries become zero
    pub fn get_rotator_array(&self, key: &str) -> Vec<Rotator> {
        self.array_of(key, FieldType::Rotator)
            .map(|items| {
                items.iter().map(|s| Rotator::parse(s).unwrap_or(Rotator::ZERO)).collect()
            })
            .unwrap_or_default()
    }

    pub fn set_rotator_array(&mut self, key: impl Into<String>, values: &[Rotator]) {
        let items = values.iter().map(|v| v.to_string()).collect();
        self.insert(key, Value::array(FieldType::Rotator, items));
    }
}

impl FromIterator<(String, Value)> for SaveData {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

impl IntoIterator for SaveData {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
