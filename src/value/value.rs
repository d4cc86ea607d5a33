//! Unified field value
//!
//! Every format loads into and saves from this representation.

use serde::{Deserialize, Serialize};

use super::field_type::FieldType;
use super::text::format_float;
use super::vector::{is_triple, Rotator, Vector3};

/// Payload of a value: one item or a list, always as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueData {
    Scalar(String),
    Array(Vec<String>),
}

impl Default for ValueData {
    fn default() -> Self {
        ValueData::Scalar(String::new())
    }
}

/// A typed value, scalar or array
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Value {
    pub field_type: FieldType,
    pub data: ValueData,
}

impl Value {
    /// Scalar of the given type from raw text
    pub fn scalar(field_type: FieldType, text: impl Into<String>) -> Self {
        Self { field_type, data: ValueData::Scalar(text.into()) }
    }

    /// Array of the given type from raw text items
    pub fn array(field_type: FieldType, items: Vec<String>) -> Self {
        Self { field_type, data: ValueData::Array(items) }
    }

    pub fn int(v: i64) -> Self {
        Self::scalar(FieldType::Int, v.to_string())
    }

    pub fn float(v: f64) -> Self {
        Self::scalar(FieldType::Float, format_float(v))
    }

    pub fn bool(v: bool) -> Self {
        Self::scalar(FieldType::Bool, if v { "true" } else { "false" })
    }

    pub fn string(v: impl Into<String>) -> Self {
        Self::scalar(FieldType::String, v)
    }

    pub fn vector(v: Vector3) -> Self {
        Self::scalar(FieldType::Vector, v.to_string())
    }

    pub fn rotator(v: Rotator) -> Self {
        Self::scalar(FieldType::Rotator, v.to_string())
    }

    pub fn is_array(&self) -> bool {
        matches!(self.data, ValueData::Array(_))
    }

    /// Scalar text, or None for arrays
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.data {
            ValueData::Scalar(s) => Some(s),
            ValueData::Array(_) => None,
        }
    }

    /// Array items, or None for scalars
    pub fn as_array(&self) -> Option<&[String]> {
        match &self.data {
            ValueData::Array(items) => Some(items),
            ValueData::Scalar(_) => None,
        }
    }

    /// Same payload under a different type
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Convert to another type when every item can be represented in it.
    /// Untyped values take any type.
    pub fn coerce_to(self, target: FieldType) -> Option<Value> {
        if self.field_type == target || target == FieldType::None {
            return Some(self);
        }
        let source = self.field_type;
        let convert = |text: &str| -> Option<String> {
            match (source, target) {
                (FieldType::None, _) | (_, FieldType::String) => Some(text.to_string()),
                (FieldType::Int, FieldType::Float) => text.trim().parse::<f64>().ok().map(format_float),
                (FieldType::Float, FieldType::Int) => text
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| (f as i64).to_string()),
                (FieldType::Int | FieldType::String, FieldType::Bool) => {
                    match text.trim().to_ascii_lowercase().as_str() {
                        "true" | "1" | "yes" => Some("true".to_string()),
                        "false" | "0" | "no" => Some("false".to_string()),
                        _ => None,
                    }
                }
                (FieldType::String, FieldType::Vector | FieldType::Rotator) => {
                    is_triple(text).then(|| text.to_string())
                }
                (FieldType::String, FieldType::Int) => {
                    text.trim().parse::<i64>().ok().map(|i| i.to_string())
                }
                (FieldType::String, FieldType::Float) => {
                    text.trim().parse::<f64>().ok().map(format_float)
                }
                _ => None,
            }
        };
        let data = match &self.data {
            ValueData::Scalar(text) => ValueData::Scalar(convert(text.as_str())?),
            ValueData::Array(items) => {
                ValueData::Array(items.iter().map(|s| convert(s.as_str())).collect::<Option<Vec<_>>>()?)
            }
        };
        Some(Value { field_type: target, data })
    }

    /// Short human-readable rendering, used by the CLI
    pub fn display_text(&self) -> String {
        match &self.data {
            ValueData::Scalar(s) => s.clone(),
            ValueData::Array(items) => format!("[{}]", items.join(", ")),
        }
    }
}
