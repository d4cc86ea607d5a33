//! Field descriptors and schemas

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value::{FieldType, Value};

/// Describes one save field: type, shape, default and validation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub is_array: bool,
    /// Default for scalar fields, as text
    pub default_value: String,
    /// Default for array fields, as text items
    pub default_array: Vec<String>,
    /// Validation only runs when this is set
    pub enable_validation: bool,
    /// Inclusive bounds for numbers. `0..=0` means unbounded.
    pub min_value: f64,
    pub max_value: f64,
    /// Pattern a string value must match somewhere
    pub regex_pattern: String,
    /// Replaces the generated message for scalar failures
    pub validation_error_message: String,
}

impl Default for FieldDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            field_type: FieldType::String,
            is_array: false,
            default_value: String::new(),
            default_array: Vec::new(),
            enable_validation: false,
            min_value: 0.0,
            max_value: 0.0,
            regex_pattern: String::new(),
            validation_error_message: String::new(),
        }
    }
}

impl FieldDescriptor {
    /// Scalar field with a default
    pub fn scalar(name: impl Into<String>, field_type: FieldType, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type,
            default_value: default.into(),
            ..Default::default()
        }
    }

    /// Array field with default items
    pub fn array(name: impl Into<String>, field_type: FieldType, defaults: Vec<String>) -> Self {
        Self {
            name: name.into(),
            field_type,
            is_array: true,
            default_array: defaults,
            ..Default::default()
        }
    }

    /// Enable a numeric range check
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.enable_validation = true;
        self.min_value = min;
        self.max_value = max;
        self
    }

    /// Enable a regex check
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.enable_validation = true;
        self.regex_pattern = pattern.into();
        self
    }

    /// Set a custom validation message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.validation_error_message = message.into();
        self
    }

    /// Value this field takes when nothing was saved
    pub fn default_value(&self) -> Value {
        if self.is_array {
            Value::array(self.field_type, self.default_array.clone())
        } else {
            Value::scalar(self.field_type, self.default_value.clone())
        }
    }

    /// Whether any validation rule is configured
    pub fn has_rules(&self) -> bool {
        self.min_value != 0.0
            || self.max_value != 0.0
            || !self.regex_pattern.is_empty()
            || !self.validation_error_message.is_empty()
    }
}

/// Set of field descriptors keyed by name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaveSchema {
    pub fields: BTreeMap<String, FieldDescriptor>,
}

impl SaveSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field, keyed by its name
    pub fn insert(&mut self, field: FieldDescriptor) {
        self.fields.insert(field.name.clone(), field);
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.fields.get_mut(name)
    }

    pub fn remove_field(&mut self, name: &str) -> Option<FieldDescriptor> {
        self.fields.remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// Add a blank String field named `NewField{n}` and return its name.
    /// Skips numbers that are already taken.
    pub fn add_field(&mut self) -> String {
        let mut n = self.fields.len() + 1;
        let mut name = format!("NewField{}", n);
        while self.fields.contains_key(&name) {
            n += 1;
            name = format!("NewField{}", n);
        }
        self.insert(FieldDescriptor::scalar(name.clone(), FieldType::String, ""));
        name
    }

    /// Default value for a named field
    pub fn default_value_for(&self, name: &str) -> Option<Value> {
        self.fields.get(name).map(FieldDescriptor::default_value)
    }
}

impl FromIterator<FieldDescriptor> for SaveSchema {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor>>(iter: I) -> Self {
        let mut schema = SaveSchema::new();
        for field in iter {
            schema.insert(field);
        }
        schema
    }
}
