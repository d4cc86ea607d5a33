//! Field validation
//!
//! Checks values against the rules in their field descriptors: numeric
//! ranges for Int/Float fields and regex patterns for String fields.

use regex::Regex;
use thiserror::Error;

use crate::save::SaveData;
use crate::schema::{FieldDescriptor, SaveSchema};
use crate::value::{parse_float, FieldType, Value};

/// A rule violation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self { field: field.to_string(), message: message.into() }
    }
}

/// Check an inclusive numeric range. `min == max == 0` disables the check.
pub fn validate_number_range(value: f64, min: f64, max: f64) -> Result<(), String> {
    if min == 0.0 && max == 0.0 {
        return Ok(());
    }
    if value < min || value > max {
        return Err(format!("Value {} is out of range [{}, {}]", value, min, max));
    }
    Ok(())
}

/// Check that a string contains a match for `pattern`. Empty patterns pass.
pub fn validate_string_pattern(value: &str, pattern: &str) -> Result<(), String> {
    if pattern.is_empty() {
        return Ok(());
    }
    let regex = Regex::new(pattern).map_err(|e| format!("Invalid pattern '{}': {}", pattern, e))?;
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(format!("Value '{}' does not match pattern '{}'", value, pattern))
    }
}

/// Check one text item against the rules for its type
fn validate_item(text: &str, descriptor: &FieldDescriptor) -> Result<(), String> {
    if descriptor.field_type.is_numeric() {
        return validate_number_range(parse_float(text), descriptor.min_value, descriptor.max_value);
    }
    match descriptor.field_type {
        FieldType::String => validate_string_pattern(text, &descriptor.regex_pattern),
        _ => Ok(()),
    }
}

/// Check every element of an array. Errors name the failing index.
pub fn validate_array(items: &[String], descriptor: &FieldDescriptor) -> Result<(), String> {
    for (i, item) in items.iter().enumerate() {
        validate_item(item, descriptor).map_err(|e| format!("Element [{}]: {}", i, e))?;
    }
    Ok(())
}

/// Check one value against its descriptor.
///
/// Nothing is checked unless the descriptor enables validation.
pub fn validate_field(name: &str, value: &Value, descriptor: &FieldDescriptor) -> Result<(), ValidationError> {
    if !descriptor.enable_validation {
        return Ok(());
    }

    match value.as_array() {
        Some(items) => validate_array(items, descriptor).map_err(|e| ValidationError::new(name, e)),
        None => {
            let text = value.as_scalar().unwrap_or_default();
            validate_item(text, descriptor).map_err(|e| {
                if descriptor.validation_error_message.is_empty() {
                    ValidationError::new(name, e)
                } else {
                    ValidationError::new(name, descriptor.validation_error_message.clone())
                }
            })
        }
    }
}

/// Check all data against a schema, stopping at the first violation.
/// Fields absent from the data are skipped.
pub fn validate_all(data: &SaveData, schema: &SaveSchema) -> Result<(), ValidationError> {
    for descriptor in schema.iter() {
        if let Some(value) = data.get(&descriptor.name) {
            validate_field(&descriptor.name, value, descriptor)?;
        }
    }
    Ok(())
}

/// Every violation in the data, in schema order
pub fn collect_violations(data: &SaveData, schema: &SaveSchema) -> Vec<ValidationError> {
    schema
        .iter()
        .filter_map(|descriptor| {
            data.get(&descriptor.name)
                .and_then(|value| validate_field(&descriptor.name, value, descriptor).err())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_unbounded_when_zero() {
        assert!(validate_number_range(1e9, 0.0, 0.0).is_ok());
        assert!(validate_number_range(5.0, 0.0, 10.0).is_ok());
        assert!(validate_number_range(10.0, 0.0, 10.0).is_ok());
        assert!(validate_number_range(10.5, 0.0, 10.0).is_err());
    }

    #[test]
    fn test_pattern() {
        assert!(validate_string_pattern("anything", "").is_ok());
        assert!(validate_string_pattern("Player_01", "^[A-Za-z_0-9]+$").is_ok());
        assert!(validate_string_pattern("bad name!", "^[A-Za-z_0-9]+$").is_err());
        assert!(validate_string_pattern("x", "(").is_err());
    }

    #[test]
    fn test_disabled_validation_passes() {
        let mut field = FieldDescriptor::scalar("Level", FieldType::Int, "1");
        field.min_value = 1.0;
        field.max_value = 5.0;
        assert!(validate_field("Level", &Value::int(99), &field).is_ok());
    }

    #[test]
    fn test_custom_message() {
        let field = FieldDescriptor::scalar("Level", FieldType::Int, "1")
            .with_range(1.0, 5.0)
            .with_message("Level must be 1-5");
        let err = validate_field("Level", &Value::int(9), &field).unwrap_err();
        assert_eq!(err.message, "Level must be 1-5");
        assert_eq!(err.to_string(), "Level: Level must be 1-5");
    }

    #[test]
    fn test_array_element_index() {
        let field = FieldDescriptor::array("Scores", FieldType::Int, vec![]).with_range(0.0, 100.0);
        let value = Value::array(FieldType::Int, vec!["10".into(), "200".into()]);
        let err = validate_field("Scores", &value, &field).unwrap_err();
        assert!(err.message.starts_with("Element [1]: "));
    }

    #[test]
    fn test_validate_all_first_error_and_missing_skipped() {
        let schema: SaveSchema = vec![
            FieldDescriptor::scalar("Absent", FieldType::Int, "0").with_range(1.0, 2.0),
            FieldDescriptor::scalar("Gold", FieldType::Int, "0").with_range(0.0, 1000.0),
            FieldDescriptor::scalar("Name", FieldType::String, "").with_pattern("^[A-Z]"),
        ]
        .into_iter()
        .collect();

        let mut data = SaveData::new();
        data.set_int("Gold", 5000);
        data.set_string("Name", "lowercase");

        let err = validate_all(&data, &schema).unwrap_err();
        assert_eq!(err.field, "Gold");
        assert_eq!(collect_violations(&data, &schema).len(), 2);

        data.set_int("Gold", 10);
        data.set_string("Name", "Upper");
        assert!(validate_all(&data, &schema).is_ok());
    }
}
