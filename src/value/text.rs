//! Text conversions
//!
//! Every payload is stored as text. These helpers parse it leniently and
//! guess types for formats that carry no type information.

use super::field_type::FieldType;
use super::value::{Value, ValueData};
use super::vector::is_triple;

/// Parse a boolean. Accepts "true", "1" and "yes" in any case.
pub fn parse_bool(text: &str) -> bool {
    let t = text.trim();
    t.eq_ignore_ascii_case("true") || t == "1" || t.eq_ignore_ascii_case("yes")
}

/// Parse an integer. Float text is truncated, anything else yields 0.
pub fn parse_int(text: &str) -> i64 {
    let t = text.trim();
    t.parse::<i64>()
        .ok()
        .or_else(|| t.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        .unwrap_or(0)
}

/// Parse a float, yielding 0.0 on bad input
pub fn parse_float(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(0.0)
}

/// Format a float so integral values keep a trailing ".0"
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Guess a scalar type from raw text
pub fn deduce_from_text(text: &str) -> Value {
    let t = text.trim();
    if t.eq_ignore_ascii_case("true") || t.eq_ignore_ascii_case("false") {
        return Value::bool(t.eq_ignore_ascii_case("true"));
    }
    if t.contains('.') && t.parse::<f64>().is_ok() {
        return Value::scalar(FieldType::Float, t);
    }
    if !t.is_empty()
        && t.chars().any(|c| c.is_ascii_digit())
        && t.chars().all(|c| c.is_ascii_digit() || c == '+' || c == '-')
        && t.parse::<i64>().is_ok()
    {
        return Value::scalar(FieldType::Int, t);
    }
    Value::string(text)
}

/// Guess the element type of an array from its first element
pub fn deduce_array_from_text(items: Vec<String>) -> Value {
    let field_type = items
        .first()
        .map(|first| deduce_from_text(first).field_type)
        .unwrap_or(FieldType::None);
    Value::array(field_type, items)
}

/// Key names that mark a vector field
fn looks_like_vector_key(key: &str) -> bool {
    key.ends_with("_Pos")
        || key.ends_with("Position")
        || key.contains("Location")
        || key.contains("Vector")
}

/// Key names that mark a rotator field
fn looks_like_rotator_key(key: &str) -> bool {
    key.ends_with("_Rot") || key.ends_with("Rotation") || key.contains("Rotator")
}

/// Promote a string value to Vector or Rotator when its key and shape say so.
/// Arrays are promoted only when every item is a triple.
pub fn refine_by_key(key: &str, value: Value) -> Value {
    if value.field_type != FieldType::String {
        return value;
    }
    let shaped = match &value.data {
        ValueData::Scalar(text) => is_triple(text),
        ValueData::Array(items) => !items.is_empty() && items.iter().all(|s| is_triple(s)),
    };
    if !shaped {
        return value;
    }
    if looks_like_vector_key(key) {
        value.with_type(FieldType::Vector)
    } else if looks_like_rotator_key(key) {
        value.with_type(FieldType::Rotator)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(parse_bool("Yes"));
        assert!(!parse_bool("no"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_parse_int_lenient() {
        assert_eq!(parse_int(" 42 "), 42);
        assert_eq!(parse_int("3.9"), 3);
        assert_eq!(parse_int("abc"), 0);
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(-0.25), "-0.25");
    }

    #[test]
    fn test_deduce_from_text() {
        assert_eq!(deduce_from_text("False").field_type, FieldType::Bool);
        assert_eq!(deduce_from_text("1.5").field_type, FieldType::Float);
        assert_eq!(deduce_from_text("-12").field_type, FieldType::Int);
        assert_eq!(deduce_from_text("1.2.3").field_type, FieldType::String);
        assert_eq!(deduce_from_text("hello").field_type, FieldType::String);
        assert_eq!(deduce_from_text("-").field_type, FieldType::String);
    }

    #[test]
    fn test_refine_by_key() {
        let v = refine_by_key("Player_Pos", Value::string("1,2,3"));
        assert_eq!(v.field_type, FieldType::Vector);

        let r = refine_by_key("CameraRotation", Value::string("0,90,0"));
        assert_eq!(r.field_type, FieldType::Rotator);

        let plain = refine_by_key("Inventory", Value::string("1,2,3"));
        assert_eq!(plain.field_type, FieldType::String);

        let short = refine_by_key("SpawnLocation", Value::string("1,2"));
        assert_eq!(short.field_type, FieldType::String);

        let path = Value::array(FieldType::String, vec!["0,0,0".into(), "1,0,0".into()]);
        assert_eq!(refine_by_key("PatrolLocations", path).field_type, FieldType::Vector);
    }
}
