//! Field types
//!
//! The closed set of value kinds a save field can hold.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of value stored in a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldType {
    /// Unknown or untyped (e.g. an empty array)
    #[default]
    None,
    Int,
    Float,
    Bool,
    String,
    /// Three floats: x, y, z
    Vector,
    /// Three floats: pitch, yaw, roll
    Rotator,
}

impl FieldType {
    /// All concrete types, in display order
    pub const ALL: [FieldType; 7] = [
        FieldType::None,
        FieldType::Int,
        FieldType::Float,
        FieldType::Bool,
        FieldType::String,
        FieldType::Vector,
        FieldType::Rotator,
    ];

    /// Canonical name used in schema files
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::None => "None",
            FieldType::Int => "Int",
            FieldType::Float => "Float",
            FieldType::Bool => "Bool",
            FieldType::String => "String",
            FieldType::Vector => "Vector",
            FieldType::Rotator => "Rotator",
        }
    }

    /// Parse a type name, ignoring case. Unknown names map to `None`.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .unwrap_or(FieldType::None)
    }

    /// Whether values of this type are numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Int | FieldType::Float)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
