//! Value model
//!
//! Field types, typed values and the text conversions shared by all formats.

pub mod field_type;
pub mod text;
pub mod value;
pub mod vector;

pub use field_type::FieldType;
pub use text::{
    deduce_array_from_text, deduce_from_text, format_float, parse_bool, parse_float, parse_int,
    refine_by_key,
};
pub use value::{Value, ValueData};
pub use vector::{Rotator, Vector3};
