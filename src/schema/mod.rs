//! Save schemas
//!
//! Field descriptors, schema editing and generation from Rust types.

pub mod descriptor;
pub mod reflect;

pub use descriptor::{FieldDescriptor, SaveSchema};
pub use reflect::{capture, generate_schema, restore, SchemaError};
