//! EzSave - Format-agnostic save games
//!
//! Typed key/value save data that reads and writes TOML, JSON, YAML, XML
//! and RON, with schemas, validation, save slots and optional encryption.

pub mod format;
pub mod library;
pub mod save;
pub mod schema;
pub mod settings;
pub mod validation;
pub mod value;

// Re-export commonly used types
pub use format::{Format, FormatError};
pub use library::EzSave;
pub use save::{ConfigStore, SaveData, SaveError, SlotId, SlotInfo, SlotManager};
pub use schema::{FieldDescriptor, SaveSchema};
pub use settings::Settings;
pub use validation::ValidationError;
pub use value::{FieldType, Rotator, Value, Vector3};
