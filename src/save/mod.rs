//! Save/load system
//!
//! Live save data, the config store backing it, numbered save slots and
//! at-rest encryption.

pub mod encryption;
pub mod error;
pub mod save_data;
pub mod slots;
pub mod store;

pub use encryption::{generate_random_key, Encryption, EncryptionError};
pub use error::SaveError;
pub use save_data::SaveData;
pub use slots::{SlotId, SlotInfo, SlotManager, DEFAULT_MAX_SLOTS, LAST_USED_SLOT_KEY};
pub use store::{example_schema, merge_with_schema, ConfigStore};
