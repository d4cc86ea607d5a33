use thiserror::Error;

use super::encryption::EncryptionError;
use crate::format::FormatError;
use crate::schema::SchemaError;
use crate::settings::SettingsError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("{slot} is empty")]
    EmptySlot { slot: String },

    #[error("No saved slot available for Quick Load")]
    NothingToQuickLoad,

    #[error("Invalid save data: {0}")]
    InvalidData(String),

    #[error("Deleted {deleted} file(s) but {failed} could not be removed")]
    DeleteFailed { deleted: usize, failed: usize },
}
