//! Save file formats
//!
//! Converts save data and schemas to and from TOML, JSON, YAML, XML and RON.
//! Every format implements [`FormatSerializer`]; the free functions here
//! route to the right one for a [`Format`].

pub mod document;
pub mod json_format;
pub mod ron_format;
pub mod toml_format;
pub mod xml_format;
pub mod yaml_format;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::save::SaveData;
use crate::schema::SaveSchema;

pub use json_format::JsonFormat;
pub use ron_format::RonFormat;
pub use toml_format::TomlFormat;
pub use xml_format::XmlFormat;
pub use yaml_format::YamlFormat;

/// Errors from reading or writing a document
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("TOML parse error: {message} (line {line})")]
    TomlParse { message: String, line: usize },

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("XML root element '{0}' not found")]
    XmlRootMissing(&'static str),

    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    #[error("RON write error: {0}")]
    RonWrite(#[from] ron::Error),

    #[error("Document root must be {0}")]
    UnexpectedRoot(&'static str),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),
}

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Format {
    #[default]
    Toml,
    Json,
    Yaml,
    Xml,
    Ron,
}

impl Format {
    pub const ALL: [Format; 5] = [Format::Toml, Format::Json, Format::Yaml, Format::Xml, Format::Ron];

    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Toml => "toml",
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Xml => "xml",
            Format::Ron => "ron",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Toml => "TOML",
            Format::Json => "JSON",
            Format::Yaml => "YAML",
            Format::Xml => "XML",
            Format::Ron => "RON",
        }
    }

    /// Serializer for this format
    pub fn serializer(&self) -> &'static dyn FormatSerializer {
        match self {
            Format::Toml => &TomlFormat,
            Format::Json => &JsonFormat,
            Format::Yaml => &YamlFormat,
            Format::Xml => &XmlFormat,
            Format::Ron => &RonFormat,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toml" => Ok(Format::Toml),
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "xml" => Ok(Format::Xml),
            "ron" => Ok(Format::Ron),
            other => Err(FormatError::UnknownFormat(other.to_string())),
        }
    }
}

/// Reads and writes config and schema documents in one format
pub trait FormatSerializer: Send + Sync {
    fn load_config(&self, text: &str) -> Result<SaveData, FormatError>;
    fn save_config(&self, data: &SaveData) -> Result<String, FormatError>;
    fn load_schema(&self, text: &str) -> Result<SaveSchema, FormatError>;
    fn save_schema(&self, schema: &SaveSchema) -> Result<String, FormatError>;
}

/// Parse config text. Blank text is empty data in every format.
pub fn load_config(format: Format, text: &str) -> Result<SaveData, FormatError> {
    if text.trim().is_empty() {
        return Ok(SaveData::new());
    }
    format.serializer().load_config(text)
}

pub fn save_config(format: Format, data: &SaveData) -> Result<String, FormatError> {
    format.serializer().save_config(data)
}

/// Parse schema text. Blank text is an empty schema in every format.
pub fn load_schema(format: Format, text: &str) -> Result<SaveSchema, FormatError> {
    if text.trim().is_empty() {
        return Ok(SaveSchema::new());
    }
    format.serializer().load_schema(text)
}

pub fn save_schema(format: Format, schema: &SaveSchema) -> Result<String, FormatError> {
    format.serializer().save_schema(schema)
}
