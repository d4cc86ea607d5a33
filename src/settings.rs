//! Project settings
//!
//! Where save files live, which format they use, and the optional
//! behaviours (example files, auto-save on exit, encryption). Settings are
//! kept in a RON file and fall back to defaults when it is missing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::format::Format;

/// File name used for settings next to the user's config directory
pub const SETTINGS_FILE_NAME: &str = "ezsave.ron";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Failed to write settings: {0}")]
    Write(#[from] ron::Error),
}

/// Save system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Format for config, schema and slot files
    pub format: Format,
    /// Base directory. Defaults to the per-user data directory.
    pub root: Option<PathBuf>,
    /// Used when deriving an encryption key
    pub project_name: String,
    /// Folder under the base directory holding all save files
    pub save_directory: String,
    /// Config file name, without extension
    pub config_file_name: String,
    /// Schema file name, without extension
    pub schema_file_name: String,
    /// Write example schema and config files when none exist
    pub create_examples_on_init: bool,
    /// Save the config when the store shuts down
    pub auto_save_on_exit: bool,
    /// Log every file operation at info level
    pub verbose_logging: bool,
    /// Encrypt config and slot files
    pub enable_encryption: bool,
    /// Key text; empty means derive one from project and user
    pub encryption_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: Format::Toml,
            root: None,
            project_name: "EzSave".to_string(),
            save_directory: "EzSaveGame".to_string(),
            config_file_name: "EzSaveConfig".to_string(),
            schema_file_name: "EzSaveSchema".to_string(),
            create_examples_on_init: false,
            auto_save_on_exit: false,
            verbose_logging: false,
            enable_encryption: false,
            encryption_key: String::new(),
        }
    }
}

impl Settings {
    /// Default settings rooted at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()), ..Default::default() }
    }

    /// Default location of the settings file
    pub fn default_path() -> PathBuf {
        use directories::ProjectDirs;

        if let Some(proj_dirs) = ProjectDirs::from("com", "ezsave", "EzSave") {
            proj_dirs.config_dir().join(SETTINGS_FILE_NAME)
        } else {
            PathBuf::from(".").join(SETTINGS_FILE_NAME)
        }
    }

    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Ok(ron::from_str(&content)?)
    }

    /// Load settings, falling back to defaults when the file is missing or broken
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No settings at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings from {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    /// Write settings as pretty RON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Extension of the active format
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    /// Base directory for all save data
    pub fn base_dir(&self) -> PathBuf {
        use directories::ProjectDirs;

        if let Some(root) = &self.root {
            return root.clone();
        }
        if let Some(proj_dirs) = ProjectDirs::from("com", "ezsave", "EzSave") {
            proj_dirs.data_local_dir().to_path_buf()
        } else {
            PathBuf::from("./Saved")
        }
    }

    /// Directory holding config, schema and slot files
    pub fn save_dir(&self) -> PathBuf {
        self.base_dir().join(&self.save_directory)
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.save_dir()
            .join(format!("{}.{}", self.config_file_name, self.extension()))
    }

    pub fn schema_file_path(&self) -> PathBuf {
        self.save_dir()
            .join(format!("{}.{}", self.schema_file_name, self.extension()))
    }

    /// Level for per-operation file logging
    pub fn io_log_level(&self) -> log::Level {
        if self.verbose_logging {
            log::Level::Info
        } else {
            log::Level::Debug
        }
    }
}
