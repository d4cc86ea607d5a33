//! Config store
//!
//! Owns the live save data and schema for one settings profile. On open it
//! reads the schema and config files, fills every schema field from the
//! config or its default, and keeps config keys the schema does not know.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use super::encryption::{Encryption, EncryptionError};
use super::error::SaveError;
use super::save_data::SaveData;
use crate::format::{self, Format};
use crate::schema::{FieldDescriptor, SaveSchema};
use crate::settings::Settings;
use crate::value::{FieldType, Rotator, Value, Vector3};

/// Write a file through a temp file and rename, creating parent directories
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(contents)?;
        file.flush()?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Fill every schema field from `loaded` or its default, then append
/// whatever `loaded` has left
pub fn merge_with_schema(schema: &SaveSchema, mut loaded: SaveData) -> SaveData {
    let mut merged = SaveData::new();

    for field in schema.iter() {
        let value = match loaded.remove(&field.name) {
            Some(value) if value.is_array() == field.is_array => {
                let stored = value.field_type;
                value.coerce_to(field.field_type).unwrap_or_else(|| {
                    log::warn!(
                        "Field '{}' holds {} but the schema expects {}, using default",
                        field.name, stored, field.field_type
                    );
                    field.default_value()
                })
            }
            Some(_) => {
                log::warn!("Field '{}' has the wrong shape, using default", field.name);
                field.default_value()
            }
            None => field.default_value(),
        };
        merged.insert(field.name.clone(), value);
    }

    for (key, value) in loaded {
        merged.insert(key, value);
    }
    merged
}

/// Schema written when example files are requested
pub fn example_schema() -> SaveSchema {
    vec![
        FieldDescriptor::scalar("PlayerName", FieldType::String, "Player")
            .with_pattern("^[A-Za-z0-9_ ]{1,24}$")
            .with_message("Name must be 1-24 letters, digits or spaces"),
        FieldDescriptor::scalar("Level", FieldType::Int, "1").with_range(1.0, 100.0),
        FieldDescriptor::scalar("Health", FieldType::Float, "100.0").with_range(0.0, 100.0),
        FieldDescriptor::scalar("MusicEnabled", FieldType::Bool, "true"),
        FieldDescriptor::scalar("Player_Pos", FieldType::Vector, Vector3::ZERO.to_string()),
        FieldDescriptor::scalar("CameraRotation", FieldType::Rotator, Rotator::ZERO.to_string()),
        FieldDescriptor::array(
            "Inventory",
            FieldType::String,
            vec!["Sword".to_string(), "Potion".to_string()],
        ),
        FieldDescriptor::array("HighScores", FieldType::Int, Vec::new()).with_range(0.0, 1_000_000.0),
    ]
    .into_iter()
    .collect()
}

/// Live save data plus the files backing it
#[derive(Debug)]
pub struct ConfigStore {
    settings: Settings,
    encryption: Encryption,
    data: SaveData,
    schema: SaveSchema,
    closed: bool,
}

impl ConfigStore {
    /// Open the store. Load failures are logged and leave empty data.
    pub fn open(settings: Settings) -> Self {
        let encryption = Encryption::from_settings(&settings);
        let mut store = Self {
            settings,
            encryption,
            data: SaveData::new(),
            schema: SaveSchema::new(),
            closed: false,
        };

        if store.settings.create_examples_on_init {
            if let Err(e) = store.create_example_files() {
                log::warn!("Failed to create example files: {}", e);
            }
        }

        if let Err(e) = store.reload_from_disk() {
            log::warn!("Failed to load save config: {}. Starting with empty data.", e);
            store.data = SaveData::new();
            // never overwrite a file that could not be read
            store.closed = true;
        }

        log::info!(
            "Save store ready: {} format, {} keys, {} schema fields",
            store.settings.format,
            store.data.len(),
            store.schema.len()
        );
        store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn format(&self) -> Format {
        self.settings.format
    }

    pub fn encryption(&self) -> &Encryption {
        &self.encryption
    }

    pub fn data(&self) -> &SaveData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut SaveData {
        &mut self.data
    }

    /// Replace all data
    pub fn set_data(&mut self, data: SaveData) {
        self.data = data;
    }

    pub fn schema(&self) -> &SaveSchema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut SaveSchema {
        &mut self.schema
    }

    /// Replace the schema and re-apply its defaults to the current data
    pub fn set_schema(&mut self, schema: SaveSchema) {
        self.schema = schema;
        self.data = merge_with_schema(&self.schema, std::mem::take(&mut self.data));
    }

    /// Read a save document, decrypting when encryption is on.
    /// Plain files are still accepted so existing saves keep loading.
    pub fn read_document(&self, path: &Path) -> Result<String, SaveError> {
        if !path.exists() {
            return Err(SaveError::FileNotFound { path: path.display().to_string() });
        }
        let raw = fs::read_to_string(path)?;
        log::log!(self.settings.io_log_level(), "Read {} bytes from {:?}", raw.len(), path);

        if !self.encryption.is_enabled() {
            return Ok(raw);
        }
        match self.encryption.decrypt_string(&raw) {
            Ok(plain) => Ok(plain),
            Err(e @ (EncryptionError::Encoding(_) | EncryptionError::Truncated)) => {
                log::warn!("{:?} is not encrypted ({}), reading as plain text", path, e);
                Ok(raw)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write a save document atomically, encrypting when encryption is on
    pub fn write_document(&self, path: &Path, text: &str) -> Result<(), SaveError> {
        let contents = self.encryption.encrypt_string(text)?;
        write_atomic(path, contents.as_bytes())?;
        log::log!(self.settings.io_log_level(), "Wrote {} bytes to {:?}", contents.len(), path);
        Ok(())
    }

    /// Schema from disk, or an empty schema when there is none
    fn load_schema_file(&self) -> Result<SaveSchema, SaveError> {
        let path = self.settings.schema_file_path();
        if !path.exists() {
            return Ok(SaveSchema::new());
        }
        let text = fs::read_to_string(&path)?;
        Ok(format::load_schema(self.format(), &text)?)
    }

    /// Re-read schema and config from disk, replacing the live data
    pub fn reload_from_disk(&mut self) -> Result<(), SaveError> {
        let schema = self.load_schema_file()?;

        let path = self.settings.config_file_path();
        let loaded = if path.exists() {
            let text = self.read_document(&path)?;
            format::load_config(self.format(), &text)?
        } else {
            log::info!("No config at {:?}, using schema defaults", path);
            SaveData::new()
        };

        self.data = merge_with_schema(&schema, loaded);
        self.schema = schema;
        Ok(())
    }

    /// Write the live data to the config file
    pub fn save_to_disk(&self) -> Result<(), SaveError> {
        let text = format::save_config(self.format(), &self.data)?;
        self.write_document(&self.settings.config_file_path(), &text)?;
        log::info!("Saved {} keys to {:?}", self.data.len(), self.settings.config_file_path());
        Ok(())
    }

    /// Write the schema file. Schemas are never encrypted.
    pub fn save_schema_to_disk(&self) -> Result<(), SaveError> {
        let text = format::save_schema(self.format(), &self.schema)?;
        write_atomic(&self.settings.schema_file_path(), text.as_bytes())?;
        log::info!("Saved schema with {} fields", self.schema.len());
        Ok(())
    }

    /// Write the example schema and matching config where files are missing
    pub fn create_example_files(&self) -> Result<(), SaveError> {
        let schema = example_schema();

        let schema_path = self.settings.schema_file_path();
        if !schema_path.exists() {
            let text = format::save_schema(self.format(), &schema)?;
            write_atomic(&schema_path, text.as_bytes())?;
            log::info!("Created example schema at {:?}", schema_path);
        }

        let config_path = self.settings.config_file_path();
        if !config_path.exists() {
            let data = merge_with_schema(&schema, SaveData::new());
            let text = format::save_config(self.format(), &data)?;
            self.write_document(&config_path, &text)?;
            log::info!("Created example config at {:?}", config_path);
        }
        Ok(())
    }

    /// Set one value, replacing its type and shape
    pub fn set_value(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key, value);
    }

    /// Flush on exit when configured. Runs at most once.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if self.settings.auto_save_on_exit {
            match self.save_to_disk() {
                Ok(()) => log::info!("Auto-saved on exit"),
                Err(e) => log::error!("Auto-save on exit failed: {}", e),
            }
        }
    }
}

impl Drop for ConfigStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_in(dir: &TempDir, format: Format) -> Settings {
        Settings { format, ..Settings::with_root(dir.path()) }
    }

    #[test]
    fn test_merge_uses_defaults_and_keeps_extras() {
        let schema: SaveSchema = vec![
            FieldDescriptor::scalar("Gold", FieldType::Int, "100"),
            FieldDescriptor::scalar("Speed", FieldType::Float, "1.0"),
            FieldDescriptor::array("Tags", FieldType::String, vec!["new".into()]),
        ]
        .into_iter()
        .collect();

        let mut loaded = SaveData::new();
        loaded.set_int("Speed", 2);
        loaded.set_string("Tags", "wrong shape");
        loaded.set_bool("Extra", true);

        let merged = merge_with_schema(&schema, loaded);
        assert_eq!(merged.get_int("Gold", 0), 100);
        assert_eq!(merged.get_float("Speed", 0.0), 2.0);
        assert_eq!(merged.get_string_array("Tags"), vec!["new"]);
        assert!(merged.get_bool("Extra", false));
    }

    #[test]
    fn test_open_without_files_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::open(settings_in(&dir, Format::Toml));
        assert!(store.data().is_empty());
        assert!(store.schema().is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut store = ConfigStore::open(settings_in(&dir, Format::Json));
        store.data_mut().set_int("Gold", 77);
        store.data_mut().set_string("Name", "Ash");
        store.save_to_disk().unwrap();

        let path = store.settings().config_file_path();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        store.data_mut().clear();
        store.reload_from_disk().unwrap();
        assert_eq!(store.data().get_int("Gold", 0), 77);
        assert_eq!(store.data().get_string("Name", ""), "Ash");
    }

    #[test]
    fn test_broken_config_starts_empty() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir, Format::Json);
        write_atomic(&settings.config_file_path(), b"{ not json").unwrap();

        let store = ConfigStore::open(settings);
        assert!(store.data().is_empty());
    }

    #[test]
    fn test_examples_created_on_init() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            create_examples_on_init: true,
            ..settings_in(&dir, Format::Yaml)
        };
        let store = ConfigStore::open(settings);

        assert!(store.settings().schema_file_path().exists());
        assert!(store.settings().config_file_path().exists());
        assert_eq!(store.data().get_int("Level", 0), 1);
        assert_eq!(store.data().get_string("PlayerName", ""), "Player");
        assert_eq!(store.schema().len(), example_schema().len());
    }

    #[test]
    fn test_auto_save_on_drop() {
        let dir = TempDir::new().unwrap();
        let settings = Settings { auto_save_on_exit: true, ..settings_in(&dir, Format::Xml) };
        {
            let mut store = ConfigStore::open(settings.clone());
            store.data_mut().set_float("Volume", 0.5);
        }
        let store = ConfigStore::open(settings);
        assert_eq!(store.data().get_float("Volume", 0.0), 0.5);
    }

    #[test]
    fn test_encrypted_config() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            enable_encryption: true,
            encryption_key: "test-key".into(),
            ..settings_in(&dir, Format::Toml)
        };
        let mut store = ConfigStore::open(settings.clone());
        store.data_mut().set_string("Secret", "treasure");
        store.save_to_disk().unwrap();

        let raw = fs::read_to_string(settings.config_file_path()).unwrap();
        assert!(!raw.contains("treasure"));

        let reopened = ConfigStore::open(settings);
        assert_eq!(reopened.data().get_string("Secret", ""), "treasure");
    }

    #[test]
    fn test_wrong_key_keeps_encrypted_config() {
        let dir = TempDir::new().unwrap();
        let keyed = |key: &str| Settings {
            enable_encryption: true,
            encryption_key: key.into(),
            auto_save_on_exit: true,
            ..settings_in(&dir, Format::Json)
        };
        {
            let mut store = ConfigStore::open(keyed("first"));
            store.data_mut().set_string("Secret", "treasure");
        }

        {
            let wrong = ConfigStore::open(keyed("second"));
            assert!(wrong.data().is_empty());
            let path = wrong.settings().config_file_path();
            assert!(matches!(
                wrong.read_document(&path),
                Err(SaveError::Encryption(EncryptionError::Decrypt))
            ));
        }

        let store = ConfigStore::open(keyed("first"));
        assert_eq!(store.data().get_string("Secret", ""), "treasure");
    }

    #[test]
    fn test_plain_config_loads_with_encryption_on() {
        let dir = TempDir::new().unwrap();
        let plain = settings_in(&dir, Format::Json);
        {
            let mut store = ConfigStore::open(plain.clone());
            store.data_mut().set_int("Gold", 12);
            store.save_to_disk().unwrap();
        }

        let encrypted = Settings { enable_encryption: true, ..plain };
        let store = ConfigStore::open(encrypted);
        assert_eq!(store.data().get_int("Gold", 0), 12);
    }
}
