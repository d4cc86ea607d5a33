//! EzSave facade
//!
//! One handle for game code: typed get/set, quick save/load, slots, schema
//! generation and validation. The store sits behind a lock so the handle can
//! be shared by reference.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::save::{ConfigStore, SaveData, SaveError, SlotId, SlotManager};
use crate::schema::{self, SaveSchema};
use crate::settings::Settings;
use crate::validation::{self, ValidationError};
use crate::value::{Rotator, Value, Vector3};

/// Shared save system handle
pub struct EzSave {
    store: RwLock<ConfigStore>,
}

impl EzSave {
    /// Open the save system for the given settings
    pub fn new(settings: Settings) -> Self {
        Self { store: RwLock::new(ConfigStore::open(settings)) }
    }

    /// Open using a settings file, falling back to defaults
    pub fn from_settings_file(path: &Path) -> Self {
        Self::new(Settings::load_or_default(path))
    }

    pub fn settings(&self) -> Settings {
        self.store.read().settings().clone()
    }

    /// Run `f` with read access to the data
    pub fn read<R>(&self, f: impl FnOnce(&SaveData) -> R) -> R {
        f(self.store.read().data())
    }

    /// Run `f` with write access to the data
    pub fn write<R>(&self, f: impl FnOnce(&mut SaveData) -> R) -> R {
        f(self.store.write().data_mut())
    }

    /// Run `f` with the slot manager
    pub fn with_slots<R>(&self, f: impl FnOnce(&mut SlotManager<'_>) -> R) -> R {
        let mut store = self.store.write();
        let mut slots = SlotManager::new(&mut store);
        f(&mut slots)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the live data to the config file
    pub fn save(&self) -> Result<(), SaveError> {
        self.store.read().save_to_disk()
    }

    /// Re-read config and schema from disk
    pub fn reload(&self) -> Result<(), SaveError> {
        self.store.write().reload_from_disk()
    }

    pub fn quick_save(&self) -> Result<SlotId, SaveError> {
        self.with_slots(|slots| slots.quick_save())
    }

    pub fn quick_load(&self) -> Result<SlotId, SaveError> {
        self.with_slots(|slots| slots.quick_load())
    }

    pub fn save_to_slot(&self, slot: SlotId) -> Result<(), SaveError> {
        self.with_slots(|slots| slots.save_to_slot(slot))
    }

    pub fn load_from_slot(&self, slot: SlotId) -> Result<(), SaveError> {
        self.with_slots(|slots| slots.load_from_slot(slot))
    }

    /// Delete every slot plus the config and schema files
    pub fn delete_all_save_data(&self, max_slots: u32) -> Result<usize, SaveError> {
        let deleted = self.with_slots(|slots| slots.delete_all_save_data(max_slots))?;
        self.store.write().data_mut().clear();
        Ok(deleted)
    }

    /// Flush on exit when configured
    pub fn shutdown(&self) {
        self.store.write().shutdown();
    }

    // ========================================================================
    // Typed access
    // ========================================================================

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.read(|d| d.get_int(key, default))
    }

    pub fn set_int(&self, key: &str, value: i64) {
        self.write(|d| d.set_int(key, value));
    }

    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        self.read(|d| d.get_float(key, default))
    }

    pub fn set_float(&self, key: &str, value: f64) {
        self.write(|d| d.set_float(key, value));
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.read(|d| d.get_bool(key, default))
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        self.write(|d| d.set_bool(key, value));
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.read(|d| d.get_string(key, default))
    }

    pub fn set_string(&self, key: &str, value: &str) {
        self.write(|d| d.set_string(key, value));
    }

    pub fn get_vector(&self, key: &str, default: Vector3) -> Vector3 {
        self.read(|d| d.get_vector(key, default))
    }

    pub fn set_vector(&self, key: &str, value: Vector3) {
        self.write(|d| d.set_vector(key, value));
    }

    pub fn get_rotator(&self, key: &str, default: Rotator) -> Rotator {
        self.read(|d| d.get_rotator(key, default))
    }

    pub fn set_rotator(&self, key: &str, value: Rotator) {
        self.write(|d| d.set_rotator(key, value));
    }

    /// Raw value for a key, any type
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.read(|d| d.get(key).cloned())
    }

    pub fn set_value(&self, key: &str, value: Value) {
        self.store.write().set_value(key, value);
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.read(|d| d.contains_key(key))
    }

    /// Remove a key. Returns whether it existed.
    pub fn remove_key(&self, key: &str) -> bool {
        self.write(|d| d.remove(key).is_some())
    }

    pub fn clear_all_data(&self) {
        self.write(SaveData::clear);
    }

    /// Copy of the live data
    pub fn snapshot(&self) -> SaveData {
        self.read(SaveData::clone)
    }

    // ========================================================================
    // Struct bridge
    // ========================================================================

    /// Store every field of `value`
    pub fn capture<T: Serialize>(&self, value: &T) -> Result<usize, SaveError> {
        Ok(self.write(|d| schema::capture(value, d))?)
    }

    /// Build a `T` from the live data
    pub fn restore<T: Serialize + DeserializeOwned + Default>(&self) -> Result<T, SaveError> {
        Ok(self.read(schema::restore::<T>)?)
    }

    // ========================================================================
    // Schema
    // ========================================================================

    pub fn schema(&self) -> SaveSchema {
        self.store.read().schema().clone()
    }

    /// Edit the schema, apply its defaults and write it to disk
    pub fn update_schema<R>(&self, f: impl FnOnce(&mut SaveSchema) -> R) -> Result<R, SaveError> {
        let mut store = self.store.write();
        let mut schema = store.schema().clone();
        let result = f(&mut schema);
        store.set_schema(schema);
        store.save_schema_to_disk()?;
        Ok(result)
    }

    /// Generate a schema from `T::default()`, write it and apply its
    /// defaults to the live data. Returns the number of fields.
    pub fn generate_schema_from<T: Serialize + Default>(&self) -> Result<usize, SaveError> {
        let generated = schema::generate_schema::<T>()?;
        let count = generated.len();
        self.update_schema(|schema| *schema = generated)?;
        log::info!("Schema generated from {} with {} fields", std::any::type_name::<T>(), count);
        Ok(count)
    }

    /// First rule violation in the live data
    pub fn validate(&self) -> Result<(), ValidationError> {
        let store = self.store.read();
        validation::validate_all(store.data(), store.schema())
    }

    /// Every rule violation in the live data
    pub fn violations(&self) -> Vec<ValidationError> {
        let store = self.store.read();
        validation::collect_violations(store.data(), store.schema())
    }

    // ========================================================================
    // Paths
    // ========================================================================

    pub fn config_file_path(&self) -> PathBuf {
        self.store.read().settings().config_file_path()
    }

    pub fn schema_file_path(&self) -> PathBuf {
        self.store.read().settings().schema_file_path()
    }

    /// Save folder, created if missing
    pub fn save_dir(&self) -> Result<PathBuf, SaveError> {
        let dir = self.store.read().settings().save_dir();
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Summary of format, files and contents
    pub fn info(&self) -> String {
        let store = self.store.read();
        let settings = store.settings();
        format!(
            "Format: {}\nConfig: {}\nSchema: {}\nKeys: {}\nSchema fields: {}\nEncryption: {}",
            settings.format,
            settings.config_file_path().display(),
            settings.schema_file_path().display(),
            store.data().len(),
            store.schema().len(),
            if store.encryption().is_enabled() { "on" } else { "off" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Options {
        volume: f64,
        difficulty: String,
        subtitles: bool,
    }

    impl Default for Options {
        fn default() -> Self {
            Self { volume: 0.7, difficulty: "Normal".into(), subtitles: true }
        }
    }

    fn open(dir: &TempDir) -> EzSave {
        EzSave::new(Settings { format: Format::Yaml, ..Settings::with_root(dir.path()) })
    }

    #[test]
    fn test_typed_access() {
        let dir = TempDir::new().unwrap();
        let save = open(&dir);
        save.set_int("Gold", 5);
        save.set_vector("Spawn_Pos", Vector3::new(1.0, 2.0, 3.0));

        assert!(save.has_key("Gold"));
        assert!(save.has_key("Spawn_Pos"));
        assert_eq!(save.get_int("Gold", 0), 5);
        assert!(save.remove_key("Gold"));
        assert!(!save.has_key("Gold"));
        assert!(!save.remove_key("Gold"));

        save.clear_all_data();
        assert!(save.snapshot().is_empty());
    }

    #[test]
    fn test_generate_schema_applies_defaults() {
        let dir = TempDir::new().unwrap();
        let save = open(&dir);

        assert_eq!(save.generate_schema_from::<Options>().unwrap(), 3);
        assert!(save.schema_file_path().exists());
        assert_eq!(save.get_string("difficulty", ""), "Normal");
        assert_eq!(save.restore::<Options>().unwrap(), Options::default());
    }

    #[test]
    fn test_capture_save_reload() {
        let dir = TempDir::new().unwrap();
        let save = open(&dir);
        let options = Options { volume: 0.25, difficulty: "Hard".into(), subtitles: false };

        save.capture(&options).unwrap();
        save.save().unwrap();
        save.clear_all_data();
        save.reload().unwrap();
        assert_eq!(save.restore::<Options>().unwrap(), options);
    }

    #[test]
    fn test_validate_with_edited_schema() {
        let dir = TempDir::new().unwrap();
        let save = open(&dir);
        save.generate_schema_from::<Options>().unwrap();
        save.update_schema(|schema| {
            if let Some(field) = schema.get_mut("volume") {
                field.enable_validation = true;
                field.min_value = 0.0;
                field.max_value = 1.0;
            }
        })
        .unwrap();

        assert!(save.validate().is_ok());
        save.set_float("volume", 3.0);
        assert_eq!(save.validate().unwrap_err().field, "volume");
        assert_eq!(save.violations().len(), 1);
    }

    #[test]
    fn test_info_mentions_paths() {
        let dir = TempDir::new().unwrap();
        let save = open(&dir);
        let info = save.info();
        assert!(info.contains("Format: YAML"));
        assert!(info.contains("EzSaveConfig.yaml"));
        assert!(save.save_dir().unwrap().is_dir());
    }
}
