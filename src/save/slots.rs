//! Save slots
//!
//! Numbered slots plus one auto-save slot. Each slot is a config document in
//! the active format, with a JSON metadata file and an optional screenshot
//! next to it:
//!
//! ```text
//! Slot3.toml  Slot3_Metadata.json  Slot3_Screenshot.png
//! AutoSave.toml  AutoSave_Metadata.json
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use super::error::SaveError;
use super::save_data::SaveData;
use super::store::{merge_with_schema, write_atomic, ConfigStore};
use crate::format;

/// Key in the global config recording the last numbered slot used
pub const LAST_USED_SLOT_KEY: &str = "LastUsedSlot";

/// Default number of numbered slots to scan
pub const DEFAULT_MAX_SLOTS: u32 = 10;

/// Identifies a save slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotId {
    Index(u32),
    Auto,
}

impl SlotId {
    /// File name stem: `Slot{n}` or `AutoSave`
    pub fn file_stem(&self) -> String {
        match self {
            SlotId::Index(n) => format!("Slot{}", n),
            SlotId::Auto => "AutoSave".to_string(),
        }
    }

    /// Name shown for a slot that was never renamed
    pub fn default_name(&self) -> String {
        match self {
            SlotId::Index(n) => format!("Save {}", n),
            SlotId::Auto => "Auto Save".to_string(),
        }
    }

    /// Numeric index; the auto slot is -1
    pub fn as_index(&self) -> i64 {
        match self {
            SlotId::Index(n) => i64::from(*n),
            SlotId::Auto => -1,
        }
    }

    /// From a numeric index, where -1 is the auto slot
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            -1 => Some(SlotId::Auto),
            n if n >= 0 => u32::try_from(n).ok().map(SlotId::Index),
            _ => None,
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotId::Index(n) => write!(f, "Slot {}", n),
            SlotId::Auto => f.write_str("Auto-save slot"),
        }
    }
}

impl FromStr for SlotId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") || s.eq_ignore_ascii_case("autosave") {
            return Ok(SlotId::Auto);
        }
        s.parse::<i64>()
            .ok()
            .and_then(SlotId::from_index)
            .ok_or_else(|| format!("invalid slot '{}': use a number, -1 or 'auto'", s))
    }
}

/// Slot metadata, stored as `{stem}_Metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SlotInfo {
    pub slot_index: i64,
    pub slot_name: String,
    pub last_modified: DateTime<Utc>,
    /// Seconds played
    pub play_time: f64,
    /// Free-form progress label
    pub player_level: String,
    pub character_level: i32,
    /// Set from the file system, never stored
    #[serde(skip)]
    pub is_occupied: bool,
    pub screenshot_path: String,
    pub custom_data: String,
}

impl Default for SlotInfo {
    fn default() -> Self {
        Self {
            slot_index: 0,
            slot_name: String::new(),
            last_modified: DateTime::<Utc>::default(),
            play_time: 0.0,
            player_level: String::new(),
            character_level: 1,
            is_occupied: false,
            screenshot_path: String::new(),
            custom_data: String::new(),
        }
    }
}

impl SlotInfo {
    /// Empty info for a slot
    pub fn empty(slot: SlotId) -> Self {
        Self { slot_index: slot.as_index(), ..Default::default() }
    }

    /// One-line summary for listings
    pub fn display_text(&self) -> String {
        if !self.is_occupied {
            return format!("[{}] <empty>", self.slot_index);
        }
        format!(
            "[{}] {} - {} ({:.0}s played)",
            self.slot_index,
            self.slot_name,
            self.last_modified.format("%Y-%m-%d %H:%M:%S"),
            self.play_time
        )
    }
}

/// Slot operations over a config store
pub struct SlotManager<'a> {
    store: &'a mut ConfigStore,
}

impl<'a> SlotManager<'a> {
    pub fn new(store: &'a mut ConfigStore) -> Self {
        Self { store }
    }

    // ========================================================================
    // Paths
    // ========================================================================

    pub fn slot_file_path(&self, slot: SlotId) -> PathBuf {
        let settings = self.store.settings();
        settings
            .save_dir()
            .join(format!("{}.{}", slot.file_stem(), settings.extension()))
    }

    pub fn metadata_path(&self, slot: SlotId) -> PathBuf {
        self.store
            .settings()
            .save_dir()
            .join(format!("{}_Metadata.json", slot.file_stem()))
    }

    pub fn slot_screenshot_path(&self, slot: SlotId) -> PathBuf {
        self.store
            .settings()
            .save_dir()
            .join(format!("{}_Screenshot.png", slot.file_stem()))
    }

    // ========================================================================
    // Save / load
    // ========================================================================

    /// Save the live data into a slot and refresh its metadata
    pub fn save_to_slot(&mut self, slot: SlotId) -> Result<(), SaveError> {
        if let SlotId::Index(n) = slot {
            self.store.data_mut().set_int(LAST_USED_SLOT_KEY, i64::from(n));
        }

        let text = format::save_config(self.store.format(), self.store.data())?;
        self.store.write_document(&self.slot_file_path(slot), &text)?;

        let previous = self.read_metadata(slot).unwrap_or_else(|| SlotInfo::empty(slot));
        let info = SlotInfo {
            slot_index: slot.as_index(),
            slot_name: if previous.slot_name.is_empty() {
                slot.default_name()
            } else {
                previous.slot_name
            },
            last_modified: Utc::now(),
            is_occupied: true,
            ..previous
        };
        self.write_metadata(slot, &info)?;

        if let SlotId::Index(n) = slot {
            self.record_last_used(n)?;
        }

        log::info!("Saved to {}", slot);
        Ok(())
    }

    /// Replace the live data with a slot's contents
    pub fn load_from_slot(&mut self, slot: SlotId) -> Result<(), SaveError> {
        if !self.is_slot_occupied(slot) {
            return Err(SaveError::EmptySlot { slot: slot.to_string() });
        }

        let text = self.store.read_document(&self.slot_file_path(slot))?;
        let data = format::load_config(self.store.format(), &text)?;
        let merged = merge_with_schema(self.store.schema(), data);
        self.store.set_data(merged);

        if let SlotId::Index(n) = slot {
            self.store.data_mut().set_int(LAST_USED_SLOT_KEY, i64::from(n));
        }

        log::info!("Loaded {}", slot);
        Ok(())
    }

    /// Remove a slot's document, metadata and screenshot
    pub fn delete_slot(&mut self, slot: SlotId) -> Result<(), SaveError> {
        for path in [
            self.slot_file_path(slot),
            self.metadata_path(slot),
            self.slot_screenshot_path(slot),
        ] {
            if path.exists() {
                fs::remove_file(&path)?;
                log::log!(self.store.settings().io_log_level(), "Deleted {:?}", path);
            }
        }
        log::info!("Deleted {}", slot);
        Ok(())
    }

    pub fn is_slot_occupied(&self, slot: SlotId) -> bool {
        self.slot_file_path(slot).exists()
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    fn read_metadata(&self, slot: SlotId) -> Option<SlotInfo> {
        let path = self.metadata_path(slot);
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(info) => Some(info),
            Err(e) => {
                log::warn!("Ignoring unreadable slot metadata {:?}: {}", path, e);
                None
            }
        }
    }

    fn write_metadata(&self, slot: SlotId, info: &SlotInfo) -> Result<(), SaveError> {
        let json = serde_json::to_string_pretty(info).map_err(format::FormatError::from)?;
        write_atomic(&self.metadata_path(slot), json.as_bytes())
    }

    /// Metadata for a slot; empty slots report `is_occupied == false`
    pub fn slot_info(&self, slot: SlotId) -> SlotInfo {
        let occupied = self.is_slot_occupied(slot);
        let mut info = self.read_metadata(slot).unwrap_or_else(|| SlotInfo::empty(slot));
        info.slot_index = slot.as_index();
        info.is_occupied = occupied;
        if occupied && info.slot_name.is_empty() {
            info.slot_name = slot.default_name();
        }
        info
    }

    /// Info for slots `0..max`, then the auto slot
    pub fn all_slots(&self, max_slots: u32) -> Vec<SlotInfo> {
        (0..max_slots)
            .map(SlotId::Index)
            .chain(std::iter::once(SlotId::Auto))
            .map(|slot| self.slot_info(slot))
            .collect()
    }

    /// Update the stored name, play time and progress labels of a used slot
    pub fn update_slot_metadata(
        &mut self,
        slot: SlotId,
        slot_name: &str,
        play_time: f64,
        player_level: &str,
        character_level: i32,
        custom_data: &str,
    ) -> Result<(), SaveError> {
        if !self.is_slot_occupied(slot) {
            return Err(SaveError::EmptySlot { slot: slot.to_string() });
        }
        let info = SlotInfo {
            slot_name: slot_name.to_string(),
            play_time,
            player_level: player_level.to_string(),
            character_level,
            custom_data: custom_data.to_string(),
            last_modified: Utc::now(),
            ..self.slot_info(slot)
        };
        self.write_metadata(slot, &info)
    }

    /// Store PNG bytes as the slot's screenshot and record the path
    pub fn save_slot_screenshot(&mut self, slot: SlotId, png: &[u8]) -> Result<PathBuf, SaveError> {
        let path = self.slot_screenshot_path(slot);
        write_atomic(&path, png)?;

        let info = SlotInfo {
            screenshot_path: path.display().to_string(),
            ..self.slot_info(slot)
        };
        self.write_metadata(slot, &info)?;
        log::info!("Saved screenshot for {} ({} bytes)", slot, png.len());
        Ok(path)
    }

    // ========================================================================
    // Shortcuts
    // ========================================================================

    pub fn auto_save(&mut self) -> Result<(), SaveError> {
        self.save_to_slot(SlotId::Auto)
    }

    /// Save to the last used slot, or slot 0
    pub fn quick_save(&mut self) -> Result<SlotId, SaveError> {
        let slot = SlotId::Index(self.last_used_slot());
        self.save_to_slot(slot)?;
        Ok(slot)
    }

    /// Load the last used slot, which must hold a save
    pub fn quick_load(&mut self) -> Result<SlotId, SaveError> {
        let slot = SlotId::Index(self.last_used_slot());
        if !self.is_slot_occupied(slot) {
            return Err(SaveError::NothingToQuickLoad);
        }
        self.load_from_slot(slot)?;
        Ok(slot)
    }

    /// Copy a slot's document and metadata to another slot
    pub fn copy_slot(&mut self, from: SlotId, to: SlotId) -> Result<(), SaveError> {
        if !self.is_slot_occupied(from) {
            return Err(SaveError::EmptySlot { slot: from.to_string() });
        }

        let text = self.store.read_document(&self.slot_file_path(from))?;
        self.store.write_document(&self.slot_file_path(to), &text)?;

        if let Some(info) = self.read_metadata(from) {
            let copied = SlotInfo {
                slot_index: to.as_index(),
                last_modified: Utc::now(),
                // screenshots stay with their slot
                screenshot_path: String::new(),
                ..info
            };
            self.write_metadata(to, &copied)?;
        }

        log::info!("Copied {} to {}", from, to);
        Ok(())
    }

    /// Store `LastUsedSlot` in the global config file, leaving its other
    /// keys as they are on disk
    fn record_last_used(&self, index: u32) -> Result<(), SaveError> {
        let path = self.store.settings().config_file_path();
        let mut global = if path.exists() {
            let text = self.store.read_document(&path)?;
            format::load_config(self.store.format(), &text)?
        } else {
            SaveData::new()
        };
        global.set_int(LAST_USED_SLOT_KEY, i64::from(index));

        let text = format::save_config(self.store.format(), &global)?;
        self.store.write_document(&path, &text)
    }

    /// Last numbered slot used, read from the global config file
    pub fn last_used_slot(&self) -> u32 {
        let path = self.store.settings().config_file_path();
        let from_disk = self
            .store
            .read_document(&path)
            .ok()
            .and_then(|text| format::load_config(self.store.format(), &text).ok())
            .map(|data| data.get_int(LAST_USED_SLOT_KEY, 0));

        from_disk
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    }

    /// First numbered slot below `max_slots` without a save
    pub fn find_first_empty_slot(&self, max_slots: u32) -> Option<SlotId> {
        (0..max_slots)
            .map(SlotId::Index)
            .find(|slot| !self.is_slot_occupied(*slot))
    }

    /// Delete every slot, the auto slot, the config and the schema.
    /// Returns the number of files removed.
    pub fn delete_all_save_data(&mut self, max_slots: u32) -> Result<usize, SaveError> {
        let mut paths = Vec::new();
        for slot in (0..max_slots).map(SlotId::Index).chain(std::iter::once(SlotId::Auto)) {
            paths.push(self.slot_file_path(slot));
            paths.push(self.metadata_path(slot));
            paths.push(self.slot_screenshot_path(slot));
        }
        paths.push(self.store.settings().config_file_path());
        paths.push(self.store.settings().schema_file_path());

        let mut deleted = 0;
        let mut failed = 0;
        for path in paths.iter().filter(|p| p.exists()) {
            match fs::remove_file(path) {
                Ok(()) => deleted += 1,
                Err(e) => {
                    log::error!("Failed to delete {:?}: {}", path, e);
                    failed += 1;
                }
            }
        }

        log::info!("Deleted {} save files", deleted);
        if failed > 0 {
            return Err(SaveError::DeleteFailed { deleted, failed });
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use crate::settings::Settings;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> ConfigStore {
        ConfigStore::open(Settings { format: Format::Toml, ..Settings::with_root(dir.path()) })
    }

    #[test]
    fn test_slot_id_parse() {
        assert_eq!("3".parse::<SlotId>().unwrap(), SlotId::Index(3));
        assert_eq!("-1".parse::<SlotId>().unwrap(), SlotId::Auto);
        assert_eq!("auto".parse::<SlotId>().unwrap(), SlotId::Auto);
        assert!("-2".parse::<SlotId>().is_err());
        assert_eq!(SlotId::Index(4).file_stem(), "Slot4");
    }

    #[test]
    fn test_save_and_load_slot() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.data_mut().set_int("Gold", 10);

        let mut slots = SlotManager::new(&mut store);
        slots.save_to_slot(SlotId::Index(2)).unwrap();
        assert!(slots.is_slot_occupied(SlotId::Index(2)));
        assert_eq!(slots.last_used_slot(), 2);

        let info = slots.slot_info(SlotId::Index(2));
        assert!(info.is_occupied);
        assert_eq!(info.slot_name, "Save 2");
        assert_eq!(info.character_level, 1);

        slots.store.data_mut().set_int("Gold", 999);
        slots.load_from_slot(SlotId::Index(2)).unwrap();
        assert_eq!(store.data().get_int("Gold", 0), 10);
    }

    #[test]
    fn test_slot_save_only_records_last_used_globally() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.data_mut().set_int("Gold", 1);
        store.save_to_disk().unwrap();
        store.data_mut().set_int("Gold", 999);

        let mut slots = SlotManager::new(&mut store);
        slots.save_to_slot(SlotId::Index(2)).unwrap();

        let path = store.settings().config_file_path();
        let text = store.read_document(&path).unwrap();
        let global = format::load_config(store.format(), &text).unwrap();
        assert_eq!(global.get_int("Gold", 0), 1);
        assert_eq!(global.get_int(LAST_USED_SLOT_KEY, -1), 2);
    }

    #[test]
    fn test_load_empty_slot_fails() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let mut slots = SlotManager::new(&mut store);
        assert!(matches!(
            slots.load_from_slot(SlotId::Index(5)),
            Err(SaveError::EmptySlot { .. })
        ));
        assert!(matches!(slots.quick_load(), Err(SaveError::NothingToQuickLoad)));
    }

    #[test]
    fn test_metadata_survives_resave() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let mut slots = SlotManager::new(&mut store);

        slots.save_to_slot(SlotId::Index(1)).unwrap();
        slots
            .update_slot_metadata(SlotId::Index(1), "Boss Fight", 3600.0, "Chapter 3", 12, "hard")
            .unwrap();
        slots.save_slot_screenshot(SlotId::Index(1), b"\x89PNG").unwrap();
        slots.save_to_slot(SlotId::Index(1)).unwrap();

        let info = slots.slot_info(SlotId::Index(1));
        assert_eq!(info.slot_name, "Boss Fight");
        assert_eq!(info.play_time, 3600.0);
        assert_eq!(info.player_level, "Chapter 3");
        assert_eq!(info.character_level, 12);
        assert!(info.screenshot_path.ends_with("Slot1_Screenshot.png"));
    }

    #[test]
    fn test_auto_save_does_not_touch_last_used() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let mut slots = SlotManager::new(&mut store);

        slots.save_to_slot(SlotId::Index(3)).unwrap();
        slots.auto_save().unwrap();
        assert!(slots.is_slot_occupied(SlotId::Auto));
        assert_eq!(slots.last_used_slot(), 3);
        assert_eq!(slots.slot_info(SlotId::Auto).slot_name, "Auto Save");
    }

    #[test]
    fn test_quick_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.data_mut().set_string("Zone", "Forest");
        let mut slots = SlotManager::new(&mut store);

        assert_eq!(slots.quick_save().unwrap(), SlotId::Index(0));
        slots.store.data_mut().set_string("Zone", "Cave");
        assert_eq!(slots.quick_load().unwrap(), SlotId::Index(0));
        assert_eq!(store.data().get_string("Zone", ""), "Forest");
    }

    #[test]
    fn test_copy_and_find_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let mut slots = SlotManager::new(&mut store);

        slots.save_to_slot(SlotId::Index(0)).unwrap();
        slots.copy_slot(SlotId::Index(0), SlotId::Index(1)).unwrap();
        assert!(slots.is_slot_occupied(SlotId::Index(1)));
        assert_eq!(slots.slot_info(SlotId::Index(1)).slot_index, 1);

        assert_eq!(slots.find_first_empty_slot(10), Some(SlotId::Index(2)));
        assert_eq!(slots.find_first_empty_slot(2), None);
        assert!(slots.copy_slot(SlotId::Index(7), SlotId::Index(8)).is_err());
    }

    #[test]
    fn test_all_slots_and_delete_all() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let mut slots = SlotManager::new(&mut store);

        slots.save_to_slot(SlotId::Index(0)).unwrap();
        slots.auto_save().unwrap();

        let all = slots.all_slots(3);
        assert_eq!(all.len(), 4);
        assert!(all[0].is_occupied);
        assert!(!all[1].is_occupied);
        assert_eq!(all[3].slot_index, -1);

        // slot 0 + metadata, auto + metadata, global config
        assert_eq!(slots.delete_all_save_data(3).unwrap(), 5);
        assert!(!slots.is_slot_occupied(SlotId::Index(0)));
        assert!(slots.all_slots(3).iter().all(|s| !s.is_occupied));
    }

    #[test]
    fn test_delete_slot() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let mut slots = SlotManager::new(&mut store);

        slots.save_to_slot(SlotId::Index(4)).unwrap();
        slots.delete_slot(SlotId::Index(4)).unwrap();
        assert!(!slots.is_slot_occupied(SlotId::Index(4)));
        assert!(!slots.metadata_path(SlotId::Index(4)).exists());
    }
}
