use ezsave::{EzSave, FieldDescriptor, FieldType, Format, Settings, SlotId, Vector3};
use tempfile::TempDir;

fn settings(dir: &TempDir, format: Format) -> Settings {
    Settings { format, ..Settings::with_root(dir.path()) }
}

#[test]
fn test_session_across_restarts() {
    let dir = TempDir::new().unwrap();

    {
        let save = EzSave::new(settings(&dir, Format::Toml));
        save.update_schema(|schema| {
            schema.insert(FieldDescriptor::scalar("Gold", FieldType::Int, "50"));
            schema.insert(FieldDescriptor::scalar("Home_Pos", FieldType::Vector, "0,0,0"));
        })
        .unwrap();

        assert_eq!(save.get_int("Gold", 0), 50);
        save.set_int("Gold", 120);
        save.set_vector("Home_Pos", Vector3::new(4.0, 5.0, 6.0));
        save.save_to_slot(SlotId::Index(1)).unwrap();
    }

    let save = EzSave::new(settings(&dir, Format::Toml));
    // the global config only remembers which slot was used
    assert_eq!(save.get_int("LastUsedSlot", -1), 1);
    assert_eq!(save.get_int("Gold", 0), 50);

    assert_eq!(save.quick_load().unwrap(), SlotId::Index(1));
    assert_eq!(save.get_int("Gold", 0), 120);
    assert_eq!(save.get_vector("Home_Pos", Vector3::ZERO), Vector3::new(4.0, 5.0, 6.0));
}

#[test]
fn test_every_format_round_trips_slots() {
    for format in Format::ALL {
        let dir = TempDir::new().unwrap();
        let save = EzSave::new(settings(&dir, format));
        save.set_string("Name", "Wren");
        save.set_float("Volume", 0.5);
        save.save_to_slot(SlotId::Auto).unwrap();

        save.clear_all_data();
        save.load_from_slot(SlotId::Auto).unwrap();
        assert_eq!(save.get_string("Name", ""), "Wren", "{}", format);
        assert_eq!(save.get_float("Volume", 0.0), 0.5, "{}", format);
    }
}

#[test]
fn test_encrypted_slots() {
    let dir = TempDir::new().unwrap();
    let encrypted = Settings {
        enable_encryption: true,
        encryption_key: "integration".into(),
        ..settings(&dir, Format::Json)
    };

    let save = EzSave::new(encrypted.clone());
    save.set_string("Secret", "hidden-room");
    save.save_to_slot(SlotId::Index(0)).unwrap();

    let slot_file = encrypted.save_dir().join("Slot0.json");
    let raw = std::fs::read_to_string(slot_file).unwrap();
    assert!(!raw.contains("hidden-room"));

    save.clear_all_data();
    save.load_from_slot(SlotId::Index(0)).unwrap();
    assert_eq!(save.get_string("Secret", ""), "hidden-room");
}

#[test]
fn test_delete_all_save_data() {
    let dir = TempDir::new().unwrap();
    let save = EzSave::new(settings(&dir, Format::Yaml));
    save.set_int("Gold", 1);
    save.save_to_slot(SlotId::Index(0)).unwrap();
    save.save_to_slot(SlotId::Index(2)).unwrap();

    let deleted = save.delete_all_save_data(5).unwrap();
    assert_eq!(deleted, 5);
    assert!(!save.config_file_path().exists());
    assert!(!save.has_key("Gold"));
    assert!(save.quick_load().is_err());
}
