use chargeguard::bus::SimulatedBus;
use chargeguard::settings::{JsonSettingsStore, SettingsStore};
use chargeguard::writer::ValidatedWriter;
use std::fs;

fn seeded_store(path: &std::path::Path) {
    let mut store = JsonSettingsStore::open(path);
    store.set("VREG_10_0", 8400).unwrap();
    store.set("ICHG_8_0", 1500).unwrap();
}

#[test]
fn set_overwrites_and_survives_reopen() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("nested").join("settings.json");

    let mut store = JsonSettingsStore::open(&path);
    store.set("ICHG_8_0", 1000).unwrap();
    store.set("EN_CHG", 1).unwrap();
    store.set("ICHG_8_0", 2000).unwrap();

    let reopened = JsonSettingsStore::open(&path);
    assert_eq!(
        reopened.get_all().unwrap(),
        vec![("ICHG_8_0".to_string(), 2000), ("EN_CHG".to_string(), 1)]
    );
}

#[test]
fn failed_save_leaves_memory_unchanged() {
    let tmp_dir = tempfile::tempdir().unwrap();
    // A regular file where the parent directory should be
    let blocker = tmp_dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let mut store = JsonSettingsStore::open(blocker.join("settings.json"));
    let err = store.set("ICHG_8_0", 1000).unwrap_err();
    assert_eq!(err.kind(), "Io");
    assert!(store.get_all().unwrap().is_empty());
    assert!(store.clear_all().is_err());
}

#[test]
fn corrupt_file_opens_empty() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    let store = JsonSettingsStore::open(&path);
    assert!(store.get_all().unwrap().is_empty());
}

#[test]
fn non_integer_values_are_skipped() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("settings.json");
    fs::write(&path, r#"{"EN_CHG": 1, "NOTE": "hello", "VREG_10_0": 8400}"#).unwrap();

    let store = JsonSettingsStore::open(&path);
    let names: Vec<String> = store.get_all().unwrap().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["EN_CHG", "VREG_10_0"]);
}

#[tokio::test]
async fn factory_reset_clears_store_on_success() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("settings.json");
    seeded_store(&path);

    let bus = SimulatedBus::new();
    let mut writer = ValidatedWriter::new(
        Box::new(bus.clone()),
        Box::new(JsonSettingsStore::open(&path)),
    );
    writer.write("REG_RST", 1).await.unwrap();

    assert!(writer.store().get_all().unwrap().is_empty());
    assert!(JsonSettingsStore::open(&path).get_all().unwrap().is_empty());
    // The reset bit does not stick
    assert_eq!(bus.register(0x09) & 0x40, 0);
}

#[tokio::test]
async fn factory_reset_with_zero_is_rejected_and_keeps_store() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("settings.json");
    seeded_store(&path);

    let bus = SimulatedBus::new();
    let mut writer = ValidatedWriter::new(
        Box::new(bus.clone()),
        Box::new(JsonSettingsStore::open(&path)),
    );
    let err = writer.write("REG_RST", 0).await.unwrap_err();

    assert_eq!(err.kind(), "OutOfRange");
    assert!(bus.writes().is_empty());
    assert_eq!(writer.store().get_all().unwrap().len(), 2);
    assert_eq!(JsonSettingsStore::open(&path).get_all().unwrap().len(), 2);
}

#[tokio::test]
async fn factory_reset_keeps_store_when_bus_fails() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("settings.json");
    seeded_store(&path);

    let bus = SimulatedBus::new();
    bus.fail_writes_at(0x09);
    let mut writer = ValidatedWriter::new(
        Box::new(bus.clone()),
        Box::new(JsonSettingsStore::open(&path)),
    );
    let err = writer.write("REG_RST", 1).await.unwrap_err();

    assert_eq!(err.kind(), "BusError");
    assert_eq!(writer.store().get_all().unwrap().len(), 2);
    assert_eq!(JsonSettingsStore::open(&path).get_all().unwrap().len(), 2);
}
