//! Integration tests: settings persistence through the file-backed KV store.

use plantcare::adapters::kv::KvAdapter;
use plantcare::app::ports::KvPort;
use plantcare::settings::{SettingKey, Settings, SettingsStore};

#[test]
fn defaults_when_nothing_is_stored() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::load(KvAdapter::open(dir.path().join("settings.json")).unwrap());

    assert!(!store.get(SettingKey::DarkMode));
    assert!(store.get(SettingKey::Notifications));
    assert_eq!(store.current(), Settings::default());
}

#[test]
fn changes_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut store = SettingsStore::load(KvAdapter::open(&path).unwrap());
    assert!(store.set(SettingKey::DarkMode, true).unwrap());
    assert!(store.set(SettingKey::Notifications, false).unwrap());
    drop(store);

    let reloaded = SettingsStore::load(KvAdapter::open(&path).unwrap());
    assert!(reloaded.get(SettingKey::DarkMode));
    assert!(!reloaded.get(SettingKey::Notifications));
}

#[test]
fn setting_the_same_value_reports_no_change() {
    let mut store = SettingsStore::load(KvAdapter::in_memory());
    assert!(!store.set(SettingKey::Notifications, true).unwrap());
    assert!(store.set(SettingKey::Notifications, false).unwrap());
    assert!(!store.set(SettingKey::Notifications, false).unwrap());
}

#[test]
fn garbage_blob_falls_back_to_defaults() {
    let mut kv = KvAdapter::in_memory();
    kv.write("plantcare", "settings", &[0xff, 0xff, 0xff]).unwrap();

    let store = SettingsStore::load(kv);
    assert_eq!(store.current(), Settings::default());
}

#[test]
fn reset_restores_defaults_and_clears_storage() {
    let mut store = SettingsStore::load(KvAdapter::in_memory());
    store.toggle(SettingKey::DarkMode).unwrap();
    store.reset().unwrap();

    assert_eq!(store.current(), Settings::default());
    assert!(!store.into_inner().exists("plantcare", "settings"));
}

#[test]
fn map_view_uses_ui_key_names() {
    let store = SettingsStore::load(KvAdapter::in_memory());
    let map = store.current().as_map();
    assert_eq!(map.get("darkMode"), Some(&false));
    assert_eq!(map.get("notifications"), Some(&true));
}
