use super::*;
use crate::util::preferences::{FileStore, MemoryStore};

fn store_with(value: &str) -> MemoryStore {
    let mut store = MemoryStore::default();
    store.set(THEME_KEY, value).unwrap();
    store
}

#[test]
fn stored_dark_is_kept() {
    let mut store = store_with("dark");
    assert_eq!(read_preference(&mut store, false).unwrap(), Theme::Dark);
    assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
}

#[test]
fn auto_follows_system_and_is_resolved() {
    let mut store = store_with("auto");
    assert_eq!(read_preference(&mut store, true).unwrap(), Theme::Dark);
    assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));

    let mut store = store_with("auto");
    assert_eq!(read_preference(&mut store, false).unwrap(), Theme::Light);
    assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
}

#[test]
fn missing_or_unknown_falls_back_to_light() {
    let mut store = MemoryStore::default();
    assert_eq!(read_preference(&mut store, true).unwrap(), Theme::Light);
    assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));

    let mut store = store_with("solarized");
    assert_eq!(read_preference(&mut store, true).unwrap(), Theme::Light);
    assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
}

#[test]
fn toggle_persists_and_reload_restores_it() {
    let path = std::env::temp_dir()
        .join(format!("chat-theme-{}", uuid::Uuid::new_v4()))
        .join("prefs.json");

    let mut store = FileStore::open(&path).unwrap();
    let theme = read_preference(&mut store, false).unwrap();
    let toggled = toggle(&mut store, theme).unwrap();
    assert_eq!(toggled, Theme::Dark);

    let mut reopened = FileStore::open(&path).unwrap();
    assert_eq!(read_preference(&mut reopened, false).unwrap(), Theme::Dark);

    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn colorfgbg_background_decides_darkness() {
    assert!(colorfgbg_is_dark(Some("15;0")));
    assert!(colorfgbg_is_dark(Some("15;default;8")));
    assert!(!colorfgbg_is_dark(Some("0;15")));
    assert!(!colorfgbg_is_dark(Some("garbage")));
    assert!(!colorfgbg_is_dark(None));
}
