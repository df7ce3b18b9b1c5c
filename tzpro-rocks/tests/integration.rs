//! Registry state kept in RocksDB across reopen.

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use tzpro_core::{Registry, Settings};
use tzpro_rocks::RocksStore;

#[test]
fn registry_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let instant = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();

    {
        let store = RocksStore::open(dir.path()).unwrap();
        let mut registry = Registry::load(Settings::new(store), "UTC");
        registry.add_timezone("Europe/Berlin");
        registry.remove_timezone("Asia/Tokyo");
        registry.set_custom_instant(instant);
        registry.save_current_as_user_default(false).unwrap();
    }

    let store = RocksStore::open(dir.path()).unwrap();
    let mut registry = Registry::load(Settings::new(store), "UTC");
    assert!(registry.contains("Europe/Berlin"));
    assert!(!registry.contains("Asia/Tokyo"));
    assert_eq!(registry.custom_instant(), Some(instant));

    registry.reset_to_user_default();
    assert!(!registry.is_custom());
    assert!(registry.settings().nav_collapsed());
    assert!(registry.contains("Europe/Berlin"));
}
