use dumppad::config::PadConfig;
use dumppad::formatter::DumpDisplayStyle;
use dumppad::hot_reload::watch_config;
use dumppad::type_name::TypeNameStyle;
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod common;
use common::temp_files;

fn wait_for<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..40 {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    false
}

#[test]
fn test_watch_config_reload() {
    const CONFIG_V1: &str = "listen_port: 6101\ntype_name_style: normal\n";
    const CONFIG_V2: &str = "listen_port: 6102\ntype_name_style: full\n";

    let file = temp_files::create_temp_config(CONFIG_V1);
    let initial = PadConfig::from_file(file.path()).unwrap();

    let updates: Arc<Mutex<Vec<PadConfig>>> = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = Arc::clone(&updates);

    let watcher = watch_config(file.path(), initial, move |config| {
        updates_clone.lock().unwrap().push(config);
    })
    .expect("watch_config");

    // allow watcher thread to start
    std::thread::sleep(Duration::from_millis(100));

    std::fs::write(file.path(), CONFIG_V2).unwrap();

    // the write may surface as several events; the last one sees the final content
    assert!(wait_for(|| updates
        .lock()
        .unwrap()
        .last()
        .is_some_and(|c| c.type_name_style == TypeNameStyle::Full)));
    let last = updates.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.listen_port, 6102);

    drop(watcher);
}

#[test]
fn test_invalid_config_is_skipped() {
    const VALID: &str = "dump_display_style: full\n";
    const INVALID: &str = "dump_display_style: sideways\n";
    const FIXED: &str = "dump_display_style: single\n";

    let file = temp_files::create_temp_config(VALID);
    let initial = PadConfig::from_file(file.path()).unwrap();

    let updates: Arc<Mutex<Vec<PadConfig>>> = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = Arc::clone(&updates);
    let watcher = watch_config(file.path(), initial, move |config| {
        updates_clone.lock().unwrap().push(config);
    })
    .expect("watch_config");
    std::thread::sleep(Duration::from_millis(100));

    std::fs::write(file.path(), INVALID).unwrap();
    std::thread::sleep(Duration::from_millis(300));
    assert!(updates.lock().unwrap().is_empty());

    std::fs::write(file.path(), FIXED).unwrap();
    assert!(wait_for(|| updates
        .lock()
        .unwrap()
        .last()
        .is_some_and(|c| c.dump_display_style == DumpDisplayStyle::Single)));

    drop(watcher);
}
