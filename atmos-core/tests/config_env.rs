//! Environment overrides for the config file and data directory. Kept in its
//! own test binary with a single test, since it mutates process environment.

use std::fs;

use atmos_core::{
    Config, LocationStore, SavedLocation,
    config::{CONFIG_PATH_ENV, DATA_DIR_ENV},
};

#[test]
fn env_vars_redirect_config_and_data_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("custom.toml");
    let data_dir = dir.path().join("state");

    // SAFETY: this is the only test in this binary, so no other thread reads
    // the environment concurrently.
    unsafe {
        std::env::set_var(CONFIG_PATH_ENV, &config_path);
        std::env::set_var(DATA_DIR_ENV, &data_dir);
    }

    assert_eq!(Config::config_file_path().expect("config path"), config_path);
    assert_eq!(Config::data_dir().expect("data dir"), data_dir);

    fs::write(&config_path, "timeout_secs = 4\n").expect("write config");
    assert_eq!(Config::load().expect("loads").timeout_secs, 4);

    let cfg = Config {
        timeout_secs: 9,
        ..Config::default()
    };
    assert_eq!(cfg.save().expect("saves"), config_path);
    assert_eq!(Config::load().expect("reloads").timeout_secs, 9);

    let store = LocationStore::new(Config::data_dir().expect("data dir"));
    store
        .save(&SavedLocation {
            lat: 51.5,
            lon: -0.12,
            name: "London".into(),
        })
        .expect("saves location");
    assert!(store.path().starts_with(&data_dir));
    assert!(store.path().exists());

    // SAFETY: as above.
    unsafe {
        std::env::remove_var(CONFIG_PATH_ENV);
        std::env::remove_var(DATA_DIR_ENV);
    }
}
