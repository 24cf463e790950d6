//! Settings loading against the real process environment.

use reelhouse::config::{apply_env_overrides, load_config_or_default, Config};
use serial_test::serial;
use std::path::PathBuf;

const VARS: &[&str] = &[
    "MEDIA_ROOT",
    "LIBRARY_CONFIG",
    "DATA_DIR",
    "LAN_ONLY",
    "REELHOUSE_HOST",
    "REELHOUSE_PORT",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn env_overrides_file_settings() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reelhouse.toml");
    std::fs::write(
        &path,
        r#"
        [server]
        port = 4000

        [media]
        root = "/srv/from-file"
        "#,
    )
    .unwrap();

    std::env::set_var("MEDIA_ROOT", dir.path());
    std::env::set_var("DATA_DIR", "/var/lib/reelhouse");
    std::env::set_var("LAN_ONLY", "false");

    let mut config = load_config_or_default(Some(&path)).unwrap();
    apply_env_overrides(&mut config).unwrap();
    clear_env();

    assert_eq!(config.server.port, 4000);
    assert_eq!(config.media.root, dir.path());
    assert_eq!(
        config.media.library_config,
        PathBuf::from("/var/lib/reelhouse/library.yml")
    );
    assert!(!config.server.lan_only);
}

#[test]
#[serial]
fn library_config_beats_data_dir() {
    clear_env();
    std::env::set_var("DATA_DIR", "/var/lib/reelhouse");
    std::env::set_var("LIBRARY_CONFIG", "/etc/reelhouse/library.yml");

    let mut config = Config::default();
    apply_env_overrides(&mut config).unwrap();
    clear_env();

    assert_eq!(
        config.media.library_config,
        PathBuf::from("/etc/reelhouse/library.yml")
    );
}

#[test]
#[serial]
fn bad_port_in_env_is_an_error() {
    clear_env();
    std::env::set_var("REELHOUSE_PORT", "99999");

    let mut config = Config::default();
    let result = apply_env_overrides(&mut config);
    clear_env();

    assert!(result.is_err());
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_config_or_default(Some(&dir.path().join("absent.toml"))).is_err());
}
