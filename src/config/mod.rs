//! Server settings.
//!
//! Settings come from a TOML file (or defaults), then environment variables
//! layered on top so container deployments can configure the media root and
//! library file without shipping a settings file.

mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./reelhouse.toml",
        "~/.config/reelhouse/config.toml",
        "/etc/reelhouse/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Apply `MEDIA_ROOT`, `LIBRARY_CONFIG`, `DATA_DIR`, `LAN_ONLY`,
/// `REELHOUSE_HOST` and `REELHOUSE_PORT` from the process environment.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary variable lookup.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(root) = lookup("MEDIA_ROOT") {
        config.media.root = PathBuf::from(root);
    }

    match (lookup("LIBRARY_CONFIG"), lookup("DATA_DIR")) {
        (Some(library), _) => config.media.library_config = PathBuf::from(library),
        (None, Some(data_dir)) => {
            config.media.library_config = Path::new(&data_dir).join("library.yml");
        }
        (None, None) => {}
    }

    if let Some(lan_only) = lookup("LAN_ONLY") {
        config.server.lan_only = lan_only != "false";
    }

    if let Some(host) = lookup("REELHOUSE_HOST") {
        config.server.host = host;
    }

    if let Some(port) = lookup("REELHOUSE_PORT") {
        config.server.port = port
            .parse()
            .with_context(|| format!("REELHOUSE_PORT is not a valid port: {port}"))?;
    }

    validate_config(config)
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.media.root.as_os_str().is_empty() {
        anyhow::bail!("Media root cannot be empty");
    }

    if config.watch.enabled && config.watch.debounce_ms == 0 {
        anyhow::bail!("Watch debounce must be at least 1ms");
    }

    if !config.media.root.exists() {
        tracing::warn!("Media root does not exist: {:?}", config.media.root);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert!(config.server.lan_only);
        assert_eq!(config.media.root, PathBuf::from("/media"));
        assert_eq!(config.media.library_config, PathBuf::from("/data/library.yml"));
        assert_eq!(config.watch.debounce_ms, 1000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [media]
            root = "/srv/media"
            "#,
        )
        .unwrap();
        assert_eq!(config.media.root, PathBuf::from("/srv/media"));
        assert_eq!(config.media.library_config, PathBuf::from("/data/library.yml"));
        assert!(config.media.verify_files);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        apply_overrides(
            &mut config,
            lookup(&[
                ("MEDIA_ROOT", "/mnt/videos"),
                ("LIBRARY_CONFIG", "/etc/library.yml"),
                ("LAN_ONLY", "false"),
                ("REELHOUSE_PORT", "8096"),
            ]),
        )
        .unwrap();

        assert_eq!(config.media.root, PathBuf::from("/mnt/videos"));
        assert_eq!(config.media.library_config, PathBuf::from("/etc/library.yml"));
        assert!(!config.server.lan_only);
        assert_eq!(config.server.port, 8096);
    }

    #[test]
    fn test_data_dir_sets_library_path() {
        let mut config = Config::default();
        apply_overrides(&mut config, lookup(&[("DATA_DIR", "/var/lib/reelhouse")])).unwrap();
        assert_eq!(
            config.media.library_config,
            PathBuf::from("/var/lib/reelhouse/library.yml")
        );
    }

    #[test]
    fn test_lan_only_anything_but_false_enables() {
        let mut config = Config::default();
        config.server.lan_only = false;
        apply_overrides(&mut config, lookup(&[("LAN_ONLY", "0")])).unwrap();
        assert!(config.server.lan_only);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = Config::default();
        assert!(apply_overrides(&mut config, lookup(&[("REELHOUSE_PORT", "http")])).is_err());
        assert!(apply_overrides(&mut config, lookup(&[("REELHOUSE_PORT", "0")])).is_err());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reelhouse.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            port = 9000
            lan_only = false

            [watch]
            debounce_ms = 250
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(!config.server.lan_only);
        assert_eq!(config.watch.debounce().as_millis(), 250);
    }

    #[test]
    fn test_load_config_rejects_zero_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reelhouse.toml");
        std::fs::write(&path, "[server]\nport = 0\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
