use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Prebuilt frontend served as a fallback for unknown routes
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Only accept connections from loopback and private network addresses
    #[serde(default = "default_true")]
    pub lan_only: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            lan_only: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    /// Directory outside of which no file is ever served
    #[serde(default = "default_media_root")]
    pub root: PathBuf,

    /// YAML file describing the collections
    #[serde(default = "default_library_config")]
    pub library_config: PathBuf,

    /// Check referenced files on load and log the ones that are missing
    #[serde(default = "default_true")]
    pub verify_files: bool,
}

fn default_media_root() -> PathBuf {
    PathBuf::from("/media")
}
fn default_library_config() -> PathBuf {
    PathBuf::from("/data/library.yml")
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            library_config: default_library_config(),
            verify_files: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Window in which bursts of write events collapse into one reload
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    1000
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
