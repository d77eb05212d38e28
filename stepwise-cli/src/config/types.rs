use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use stepwise_core::widget::{DEFAULT_GLTF_URL, DEFAULT_SWAPI_URL};
use stepwise_core::{Environment, SettingsLayer, WidgetSettings};

/// Default host for the stepwise server
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port for the stepwise server
pub const DEFAULT_PORT: u16 = 7480;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStepwiseConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub storage: RawStorageConfig,

    #[serde(default)]
    pub widget: RawWidgetConfig,

    /// Course-wide grading defaults, keyed by course id
    #[serde(default)]
    pub courses: HashMap<String, SettingsLayer>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStorageConfig {
    pub backend: Option<StorageBackend>,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawWidgetConfig {
    pub swapi_url: Option<String>,
    pub gltf_url: Option<String>,
    /// Deployment tag, validated when the config is finalized
    pub environment: Option<String>,
}

/// Where question and student state is kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Lost on restart
    Memory,
    /// JSON documents under `data_dir`
    #[default]
    File,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize)]
pub struct StepwiseConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub widget: WidgetSettings,
    pub courses: BTreeMap<String, SettingsLayer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

/// Platform data directory, or `.stepwise/data` when none can be determined
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "stepwise")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".stepwise/data"))
}

impl Default for StepwiseConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            storage: StorageConfig {
                backend: StorageBackend::default(),
                data_dir: default_data_dir(),
            },
            widget: WidgetSettings {
                swapi_url: DEFAULT_SWAPI_URL.to_string(),
                gltf_url: DEFAULT_GLTF_URL.to_string(),
                environment: Environment::default(),
            },
            courses: BTreeMap::new(),
        }
    }
}
