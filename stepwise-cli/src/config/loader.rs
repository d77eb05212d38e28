use super::types::{
    DEFAULT_HOST, DEFAULT_PORT, RawServerConfig, RawStepwiseConfig, RawStorageConfig,
    RawWidgetConfig, ServerConfig, StepwiseConfig, StorageConfig, default_data_dir,
};
use anyhow::Result;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use stepwise_core::widget::{DEFAULT_GLTF_URL, DEFAULT_SWAPI_URL};
use stepwise_core::{ConfigError, ENVIRONMENT_VAR, Environment, WidgetSettings};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project), with the deployment tag
    /// from `STEPWISEMATH_ENV` taking precedence over the files
    pub fn load() -> Result<StepwiseConfig> {
        let mut raw = RawStepwiseConfig::default();

        // Layer 1: User config
        if let Some(user_path) = Self::user_config_path() {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        raw = Self::merge_raw(raw, Self::read_raw(&Self::project_config_path())?);

        let env_tag = std::env::var(ENVIRONMENT_VAR).ok();
        Ok(Self::finalize(raw, env_tag)?)
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "stepwise").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with STEPWISE_PROJECT_CONFIG_DIR
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("STEPWISE_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".stepwise/config.toml")
        }
    }

    /// Read one layer; a missing file is an empty layer
    fn read_raw(path: &Path) -> Result<RawStepwiseConfig> {
        if !path.exists() {
            return Ok(RawStepwiseConfig::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawStepwiseConfig, overlay: RawStepwiseConfig) -> RawStepwiseConfig {
        let mut courses = base.courses;
        for (course_id, layer) in overlay.courses {
            let merged = match courses.remove(&course_id) {
                Some(existing) => existing.overlay(layer),
                None => layer,
            };
            courses.insert(course_id, merged);
        }

        RawStepwiseConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            storage: RawStorageConfig {
                backend: overlay.storage.backend.or(base.storage.backend),
                data_dir: overlay.storage.data_dir.or(base.storage.data_dir),
            },
            widget: RawWidgetConfig {
                swapi_url: overlay.widget.swapi_url.or(base.widget.swapi_url),
                gltf_url: overlay.widget.gltf_url.or(base.widget.gltf_url),
                environment: overlay.widget.environment.or(base.widget.environment),
            },
            courses,
        }
    }

    /// Convert raw config to final config with defaults applied.
    ///
    /// Fails on an unrecognized deployment tag.
    fn finalize(
        raw: RawStepwiseConfig,
        env_tag: Option<String>,
    ) -> Result<StepwiseConfig, ConfigError> {
        let environment = match env_tag.or(raw.widget.environment) {
            Some(tag) => tag.parse::<Environment>()?,
            None => Environment::default(),
        };

        Ok(StepwiseConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            storage: StorageConfig {
                backend: raw.storage.backend.unwrap_or_default(),
                data_dir: raw.storage.data_dir.unwrap_or_else(default_data_dir),
            },
            widget: WidgetSettings {
                swapi_url: raw
                    .widget
                    .swapi_url
                    .unwrap_or_else(|| DEFAULT_SWAPI_URL.to_string()),
                gltf_url: raw
                    .widget
                    .gltf_url
                    .unwrap_or_else(|| DEFAULT_GLTF_URL.to_string()),
                environment,
            },
            courses: raw.courses.into_iter().collect(),
        })
    }
}
