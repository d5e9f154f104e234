// Application configuration
// Data directory resolution plus the optional config.json inside it
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::state::storage::{get_app_data_dir, AppPaths, StorageError};

pub const DATA_DIR_ENV: &str = "HEMBYGD_DATA_DIR";
pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_MAX_IMAGE_WIDTH: u32 = 800;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Keep the catalogue somewhere other than the directory holding config.json
    pub data_dir: Option<PathBuf>,
    /// Photos wider than this are downsampled in reports; 0 disables it
    pub max_image_width: u32,
    /// Used for `registered_by` when the form leaves it empty
    pub default_registrant: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            max_image_width: DEFAULT_MAX_IMAGE_WIDTH,
            default_registrant: None,
        }
    }
}

/// Pick the data directory: explicit flag, then environment, then the
/// platform data directory
pub fn resolve_data_dir(flag: Option<&Path>, env_value: Option<OsString>) -> ConfigResult<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env_value.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    Ok(get_app_data_dir()?)
}

/// Read `config.json` from `dir`; a missing file yields the defaults
pub fn load_config(dir: &Path) -> ConfigResult<AppConfig> {
    let path = dir.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(&path)?;
    let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;

    log::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolve configuration and on-disk layout for this process
pub fn load(flag: Option<&Path>) -> ConfigResult<(AppConfig, AppPaths)> {
    let root = resolve_data_dir(flag, std::env::var_os(DATA_DIR_ENV))?;
    let config = load_config(&root)?;
    let paths = AppPaths::new(config.data_dir.clone().unwrap_or(root));
    Ok((config, paths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_flag_wins_over_environment() {
        let resolved = resolve_data_dir(
            Some(Path::new("/srv/museum")),
            Some(OsString::from("/env/museum")),
        )
        .unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/museum"));
    }

    #[test]
    fn test_environment_used_without_flag() {
        let resolved = resolve_data_dir(None, Some(OsString::from("/env/museum"))).unwrap();
        assert_eq!(resolved, PathBuf::from("/env/museum"));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(temp_dir.path()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.max_image_width, 800);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            r#"{ "default_registrant": "Ingrid" }"#,
        )
        .unwrap();

        let config = load_config(temp_dir.path()).unwrap();
        assert_eq!(config.default_registrant.as_deref(), Some("Ingrid"));
        assert_eq!(config.max_image_width, DEFAULT_MAX_IMAGE_WIDTH);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert!(matches!(
            load_config(temp_dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_config_can_relocate_catalogue() {
        let temp_dir = TempDir::new().unwrap();
        let elsewhere = temp_dir.path().join("shared");
        let json = serde_json::json!({ "data_dir": elsewhere, "max_image_width": 640 });
        fs::write(temp_dir.path().join(CONFIG_FILE), json.to_string()).unwrap();

        let (config, paths) = load(Some(temp_dir.path())).unwrap();
        assert_eq!(config.max_image_width, 640);
        assert_eq!(paths.root, elsewhere);
        assert_eq!(paths.database, elsewhere.join("hembygdsmuseum.db"));
    }
}
