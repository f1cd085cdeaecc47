use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::model::Configuration;
use crate::paths::ConfigPaths;
use crate::schema::{parse_configuration, serialize_configuration, SchemaError};
use crate::util::write_atomic;

/// Errors raised while reading or writing the configuration file.  
/// 讀寫啟動設定檔時的錯誤。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
    #[error("failed to serialize configuration {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
    #[error("failed to write configuration {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Loads and saves the configuration file of one solution.  
/// 負責單一方案設定檔的載入與儲存。
#[derive(Debug, Clone)]
pub struct ConfigurationStore {
    path: PathBuf,
}

impl ConfigurationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_solution(solution: impl AsRef<Path>) -> Self {
        Self::new(ConfigPaths::for_solution(solution).config_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the configuration; a missing file yields the defaults.  
    /// 載入設定；檔案不存在時回傳預設值。
    pub fn load(&self) -> Result<Configuration, ConfigError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "configuration file not found, using defaults");
                return Ok(Configuration::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let config = parse_configuration(&contents).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            path = %self.path.display(),
            version = config.version,
            configurations = config.multi_project_configurations.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Writes the configuration atomically.  
    /// 以原子方式寫入設定。
    pub fn save(&self, config: &Configuration) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = serialize_configuration(config).map_err(|source| ConfigError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, payload.as_bytes()).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes `initial` when no configuration file exists yet; returns whether
    /// a file was created.  
    /// 若設定檔尚不存在則寫入初始內容，並回傳是否建立了檔案。
    pub fn create_default(&self, initial: &Configuration) -> Result<bool, ConfigError> {
        if self.exists() {
            return Ok(false);
        }
        self.save(initial)?;
        info!(path = %self.path.display(), "created default configuration file");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = ConfigurationStore::new(dir.path().join("Shop.sln.startup.json"));
        assert!(!store.exists());
        assert_eq!(store.load().unwrap(), Configuration::default());
    }

    #[test]
    fn unreadable_path_is_a_read_error() {
        let dir = tempdir().unwrap();
        let store = ConfigurationStore::new(dir.path());
        assert!(matches!(store.load(), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn create_default_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let store = ConfigurationStore::new(dir.path().join("nested").join("a.startup.json"));
        assert!(store.create_default(&Configuration::default()).unwrap());

        fs::write(store.path(), r#"{ "Version": 2, "ListAllProjects": false }"#).unwrap();
        assert!(!store.create_default(&Configuration::default()).unwrap());
        assert!(!store.load().unwrap().list_all_projects);
    }
}
