use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the solution file name for the configuration file.
pub const CONFIG_FILE_SUFFIX: &str = ".startup.json";

/// Suffix appended to the solution stem by the legacy settings store.
pub const LEGACY_SETTINGS_SUFFIX: &str = ".startup.suo";

/// File locations derived from a solution path.  
/// 由方案路徑推導出的設定檔位置。
///
/// `Shop.sln` keeps its configuration in `Shop.sln.startup.json`; older
/// releases stored settings in `Shop.startup.suo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    solution: PathBuf,
    config: PathBuf,
    legacy: PathBuf,
}

impl ConfigPaths {
    pub fn for_solution(solution: impl AsRef<Path>) -> Self {
        let solution = solution.as_ref().to_path_buf();

        let mut config_name: OsString = solution
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        config_name.push(CONFIG_FILE_SUFFIX);

        let mut legacy_name: OsString = solution
            .file_stem()
            .map(|stem| stem.to_os_string())
            .unwrap_or_default();
        legacy_name.push(LEGACY_SETTINGS_SUFFIX);

        Self {
            config: solution.with_file_name(config_name),
            legacy: solution.with_file_name(legacy_name),
            solution,
        }
    }

    pub fn solution(&self) -> &Path {
        &self.solution
    }

    /// Path of the JSON configuration file.  
    /// JSON 設定檔路徑。
    pub fn config_file(&self) -> &Path {
        &self.config
    }

    /// Path of the legacy settings file (never parsed).  
    /// 舊版設定檔路徑（僅檢查是否存在）。
    pub fn legacy_settings(&self) -> &Path {
        &self.legacy
    }

    /// Legacy settings exist but have not been migrated to the JSON file yet.  
    /// 舊版設定存在但尚未轉換為 JSON 設定檔。
    pub fn needs_migration_hint(&self) -> bool {
        self.legacy.exists() && !self.config.exists()
    }
}
