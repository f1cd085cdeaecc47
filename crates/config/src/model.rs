//! In-memory model of a startup configuration file.
//! 啟動設定檔的記憶體模型。

/// Schema version written by this crate.
pub const CURRENT_VERSION: u32 = 2;

/// Version assumed when a file carries no `"Version"` key.
pub const LEGACY_VERSION: u32 = 1;

/// One project entry inside a multi-project configuration.
/// 多專案設定中的單一專案條目。
///
/// Every override is optional: `None` leaves the project's own setting alone,
/// while `Some("")` / `Some(false)` is an explicit value that gets applied and
/// must match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectReference {
    pub name_or_path: String,
    pub command_line_arguments: Option<String>,
    pub working_directory: Option<String>,
    pub start_project: Option<bool>,
    pub start_external_program: Option<String>,
    pub start_browser_with_url: Option<String>,
    pub enable_remote_debugging: Option<bool>,
    pub remote_debugging_machine: Option<String>,
    pub profile_name: Option<String>,
}

impl ProjectReference {
    /// Creates a reference with every override unmanaged.
    /// 建立所有覆寫值皆不受管理的參考。
    pub fn new(name_or_path: impl Into<String>) -> Self {
        Self {
            name_or_path: name_or_path.into(),
            ..Self::default()
        }
    }

    /// Creates a reference the way a version-1 file describes it.
    /// 以第 1 版格式的語意建立參考（命令列參數為空字串）。
    pub fn legacy(name_or_path: impl Into<String>) -> Self {
        Self {
            command_line_arguments: Some(String::new()),
            ..Self::new(name_or_path)
        }
    }

    pub fn with_command_line_arguments(mut self, value: impl Into<String>) -> Self {
        self.command_line_arguments = Some(value.into());
        self
    }

    pub fn with_working_directory(mut self, value: impl Into<String>) -> Self {
        self.working_directory = Some(value.into());
        self
    }

    pub fn with_start_project(mut self, value: bool) -> Self {
        self.start_project = Some(value);
        self
    }

    pub fn with_start_external_program(mut self, value: impl Into<String>) -> Self {
        self.start_external_program = Some(value.into());
        self
    }

    pub fn with_start_browser_with_url(mut self, value: impl Into<String>) -> Self {
        self.start_browser_with_url = Some(value.into());
        self
    }

    pub fn with_remote_debugging(mut self, enabled: bool, machine: Option<String>) -> Self {
        self.enable_remote_debugging = Some(enabled);
        self.remote_debugging_machine = machine;
        self
    }

    pub fn with_profile_name(mut self, value: impl Into<String>) -> Self {
        self.profile_name = Some(value.into());
        self
    }

    /// Returns `true` when nothing besides the project itself is managed.
    /// 若除專案本身外沒有任何受管理的設定則回傳 `true`。
    pub fn is_unmanaged(&self) -> bool {
        self.command_line_arguments.is_none()
            && self.working_directory.is_none()
            && self.start_project.is_none()
            && self.start_external_program.is_none()
            && self.start_browser_with_url.is_none()
            && self.enable_remote_debugging.is_none()
            && self.remote_debugging_machine.is_none()
            && self.profile_name.is_none()
    }

    /// Whether the reference can be written as a plain version-1 string.
    pub(crate) fn is_legacy_expressible(&self) -> bool {
        let legacy_arguments = self.command_line_arguments.as_deref() == Some("");
        let rest = ProjectReference {
            command_line_arguments: None,
            ..self.clone()
        };
        legacy_arguments && rest.is_unmanaged()
    }
}

/// A named set of projects started together.
/// 一組具名、同時啟動的專案。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiProjectConfiguration {
    pub name: String,
    pub projects: Vec<ProjectReference>,
    pub solution_configuration: Option<String>,
    pub solution_platform: Option<String>,
}

impl MultiProjectConfiguration {
    pub fn new(name: impl Into<String>, projects: Vec<ProjectReference>) -> Self {
        Self {
            name: name.into(),
            projects,
            solution_configuration: None,
            solution_platform: None,
        }
    }
}

/// Whole contents of a startup configuration file.
/// 啟動設定檔的完整內容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub version: u32,
    pub list_all_projects: bool,
    pub activate_command_line_arguments: bool,
    pub multi_project_configurations: Vec<MultiProjectConfiguration>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            list_all_projects: true,
            activate_command_line_arguments: false,
            multi_project_configurations: Vec::new(),
        }
    }
}

impl Configuration {
    /// Version-1 files only carry command-line arguments as an implicit empty
    /// string; they are applied only when `ActivateCommandLineArguments` is set.
    pub fn manages_command_line_arguments(&self) -> bool {
        self.version >= CURRENT_VERSION || self.activate_command_line_arguments
    }

    pub(crate) fn is_legacy_expressible(&self) -> bool {
        self.multi_project_configurations.iter().all(|configuration| {
            configuration.solution_configuration.is_none()
                && configuration.solution_platform.is_none()
                && configuration
                    .projects
                    .iter()
                    .all(ProjectReference::is_legacy_expressible)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lists_all_projects() {
        let config = Configuration::default();
        assert!(config.list_all_projects);
        assert!(!config.activate_command_line_arguments);
        assert_eq!(config.version, CURRENT_VERSION);
        assert!(config.multi_project_configurations.is_empty());
    }

    #[test]
    fn empty_and_missing_overrides_are_distinct() {
        let unmanaged = ProjectReference::new("App");
        let explicit = ProjectReference::new("App").with_command_line_arguments("");
        assert!(unmanaged.is_unmanaged());
        assert!(!explicit.is_unmanaged());
        assert_ne!(unmanaged, explicit);
    }

    #[test]
    fn legacy_command_line_management_depends_on_flag() {
        let mut config = Configuration {
            version: LEGACY_VERSION,
            ..Configuration::default()
        };
        assert!(!config.manages_command_line_arguments());
        config.activate_command_line_arguments = true;
        assert!(config.manages_command_line_arguments());
    }
}
