use crate::project::LoadedProject;

/// Fully populated launch settings read back from the host.  
/// 從宿主讀回、欄位完整的啟動設定。
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LaunchSettings {
    pub command_line_arguments: String,
    pub working_directory: String,
    pub start_project: bool,
    pub start_external_program: String,
    pub start_browser_with_url: String,
    pub enable_remote_debugging: bool,
    pub remote_debugging_machine: String,
    pub profile_name: String,
}

/// One active startup project together with its live launch settings.  
/// 單一啟動專案及其目前的啟動設定。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservedProjectState {
    pub project: LoadedProject,
    pub settings: LaunchSettings,
}

/// The host's current startup-project set.  
/// 宿主目前的啟動專案集合。
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ObservedStartupState {
    pub projects: Vec<ObservedProjectState>,
}

impl ObservedStartupState {
    pub fn new(projects: Vec<ObservedProjectState>) -> Self {
        Self { projects }
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.projects.iter().map(|state| state.project.path.as_str())
    }
}
