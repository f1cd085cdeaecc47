use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::launch::LaunchAdapter;
use crate::native::NativeDebugSettings;
use crate::observed::{ObservedProjectState, ObservedStartupState};
use crate::project::{LoadedProject, ProjectId};

/// Errors reported by the host when a request cannot be honoured.  
/// 宿主無法完成要求時回報的錯誤。
#[derive(Debug, Error)]
pub enum HostError {
    #[error("project {0} is not loaded")]
    ProjectNotFound(String),
    #[error("host rejected {operation}: {reason}")]
    Rejected { operation: String, reason: String },
    #[error("{0} is not supported for this project")]
    Unsupported(&'static str),
}

/// Capabilities the startup switcher needs from the development environment.  
/// 啟動切換功能需要宿主開發環境提供的能力。
///
/// All calls happen on the host's main thread and are expected to complete
/// before returning.
pub trait Host {
    /// Projects of the open solution, in the host's iteration order.
    fn loaded_projects(&self) -> Vec<LoadedProject>;

    /// Paths of the projects currently marked as startup projects.
    fn startup_project_paths(&self) -> Vec<String>;

    /// Replaces the startup-project set; an empty slice clears it.
    fn set_startup_projects(&mut self, paths: &[String]) -> Result<(), HostError>;

    /// Reads a launch property from the project's property bag.
    fn read_property(&self, project: &ProjectId, name: &str) -> Option<String>;

    fn write_property(
        &mut self,
        project: &ProjectId,
        name: &str,
        value: &str,
    ) -> Result<(), HostError>;

    /// Debugger settings of a native project, `None` when the project has none.
    fn native_debug_settings(&self, project: &ProjectId) -> Option<NativeDebugSettings>;

    fn set_native_debug_settings(
        &mut self,
        project: &ProjectId,
        settings: &NativeDebugSettings,
    ) -> Result<(), HostError>;

    /// Activates a solution configuration and/or platform; `None` keeps the current one.
    fn activate_solution_configuration(
        &mut self,
        configuration: Option<&str>,
        platform: Option<&str>,
    ) -> Result<(), HostError>;

    /// Opens a file in the host's editor.
    fn open_file(&mut self, path: &Path) -> Result<(), HostError>;

    /// Shows a message to the user.
    fn notify_user(&mut self, message: &str);
}

/// Reads the current startup-project set and each project's live launch settings.  
/// 讀取目前的啟動專案集合與各專案的啟動設定。
pub fn observe_startup_state(host: &dyn Host) -> ObservedStartupState {
    let loaded = host.loaded_projects();
    let mut projects = Vec::new();
    for path in host.startup_project_paths() {
        let Some(project) = loaded.iter().find(|project| project.path == path) else {
            warn!(path = %path, "startup project is not among the loaded projects");
            continue;
        };
        let settings = LaunchAdapter::for_project(project).read(project, host);
        projects.push(ObservedProjectState {
            project: project.clone(),
            settings,
        });
    }
    ObservedStartupState::new(projects)
}
