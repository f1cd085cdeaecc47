//! In-memory [`Host`] backed by a serializable solution snapshot.
//! 以可序列化快照實作的記憶體宿主。

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::{Host, HostError};
use crate::native::NativeDebugSettings;
use crate::project::{LoadedProject, ProjectId};

/// One project of a snapshot and its launch state.
/// 快照中的單一專案與其啟動狀態。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    #[serde(flatten)]
    pub project: LoadedProject,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<NativeDebugSettings>,
}

/// Serializable state of a solution as the host sees it.
/// 宿主觀點下方案狀態的可序列化形式。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSnapshot {
    #[serde(default)]
    pub projects: Vec<ProjectSnapshot>,
    #[serde(default)]
    pub startup: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_configuration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_platform: Option<String>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize snapshot {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HostSnapshot {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref().to_path_buf();
        let contents = fs::read_to_string(&path).map_err(|source| SnapshotError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| SnapshotError::Parse { path, source })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref().to_path_buf();
        let payload = serde_json::to_string_pretty(self).map_err(|source| SnapshotError::Serialize {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, payload).map_err(|source| SnapshotError::Write { path, source })
    }
}

/// A mutation recorded by [`InMemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostChange {
    StartupProjects(Vec<String>),
    Property {
        project: ProjectId,
        name: String,
        value: String,
    },
    NativeSettings(ProjectId),
    SolutionConfiguration {
        configuration: Option<String>,
        platform: Option<String>,
    },
}

/// A recorded mutation plus what the change probe reported at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedChange {
    pub change: HostChange,
    pub probe: bool,
}

/// [`Host`] implementation kept entirely in memory.
/// 完全在記憶體中運作的宿主實作。
#[derive(Default)]
pub struct InMemoryHost {
    snapshot: HostSnapshot,
    rejected: HashSet<ProjectId>,
    changes: Vec<RecordedChange>,
    opened_files: Vec<PathBuf>,
    messages: Vec<String>,
    probe: Option<Box<dyn Fn() -> bool>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: HostSnapshot) -> Self {
        Self {
            snapshot,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> &HostSnapshot {
        &self.snapshot
    }

    /// Adds a project with an empty property bag.
    pub fn add_project(&mut self, project: LoadedProject) {
        let native = (project.capability == crate::project::LaunchCapability::NativeDebugger)
            .then(NativeDebugSettings::default);
        self.snapshot.projects.push(ProjectSnapshot {
            project,
            properties: BTreeMap::new(),
            native,
        });
    }

    /// Removes the project at `path`, also from the startup set.
    pub fn remove_project(&mut self, path: &str) -> Option<LoadedProject> {
        let index = self
            .snapshot
            .projects
            .iter()
            .position(|entry| entry.project.path == path)?;
        self.snapshot.startup.retain(|startup| startup != path);
        Some(self.snapshot.projects.remove(index).project)
    }

    /// Renames the project at `old_path`, keeping its identity and settings.
    pub fn rename_project(&mut self, old_path: &str, name: &str, path: &str) -> bool {
        let Some(entry) = self
            .snapshot
            .projects
            .iter_mut()
            .find(|entry| entry.project.path == old_path)
        else {
            return false;
        };
        entry.project.name = name.to_string();
        entry.project.path = path.to_string();
        for startup in &mut self.snapshot.startup {
            if startup == old_path {
                *startup = path.to_string();
            }
        }
        true
    }

    /// Sets a property without recording a change (test and fixture setup).
    pub fn set_property(&mut self, project: &ProjectId, name: &str, value: &str) {
        if let Some(entry) = self.entry_mut(project) {
            entry.properties.insert(name.to_string(), value.to_string());
        }
    }

    /// Sets the startup set without recording a change.
    pub fn set_startup(&mut self, paths: Vec<String>) {
        self.snapshot.startup = paths;
    }

    /// Makes every write to `project` fail.
    pub fn reject_writes_for(&mut self, project: ProjectId) {
        self.rejected.insert(project);
    }

    /// Installs a probe evaluated on every recorded change.
    pub fn set_change_probe(&mut self, probe: impl Fn() -> bool + 'static) {
        self.probe = Some(Box::new(probe));
    }

    pub fn changes(&self) -> &[RecordedChange] {
        &self.changes
    }

    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    pub fn opened_files(&self) -> &[PathBuf] {
        &self.opened_files
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn property(&self, project: &ProjectId, name: &str) -> Option<&str> {
        self.entry(project)
            .and_then(|entry| entry.properties.get(name))
            .map(String::as_str)
    }

    fn entry(&self, project: &ProjectId) -> Option<&ProjectSnapshot> {
        self.snapshot
            .projects
            .iter()
            .find(|entry| entry.project.id == *project)
    }

    fn entry_mut(&mut self, project: &ProjectId) -> Option<&mut ProjectSnapshot> {
        self.snapshot
            .projects
            .iter_mut()
            .find(|entry| entry.project.id == *project)
    }

    fn record(&mut self, change: HostChange) {
        let probe = self.probe.as_ref().is_some_and(|probe| probe());
        self.changes.push(RecordedChange { change, probe });
    }

    fn check_writable(&self, project: &ProjectId) -> Result<(), HostError> {
        if self.entry(project).is_none() {
            return Err(HostError::ProjectNotFound(project.as_str().to_string()));
        }
        if self.rejected.contains(project) {
            return Err(HostError::Rejected {
                operation: "property write".to_string(),
                reason: format!("project {} is read-only", project.as_str()),
            });
        }
        Ok(())
    }
}

impl Host for InMemoryHost {
    fn loaded_projects(&self) -> Vec<LoadedProject> {
        self.snapshot
            .projects
            .iter()
            .map(|entry| entry.project.clone())
            .collect()
    }

    fn startup_project_paths(&self) -> Vec<String> {
        self.snapshot.startup.clone()
    }

    fn set_startup_projects(&mut self, paths: &[String]) -> Result<(), HostError> {
        if let Some(missing) = paths.iter().find(|path| {
            !self
                .snapshot
                .projects
                .iter()
                .any(|entry| &entry.project.path == *path)
        }) {
            return Err(HostError::ProjectNotFound(missing.clone()));
        }
        self.snapshot.startup = paths.to_vec();
        self.record(HostChange::StartupProjects(paths.to_vec()));
        Ok(())
    }

    fn read_property(&self, project: &ProjectId, name: &str) -> Option<String> {
        self.property(project, name).map(str::to_string)
    }

    fn write_property(
        &mut self,
        project: &ProjectId,
        name: &str,
        value: &str,
    ) -> Result<(), HostError> {
        self.check_writable(project)?;
        self.set_property(project, name, value);
        self.record(HostChange::Property {
            project: project.clone(),
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn native_debug_settings(&self, project: &ProjectId) -> Option<NativeDebugSettings> {
        self.entry(project).and_then(|entry| entry.native.clone())
    }

    fn set_native_debug_settings(
        &mut self,
        project: &ProjectId,
        settings: &NativeDebugSettings,
    ) -> Result<(), HostError> {
        self.check_writable(project)?;
        if let Some(entry) = self.entry_mut(project) {
            entry.native = Some(settings.clone());
        }
        self.record(HostChange::NativeSettings(project.clone()));
        Ok(())
    }

    fn activate_solution_configuration(
        &mut self,
        configuration: Option<&str>,
        platform: Option<&str>,
    ) -> Result<(), HostError> {
        if let Some(configuration) = configuration {
            self.snapshot.solution_configuration = Some(configuration.to_string());
        }
        if let Some(platform) = platform {
            self.snapshot.solution_platform = Some(platform.to_string());
        }
        self.record(HostChange::SolutionConfiguration {
            configuration: configuration.map(str::to_string),
            platform: platform.map(str::to_string),
        });
        Ok(())
    }

    fn open_file(&mut self, path: &Path) -> Result<(), HostError> {
        self.opened_files.push(path.to_path_buf());
        Ok(())
    }

    fn notify_user(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
