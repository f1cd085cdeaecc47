//! Per-solution state and the host event surface.
//! 每個方案的狀態與宿主事件入口。

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use switchstartup_config::{ConfigError, ConfigPaths, Configuration, ConfigurationStore};
use switchstartup_host::{observe_startup_state, FileWatch, Host, WatchHandle};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::activation::{ActivationController, ActivationError, ActivationReport, SuppressionFlag};
use crate::catalog::{build_catalog, Catalog, CatalogMode, DropdownEntry, OtherEntry};
use crate::matcher::find_active_entry;
use crate::recent::{RecentProjects, DEFAULT_RECENT_CAPACITY};
use crate::resolver::{resolve, ResolutionWarning, ResolvedConfiguration};

const MAX_RECENT_CAPACITY: usize = 50;

/// Tunables of a [`StartupSession`].
/// 啟動工作階段的可調整選項。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    #[serde(default)]
    pub mode: CatalogMode,
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,
}

fn default_recent_capacity() -> usize {
    DEFAULT_RECENT_CAPACITY
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mode: CatalogMode::default(),
            recent_capacity: default_recent_capacity(),
        }
    }
}

impl SessionOptions {
    pub fn sanitize(&mut self) {
        if self.recent_capacity == 0 {
            self.recent_capacity = default_recent_capacity();
        }
        self.recent_capacity = self.recent_capacity.clamp(1, MAX_RECENT_CAPACITY);
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no solution is open")]
    NoSolution,
    #[error("dropdown has no entry at index {0}")]
    NoSuchEntry(usize),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Activation(#[from] ActivationError),
}

/// State owned by one open solution; dropped as a whole on close.
struct SolutionState {
    paths: ConfigPaths,
    store: ConfigurationStore,
    configuration: Configuration,
    resolved: ResolvedConfiguration,
    catalog: Catalog,
    selected: DropdownEntry,
    watch: Option<WatchHandle>,
}

/// Keeps the dropdown, the configuration file and the host's startup
/// projects in step.
/// 讓下拉選單、設定檔與宿主的啟動專案保持一致。
///
/// Every method is driven by a host event on the host's main thread and
/// finishes its work before returning.
pub struct StartupSession<W: FileWatch> {
    options: SessionOptions,
    watcher: W,
    controller: ActivationController,
    recent: RecentProjects,
    hinted: HashSet<PathBuf>,
    state: Option<SolutionState>,
}

impl<W: FileWatch> StartupSession<W> {
    pub fn new(mut options: SessionOptions, watcher: W) -> Self {
        options.sanitize();
        let recent = RecentProjects::new(options.recent_capacity);
        Self {
            options,
            watcher,
            controller: ActivationController::default(),
            recent,
            hinted: HashSet::new(),
            state: None,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Flag to consult before reacting to host change notifications.
    pub fn suppression_flag(&self) -> SuppressionFlag {
        self.controller.suppression_flag().clone()
    }

    pub fn watcher(&self) -> &W {
        &self.watcher
    }

    pub fn watcher_mut(&mut self) -> &mut W {
        &mut self.watcher
    }

    pub fn recent(&self) -> &RecentProjects {
        &self.recent
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.state.as_ref().map(|state| state.store.path())
    }

    pub fn configuration(&self) -> Option<&Configuration> {
        self.state.as_ref().map(|state| &state.configuration)
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.state.as_ref().map(|state| &state.catalog)
    }

    pub fn warnings(&self) -> &[ResolutionWarning] {
        self.state
            .as_ref()
            .map(|state| state.resolved.warnings.as_slice())
            .unwrap_or_default()
    }

    /// Selected entry; [`DropdownEntry::unknown`] when nothing matches.
    pub fn selected(&self) -> Option<&DropdownEntry> {
        self.state.as_ref().map(|state| &state.selected)
    }

    /// Catalog position of the selection, `None` for the unknown sentinel.
    pub fn selected_index(&self) -> Option<usize> {
        let state = self.state.as_ref()?;
        state.catalog.find_equivalent(&state.selected)
    }

    /// 開啟方案：載入設定、開始監看並比對目前的啟動專案。
    /// Loads the solution's configuration, starts watching it and selects the
    /// entry matching the host's startup projects.
    pub fn on_solution_opened(&mut self, solution: &Path, host: &mut dyn Host) {
        if self.state.is_some() {
            self.on_solution_closed();
        }

        let paths = ConfigPaths::for_solution(solution);
        if paths.needs_migration_hint() && self.hinted.insert(paths.solution().to_path_buf()) {
            host.notify_user(&format!(
                "Found legacy startup settings in {}. Startup configurations are now kept in {}; choose \"Configure...\" to create it.",
                paths.legacy_settings().display(),
                paths.config_file().display()
            ));
        }

        let store = ConfigurationStore::new(paths.config_file());
        let configuration = store.load().unwrap_or_else(|err| {
            error!(%err, "failed to load startup configuration; using defaults");
            Configuration::default()
        });
        let watch = match self.watcher.watch(store.path()) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(path = %store.path().display(), %err, "cannot watch startup configuration");
                None
            }
        };
        info!(solution = %solution.display(), "opened solution");

        self.state = Some(SolutionState {
            paths,
            store,
            configuration,
            resolved: ResolvedConfiguration::default(),
            catalog: Catalog::default(),
            selected: DropdownEntry::unknown(),
            watch,
        });
        self.rebuild(&*host);
        self.rematch(&*host);
    }

    /// 關閉方案並丟棄所有狀態。 / Discards everything owned by the solution.
    pub fn on_solution_closed(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        if let Some(handle) = state.watch {
            if let Err(err) = self.watcher.unwatch(handle) {
                warn!(%handle, %err, "failed to stop watching startup configuration");
            }
        }
        self.recent.clear();
        info!(solution = %state.paths.solution().display(), "closed solution");
    }

    pub fn on_project_opened(&mut self, host: &dyn Host) {
        self.rebuild(host);
        self.rematch(host);
    }

    pub fn on_project_closed(&mut self, path: &str, host: &dyn Host) {
        self.recent.remove(path);
        self.rebuild(host);
        self.rematch(host);
    }

    pub fn on_project_renamed(&mut self, old_path: &str, new_path: &str, host: &dyn Host) {
        self.recent.rename(old_path, new_path);
        self.rebuild(host);
        self.rematch(host);
    }

    /// Host reports that its startup projects or their settings changed.
    /// 宿主回報啟動專案或其設定已變更。
    pub fn on_startup_changed(&mut self, host: &dyn Host) {
        if self.controller.suppression_flag().is_active() {
            debug!("ignoring startup change raised by our own activation");
            return;
        }
        self.rematch(host);
    }

    /// 使用者從下拉選單選擇項目。 / The user picked the entry at `index`.
    pub fn on_user_chose_entry(
        &mut self,
        index: usize,
        host: &mut dyn Host,
    ) -> Result<ActivationReport, SessionError> {
        let state = self.state.as_ref().ok_or(SessionError::NoSolution)?;
        let entry = state
            .catalog
            .get(index)
            .cloned()
            .ok_or(SessionError::NoSuchEntry(index))?;
        if let DropdownEntry::Other(OtherEntry::Configure) = entry {
            return self.on_user_requested_configure(host);
        }

        let config_path = state.store.path().to_path_buf();
        match self.controller.activate(&entry, host, &config_path) {
            Ok(report) => {
                if let DropdownEntry::Single(single) = &entry {
                    self.recent.touch(single.project.path.as_str());
                }
                if let Some(state) = self.state.as_mut() {
                    state.selected = entry;
                }
                if self.options.mode == CatalogMode::MostRecentlyUsed {
                    self.rebuild(&*host);
                }
                Ok(report)
            }
            Err(err) => {
                error!(%err, entry = %entry.label(), "activation failed");
                self.rematch(&*host);
                Err(err.into())
            }
        }
    }

    /// 建立（必要時）並開啟設定檔。 / Creates the configuration file when
    /// missing and opens it in the host.
    pub fn on_user_requested_configure(
        &mut self,
        host: &mut dyn Host,
    ) -> Result<ActivationReport, SessionError> {
        let state = self.state.as_ref().ok_or(SessionError::NoSolution)?;
        match state.store.create_default(&Configuration::default()) {
            Ok(true) => info!(path = %state.store.path().display(), "created startup configuration"),
            Ok(false) => {}
            Err(err) => {
                host.notify_user(&format!("Could not create the startup configuration: {err}"));
                return Err(err.into());
            }
        }
        let report = self.controller.activate(
            &DropdownEntry::Other(OtherEntry::Configure),
            host,
            state.store.path(),
        )?;
        Ok(report)
    }

    pub fn on_config_file_changed(&mut self, host: &dyn Host) -> Result<(), SessionError> {
        self.reload(host)
    }

    /// 重新載入設定並保留原本的選取項目。
    /// Reloads the configuration and keeps the selection when an entry with
    /// the same identity still exists; the host is not touched.
    ///
    /// A file that fails to load leaves the previous configuration in place.
    pub fn reload(&mut self, host: &dyn Host) -> Result<(), SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NoSolution)?;
        let captured = state.selected.clone();
        let loaded = state.store.load();
        let result = match loaded {
            Ok(configuration) => {
                state.configuration = configuration;
                Ok(())
            }
            Err(err) => {
                error!(%err, "keeping previous startup configuration");
                Err(SessionError::from(err))
            }
        };

        self.rebuild(host);
        if let Some(state) = self.state.as_mut() {
            state.selected = match state.catalog.find_equivalent(&captured) {
                Some(index) => state.catalog.entries()[index].clone(),
                None => {
                    if !captured.is_unknown() {
                        info!(entry = %captured.label(), "selected entry disappeared after reload");
                    }
                    DropdownEntry::unknown()
                }
            };
        }
        result
    }

    fn rebuild(&mut self, host: &dyn Host) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let projects = host.loaded_projects();
        state.resolved = resolve(&state.configuration, &projects);
        state.catalog = build_catalog(&state.resolved, &projects, self.options.mode, &self.recent);
        debug!(entries = state.catalog.len(), "rebuilt startup dropdown");
    }

    fn rematch(&mut self, host: &dyn Host) {
        if self.state.is_none() {
            return;
        }
        let observed = observe_startup_state(host);
        // A lone startup project counts as used, however it was chosen.
        if let [only] = observed.projects.as_slice() {
            self.recent.touch(only.project.path.as_str());
            if self.options.mode == CatalogMode::MostRecentlyUsed {
                self.rebuild(host);
            }
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.selected = find_active_entry(&observed, &state.catalog)
            .and_then(|index| state.catalog.get(index).cloned())
            .unwrap_or_else(DropdownEntry::unknown);
    }
}
