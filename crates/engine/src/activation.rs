//! Pushing a chosen dropdown entry onto the host.
//! 將選取的下拉項目套用到宿主。

use std::cell::Cell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use switchstartup_host::{Host, HostError, LaunchAdapter};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{DropdownEntry, MultiProjectEntry, OtherEntry};

/// Shared "ignore host change notifications" flag.
/// 共用的「忽略宿主變更通知」旗標。
///
/// Clones observe the same flag. It is raised only through [`ReactionGuard`].
#[derive(Debug, Clone, Default)]
pub struct SuppressionFlag(Rc<Cell<bool>>);

impl SuppressionFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.0.get()
    }

    /// Raises the flag until the returned guard is dropped.
    /// 升起旗標，直到回傳的守衛被釋放。
    pub fn acquire(&self) -> Result<ReactionGuard, ActivationError> {
        if self.0.replace(true) {
            return Err(ActivationError::Reentrant);
        }
        Ok(ReactionGuard {
            flag: Rc::clone(&self.0),
        })
    }
}

/// Keeps the suppression flag raised for its lifetime.
#[derive(Debug)]
pub struct ReactionGuard {
    flag: Rc<Cell<bool>>,
}

impl Drop for ReactionGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("an activation is already in progress")]
    Reentrant,
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Non-fatal problems met while activating.
/// 套用時遇到、但不中斷流程的問題。
#[derive(Debug)]
pub enum ActivationWarning {
    Dangling {
        configuration: String,
        reference: String,
    },
    PropertyWrite {
        project: String,
        error: HostError,
    },
    SolutionConfiguration(HostError),
}

impl fmt::Display for ActivationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationWarning::Dangling {
                configuration,
                reference,
            } => write!(
                f,
                "skipped project \"{reference}\" of \"{configuration}\": it is not loaded"
            ),
            ActivationWarning::PropertyWrite { project, error } => {
                write!(f, "failed to apply launch settings to {project}: {error}")
            }
            ActivationWarning::SolutionConfiguration(error) => {
                write!(f, "failed to activate solution configuration: {error}")
            }
        }
    }
}

/// What an activation did.
#[derive(Debug, Default)]
pub struct ActivationReport {
    /// Startup set handed to the host; `None` when it was left alone.
    pub startup_projects: Option<Vec<String>>,
    pub opened_configuration: bool,
    pub warnings: Vec<ActivationWarning>,
}

/// Applies dropdown entries to the host while suppressing its change reactions.
/// 套用下拉項目，並在期間抑制對宿主變更的反應。
#[derive(Debug, Clone, Default)]
pub struct ActivationController {
    suppression: SuppressionFlag,
}

impl ActivationController {
    pub fn new(suppression: SuppressionFlag) -> Self {
        Self { suppression }
    }

    pub fn suppression_flag(&self) -> &SuppressionFlag {
        &self.suppression
    }

    /// Makes `entry` the host's startup configuration.
    /// 將項目設為宿主的啟動設定。
    ///
    /// Failing property writes are collected as warnings and the remaining
    /// projects are still processed. Only a refused startup set aborts.
    pub fn activate(
        &self,
        entry: &DropdownEntry,
        host: &mut dyn Host,
        config_path: &Path,
    ) -> Result<ActivationReport, ActivationError> {
        if let DropdownEntry::Other(OtherEntry::Configure) = entry {
            host.open_file(config_path)?;
            return Ok(ActivationReport {
                opened_configuration: true,
                ..ActivationReport::default()
            });
        }

        let _guard = self.suppression.acquire()?;
        let mut report = ActivationReport::default();
        match entry {
            DropdownEntry::Other(_) => {
                host.set_startup_projects(&[])?;
                report.startup_projects = Some(Vec::new());
                info!("cleared startup projects");
            }
            DropdownEntry::Single(single) => {
                let paths = vec![single.project.path.clone()];
                host.set_startup_projects(&paths)?;
                info!(project = %single.project.name, "activated startup project");
                report.startup_projects = Some(paths);
            }
            DropdownEntry::Multi(multi) => activate_multi(multi, host, &mut report)?,
        }

        for warning in &report.warnings {
            warn!("{warning}");
        }
        Ok(report)
    }
}

fn activate_multi(
    multi: &MultiProjectEntry,
    host: &mut dyn Host,
    report: &mut ActivationReport,
) -> Result<(), ActivationError> {
    report.warnings.extend(
        multi
            .projects
            .iter()
            .filter(|resolved| resolved.is_dangling())
            .map(|resolved| ActivationWarning::Dangling {
                configuration: multi.name.clone(),
                reference: resolved.reference.name_or_path.clone(),
            }),
    );

    if multi.solution_configuration.is_some() || multi.solution_platform.is_some() {
        if let Err(error) = host.activate_solution_configuration(
            multi.solution_configuration.as_deref(),
            multi.solution_platform.as_deref(),
        ) {
            report
                .warnings
                .push(ActivationWarning::SolutionConfiguration(error));
        }
    }

    let paths: Vec<String> = multi
        .resolvable()
        .map(|(_, project)| project.path.clone())
        .collect();
    host.set_startup_projects(&paths)?;

    for (resolved, project) in multi.resolvable() {
        let adapter = LaunchAdapter::for_project(project);
        debug!(project = %project.name, ?adapter, "applying launch overrides");
        if let Err(error) = adapter.apply(project, &resolved.reference, host) {
            report.warnings.push(ActivationWarning::PropertyWrite {
                project: project.name.clone(),
                error,
            });
        }
    }

    info!(
        configuration = %multi.name,
        projects = paths.len(),
        "activated startup configuration"
    );
    report.startup_projects = Some(paths);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_resets_flag_on_drop() {
        let flag = SuppressionFlag::new();
        {
            let _guard = flag.acquire().unwrap();
            assert!(flag.is_active());
            assert!(matches!(flag.acquire(), Err(ActivationError::Reentrant)));
        }
        assert!(!flag.is_active());
        assert!(flag.acquire().is_ok());
    }

    #[test]
    fn clones_share_the_flag() {
        let flag = SuppressionFlag::new();
        let observer = flag.clone();
        let guard = flag.acquire().unwrap();
        assert!(observer.is_active());
        drop(guard);
        assert!(!observer.is_active());
    }
}
