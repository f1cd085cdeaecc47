//! Recognition of the catalog entry that describes the host's current
//! startup state.
//! 找出與宿主目前啟動狀態相符的下拉項目。

use switchstartup_config::ProjectReference;
use switchstartup_host::{
    LaunchAdapter, LaunchField, LaunchSettings, LoadedProject, ObservedProjectState,
    ObservedStartupState,
};
use tracing::{debug, info};

use crate::catalog::{Catalog, DropdownEntry, MultiProjectEntry};

/// Canonical ordering key; `None` sorts before any value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey<'a> {
    path: &'a str,
    command_line_arguments: Option<&'a str>,
    working_directory: Option<&'a str>,
    start_project: Option<bool>,
    start_external_program: Option<&'a str>,
    start_browser_with_url: Option<&'a str>,
    enable_remote_debugging: Option<bool>,
    remote_debugging_machine: Option<&'a str>,
    profile_name: Option<&'a str>,
}

impl<'a> SortKey<'a> {
    fn configured(reference: &'a ProjectReference, project: &'a LoadedProject) -> Self {
        Self {
            path: &project.path,
            command_line_arguments: reference.command_line_arguments.as_deref(),
            working_directory: reference.working_directory.as_deref(),
            start_project: reference.start_project,
            start_external_program: reference.start_external_program.as_deref(),
            start_browser_with_url: reference.start_browser_with_url.as_deref(),
            enable_remote_debugging: reference.enable_remote_debugging,
            remote_debugging_machine: reference.remote_debugging_machine.as_deref(),
            profile_name: reference.profile_name.as_deref(),
        }
    }

    fn observed(state: &'a ObservedProjectState) -> Self {
        let settings: &LaunchSettings = &state.settings;
        Self {
            path: &state.project.path,
            command_line_arguments: Some(&settings.command_line_arguments),
            working_directory: Some(&settings.working_directory),
            start_project: Some(settings.start_project),
            start_external_program: Some(&settings.start_external_program),
            start_browser_with_url: Some(&settings.start_browser_with_url),
            enable_remote_debugging: Some(settings.enable_remote_debugging),
            remote_debugging_machine: Some(&settings.remote_debugging_machine),
            profile_name: Some(&settings.profile_name),
        }
    }
}

/// Contribution of one overridable field: `Some(0)` unmanaged, `Some(1)`
/// explicit match, `None` hard mismatch.
fn field<T: PartialEq>(configured: Option<T>, observed: T) -> Option<u32> {
    match configured {
        None => Some(0),
        Some(value) if value == observed => Some(1),
        Some(_) => None,
    }
}

fn score_pair(
    reference: &ProjectReference,
    project: &LoadedProject,
    observed: &ObservedProjectState,
) -> Option<u32> {
    if project.path != observed.project.path {
        return None;
    }
    // Fields the project's adapter cannot apply count as unmanaged.
    let adapter = LaunchAdapter::for_project(&observed.project);
    let applies = |field| adapter.applies(reference, field);
    let settings = &observed.settings;
    let mut score = 0;
    score += field(
        reference
            .command_line_arguments
            .as_deref()
            .filter(|_| applies(LaunchField::CommandLineArguments)),
        settings.command_line_arguments.as_str(),
    )?;
    score += field(
        reference
            .working_directory
            .as_deref()
            .filter(|_| applies(LaunchField::WorkingDirectory)),
        settings.working_directory.as_str(),
    )?;
    score += field(
        reference.start_project.filter(|_| applies(LaunchField::StartProject)),
        settings.start_project,
    )?;
    score += field(
        reference
            .start_external_program
            .as_deref()
            .filter(|_| applies(LaunchField::StartExternalProgram)),
        settings.start_external_program.as_str(),
    )?;
    score += field(
        reference
            .start_browser_with_url
            .as_deref()
            .filter(|_| applies(LaunchField::StartBrowserWithUrl)),
        settings.start_browser_with_url.as_str(),
    )?;
    score += field(
        reference
            .enable_remote_debugging
            .filter(|_| applies(LaunchField::EnableRemoteDebugging)),
        settings.enable_remote_debugging,
    )?;
    score += field(
        reference
            .remote_debugging_machine
            .as_deref()
            .filter(|_| applies(LaunchField::RemoteDebuggingMachine)),
        settings.remote_debugging_machine.as_str(),
    )?;
    score += field(
        reference
            .profile_name
            .as_deref()
            .filter(|_| applies(LaunchField::ProfileName)),
        settings.profile_name.as_str(),
    )?;
    Some(score)
}

/// Scores a multi-project entry against the observed state.
/// 以觀察到的啟動狀態為多專案設定評分。
///
/// Returns `None` when the entry cannot describe the observed state: the
/// number of resolvable projects differs, a paired project differs in
/// identity, or a managed field differs from the live value. Otherwise the
/// score is the number of managed fields that match.
///
/// Both sides are sorted by the same composite key and paired by position.
/// Two observed projects sharing a path may therefore pair with the wrong
/// configured reference.
pub fn score_configuration(observed: &ObservedStartupState, entry: &MultiProjectEntry) -> Option<u32> {
    let mut configured: Vec<(&ProjectReference, &LoadedProject)> = entry
        .resolvable()
        .map(|(resolved, project)| (&resolved.reference, project))
        .collect();
    if configured.is_empty() || configured.len() != observed.len() {
        return None;
    }

    let mut live: Vec<&ObservedProjectState> = observed.projects.iter().collect();
    configured.sort_by(|a, b| SortKey::configured(a.0, a.1).cmp(&SortKey::configured(b.0, b.1)));
    live.sort_by(|a, b| SortKey::observed(a).cmp(&SortKey::observed(b)));

    configured
        .iter()
        .zip(live)
        .try_fold(0, |total, ((reference, project), state)| {
            score_pair(reference, project, state).map(|score| total + score)
        })
}

/// Finds the catalog index of the entry the host is currently running.
/// 找出宿主目前執行中的下拉項目索引。
///
/// The highest scoring multi-project entry wins, earlier entries winning
/// ties. Without an eligible entry, a single observed project selects its
/// single-project entry. `None` means the unknown sentinel.
pub fn find_active_entry(observed: &ObservedStartupState, catalog: &Catalog) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, entry) in catalog.entries().iter().enumerate() {
        let DropdownEntry::Multi(multi) = entry else {
            continue;
        };
        let Some(score) = score_configuration(observed, multi) else {
            continue;
        };
        debug!(configuration = %multi.name, score, "eligible startup configuration");
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }
    if let Some((index, _)) = best {
        return Some(index);
    }

    if let [only] = observed.projects.as_slice() {
        if let Some(index) = catalog.find_single(&only.project.path) {
            return Some(index);
        }
    }

    info!(
        startup_projects = observed.len(),
        "no startup configuration matches the active startup projects"
    );
    None
}
