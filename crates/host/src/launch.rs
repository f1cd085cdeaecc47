//! Per-capability translation between configured overrides and the host's
//! launch properties.
//! 依專案能力在設定覆寫值與宿主啟動屬性之間轉換。

use switchstartup_config::ProjectReference;
use tracing::debug;

use crate::host::{Host, HostError};
use crate::native::NativeDebugSettings;
use crate::observed::LaunchSettings;
use crate::project::{LaunchCapability, LoadedProject, ProjectId};

mod managed {
    pub const ARGUMENTS: &str = "StartArguments";
    pub const WORKING_DIRECTORY: &str = "StartWorkingDirectory";
    pub const START_ACTION: &str = "StartAction";
    pub const PROGRAM: &str = "StartProgram";
    pub const URL: &str = "StartURL";
    pub const REMOTE_ENABLED: &str = "RemoteDebugEnabled";
    pub const REMOTE_MACHINE: &str = "RemoteDebugMachine";
}

mod profiles {
    pub const ACTIVE_PROFILE: &str = "ActiveDebugProfile";
    pub const ARGUMENTS: &str = "CommandLineArguments";
    pub const WORKING_DIRECTORY: &str = "WorkingDirectory";
    pub const COMMAND_NAME: &str = "CommandName";
    pub const EXECUTABLE: &str = "ExecutablePath";
    pub const URL: &str = "LaunchUrl";
    pub const LAUNCH_BROWSER: &str = "LaunchBrowser";
    pub const REMOTE_ENABLED: &str = "RemoteDebugEnabled";
    pub const REMOTE_MACHINE: &str = "RemoteDebugMachine";
}

mod browser {
    pub const ARGUMENTS: &str = "WebApplication.StartCmdLineArguments";
    pub const WORKING_DIRECTORY: &str = "WebApplication.StartWorkingDirectory";
    pub const START_ACTION: &str = "WebApplication.DebugStartAction";
    pub const PROGRAM: &str = "WebApplication.StartExternalProgram";
    pub const URL: &str = "WebApplication.StartExternalUrl";
}

/// What the debugger starts for a project.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StartAction {
    Project,
    Program,
    Url,
}

impl StartAction {
    fn resolve(self, start_project: Option<bool>, program: Option<&str>, url: Option<&str>) -> Self {
        if matches!(url, Some(url) if !url.is_empty()) {
            StartAction::Url
        } else if matches!(program, Some(program) if !program.is_empty()) {
            StartAction::Program
        } else if start_project == Some(true) {
            StartAction::Project
        } else {
            self
        }
    }

    fn from_managed(code: Option<String>) -> Self {
        match code.as_deref().map(str::trim) {
            Some("1") => StartAction::Program,
            Some("2") => StartAction::Url,
            _ => StartAction::Project,
        }
    }

    fn managed_code(self) -> &'static str {
        match self {
            StartAction::Project => "0",
            StartAction::Program => "1",
            StartAction::Url => "2",
        }
    }

    // Web projects use 0/1 for "current page"/"specific page", both start the project.
    fn from_browser(code: Option<String>) -> Self {
        match code.as_deref().map(str::trim) {
            Some("2") => StartAction::Program,
            Some("3") => StartAction::Url,
            _ => StartAction::Project,
        }
    }

    fn browser_code(self) -> &'static str {
        match self {
            StartAction::Project => "0",
            StartAction::Program => "2",
            StartAction::Url => "3",
        }
    }

    fn from_command_name(name: Option<String>) -> Self {
        match name.as_deref() {
            Some("Executable") => StartAction::Program,
            _ => StartAction::Project,
        }
    }
}

/// One overridable launch field of a [`ProjectReference`].
/// 專案參考中可覆寫的單一啟動欄位。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchField {
    CommandLineArguments,
    WorkingDirectory,
    StartProject,
    StartExternalProgram,
    StartBrowserWithUrl,
    EnableRemoteDebugging,
    RemoteDebuggingMachine,
    ProfileName,
}

/// Adapter chosen from a project's [`LaunchCapability`].
/// 依專案能力選擇的啟動設定轉接器。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchAdapter {
    Managed,
    Profiles,
    Browser,
    Native,
    Unsupported,
}

impl LaunchAdapter {
    pub fn for_project(project: &LoadedProject) -> Self {
        match project.capability {
            LaunchCapability::ManagedProperties => LaunchAdapter::Managed,
            LaunchCapability::LaunchProfiles => LaunchAdapter::Profiles,
            LaunchCapability::BrowserLaunch => LaunchAdapter::Browser,
            LaunchCapability::NativeDebugger => LaunchAdapter::Native,
            LaunchCapability::Unsupported => LaunchAdapter::Unsupported,
        }
    }

    /// Whether the adapter can write `field` at all.
    /// 轉接器是否能寫入該欄位。
    pub fn supports(self, field: LaunchField) -> bool {
        match self {
            LaunchAdapter::Profiles => true,
            LaunchAdapter::Managed | LaunchAdapter::Native => field != LaunchField::ProfileName,
            LaunchAdapter::Browser => !matches!(
                field,
                LaunchField::EnableRemoteDebugging
                    | LaunchField::RemoteDebuggingMachine
                    | LaunchField::ProfileName
            ),
            LaunchAdapter::Unsupported => false,
        }
    }

    /// Whether [`apply`](Self::apply) leaves `field` of `reference` readable
    /// as configured. Fields it does not apply carry no weight when matching.
    /// 套用後該欄位是否能以設定值讀回；無法套用的欄位不參與比對。
    pub fn applies(self, reference: &ProjectReference, field: LaunchField) -> bool {
        self.supports(field)
            && !(field == LaunchField::StartProject && lacks_start_target(reference))
    }

    /// Reads the project's live launch settings.
    /// 讀取專案目前的啟動設定。
    pub fn read(self, project: &LoadedProject, host: &dyn Host) -> LaunchSettings {
        let id = &project.id;
        match self {
            LaunchAdapter::Managed => LaunchSettings {
                command_line_arguments: text(host, id, managed::ARGUMENTS),
                working_directory: text(host, id, managed::WORKING_DIRECTORY),
                start_project: StartAction::from_managed(host.read_property(id, managed::START_ACTION))
                    == StartAction::Project,
                start_external_program: text(host, id, managed::PROGRAM),
                start_browser_with_url: text(host, id, managed::URL),
                enable_remote_debugging: flag(host, id, managed::REMOTE_ENABLED),
                remote_debugging_machine: text(host, id, managed::REMOTE_MACHINE),
                profile_name: String::new(),
            },
            LaunchAdapter::Profiles => LaunchSettings {
                command_line_arguments: text(host, id, profiles::ARGUMENTS),
                working_directory: text(host, id, profiles::WORKING_DIRECTORY),
                start_project: StartAction::from_command_name(
                    host.read_property(id, profiles::COMMAND_NAME),
                ) == StartAction::Project,
                start_external_program: text(host, id, profiles::EXECUTABLE),
                start_browser_with_url: text(host, id, profiles::URL),
                enable_remote_debugging: flag(host, id, profiles::REMOTE_ENABLED),
                remote_debugging_machine: text(host, id, profiles::REMOTE_MACHINE),
                profile_name: text(host, id, profiles::ACTIVE_PROFILE),
            },
            LaunchAdapter::Browser => LaunchSettings {
                command_line_arguments: text(host, id, browser::ARGUMENTS),
                working_directory: text(host, id, browser::WORKING_DIRECTORY),
                start_project: StartAction::from_browser(host.read_property(id, browser::START_ACTION))
                    == StartAction::Project,
                start_external_program: text(host, id, browser::PROGRAM),
                start_browser_with_url: text(host, id, browser::URL),
                ..LaunchSettings::default()
            },
            LaunchAdapter::Native => {
                let settings = host.native_debug_settings(id).unwrap_or_default();
                LaunchSettings {
                    command_line_arguments: settings.command_arguments,
                    working_directory: settings.working_directory,
                    start_project: settings.command.is_empty(),
                    start_external_program: settings.command,
                    start_browser_with_url: settings.browser_url,
                    enable_remote_debugging: settings.flavor
                        == crate::native::DebuggerFlavor::Remote,
                    remote_debugging_machine: settings.remote_machine,
                    profile_name: String::new(),
                }
            }
            LaunchAdapter::Unsupported => LaunchSettings::default(),
        }
    }

    /// Pushes every managed (non-`None`) override of `reference` onto the project.
    /// 將參考中所有受管理的覆寫值寫入專案。
    ///
    /// Stops at the first property the host refuses.
    pub fn apply(
        self,
        project: &LoadedProject,
        reference: &ProjectReference,
        host: &mut dyn Host,
    ) -> Result<(), HostError> {
        let id = &project.id;
        if self != LaunchAdapter::Unsupported && lacks_start_target(reference) {
            debug!(
                project = %project.name,
                "StartProject false needs a program or URL to start instead; skipped"
            );
        }
        match self {
            LaunchAdapter::Managed => {
                write(host, id, managed::ARGUMENTS, &reference.command_line_arguments)?;
                write(host, id, managed::WORKING_DIRECTORY, &reference.working_directory)?;
                write(host, id, managed::PROGRAM, &reference.start_external_program)?;
                write(host, id, managed::URL, &reference.start_browser_with_url)?;
                let current = StartAction::from_managed(host.read_property(id, managed::START_ACTION));
                let next = resolve_action(current, reference);
                if next != current {
                    host.write_property(id, managed::START_ACTION, next.managed_code())?;
                }
                write_flag(host, id, managed::REMOTE_ENABLED, reference.enable_remote_debugging)?;
                write(host, id, managed::REMOTE_MACHINE, &reference.remote_debugging_machine)?;
                skip_profile(project, reference);
                Ok(())
            }
            LaunchAdapter::Profiles => {
                // Every other property belongs to the active profile.
                write(host, id, profiles::ACTIVE_PROFILE, &reference.profile_name)?;
                write(host, id, profiles::ARGUMENTS, &reference.command_line_arguments)?;
                write(host, id, profiles::WORKING_DIRECTORY, &reference.working_directory)?;
                write(host, id, profiles::EXECUTABLE, &reference.start_external_program)?;
                let current =
                    StartAction::from_command_name(host.read_property(id, profiles::COMMAND_NAME));
                match resolve_action(current, reference) {
                    StartAction::Program if current != StartAction::Program => {
                        host.write_property(id, profiles::COMMAND_NAME, "Executable")?
                    }
                    StartAction::Project if current != StartAction::Project => {
                        host.write_property(id, profiles::COMMAND_NAME, "Project")?
                    }
                    _ => {}
                }
                if let Some(url) = &reference.start_browser_with_url {
                    host.write_property(id, profiles::URL, url)?;
                    let launch = if url.is_empty() { "false" } else { "true" };
                    host.write_property(id, profiles::LAUNCH_BROWSER, launch)?;
                }
                write_flag(host, id, profiles::REMOTE_ENABLED, reference.enable_remote_debugging)?;
                write(host, id, profiles::REMOTE_MACHINE, &reference.remote_debugging_machine)?;
                Ok(())
            }
            LaunchAdapter::Browser => {
                write(host, id, browser::ARGUMENTS, &reference.command_line_arguments)?;
                write(host, id, browser::WORKING_DIRECTORY, &reference.working_directory)?;
                write(host, id, browser::PROGRAM, &reference.start_external_program)?;
                write(host, id, browser::URL, &reference.start_browser_with_url)?;
                let current = StartAction::from_browser(host.read_property(id, browser::START_ACTION));
                let next = resolve_action(current, reference);
                if next != current {
                    host.write_property(id, browser::START_ACTION, next.browser_code())?;
                }
                if reference.enable_remote_debugging.is_some()
                    || reference.remote_debugging_machine.is_some()
                {
                    debug!(project = %project.name, "web projects have no remote debugging settings");
                }
                skip_profile(project, reference);
                Ok(())
            }
            LaunchAdapter::Native => {
                let current = host
                    .native_debug_settings(id)
                    .ok_or(HostError::Unsupported("native debugger settings"))?;
                let next = apply_native(&current, reference);
                if next != current {
                    host.set_native_debug_settings(id, &next)?;
                }
                skip_profile(project, reference);
                Ok(())
            }
            LaunchAdapter::Unsupported => {
                if !reference.is_unmanaged() {
                    debug!(project = %project.name, "project has no launch settings; overrides skipped");
                }
                Ok(())
            }
        }
    }
}

fn apply_native(current: &NativeDebugSettings, reference: &ProjectReference) -> NativeDebugSettings {
    let mut next = current.clone();
    if let Some(arguments) = &reference.command_line_arguments {
        next.command_arguments = arguments.clone();
    }
    if let Some(directory) = &reference.working_directory {
        next.working_directory = directory.clone();
    }
    if let Some(program) = &reference.start_external_program {
        next.command = program.clone();
    } else if reference.start_project == Some(true) {
        next.command.clear();
    }
    if let Some(url) = &reference.start_browser_with_url {
        next.browser_url = url.clone();
    }
    if let Some(machine) = &reference.remote_debugging_machine {
        next.remote_machine = machine.clone();
    }
    next.flavor = current.flavor.transition(
        reference.start_browser_with_url.as_deref(),
        reference.enable_remote_debugging,
    );
    next
}

/// `StartProject: false` only has an effect when something else is started.
fn lacks_start_target(reference: &ProjectReference) -> bool {
    let set = |value: &Option<String>| value.as_deref().is_some_and(|value| !value.is_empty());
    reference.start_project == Some(false)
        && !set(&reference.start_external_program)
        && !set(&reference.start_browser_with_url)
}

fn resolve_action(current: StartAction, reference: &ProjectReference) -> StartAction {
    current.resolve(
        reference.start_project,
        reference.start_external_program.as_deref(),
        reference.start_browser_with_url.as_deref(),
    )
}

fn skip_profile(project: &LoadedProject, reference: &ProjectReference) {
    if reference.profile_name.is_some() {
        debug!(project = %project.name, "project has no launch profiles; profile override skipped");
    }
}

fn text(host: &dyn Host, id: &ProjectId, name: &str) -> String {
    host.read_property(id, name).unwrap_or_default()
}

fn flag(host: &dyn Host, id: &ProjectId, name: &str) -> bool {
    host.read_property(id, name)
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

fn write(
    host: &mut dyn Host,
    id: &ProjectId,
    name: &str,
    value: &Option<String>,
) -> Result<(), HostError> {
    match value {
        Some(value) => host.write_property(id, name, value),
        None => Ok(()),
    }
}

fn write_flag(
    host: &mut dyn Host,
    id: &ProjectId,
    name: &str,
    value: Option<bool>,
) -> Result<(), HostError> {
    match value {
        Some(value) => host.write_property(id, name, if value { "true" } else { "false" }),
        None => Ok(()),
    }
}
