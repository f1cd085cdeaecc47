//! Versioned JSON schema of the startup configuration file.
//! 啟動設定檔的版本化 JSON 格式。
//!
//! Version 1 maps each configuration name to a plain list of project names or
//! paths. Version 2 maps it to an object carrying per-project overrides:
//!
//! ```json
//! {
//!   "Version": 2,
//!   "ListAllProjects": false,
//!   "MultiProjectConfigurations": {
//!     "Server + Client": {
//!       "Projects": {
//!         "Server": { "CommandLineArguments": "--port 8080" },
//!         "Client": {}
//!       },
//!       "SolutionConfiguration": "Debug"
//!     }
//!   }
//! }
//! ```
//!
//! Object key order is significant (it is the catalog order), which is why the
//! workspace enables serde_json's `preserve_order` feature.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{
    Configuration, MultiProjectConfiguration, ProjectReference, CURRENT_VERSION, LEGACY_VERSION,
};

/// Errors raised while interpreting configuration text.
/// 解析設定內容時的錯誤。
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported configuration version {0}")]
    UnsupportedVersion(u32),
    #[error("configuration \"{name}\": {message}")]
    InvalidConfiguration { name: String, message: String },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default = "default_true")]
    list_all_projects: bool,
    #[serde(default)]
    activate_command_line_arguments: bool,
    #[serde(default)]
    multi_project_configurations: Map<String, Value>,
}

fn default_version() -> u32 {
    LEGACY_VERSION
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawMultiConfiguration {
    #[serde(default)]
    projects: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    solution_configuration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    solution_platform: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command_line_arguments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    working_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_project: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_external_program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_browser_with_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enable_remote_debugging: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remote_debugging_machine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile_name: Option<String>,
}

impl RawProject {
    fn into_reference(self, name_or_path: String) -> ProjectReference {
        ProjectReference {
            name_or_path,
            command_line_arguments: self.command_line_arguments,
            working_directory: self.working_directory,
            start_project: self.start_project,
            start_external_program: self.start_external_program,
            start_browser_with_url: self.start_browser_with_url,
            enable_remote_debugging: self.enable_remote_debugging,
            remote_debugging_machine: self.remote_debugging_machine,
            profile_name: self.profile_name,
        }
    }

    fn from_reference(reference: &ProjectReference) -> Self {
        Self {
            command_line_arguments: reference.command_line_arguments.clone(),
            working_directory: reference.working_directory.clone(),
            start_project: reference.start_project,
            start_external_program: reference.start_external_program.clone(),
            start_browser_with_url: reference.start_browser_with_url.clone(),
            enable_remote_debugging: reference.enable_remote_debugging,
            remote_debugging_machine: reference.remote_debugging_machine.clone(),
            profile_name: reference.profile_name.clone(),
        }
    }
}

/// Parses configuration text of any supported version.
/// 解析任一支援版本的設定內容。
pub fn parse_configuration(input: &str) -> Result<Configuration, SchemaError> {
    if input.trim().is_empty() {
        debug!("configuration text is empty, using defaults");
        return Ok(Configuration::default());
    }

    let raw: RawFile = serde_json::from_str(input)?;
    if raw.version == 0 {
        return Err(SchemaError::UnsupportedVersion(raw.version));
    }
    if raw.version > CURRENT_VERSION {
        warn!(
            version = raw.version,
            supported = CURRENT_VERSION,
            "configuration file is newer than supported; reading it with the latest known rules"
        );
    }

    let mut configurations = Vec::with_capacity(raw.multi_project_configurations.len());
    for (name, value) in raw.multi_project_configurations {
        let configuration = if raw.version == LEGACY_VERSION {
            parse_legacy_configuration(name, value)?
        } else {
            parse_configuration_object(name, value)?
        };
        configurations.push(configuration);
    }

    Ok(Configuration {
        version: raw.version,
        list_all_projects: raw.list_all_projects,
        activate_command_line_arguments: raw.activate_command_line_arguments,
        multi_project_configurations: configurations,
    })
}

fn parse_legacy_configuration(
    name: String,
    value: Value,
) -> Result<MultiProjectConfiguration, SchemaError> {
    let Value::Array(items) = value else {
        return Err(SchemaError::InvalidConfiguration {
            name,
            message: "expected a list of project names (use \"Version\": 2 for per-project settings)"
                .to_string(),
        });
    };

    let mut projects = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(project) => projects.push(ProjectReference::legacy(project)),
            other => {
                return Err(SchemaError::InvalidConfiguration {
                    name,
                    message: format!("expected a project name, found {other}"),
                })
            }
        }
    }
    Ok(MultiProjectConfiguration::new(name, projects))
}

fn parse_configuration_object(
    name: String,
    value: Value,
) -> Result<MultiProjectConfiguration, SchemaError> {
    let raw: RawMultiConfiguration = match value {
        Value::Null => RawMultiConfiguration::default(),
        value => serde_json::from_value(value).map_err(|err| SchemaError::InvalidConfiguration {
            name: name.clone(),
            message: err.to_string(),
        })?,
    };

    let mut projects = Vec::with_capacity(raw.projects.len());
    for (project, settings) in raw.projects {
        let settings: RawProject = match settings {
            Value::Null => RawProject::default(),
            settings => serde_json::from_value(settings).map_err(|err| {
                SchemaError::InvalidConfiguration {
                    name: name.clone(),
                    message: format!("project \"{project}\": {err}"),
                }
            })?,
        };
        projects.push(settings.into_reference(project));
    }

    Ok(MultiProjectConfiguration {
        name,
        projects,
        solution_configuration: raw.solution_configuration,
        solution_platform: raw.solution_platform,
    })
}

/// Serializes the configuration as pretty-printed JSON.
/// 將設定序列化為格式化的 JSON。
///
/// The version-1 layout is kept only while every entry still fits it;
/// otherwise the file is written in the current layout. Arguments a
/// version-1 file leaves unmanaged are omitted on that upgrade, and a
/// configuration naming the same project twice is rejected there.
pub fn serialize_configuration(config: &Configuration) -> Result<String, SchemaError> {
    let legacy = config.version == LEGACY_VERSION && config.is_legacy_expressible();
    let keep_arguments = config.manages_command_line_arguments();

    let mut configurations = Map::new();
    for configuration in &config.multi_project_configurations {
        let value = if legacy {
            Value::Array(
                configuration
                    .projects
                    .iter()
                    .map(|project| Value::String(project.name_or_path.clone()))
                    .collect(),
            )
        } else {
            let mut projects = Map::new();
            for project in &configuration.projects {
                let mut raw = RawProject::from_reference(project);
                if !keep_arguments {
                    raw.command_line_arguments = None;
                }
                let value = serde_json::to_value(raw)?;
                if projects.insert(project.name_or_path.clone(), value).is_some() {
                    return Err(SchemaError::InvalidConfiguration {
                        name: configuration.name.clone(),
                        message: format!("project \"{}\" is listed twice", project.name_or_path),
                    });
                }
            }
            serde_json::to_value(RawMultiConfiguration {
                projects,
                solution_configuration: configuration.solution_configuration.clone(),
                solution_platform: configuration.solution_platform.clone(),
            })?
        };
        configurations.insert(configuration.name.clone(), value);
    }

    let raw = RawFile {
        version: if legacy {
            LEGACY_VERSION
        } else {
            config.version.max(CURRENT_VERSION)
        },
        list_all_projects: config.list_all_projects,
        activate_command_line_arguments: config.activate_command_line_arguments,
        multi_project_configurations: configurations,
    };
    Ok(serde_json::to_string_pretty(&raw)?)
}
