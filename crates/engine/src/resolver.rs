//! Resolution of configured project references against loaded projects.
//! 將設定中的專案參考對應到已載入的專案。

use std::fmt;

use switchstartup_config::{Configuration, MultiProjectConfiguration, ProjectReference};
use switchstartup_host::LoadedProject;
use tracing::warn;

/// A configured reference and the project it currently points at.
/// 設定參考及其目前對應的專案。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProjectReference {
    pub reference: ProjectReference,
    /// `None` when the project was renamed, unloaded or never existed.
    pub project: Option<LoadedProject>,
}

impl ResolvedProjectReference {
    pub fn is_dangling(&self) -> bool {
        self.project.is_none()
    }
}

/// A multi-project configuration with its references resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMultiConfiguration {
    pub name: String,
    pub projects: Vec<ResolvedProjectReference>,
    pub solution_configuration: Option<String>,
    pub solution_platform: Option<String>,
}

/// Problems found while resolving; none of them stop resolution.
/// 解析過程中發現的問題，皆不會中斷解析。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    Dangling {
        configuration: String,
        reference: String,
    },
    Ambiguous {
        configuration: String,
        reference: String,
        candidates: Vec<String>,
    },
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionWarning::Dangling {
                configuration,
                reference,
            } => write!(
                f,
                "configuration \"{configuration}\" references unknown project \"{reference}\""
            ),
            ResolutionWarning::Ambiguous {
                configuration,
                reference,
                candidates,
            } => write!(
                f,
                "configuration \"{configuration}\" references ambiguous project name \"{reference}\"; use one of: {}",
                candidates.join(", ")
            ),
        }
    }
}

/// Result of resolving a whole configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    pub list_all_projects: bool,
    pub configurations: Vec<ResolvedMultiConfiguration>,
    pub warnings: Vec<ResolutionWarning>,
}

impl Default for ResolvedConfiguration {
    fn default() -> Self {
        resolve(&Configuration::default(), &[])
    }
}

/// Resolves every reference of `config` against `projects`.
/// 以已載入專案解析設定中的每個參考。
///
/// The first project (in iteration order) whose name or path equals the
/// reference wins. Shared display names are reported as ambiguous but still
/// resolve to that first project.
pub fn resolve(config: &Configuration, projects: &[LoadedProject]) -> ResolvedConfiguration {
    let manage_arguments = config.manages_command_line_arguments();
    let mut warnings = Vec::new();
    let configurations = config
        .multi_project_configurations
        .iter()
        .map(|configuration| {
            resolve_configuration(configuration, projects, manage_arguments, &mut warnings)
        })
        .collect();

    for warning in &warnings {
        warn!("{warning}");
    }

    ResolvedConfiguration {
        list_all_projects: config.list_all_projects,
        configurations,
        warnings,
    }
}

fn resolve_configuration(
    configuration: &MultiProjectConfiguration,
    projects: &[LoadedProject],
    manage_arguments: bool,
    warnings: &mut Vec<ResolutionWarning>,
) -> ResolvedMultiConfiguration {
    let resolved = configuration
        .projects
        .iter()
        .map(|reference| {
            let name_or_path = reference.name_or_path.as_str();
            let project = projects
                .iter()
                .find(|project| project.name == name_or_path || project.path == name_or_path)
                .cloned();

            if project.is_none() {
                warnings.push(ResolutionWarning::Dangling {
                    configuration: configuration.name.clone(),
                    reference: name_or_path.to_string(),
                });
            } else if let Some(candidates) = ambiguous_candidates(name_or_path, projects) {
                warnings.push(ResolutionWarning::Ambiguous {
                    configuration: configuration.name.clone(),
                    reference: name_or_path.to_string(),
                    candidates,
                });
            }

            let mut reference = reference.clone();
            if !manage_arguments {
                reference.command_line_arguments = None;
            }
            ResolvedProjectReference { reference, project }
        })
        .collect();

    ResolvedMultiConfiguration {
        name: configuration.name.clone(),
        projects: resolved,
        solution_configuration: configuration.solution_configuration.clone(),
        solution_platform: configuration.solution_platform.clone(),
    }
}

fn ambiguous_candidates(name_or_path: &str, projects: &[LoadedProject]) -> Option<Vec<String>> {
    if projects.iter().any(|project| project.path == name_or_path) {
        return None;
    }
    let candidates: Vec<String> = projects
        .iter()
        .filter(|project| project.name == name_or_path)
        .map(|project| project.path.clone())
        .collect();
    (candidates.len() > 1).then_some(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchstartup_config::{LEGACY_VERSION, CURRENT_VERSION};

    fn projects() -> Vec<LoadedProject> {
        vec![
            LoadedProject::new("1", "Api", "src/Api/Api.csproj"),
            LoadedProject::new("2", "Common", "src/Common/Common.csproj"),
            LoadedProject::new("3", "Common", "tests/Common/Common.csproj"),
        ]
    }

    fn config_with(references: Vec<ProjectReference>) -> Configuration {
        Configuration {
            multi_project_configurations: vec![MultiProjectConfiguration::new("Cfg", references)],
            ..Configuration::default()
        }
    }

    #[test]
    fn resolves_by_name_or_path() {
        let config = config_with(vec![
            ProjectReference::new("Api"),
            ProjectReference::new("tests/Common/Common.csproj"),
        ]);
        let resolved = resolve(&config, &projects());
        let ids: Vec<_> = resolved.configurations[0]
            .projects
            .iter()
            .map(|r| r.project.as_ref().unwrap().id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn missing_projects_are_dangling() {
        let config = config_with(vec![ProjectReference::new("Gone")]);
        let resolved = resolve(&config, &projects());
        assert!(resolved.configurations[0].projects[0].is_dangling());
        assert_eq!(
            resolved.warnings,
            vec![ResolutionWarning::Dangling {
                configuration: "Cfg".into(),
                reference: "Gone".into(),
            }]
        );
    }

    #[test]
    fn shared_names_are_ambiguous_but_resolve_in_order() {
        let config = config_with(vec![ProjectReference::new("Common")]);
        let resolved = resolve(&config, &projects());
        let project = resolved.configurations[0].projects[0].project.as_ref().unwrap();
        assert_eq!(project.id.as_str(), "2");
        match &resolved.warnings[..] {
            [ResolutionWarning::Ambiguous { candidates, .. }] => assert_eq!(
                candidates,
                &vec![
                    "src/Common/Common.csproj".to_string(),
                    "tests/Common/Common.csproj".to_string()
                ]
            ),
            other => panic!("unexpected warnings {other:?}"),
        }
    }

    #[test]
    fn legacy_arguments_are_unmanaged_unless_activated() {
        let mut config = config_with(vec![ProjectReference::legacy("Api")]);
        config.version = LEGACY_VERSION;
        let resolved = resolve(&config, &projects());
        assert_eq!(
            resolved.configurations[0].projects[0]
                .reference
                .command_line_arguments,
            None
        );

        config.activate_command_line_arguments = true;
        let resolved = resolve(&config, &projects());
        assert_eq!(
            resolved.configurations[0].projects[0]
                .reference
                .command_line_arguments
                .as_deref(),
            Some("")
        );

        config.activate_command_line_arguments = false;
        config.version = CURRENT_VERSION;
        let resolved = resolve(&config, &projects());
        assert!(resolved.configurations[0].projects[0]
            .reference
            .command_line_arguments
            .is_some());
    }
}
