//! Dropdown catalog assembly.
//! 下拉選單項目的組裝。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use switchstartup_host::LoadedProject;

use crate::recent::RecentProjects;
use crate::resolver::{ResolvedConfiguration, ResolvedMultiConfiguration, ResolvedProjectReference};

/// Label of the trailing "open the configuration file" entry.
pub const CONFIGURE_LABEL: &str = "Configure...";

/// Which projects feed the single-project entries.
/// 單一專案項目的來源。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogMode {
    #[default]
    AllProjects,
    MostRecentlyUsed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleProjectEntry {
    pub project: LoadedProject,
    /// Another loaded project has the same name; the label shows the path.
    pub disambiguate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiProjectEntry {
    pub name: String,
    pub projects: Vec<ResolvedProjectReference>,
    pub solution_configuration: Option<String>,
    pub solution_platform: Option<String>,
}

impl MultiProjectEntry {
    /// Projects of the entry that resolved to a loaded project.
    pub fn resolvable(&self) -> impl Iterator<Item = (&ResolvedProjectReference, &LoadedProject)> {
        self.projects
            .iter()
            .filter_map(|resolved| resolved.project.as_ref().map(|project| (resolved, project)))
    }
}

impl From<&ResolvedMultiConfiguration> for MultiProjectEntry {
    fn from(configuration: &ResolvedMultiConfiguration) -> Self {
        Self {
            name: configuration.name.clone(),
            projects: configuration.projects.clone(),
            solution_configuration: configuration.solution_configuration.clone(),
            solution_platform: configuration.solution_platform.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherEntry {
    /// Opens the configuration file; never a real selection.
    Configure,
    /// Nothing in the catalog matches the host; never listed.
    Unknown,
}

/// One selectable item of the startup dropdown.
/// 啟動下拉選單中的一個項目。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownEntry {
    Single(SingleProjectEntry),
    Multi(MultiProjectEntry),
    Other(OtherEntry),
}

impl DropdownEntry {
    pub fn unknown() -> Self {
        DropdownEntry::Other(OtherEntry::Unknown)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, DropdownEntry::Other(OtherEntry::Unknown))
    }

    /// Text shown in the dropdown.
    /// 下拉選單顯示的文字。
    pub fn label(&self) -> String {
        match self {
            DropdownEntry::Single(entry) if entry.disambiguate => {
                format!("{} ({})", entry.project.name, entry.project.path)
            }
            DropdownEntry::Single(entry) => entry.project.name.clone(),
            DropdownEntry::Multi(entry) => entry.name.clone(),
            DropdownEntry::Other(OtherEntry::Configure) => CONFIGURE_LABEL.to_string(),
            DropdownEntry::Other(OtherEntry::Unknown) => String::new(),
        }
    }

    /// Continuity equality across rebuilds: kind plus project path (single)
    /// or configuration name (multi).
    /// 重建前後判斷是否為同一項目：種類加上專案路徑或設定名稱。
    pub fn same_identity(&self, other: &DropdownEntry) -> bool {
        match (self, other) {
            (DropdownEntry::Single(a), DropdownEntry::Single(b)) => a.project.path == b.project.path,
            (DropdownEntry::Multi(a), DropdownEntry::Multi(b)) => a.name == b.name,
            (DropdownEntry::Other(a), DropdownEntry::Other(b)) => a == b,
            _ => false,
        }
    }
}

/// Ordered dropdown entries: singles, multis, then "Configure...".
/// 依序排列的下拉項目：單一專案、多專案設定、最後為「設定…」。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<DropdownEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            entries: vec![DropdownEntry::Other(OtherEntry::Configure)],
        }
    }
}

impl Catalog {
    pub fn entries(&self) -> &[DropdownEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&DropdownEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(DropdownEntry::label).collect()
    }

    /// Index of the entry with the same identity as `entry`.
    pub fn find_equivalent(&self, entry: &DropdownEntry) -> Option<usize> {
        self.entries
            .iter()
            .position(|candidate| candidate.same_identity(entry))
    }

    /// Index of the multi-project entry called `name`.
    pub fn find_multi(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| matches!(entry, DropdownEntry::Multi(multi) if multi.name == name))
    }

    /// Index of the single-project entry for `path`.
    pub fn find_single(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(
            |entry| matches!(entry, DropdownEntry::Single(single) if single.project.path == path),
        )
    }
}

/// Builds the dropdown catalog.
/// 組裝下拉選單項目。
pub fn build_catalog(
    resolved: &ResolvedConfiguration,
    projects: &[LoadedProject],
    mode: CatalogMode,
    recent: &RecentProjects,
) -> Catalog {
    let mut entries = Vec::new();

    if resolved.list_all_projects {
        let mut name_counts: HashMap<&str, usize> = HashMap::new();
        for project in projects {
            *name_counts.entry(project.name.as_str()).or_insert(0) += 1;
        }

        let sources: Vec<&LoadedProject> = match mode {
            CatalogMode::AllProjects => {
                let mut sorted: Vec<&LoadedProject> = projects.iter().collect();
                sorted.sort_by(|a, b| {
                    a.name
                        .to_lowercase()
                        .cmp(&b.name.to_lowercase())
                        .then_with(|| a.name.cmp(&b.name))
                });
                sorted
            }
            CatalogMode::MostRecentlyUsed => recent
                .iter()
                .filter_map(|path| projects.iter().find(|project| project.path == path))
                .collect(),
        };

        entries.extend(sources.into_iter().map(|project| {
            DropdownEntry::Single(SingleProjectEntry {
                project: project.clone(),
                disambiguate: name_counts
                    .get(project.name.as_str())
                    .is_some_and(|count| *count > 1),
            })
        }));
    }

    entries.extend(
        resolved
            .configurations
            .iter()
            .map(|configuration| DropdownEntry::Multi(MultiProjectEntry::from(configuration))),
    );
    entries.push(DropdownEntry::Other(OtherEntry::Configure));

    Catalog { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve;
    use switchstartup_config::{Configuration, MultiProjectConfiguration, ProjectReference};

    fn projects() -> Vec<LoadedProject> {
        vec![
            LoadedProject::new("1", "web", "src/web/web.csproj"),
            LoadedProject::new("2", "Api", "src/Api/Api.csproj"),
            LoadedProject::new("3", "Common", "src/Common/Common.csproj"),
            LoadedProject::new("4", "Common", "tests/Common/Common.csproj"),
        ]
    }

    fn configuration(list_all_projects: bool) -> Configuration {
        Configuration {
            list_all_projects,
            multi_project_configurations: vec![
                MultiProjectConfiguration::new("Zeta", vec![ProjectReference::new("Api")]),
                MultiProjectConfiguration::new("Alpha", vec![ProjectReference::new("web")]),
            ],
            ..Configuration::default()
        }
    }

    #[test]
    fn all_projects_are_sorted_by_name_then_multis_in_file_order() {
        let projects = projects();
        let resolved = resolve(&configuration(true), &projects);
        let catalog = build_catalog(
            &resolved,
            &projects,
            CatalogMode::AllProjects,
            &RecentProjects::default(),
        );
        assert_eq!(
            catalog.labels(),
            vec![
                "Api",
                "Common (src/Common/Common.csproj)",
                "Common (tests/Common/Common.csproj)",
                "web",
                "Zeta",
                "Alpha",
                CONFIGURE_LABEL,
            ]
        );
    }

    #[test]
    fn list_all_projects_false_emits_only_configurations() {
        let projects = projects();
        let resolved = resolve(&configuration(false), &projects);
        let catalog = build_catalog(
            &resolved,
            &projects,
            CatalogMode::AllProjects,
            &RecentProjects::default(),
        );
        assert_eq!(catalog.labels(), vec!["Zeta", "Alpha", CONFIGURE_LABEL]);
    }

    #[test]
    fn recent_mode_uses_recency_order_and_skips_unloaded() {
        let projects = projects();
        let resolved = resolve(&configuration(true), &projects);
        let mut recent = RecentProjects::new(3);
        recent.touch("src/Api/Api.csproj");
        recent.touch("gone.csproj");
        recent.touch("tests/Common/Common.csproj");

        let catalog = build_catalog(&resolved, &projects, CatalogMode::MostRecentlyUsed, &recent);
        assert_eq!(
            catalog.labels(),
            vec![
                "Common (tests/Common/Common.csproj)",
                "Api",
                "Zeta",
                "Alpha",
                CONFIGURE_LABEL
            ]
        );
    }

    #[test]
    fn equivalence_uses_kind_and_identity() {
        let projects = projects();
        let resolved = resolve(&configuration(true), &projects);
        let catalog = build_catalog(
            &resolved,
            &projects,
            CatalogMode::AllProjects,
            &RecentProjects::default(),
        );

        let alpha = catalog.get(catalog.find_multi("Alpha").unwrap()).unwrap().clone();
        assert_eq!(catalog.find_equivalent(&alpha), Some(5));
        assert_eq!(
            catalog.find_equivalent(&DropdownEntry::Other(OtherEntry::Configure)),
            Some(6)
        );
        assert_eq!(catalog.find_equivalent(&DropdownEntry::unknown()), None);
        assert_eq!(catalog.find_single("src/web/web.csproj"), Some(3));
    }
}
