use serde::{Deserialize, Serialize};

/// Opaque identity the host assigns to a loaded project.  
/// 宿主為已載入專案指定的不透明識別碼。
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which launch-settings surface a project exposes.  
/// 專案提供的啟動設定介面種類。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchCapability {
    /// Classic managed projects with a flat property bag.
    #[default]
    ManagedProperties,
    /// SDK-style projects driven by named launch profiles.
    LaunchProfiles,
    /// Native projects configured through the debugger settings object.
    NativeDebugger,
    /// Web applications and web sites that launch a browser.
    BrowserLaunch,
    /// Anything without launch settings (solution items, database projects...).
    Unsupported,
}

/// A project currently loaded in the host.  
/// 宿主中目前已載入的專案。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedProject {
    pub id: ProjectId,
    pub name: String,
    /// Solution-relative path, absolute for web-site projects.
    pub path: String,
    #[serde(default)]
    pub capability: LaunchCapability,
}

impl LoadedProject {
    pub fn new(id: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(id),
            name: name.into(),
            path: path.into(),
            capability: LaunchCapability::default(),
        }
    }

    pub fn with_capability(mut self, capability: LaunchCapability) -> Self {
        self.capability = capability;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_defaults_to_managed_properties() {
        let project: LoadedProject =
            serde_json::from_str(r#"{ "id": "1", "name": "App", "path": "App/App.csproj" }"#)
                .unwrap();
        assert_eq!(project, LoadedProject::new("1", "App", "App/App.csproj"));

        let native: LoadedProject = serde_json::from_str(
            r#"{ "id": "2", "name": "Engine", "path": "Engine.vcxproj", "capability": "native_debugger" }"#,
        )
        .unwrap();
        assert_eq!(native.capability, LaunchCapability::NativeDebugger);
    }
}
