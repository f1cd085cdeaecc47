use std::fs;

use switchstartup_config::{
    ConfigError, Configuration, ConfigurationStore, MultiProjectConfiguration, ProjectReference,
    CURRENT_VERSION,
};
use tempfile::tempdir;

fn sample_configuration() -> Configuration {
    let mut server = MultiProjectConfiguration::new(
        "Server + Client",
        vec![
            ProjectReference::new("Server")
                .with_command_line_arguments("--port 8080")
                .with_working_directory("")
                .with_start_project(true)
                .with_remote_debugging(false, Some(String::new())),
            ProjectReference::new("src/Client/Client.csproj")
                .with_start_browser_with_url("http://localhost:5000")
                .with_profile_name("Client (dev)"),
        ],
    );
    server.solution_configuration = Some("Debug".into());
    server.solution_platform = Some("Any CPU".into());

    Configuration {
        version: CURRENT_VERSION,
        list_all_projects: false,
        activate_command_line_arguments: true,
        multi_project_configurations: vec![
            server,
            MultiProjectConfiguration::new(
                "Tools",
                vec![ProjectReference::new("Tool").with_start_external_program("")],
            ),
        ],
    }
}

#[test]
fn save_and_reload_roundtrip() {
    let temp = tempdir().expect("tempdir");
    let store = ConfigurationStore::for_solution(temp.path().join("Shop.sln"));
    let config = sample_configuration();

    store.save(&config).expect("save");
    assert!(temp.path().join("Shop.sln.startup.json").exists());

    let reloaded = store.load().expect("reload");
    assert_eq!(reloaded, config);
}

#[test]
fn saving_is_deterministic() {
    let temp = tempdir().expect("tempdir");
    let store = ConfigurationStore::new(temp.path().join("a.startup.json"));
    let config = sample_configuration();

    store.save(&config).expect("first save");
    let first = fs::read_to_string(store.path()).expect("read first");
    store.save(&store.load().expect("reload")).expect("second save");
    let second = fs::read_to_string(store.path()).expect("read second");
    assert_eq!(first, second);
}

#[test]
fn legacy_file_without_version_is_read() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("legacy.startup.json");
    fs::write(
        &path,
        r#"{
            "ListAllProjects": false,
            "MultiProjectConfigurations": { "A": ["P1", "P2"] }
        }"#,
    )
    .expect("write legacy file");

    let config = ConfigurationStore::new(&path).load().expect("load legacy");
    assert_eq!(config.version, 1);
    assert_eq!(
        config.multi_project_configurations,
        vec![MultiProjectConfiguration::new(
            "A",
            vec![ProjectReference::legacy("P1"), ProjectReference::legacy("P2")],
        )]
    );
    assert_eq!(
        config.multi_project_configurations[0].projects[1]
            .command_line_arguments
            .as_deref(),
        Some("")
    );
}

#[test]
fn malformed_file_reports_parse_error() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("broken.startup.json");
    fs::write(&path, "{ \"Version\": 2, ").expect("write broken file");

    let err = ConfigurationStore::new(&path).load().unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("broken.startup.json"));
}

#[test]
fn wrong_field_type_reports_configuration_name() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("typed.startup.json");
    fs::write(
        &path,
        r#"{ "Version": 2, "MultiProjectConfigurations": { "Broken": { "Projects": { "P": { "StartProject": "yes" } } } } }"#,
    )
    .expect("write file");

    let err = ConfigurationStore::new(&path).load().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Broken"), "{message}");
}
