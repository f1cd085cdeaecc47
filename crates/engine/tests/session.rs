use std::fs;
use std::path::{Path, PathBuf};

use switchstartup_engine::{
    CatalogMode, DropdownEntry, SessionError, SessionOptions, StartupSession, CONFIGURE_LABEL,
};
use switchstartup_host::{Host, InMemoryHost, LoadedProject, ManualWatcher, ProjectId};
use tempfile::{tempdir, TempDir};

struct Fixture {
    _dir: TempDir,
    solution: PathBuf,
    config: PathBuf,
    host: InMemoryHost,
}

impl Fixture {
    fn new(config: Option<&str>) -> Self {
        let dir = tempdir().expect("tempdir");
        let solution = dir.path().join("Shop.sln");
        let config_path = dir.path().join("Shop.sln.startup.json");
        if let Some(text) = config {
            fs::write(&config_path, text).expect("write config");
        }
        let mut host = InMemoryHost::new();
        host.add_project(LoadedProject::new("a", "A", "A.csproj"));
        host.add_project(LoadedProject::new("b", "B", "B.csproj"));
        Self {
            _dir: dir,
            solution,
            config: config_path,
            host,
        }
    }

    fn rewrite(&self, text: &str) {
        fs::write(&self.config, text).expect("rewrite config");
    }
}

fn session() -> StartupSession<ManualWatcher> {
    StartupSession::new(SessionOptions::default(), ManualWatcher::new())
}

fn selected_label<W: switchstartup_host::FileWatch>(session: &StartupSession<W>) -> String {
    session.selected().expect("open solution").label()
}

const TWO_CONFIGS: &str = r#"{
  "Version": 2,
  "ListAllProjects": false,
  "MultiProjectConfigurations": {
    "Cfg1": { "Projects": { "A": { "CommandLineArguments": "--x" } } },
    "Cfg2": { "Projects": { "A": {} } }
  }
}"#;

#[test]
fn opening_a_solution_selects_the_best_match() {
    let mut fixture = Fixture::new(Some(TWO_CONFIGS));
    fixture
        .host
        .set_property(&ProjectId::new("a"), "StartArguments", "--x");
    fixture.host.set_startup(vec!["A.csproj".into()]);

    let mut session = session();
    session.on_solution_opened(&fixture.solution, &mut fixture.host);

    assert_eq!(
        session.catalog().unwrap().labels(),
        vec!["Cfg1", "Cfg2", CONFIGURE_LABEL]
    );
    assert_eq!(selected_label(&session), "Cfg1");
    assert_eq!(session.selected_index(), Some(0));
    assert!(session.watcher().is_watching(&fixture.config));
}

#[test]
fn mismatching_state_selects_unknown() {
    let mut fixture = Fixture::new(Some(
        r#"{
  "Version": 2,
  "ListAllProjects": false,
  "MultiProjectConfigurations": {
    "Cfg3": { "Projects": { "A": {}, "B": { "CommandLineArguments": "--y" } } }
  }
}"#,
    ));
    fixture
        .host
        .set_property(&ProjectId::new("b"), "StartArguments", "--z");
    fixture
        .host
        .set_startup(vec!["A.csproj".into(), "B.csproj".into()]);

    let mut session = session();
    session.on_solution_opened(&fixture.solution, &mut fixture.host);

    assert!(session.selected().unwrap().is_unknown());
    assert_eq!(session.selected_index(), None);
}

#[test]
fn reload_keeps_the_selection_when_an_unrelated_configuration_is_added() {
    let mut fixture = Fixture::new(Some(TWO_CONFIGS));
    let mut session = session();
    session.on_solution_opened(&fixture.solution, &mut fixture.host);

    let index = session.catalog().unwrap().find_multi("Cfg2").unwrap();
    session
        .on_user_chose_entry(index, &mut fixture.host)
        .expect("activate");
    assert_eq!(selected_label(&session), "Cfg2");

    fixture.rewrite(
        r#"{
  "Version": 2,
  "ListAllProjects": false,
  "MultiProjectConfigurations": {
    "Brand new": { "Projects": { "B": {} } },
    "Cfg1": { "Projects": { "A": { "CommandLineArguments": "--x" } } },
    "Cfg2": { "Projects": { "A": {} } }
  }
}"#,
    );
    fixture.host.clear_changes();
    session
        .on_config_file_changed(&fixture.host)
        .expect("reload");

    assert_eq!(selected_label(&session), "Cfg2");
    assert_eq!(session.selected_index(), Some(2));
    assert!(fixture.host.changes().is_empty());
}

#[test]
fn reload_falls_back_to_unknown_when_the_selection_disappears() {
    let mut fixture = Fixture::new(Some(TWO_CONFIGS));
    let mut session = session();
    session.on_solution_opened(&fixture.solution, &mut fixture.host);
    let index = session.catalog().unwrap().find_multi("Cfg1").unwrap();
    session.on_user_chose_entry(index, &mut fixture.host).unwrap();

    fixture.rewrite(r#"{ "Version": 2, "ListAllProjects": false, "MultiProjectConfigurations": {} }"#);
    session.reload(&fixture.host).unwrap();

    assert!(session.selected().unwrap().is_unknown());
    assert_eq!(session.catalog().unwrap().labels(), vec![CONFIGURE_LABEL]);
}

#[test]
fn broken_file_keeps_the_previous_configuration() {
    let mut fixture = Fixture::new(Some(TWO_CONFIGS));
    let mut session = session();
    session.on_solution_opened(&fixture.solution, &mut fixture.host);

    fixture.rewrite("{ \"Version\": 2, ");
    let err = session.reload(&fixture.host).unwrap_err();

    assert!(matches!(err, SessionError::Config(_)));
    assert_eq!(
        session.catalog().unwrap().labels(),
        vec!["Cfg1", "Cfg2", CONFIGURE_LABEL]
    );
}

#[test]
fn own_activation_does_not_trigger_rematching() {
    let mut fixture = Fixture::new(Some(TWO_CONFIGS));
    let mut session = session();
    session.on_solution_opened(&fixture.solution, &mut fixture.host);
    let index = session.catalog().unwrap().find_multi("Cfg2").unwrap();
    session.on_user_chose_entry(index, &mut fixture.host).unwrap();

    // With "--x" live, Cfg1 would now score higher than Cfg2.
    fixture
        .host
        .set_property(&ProjectId::new("a"), "StartArguments", "--x");
    let guard = session.suppression_flag().acquire().unwrap();
    session.on_startup_changed(&fixture.host);
    assert_eq!(selected_label(&session), "Cfg2");

    drop(guard);
    session.on_startup_changed(&fixture.host);
    assert_eq!(selected_label(&session), "Cfg1");
}

#[test]
fn configure_creates_the_default_file_and_opens_it() {
    let mut fixture = Fixture::new(None);
    let mut session = session();
    session.on_solution_opened(&fixture.solution, &mut fixture.host);
    assert_eq!(
        session.catalog().unwrap().labels(),
        vec!["A", "B", CONFIGURE_LABEL]
    );

    let configure = session.catalog().unwrap().len() - 1;
    let report = session
        .on_user_chose_entry(configure, &mut fixture.host)
        .unwrap();

    assert!(report.opened_configuration);
    assert!(fixture.config.exists());
    assert_eq!(fixture.host.opened_files(), &[fixture.config.clone()]);
    assert!(session.selected().unwrap().is_unknown());
}

#[test]
fn legacy_settings_produce_a_single_hint() {
    let mut fixture = Fixture::new(None);
    fs::write(fixture.solution.with_file_name("Shop.startup.suo"), b"legacy").unwrap();

    let mut session = session();
    session.on_solution_opened(&fixture.solution, &mut fixture.host);
    session.on_solution_closed();
    session.on_solution_opened(&fixture.solution, &mut fixture.host);

    assert_eq!(fixture.host.messages().len(), 1);
    assert!(fixture.host.messages()[0].contains("Shop.startup.suo"));
}

#[test]
fn closing_discards_state_and_stops_watching() {
    let mut fixture = Fixture::new(Some(TWO_CONFIGS));
    let mut session = session();
    session.on_solution_opened(&fixture.solution, &mut fixture.host);
    session.on_solution_closed();

    assert!(!session.is_open());
    assert!(session.catalog().is_none());
    assert_eq!(session.watcher().watched().count(), 0);
    assert!(matches!(
        session.on_user_chose_entry(0, &mut fixture.host),
        Err(SessionError::NoSolution)
    ));
}

#[test]
fn recent_mode_lists_chosen_projects_first() {
    let mut fixture = Fixture::new(None);
    fixture.host.add_project(LoadedProject::new("c", "C", "C.csproj"));
    let mut session = StartupSession::new(
        SessionOptions {
            mode: CatalogMode::MostRecentlyUsed,
            recent_capacity: 2,
        },
        ManualWatcher::new(),
    );
    session.on_solution_opened(&fixture.solution, &mut fixture.host);
    assert_eq!(session.catalog().unwrap().labels(), vec![CONFIGURE_LABEL]);

    for path in ["A.csproj", "B.csproj", "C.csproj"] {
        fixture.host.set_startup(vec![path.to_string()]);
        session.on_startup_changed(&fixture.host);
    }

    assert_eq!(
        session.catalog().unwrap().labels(),
        vec!["C", "B", CONFIGURE_LABEL]
    );
    assert_eq!(selected_label(&session), "C");

    // Choosing from the dropdown promotes the entry as well.
    let index = session.catalog().unwrap().find_single("B.csproj").unwrap();
    session.on_user_chose_entry(index, &mut fixture.host).unwrap();
    assert_eq!(
        session.catalog().unwrap().labels(),
        vec!["B", "C", CONFIGURE_LABEL]
    );
    assert_eq!(session.selected_index(), Some(0));
}

#[test]
fn project_events_rebuild_the_catalog() {
    let mut fixture = Fixture::new(None);
    let mut session = session();
    session.on_solution_opened(&fixture.solution, &mut fixture.host);

    fixture.host.add_project(LoadedProject::new("c", "C", "C.csproj"));
    session.on_project_opened(&fixture.host);
    assert_eq!(
        session.catalog().unwrap().labels(),
        vec!["A", "B", "C", CONFIGURE_LABEL]
    );

    fixture.host.set_startup(vec!["B.csproj".into()]);
    session.on_startup_changed(&fixture.host);
    assert!(matches!(session.selected(), Some(DropdownEntry::Single(_))));

    fixture.host.rename_project("B.csproj", "Bee", "Bee.csproj");
    session.on_project_renamed("B.csproj", "Bee.csproj", &fixture.host);
    assert_eq!(selected_label(&session), "Bee");

    fixture.host.remove_project("Bee.csproj");
    session.on_project_closed("Bee.csproj", &fixture.host);
    assert!(session.selected().unwrap().is_unknown());
    assert!(fixture.host.startup_project_paths().is_empty());
    assert_eq!(session.config_path(), Some(Path::new(&fixture.config)));
}
