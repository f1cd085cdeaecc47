use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use switchstartup_config::{ConfigPaths, Configuration, ConfigurationStore};
use switchstartup_engine::{
    build_catalog, find_active_entry, resolve, Catalog, CatalogMode, DropdownEntry,
    RecentProjects, SessionOptions, StartupSession, DEFAULT_RECENT_CAPACITY,
};
use switchstartup_host::{
    observe_startup_state, FileWatch, Host, HostSnapshot, InMemoryHost, ManualWatcher,
    NotifyWatcher,
};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

const UNKNOWN_LABEL: &str = "<unknown>";

#[derive(Parser)]
#[command(
    name = "switchstartup-cli",
    about = "Inspect and switch startup configurations of a solution",
    author,
    version
)]
struct Cli {
    /// 方案檔路徑。 / Path of the solution file.
    #[arg(long, global = true, value_name = "SOLUTION")]
    solution: Option<PathBuf>,

    /// 宿主狀態快照（JSON）。 / Host state snapshot (JSON) standing in for the IDE.
    #[arg(long, global = true, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// 顯示更多記錄（可重複）。 / Log more details (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 建立預設設定檔。 / Create the default configuration file.
    Init,
    /// 檢查設定檔與專案參考。 / Validate the configuration file and its project references.
    Check,
    /// 列出下拉選單項目。 / Print the dropdown entries.
    List(ListArgs),
    /// 顯示目前生效的項目。 / Print the entry matching the host's startup projects.
    Active,
    /// 套用指定項目。 / Activate an entry by label or project path.
    Activate(ActivateArgs),
    /// 監看設定檔並在變更時重新比對。 / Watch the configuration file and re-match on change.
    Watch(WatchArgs),
}

#[derive(Args)]
struct ListArgs {
    /// 單一專案項目的來源。 / Source of the single-project entries.
    #[arg(long, value_enum, default_value_t = ModeChoice::All)]
    mode: ModeChoice,

    /// 最近使用的專案路徑（由新到舊）。 / Recently used project paths, newest first.
    #[arg(long, value_name = "PROJECT_PATH", num_args = 1..)]
    recent: Vec<String>,

    /// 最近使用清單的容量。 / Capacity of the recency list.
    #[arg(long, default_value_t = DEFAULT_RECENT_CAPACITY)]
    recent_capacity: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum ModeChoice {
    All,
    Recent,
}

impl From<ModeChoice> for CatalogMode {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::All => CatalogMode::AllProjects,
            ModeChoice::Recent => CatalogMode::MostRecentlyUsed,
        }
    }
}

#[derive(Args)]
struct ActivateArgs {
    /// 項目名稱、專案名稱或專案路徑。 / Entry label, project name or project path.
    #[arg(value_name = "ENTRY")]
    entry: String,

    /// 將結果寫回快照。 / Write the resulting host state back to the snapshot.
    #[arg(long)]
    write: bool,
}

#[derive(Args)]
struct WatchArgs {
    /// 閒置指定毫秒後結束；預設持續監看。 / Exit after this many idle milliseconds; watches forever by default.
    #[arg(long, value_name = "MILLIS")]
    idle_exit: Option<u64>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        solution,
        snapshot,
        verbose,
        command,
    } = Cli::parse();
    init_logging(verbose)?;

    let solution = resolve_solution(solution)?;
    match command {
        Commands::Init => execute_init(&solution),
        Commands::Check => execute_check(&solution, snapshot.as_deref()),
        Commands::List(args) => execute_list(&solution, &require_snapshot(snapshot)?, args),
        Commands::Active => execute_active(&solution, &require_snapshot(snapshot)?),
        Commands::Activate(args) => execute_activate(&solution, &require_snapshot(snapshot)?, args),
        Commands::Watch(args) => execute_watch(&solution, &require_snapshot(snapshot)?, args),
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install log subscriber")
}

fn resolve_solution(solution: Option<PathBuf>) -> Result<PathBuf> {
    let solution = solution.ok_or_else(|| anyhow!("--solution is required"))?;
    if solution.file_name().is_none() {
        bail!("{} is not a solution file", solution.display());
    }
    Ok(solution)
}

fn require_snapshot(snapshot: Option<PathBuf>) -> Result<PathBuf> {
    snapshot.ok_or_else(|| anyhow!("--snapshot is required for this command"))
}

fn load_host(snapshot: &Path) -> Result<InMemoryHost> {
    let snapshot = HostSnapshot::load(snapshot)
        .with_context(|| format!("failed to load host snapshot {}", snapshot.display()))?;
    Ok(InMemoryHost::from_snapshot(snapshot))
}

fn execute_init(solution: &Path) -> Result<()> {
    let store = ConfigurationStore::for_solution(solution);
    if store.create_default(&Configuration::default())? {
        println!("created {}", store.path().display());
    } else {
        println!("exists {}", store.path().display());
    }
    Ok(())
}

fn execute_check(solution: &Path, snapshot: Option<&Path>) -> Result<()> {
    let paths = ConfigPaths::for_solution(solution);
    if paths.needs_migration_hint() {
        println!(
            "hint: legacy settings {} found; run `init` to create {}",
            paths.legacy_settings().display(),
            paths.config_file().display()
        );
    }

    let store = ConfigurationStore::new(paths.config_file());
    let exists = store.exists();
    let config = store.load()?;
    println!(
        "{}: version {}, {} configuration(s){}",
        store.path().display(),
        config.version,
        config.multi_project_configurations.len(),
        if exists { "" } else { " (not created yet)" }
    );

    let Some(snapshot) = snapshot else {
        return Ok(());
    };
    let host = load_host(snapshot)?;
    let resolved = resolve(&config, &host.loaded_projects());
    if resolved.warnings.is_empty() {
        println!("ok");
    }
    for warning in &resolved.warnings {
        println!("warning: {warning}");
    }
    Ok(())
}

fn execute_list(solution: &Path, snapshot: &Path, args: ListArgs) -> Result<()> {
    let host = load_host(snapshot)?;
    let config = ConfigurationStore::for_solution(solution).load()?;
    let projects = host.loaded_projects();
    let recent = RecentProjects::with_entries(args.recent_capacity, args.recent);
    let catalog = build_catalog(
        &resolve(&config, &projects),
        &projects,
        args.mode.into(),
        &recent,
    );
    let active = find_active_entry(&observe_startup_state(&host), &catalog);

    for (index, entry) in catalog.entries().iter().enumerate() {
        let marker = if Some(index) == active { '*' } else { ' ' };
        println!("{marker} {index} {}", entry.label());
    }
    Ok(())
}

fn open_session<W: FileWatch>(
    solution: &Path,
    host: &mut InMemoryHost,
    watcher: W,
) -> StartupSession<W> {
    let mut session = StartupSession::new(SessionOptions::default(), watcher);
    session.on_solution_opened(solution, host);
    for message in host.messages() {
        eprintln!("{message}");
    }
    session
}

fn selected_label<W: FileWatch>(session: &StartupSession<W>) -> String {
    match session.selected() {
        Some(entry) if !entry.is_unknown() => entry.label(),
        _ => UNKNOWN_LABEL.to_string(),
    }
}

fn execute_active(solution: &Path, snapshot: &Path) -> Result<()> {
    let mut host = load_host(snapshot)?;
    let session = open_session(solution, &mut host, ManualWatcher::new());
    println!("{}", selected_label(&session));
    Ok(())
}

fn find_entry(catalog: &Catalog, wanted: &str) -> Option<usize> {
    catalog
        .entries()
        .iter()
        .position(|entry| !matches!(entry, DropdownEntry::Other(_)) && entry.label() == wanted)
        .or_else(|| catalog.find_single(wanted))
        .or_else(|| {
            catalog.entries().iter().position(
                |entry| matches!(entry, DropdownEntry::Single(single) if single.project.name == wanted),
            )
        })
}

fn execute_activate(solution: &Path, snapshot: &Path, args: ActivateArgs) -> Result<()> {
    let mut host = load_host(snapshot)?;
    let mut session = open_session(solution, &mut host, ManualWatcher::new());
    let catalog = session
        .catalog()
        .ok_or_else(|| anyhow!("solution is not open"))?;
    let index = find_entry(catalog, &args.entry)
        .ok_or_else(|| anyhow!("no dropdown entry named \"{}\"", args.entry))?;

    let report = session.on_user_chose_entry(index, &mut host)?;
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    println!("active: {}", selected_label(&session));
    println!("startup: {}", host.startup_project_paths().join(", "));

    if args.write {
        host.snapshot()
            .save(snapshot)
            .with_context(|| format!("failed to update snapshot {}", snapshot.display()))?;
        debug!(path = %snapshot.display(), "snapshot updated");
    }
    Ok(())
}

fn execute_watch(solution: &Path, snapshot: &Path, args: WatchArgs) -> Result<()> {
    let mut host = load_host(snapshot)?;
    let watcher = NotifyWatcher::new()?;
    let mut session = open_session(solution, &mut host, watcher);
    println!("active: {}", selected_label(&session));

    let timeout = Duration::from_millis(args.idle_exit.unwrap_or(500));
    loop {
        match session.watcher().recv_timeout(timeout)? {
            Some(path) => {
                debug!(path = %path.display(), "configuration changed");
                if let Err(err) = session.on_config_file_changed(&host) {
                    eprintln!("warning: {err}");
                }
                println!("active: {}", selected_label(&session));
            }
            None if args.idle_exit.is_some() => return Ok(()),
            None => {}
        }
    }
}
