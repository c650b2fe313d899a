use clap::{Parser, Subcommand};
use std::path::PathBuf;

use repoimport::config::AppConfig;
use repoimport::core::{
    ConnectionStatus, ImportForm, PersistedValue, ProjectOverview, ProjectStore, Route,
    SqliteStorage, SubmitError, finish_import,
};
use repoimport::logging;

#[derive(Parser)]
#[command(name = "repoimport")]
#[command(about = "Import a GitHub repository and keep it as your current project")]
struct Cli {
    /// Read settings from this file instead of the default config location
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Use this storage file instead of the configured one
    #[arg(long, value_name = "FILE", global = true)]
    storage: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Page to open, e.g. "/" or "/project?repoUrl=..."
    #[arg(long, value_name = "PATH", conflicts_with = "repo_url")]
    route: Option<String>,

    /// Open the project page for this URL without touching the stored project
    #[arg(long, value_name = "URL")]
    repo_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate and import a repository, remembering it on success
    Import {
        #[arg(value_name = "URL")]
        url: String,
    },
    /// Print the current project
    Show {
        /// Show this URL instead of the stored project
        #[arg(long, value_name = "URL")]
        repo_url: Option<String>,
    },
    /// Forget the stored project
    Clear,
}

/// Open the configured storage, degrading to an in-memory medium when the
/// file cannot be used.
async fn open_store(config: &AppConfig) -> anyhow::Result<ProjectStore> {
    let storage = match config.storage_path() {
        Some(path) => match SqliteStorage::open(&path).await {
            Ok(storage) => storage,
            Err(error) => {
                tracing::error!(?path, %error, "Local storage unavailable, nothing will be remembered");
                SqliteStorage::in_memory().await?
            }
        },
        None => {
            tracing::error!("No data directory, nothing will be remembered");
            SqliteStorage::in_memory().await?
        }
    };
    Ok(PersistedValue::load(storage, config.storage_key.clone()).await)
}

fn print_overview(overview: &ProjectOverview) {
    println!("\n=== {} ===", overview.name);
    match (&overview.status, &overview.repo_url) {
        (ConnectionStatus::Connected, Some(url)) => {
            println!("GitHub repository: connected");
            println!("  {}", url);
        }
        _ => println!("GitHub repository: not found"),
    }
}

async fn import(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let importer = config.importer();
    let mut form = ImportForm::new(url);

    println!("Importing {}...", url);
    match form.submit(&importer).await {
        Ok(repo_url) => {
            println!("Repository imported successfully!");
            let stored = finish_import(&store, repo_url, config.confirmation_delay()).await;
            print_overview(&ProjectOverview::from_stored(&stored));
            Ok(())
        }
        Err(SubmitError::Rejected(rejected)) => Err(anyhow::anyhow!(rejected)),
        Err(SubmitError::Import(error)) => Err(anyhow::anyhow!(error)),
    }
}

async fn show(config: &AppConfig, repo_url: Option<String>) -> anyhow::Result<()> {
    if let Some(repo_url) = repo_url {
        print_overview(&ProjectOverview::from_query(Some(&repo_url)));
        return Ok(());
    }
    let store = open_store(config).await?;
    match store.read() {
        Some(url) => print_overview(&ProjectOverview::from_stored(&url)),
        None => println!("No project imported yet."),
    }
    Ok(())
}

async fn clear(config: &AppConfig) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    store.clear().await;
    println!("Stored project cleared.");
    Ok(())
}

#[cfg(feature = "gui")]
fn launch_gui(
    runtime: &tokio::runtime::Runtime,
    config: &AppConfig,
    route: Route,
) -> anyhow::Result<()> {
    use std::sync::Arc;

    use repoimport::gui::{self, AppState};

    // The storage pool and its watcher live on our runtime, iced brings its own.
    let store = runtime.block_on(open_store(config))?;
    let _watcher = {
        let _guard = runtime.enter();
        store.storage().watch_external(config.poll_interval())
    };

    let state = AppState {
        store,
        importer: Arc::new(config.importer()),
        route,
        default_repo_url: config.default_repo_url.clone(),
        confirmation_delay: config.confirmation_delay(),
    };
    gui::run(state).map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

#[cfg(not(feature = "gui"))]
fn launch_gui(
    _runtime: &tokio::runtime::Runtime,
    _config: &AppConfig,
    _route: Route,
) -> anyhow::Result<()> {
    anyhow::bail!("Built without the `gui` feature; use one of the subcommands instead")
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    if let Err(e) = logging::init_logging(args.verbose) {
        logging::init_logging_stderr(args.verbose);
        tracing::warn!("Falling back to stderr logging: {:#}", e);
    }

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(storage) = args.storage {
        config.storage_path = Some(storage);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    match args.command {
        Some(Command::Import { url }) => runtime.block_on(import(&config, &url)),
        Some(Command::Show { repo_url }) => runtime.block_on(show(&config, repo_url)),
        Some(Command::Clear) => runtime.block_on(clear(&config)),
        None => {
            let route = match (args.route, args.repo_url) {
                (Some(location), _) => Route::parse(&location)?,
                (None, Some(repo_url)) => Route::project(repo_url),
                (None, None) => Route::Home,
            };
            launch_gui(&runtime, &config, route)
        }
    }
}
