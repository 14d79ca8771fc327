//! init-app - Python backend project scaffolding

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use initapp_core::mission::{BuildRequest, MissionOutcome, VenvSignal};
use initapp_core::tui::CreateArgs;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

const EXIT_CANCELLED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "init-app")]
#[command(about = "Scaffold Python backend projects from framework blueprints")]
#[command(version)]
pub struct Args {
    /// Log pipeline details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project
    Create(CliCreateArgs),
    /// Pack the template directory into templates.zip (for development use)
    BuildZip(BuildZipArgs),
}

#[derive(Parser, Debug, Default)]
pub struct CliCreateArgs {
    /// Project name (also the project directory name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Framework: fastapi, flask, django, bottle, sanic, falcon, tornado, pyramid, others
    #[arg(short, long)]
    pub framework: Option<String>,

    /// Project structure: standard, production, auto_config, custom
    #[arg(short, long, alias = "strategy")]
    pub structure: Option<String>,

    /// Parent directory for the project
    #[arg(short, long)]
    pub location: Option<PathBuf>,

    /// Database: postgresql, mysql, sqlite, mongodb, none
    #[arg(long)]
    pub database: Option<String>,

    /// Project type for `others`: base, hp_cli, data_pipeline, dbt_analytics, mlops_core, rag_ai
    #[arg(long)]
    pub domain: Option<String>,

    /// Django REST framework mode
    #[arg(long)]
    pub drf: bool,

    /// Django app name
    #[arg(long = "app-name")]
    pub app_name: Option<String>,

    /// Create a virtual environment: yes or no
    #[arg(long)]
    pub venv: Option<String>,

    /// Infrastructure suite, optionally with files: `docker` or `github=ci.yml.tpl,security.yml.tpl`
    #[arg(long)]
    pub infra: Vec<String>,

    /// Extra folders for the custom structure (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub folders: Vec<String>,

    /// Local directory to use for templates instead of fetching from remote (for development use)
    #[arg(long = "template-dir", env = "INIT_APP_TEMPLATE_DIR")]
    pub template_dir: Option<PathBuf>,

    /// Read the build request from a YAML file; flags take precedence
    #[arg(long = "from")]
    pub from: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Debug)]
pub struct BuildZipArgs {
    /// Template directory to pack (defaults to ./templates)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Output directory (defaults to dist/ next to the template directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Parse `suite` or `suite=file,file` into a selection
fn parse_infra(entries: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut infra: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in entries {
        let (suite, files) = match entry.split_once('=') {
            Some((suite, files)) => (suite, files),
            None => (entry.as_str(), ""),
        };
        let selected = infra.entry(suite.trim().to_lowercase()).or_default();
        selected.extend(
            files
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(String::from),
        );
    }
    infra
}

impl CliCreateArgs {
    fn into_create_args(self) -> Result<CreateArgs> {
        let mut request = BuildRequest {
            name: self.name,
            framework: self.framework,
            structure: self.structure,
            location: self.location,
            database: self.database,
            domain: self.domain,
            is_drf: self.drf,
            app_name: self.app_name,
            venv: self
                .venv
                .as_deref()
                .map(VenvSignal::parse)
                .unwrap_or_default(),
            infra: parse_infra(&self.infra),
            custom_folders: self.folders,
            ..Default::default()
        };

        if let Some(path) = &self.from {
            let from_file = BuildRequest::from_yaml_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            request.merge_missing(from_file);
        }

        Ok(CreateArgs {
            request,
            template_dir: self.template_dir,
            yes: self.yes,
        })
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn create(args: CliCreateArgs) -> Result<ExitCode> {
    let outcome = initapp_core::run(args.into_create_args()?, CLI_VERSION).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    Ok(match outcome? {
        MissionOutcome::Completed(_) => ExitCode::SUCCESS,
        MissionOutcome::Failed(_) => ExitCode::FAILURE,
        MissionOutcome::Cancelled => ExitCode::from(EXIT_CANCELLED),
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        eprintln!("\n{}", "cancelled by user".yellow());
        std::process::exit(EXIT_CANCELLED as i32);
    })
    .ok();

    let args = Args::parse();
    init_logging(args.verbose);
    debug!("Parsed arguments: {:?}", args);

    let result = match args.command {
        Some(Command::Create(create_args)) => create(create_args).await,
        Some(Command::BuildZip(zip_args)) => {
            initapp_core::templates::build_zip(&zip_args.template_dir, &zip_args.out)
                .map(|_| ExitCode::SUCCESS)
        }
        // No subcommand provided, default to create behavior (interactive mode)
        None => create(CliCreateArgs::default()).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{:#}", e).to_lowercase();
            let line = message.lines().next().unwrap_or(&message).to_string();
            eprintln!("{} {}", "error:".red().bold(), line);
            ExitCode::FAILURE
        }
    }
}
