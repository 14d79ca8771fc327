//! Charm-style CLI prompts using cliclack

use super::spinner::SpinnerReporter;
use crate::error::BuildError;
use crate::framework::{Domain, Framework, InfraSuite, Strategy};
use crate::mission::command::python_from_env;
use crate::mission::{BuildRequest, Controller, MissionOutcome, SystemRunner, VenvSignal};
use crate::rules::constants::{
    self, APP_NAME, APP_TAGLINE, CODE_FOLDERS, CUSTOM_FOLDERS, DEFAULT_APP_NAME,
    DEFAULT_PROJECT_NAME,
};
use crate::templates::{check_compatibility, TemplatePack, TemplateSource};
use anyhow::Result;
use std::io;
use std::path::PathBuf;

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Everything already decided by flags or a request file
    pub request: BuildRequest,

    /// Local directory to use for templates instead of fetching from remote
    pub template_dir: Option<PathBuf>,

    /// Take defaults for anything not given (non-interactive mode)
    pub yes: bool,
}

/// Interrupted prompts become cancellations
fn prompt<T>(result: io::Result<T>) -> Result<T, BuildError> {
    result.map_err(|e| match e.kind() {
        io::ErrorKind::Interrupted => BuildError::Cancelled,
        _ => BuildError::from(e),
    })
}

/// Run the create flow with interactive prompts
pub async fn run(args: CreateArgs, cli_version: &str) -> Result<MissionOutcome> {
    cliclack::intro(format!("{} - {}", APP_NAME, APP_TAGLINE))?;

    let pack = load_pack(&args.template_dir).await?;

    if let Some(warning) = check_compatibility(cli_version, &pack.manifest().version) {
        cliclack::log::warning(format!("Version warning: {}", warning))?;
    }

    let request = if args.yes {
        args.request
    } else {
        match collect_request(args.request) {
            Ok(request) => request,
            Err(BuildError::Cancelled) => {
                cliclack::outro_cancel("cancelled by user")?;
                return Ok(MissionOutcome::Cancelled);
            }
            Err(err) => return Err(err.into()),
        }
    };

    let mut controller = Controller::new(&pack, SystemRunner::default(), SpinnerReporter::new())
        .with_python(python_from_env());
    let outcome = controller.run_mission(request).await;

    match &outcome {
        MissionOutcome::Completed(report) => {
            cliclack::note("Quick start", report.instructions.trim_end())?;
            cliclack::outro(report.success_line())?;
        }
        MissionOutcome::Failed(message) => {
            cliclack::log::error(message)?;
            cliclack::outro_cancel("mission failed")?;
        }
        MissionOutcome::Cancelled => {
            cliclack::outro_cancel("cancelled by user")?;
        }
    }

    Ok(outcome)
}

async fn load_pack(template_dir: &Option<PathBuf>) -> Result<TemplatePack> {
    let source = match template_dir {
        Some(path) => {
            cliclack::log::info(format!("Using local templates from {}", path.display()))?;
            TemplateSource::local(path.clone())
        }
        None => TemplateSource::from_env()?,
    };

    let spinner = cliclack::spinner();
    spinner.start("Loading templates...");
    match TemplatePack::load(&source, APP_NAME).await {
        Ok(pack) => {
            spinner.stop(format!(
                "Templates: {} {} ({} files)",
                pack.manifest().name,
                pack.manifest().version,
                pack.len()
            ));
            Ok(pack)
        }
        Err(e) => {
            spinner.stop("Failed to load templates");
            Err(e)
        }
    }
}

/// Ask for everything the request leaves open
fn collect_request(mut request: BuildRequest) -> Result<BuildRequest, BuildError> {
    if request.name.is_none() {
        let name: String = prompt(
            cliclack::input("Project name")
                .placeholder(DEFAULT_PROJECT_NAME)
                .default_input(DEFAULT_PROJECT_NAME)
                .interact(),
        )?;
        request.name = Some(name);
    }

    let framework = match request.framework.as_deref().and_then(Framework::parse) {
        Some(fw) => fw,
        None => {
            let mut select = cliclack::select("Select a framework");
            for fw in Framework::ALL {
                select = select.item(fw, fw.display_name(), constants::framework_description(fw));
            }
            let fw: Framework = prompt(select.interact())?;
            request.framework = Some(fw.slug().to_string());
            fw
        }
    };

    if framework.is_django() {
        if !request.is_drf {
            request.is_drf = prompt(
                cliclack::confirm("Add Django REST framework?")
                    .initial_value(false)
                    .interact(),
            )?;
        }
        if request.app_name.is_none() {
            let app: String = prompt(
                cliclack::input("App name")
                    .placeholder(DEFAULT_APP_NAME)
                    .default_input(DEFAULT_APP_NAME)
                    .interact(),
            )?;
            request.app_name = Some(app);
        }
    }

    if framework == Framework::Others && request.domain.is_none() {
        let mut select = cliclack::select("Select a project type");
        for domain in Domain::ALL {
            select = select.item(domain, domain.slug(), constants::domain_description(domain));
        }
        let domain: Domain = prompt(select.interact())?;
        request.domain = Some(domain.slug().to_string());
    }

    let strategy = match request.structure.as_deref().and_then(Strategy::parse) {
        Some(s) => s,
        None => {
            let mut select = cliclack::select("Select a project structure");
            for strategy in Strategy::ALL {
                select = select.item(
                    strategy,
                    strategy.slug(),
                    constants::strategy_description(strategy),
                );
            }
            let strategy: Strategy = prompt(select.interact())?;
            request.structure = Some(strategy.slug().to_string());
            strategy
        }
    };

    if strategy == Strategy::Custom && request.custom_folders.is_empty() {
        collect_custom_folders(&mut request)?;
    }

    if request.database.is_none() {
        let choice: &str = prompt(
            cliclack::select("Select a database")
                .item("none", "None", "")
                .item("postgresql", "PostgreSQL", "")
                .item("mysql", "MySQL", "")
                .item("sqlite", "SQLite", "")
                .item("mongodb", "MongoDB", "")
                .interact(),
        )?;
        request.database = Some(choice.to_string());
    }

    // Auto-config selects every suite on its own
    if strategy != Strategy::AutoConfig && request.infra.is_empty() {
        let mut multi = cliclack::multiselect("Add infrastructure (optional)");
        for suite in InfraSuite::ALL {
            multi = multi.item(suite, suite.name(), suite.target_dir());
        }
        let suites: Vec<InfraSuite> = prompt(multi.required(false).interact())?;
        for suite in suites {
            request.infra.insert(suite.name().to_string(), Vec::new());
        }
    }

    if request.venv == VenvSignal::Unset {
        let create = prompt(
            cliclack::confirm("Create a virtual environment and install dependencies?")
                .initial_value(true)
                .interact(),
        )?;
        request.venv = VenvSignal::Flag(create);
    }

    if request.location.is_none() {
        let location: String = prompt(
            cliclack::input("Location")
                .placeholder(".")
                .default_input(".")
                .interact(),
        )?;
        request.location = Some(PathBuf::from(location));
    }

    Ok(request)
}

fn collect_custom_folders(request: &mut BuildRequest) -> Result<(), BuildError> {
    let mut multi = cliclack::multiselect("Select folders");
    for folder in CUSTOM_FOLDERS {
        multi = multi.item(*folder, *folder, "");
    }
    let folders: Vec<&str> = prompt(multi.required(false).interact())?;
    if folders.is_empty() {
        return Ok(());
    }

    let mut packages = cliclack::multiselect("Which folders are Python packages?");
    for folder in &folders {
        packages = packages.item(*folder, *folder, "");
    }
    let defaults: Vec<&str> = folders
        .iter()
        .copied()
        .filter(|f| CODE_FOLDERS.contains(f))
        .collect();
    let packages: Vec<&str> = prompt(
        packages
            .initial_values(defaults)
            .required(false)
            .interact(),
    )?;

    for folder in &folders {
        request
            .init_strategy
            .insert(folder.to_string(), packages.contains(folder));
    }
    request.custom_folders = folders.iter().map(|f| f.to_string()).collect();
    Ok(())
}
