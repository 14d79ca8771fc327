//! Mission controller: the state machine that drives one build
//!
//! ```text
//! Init -> PrerequisiteCheck -> [FrameworkBootstrap] -> ArchitectureResolution
//!      -> InfrastructureInjection -> PhysicalGeneration -> EnvironmentSetup
//!      -> Cleanup -> InstructionsRendered -> Done
//! ```
//!
//! Any error moves straight to `Failed`. This is the only place build errors
//! are turned into user-facing messages.

use super::command::CommandRunner;
use super::django;
use super::prereq::{check_prerequisites, Requirements};
use super::reporter::Reporter;
use super::request::BuildRequest;
use super::venv;
use crate::bundler::{BuildPlan, Bundler, Selection};
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::generator::{Generator, ManifestResult};
use crate::templates::{Renderer, TemplatePack};
use std::fmt;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, error, info, warn};

/// Quick start text shown after a successful build
pub const INSTRUCTIONS_TEMPLATE: &str = "common/work.txt.tpl";
/// Extra quick start lines when a virtual environment was created
pub const VENV_INSTRUCTIONS_TEMPLATE: &str = "common/venv.txt.tpl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionState {
    Init,
    PrerequisiteCheck,
    FrameworkBootstrap,
    ArchitectureResolution,
    InfrastructureInjection,
    PhysicalGeneration,
    EnvironmentSetup,
    Cleanup,
    InstructionsRendered,
    Done,
    Failed,
}

impl MissionState {
    pub fn label(&self) -> &'static str {
        match self {
            MissionState::Init => "init",
            MissionState::PrerequisiteCheck => "prerequisite check",
            MissionState::FrameworkBootstrap => "framework bootstrap",
            MissionState::ArchitectureResolution => "architecture resolution",
            MissionState::InfrastructureInjection => "infrastructure injection",
            MissionState::PhysicalGeneration => "physical generation",
            MissionState::EnvironmentSetup => "environment setup",
            MissionState::Cleanup => "cleanup",
            MissionState::InstructionsRendered => "instructions",
            MissionState::Done => "done",
            MissionState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MissionState::Done | MissionState::Failed)
    }
}

impl fmt::Display for MissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What a completed mission produced
#[derive(Debug, Clone)]
pub struct MissionReport {
    pub project_name: String,
    pub root: PathBuf,
    pub result: ManifestResult,
    pub venv: Option<PathBuf>,
    pub instructions: String,
}

impl MissionReport {
    pub fn success_line(&self) -> String {
        format!("mission success: {} is ready.", self.project_name)
    }
}

#[derive(Debug)]
pub enum MissionOutcome {
    Completed(MissionReport),
    /// One lower-cased line for the user
    Failed(String),
    Cancelled,
}

pub struct Controller<'a, R: CommandRunner, P: Reporter> {
    pack: &'a TemplatePack,
    runner: R,
    reporter: P,
    python: String,
    history: Vec<MissionState>,
}

impl<'a, R: CommandRunner, P: Reporter> Controller<'a, R, P> {
    pub fn new(pack: &'a TemplatePack, runner: R, reporter: P) -> Self {
        Self {
            pack,
            runner,
            reporter,
            python: super::command::DEFAULT_PYTHON.to_string(),
            history: Vec::new(),
        }
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    pub fn state(&self) -> MissionState {
        self.history.last().copied().unwrap_or(MissionState::Init)
    }

    /// Every state visited by the last mission, in order
    pub fn history(&self) -> &[MissionState] {
        &self.history
    }

    fn transition(&mut self, next: MissionState) {
        debug!("Mission state: {} -> {}", self.state(), next);
        self.history.push(next);
    }

    /// Run one build to a terminal state
    pub async fn run_mission(&mut self, request: BuildRequest) -> MissionOutcome {
        self.history.clear();
        match self.execute(request).await {
            Ok(report) => {
                self.transition(MissionState::Done);
                MissionOutcome::Completed(report)
            }
            Err(BuildError::Cancelled) => {
                self.transition(MissionState::Failed);
                MissionOutcome::Cancelled
            }
            Err(err) => {
                let failed_in = self.state();
                self.transition(MissionState::Failed);
                error!("Mission failed during {}: {:?}", failed_in, err);
                MissionOutcome::Failed(err.user_message())
            }
        }
    }

    async fn execute(&mut self, mut request: BuildRequest) -> Result<MissionReport, BuildError> {
        self.transition(MissionState::Init);
        if request.is_auto_config() {
            info!("Auto-config: forcing every domain folder and infrastructure suite");
            request.force_auto_config();
        }

        let request_ctx = request.to_context();
        let selection = Selection::from_context(&request_ctx);
        let root = request.root();
        let wants_venv = request.venv.wants_venv();
        info!(
            "Building {} ({} / {}) at {}",
            request.project_name(),
            selection.framework.slug(),
            selection.strategy,
            root.display()
        );

        self.transition(MissionState::PrerequisiteCheck);
        self.reporter.start("Checking prerequisites...");
        let found = check_prerequisites(
            &self.runner,
            &self.python,
            Requirements {
                venv: wants_venv,
                django: selection.framework.is_django(),
            },
        )
        .await;
        let found = match found {
            Ok(found) => found,
            Err(err) => {
                self.reporter.stop("Prerequisites missing");
                return Err(err);
            }
        };
        let summary: Vec<String> = found
            .iter()
            .map(|t| format!("{} ({})", t.name, t.version.as_deref().unwrap_or("unknown")))
            .collect();
        self.reporter
            .stop(&format!("Prerequisites: {}", summary.join(", ")));

        if root.exists() {
            self.reporter
                .warn(&format!("{} already exists, files may be overwritten", root.display()));
        }

        if selection.framework.is_django() {
            self.transition(MissionState::FrameworkBootstrap);
            self.bootstrap_django(&request, &request_ctx, &selection).await?;
        }

        self.transition(MissionState::ArchitectureResolution);
        let mut plan = Bundler::new(&root, request_ctx).execute();
        self.reporter.info(&format!(
            "{} folders, {} files planned",
            plan.blueprint.all_dirs().len(),
            plan.manifest.len()
        ));

        self.transition(MissionState::InfrastructureInjection);
        let infra = request.infra_rules();
        if !infra.is_empty() {
            self.reporter
                .info(&format!("{} infrastructure files selected", infra.len()));
        }
        plan.extend_manifest(infra);

        self.transition(MissionState::PhysicalGeneration);
        let result = self.generate(&plan).await?;

        self.transition(MissionState::EnvironmentSetup);
        let venv_dir = if wants_venv {
            self.reporter.start("Creating virtual environment...");
            match venv::setup(&self.runner, &self.python, &plan.root).await {
                Ok(dir) => {
                    self.reporter.stop("Virtual environment ready");
                    Some(dir)
                }
                Err(err) => {
                    self.reporter.stop("Virtual environment failed");
                    return Err(err);
                }
            }
        } else {
            info!("Virtual environment declined");
            None
        };

        self.transition(MissionState::Cleanup);
        if selection.framework.is_django() {
            remove_stray_ui(&plan.root).await;
        }

        self.transition(MissionState::InstructionsRendered);
        let instructions = self.instructions(&plan, venv_dir.is_some());

        Ok(MissionReport {
            project_name: request.project_name().to_string(),
            root: plan.root,
            result,
            venv: venv_dir,
            instructions,
        })
    }

    async fn bootstrap_django(
        &self,
        request: &BuildRequest,
        ctx: &BuildContext,
        selection: &Selection,
    ) -> Result<(), BuildError> {
        self.reporter.start("Bootstrapping Django project...");
        let step = async {
            let project = django::bootstrap(
                &self.runner,
                &self.python,
                &request.root(),
                request.project_name(),
                request.app_name(),
            )
            .await?;

            let rule = crate::rules::django::django(selection.rest_mode);
            let renderer = Renderer::new(self.pack);
            django::apply_settings_patches(&renderer, ctx, &rule.patches, &project).await?;
            django::override_urls(&renderer, ctx, &rule.patches, &project).await?;
            Ok::<_, BuildError>(project)
        };
        match step.await {
            Ok(project) => {
                self.reporter
                    .stop(&format!("Django project {} created", project.module));
                Ok(())
            }
            Err(err) => {
                self.reporter.stop("Django bootstrap failed");
                Err(err)
            }
        }
    }

    async fn generate(&self, plan: &BuildPlan) -> Result<ManifestResult, BuildError> {
        self.reporter.start("Generating project files...");
        let generator = Generator::new(&plan.root, self.pack, &plan.ctx);
        match generator.run(&plan.blueprint, &plan.manifest).await {
            Ok(result) => {
                self.reporter.stop(&format!(
                    "{} files written under {}",
                    result.rendered.len(),
                    plan.root.display()
                ));
                for failed in &result.failed {
                    self.reporter
                        .warn(&format!("{}: {}", failed.target, failed.reason));
                }
                Ok(result)
            }
            Err(err) => {
                self.reporter.stop("Generation failed");
                Err(err)
            }
        }
    }

    fn instructions(&self, plan: &BuildPlan, with_venv: bool) -> String {
        let renderer = Renderer::new(self.pack);
        let mut ctx = plan.ctx.clone();
        ctx.insert("venv_activate", venv::activate_command());
        ctx.insert("venv_section", "");
        ctx.insert("url_section", url_section(&ctx));

        if with_venv {
            match renderer.render(VENV_INSTRUCTIONS_TEMPLATE, &ctx) {
                Ok(section) => {
                    ctx.insert("venv_section", format!("\n{}", section.text.trim_end()))
                }
                Err(err) => warn!("No venv instructions: {}", err),
            }
        }

        match renderer.render(INSTRUCTIONS_TEMPLATE, &ctx) {
            Ok(rendered) => rendered.text,
            Err(err) => {
                warn!("Falling back to built-in instructions: {}", err);
                let name = ctx.text("project_name").unwrap_or_default();
                let run = ctx.text("run_command").unwrap_or_default();
                let mut lines = vec![format!("cd {}", name)];
                if with_venv {
                    lines.push(venv::activate_command());
                }
                lines.push(run);
                lines.join("\n")
            }
        }
    }
}

/// Browser hint for builds that listen on a port; empty for CLI and batch archetypes
fn url_section(ctx: &BuildContext) -> String {
    match ctx.text("port").and_then(|p| p.parse::<u16>().ok()) {
        Some(port) => format!("\n\nOpen http://localhost:{} once the server is up.", port),
        None => String::new(),
    }
}

/// Django keeps views inside its app package; drop a generic `ui/` if one appeared
async fn remove_stray_ui(root: &std::path::Path) {
    let ui = root.join("ui");
    if !ui.is_dir() {
        return;
    }
    match fs::remove_dir_all(&ui).await {
        Ok(()) => debug!("Removed stray {}", ui.display()),
        Err(e) => warn!("Failed to remove {}: {}", ui.display(), e),
    }
}
