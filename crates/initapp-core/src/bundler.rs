//! Architecture resolution: request context -> (blueprint, manifest, full context)
//!
//! The bundler is pure: it reads the rule tables and the dependency resolver
//! and never touches the filesystem. Every lookup has a fallback, so any
//! combination of inputs yields a usable plan.

use crate::context::BuildContext;
use crate::deps::DependencyQuery;
use crate::framework::{Database, Domain, Framework, Strategy};
use crate::rules::blueprints::{production, specialized, standard};
use crate::rules::constants::{
    self, DEFAULT_APP_NAME, DEFAULT_HOST, DEFAULT_PROJECT_NAME, DJANGO_ENTRYPOINT, ENTRYPOINT,
    UNIVERSAL_ENTRY_TEMPLATE,
};
use crate::rules::{django, global_manifest};
use crate::templates::{Blueprint, ManifestRule};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Resolved selections a build is planned from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub framework: Framework,
    pub strategy: Strategy,
    pub database: Database,
    pub domain: Domain,
    /// REST mode, only ever true for Django
    pub rest_mode: bool,
}

impl Selection {
    /// Read the selections from a context, falling back to defaults for unknown values.
    ///
    /// Accepts either `framework` or `fw_name`, and either `structure` or `strategy`.
    pub fn from_context(ctx: &BuildContext) -> Self {
        let fw_raw = ctx.text("framework").or_else(|| ctx.text("fw_name"));
        let framework = match fw_raw.as_deref().map(Framework::parse) {
            Some(Some(fw)) => fw,
            Some(None) => {
                warn!(
                    "Unknown framework {:?}, falling back to {}",
                    fw_raw.as_deref().unwrap_or_default(),
                    Framework::FastApi.slug()
                );
                Framework::FastApi
            }
            None => Framework::FastApi,
        };

        let strategy_raw = ctx.text("structure").or_else(|| ctx.text("strategy"));
        let strategy = match strategy_raw.as_deref().map(Strategy::parse) {
            Some(Some(s)) => s,
            Some(None) => {
                warn!(
                    "Unknown strategy {:?}, falling back to {}",
                    strategy_raw.as_deref().unwrap_or_default(),
                    Strategy::Standard
                );
                Strategy::Standard
            }
            None => Strategy::Standard,
        };

        let database = ctx
            .text("database")
            .map(|d| Database::parse(&d))
            .unwrap_or(Database::None);

        let domain_raw = ctx.text("domain").or_else(|| ctx.text("project_type"));
        let domain = match domain_raw.as_deref().map(Domain::parse) {
            Some(Some(d)) => d,
            Some(None) => {
                warn!(
                    "Unknown domain {:?}, falling back to {}",
                    domain_raw.as_deref().unwrap_or_default(),
                    Domain::Base.slug()
                );
                Domain::Base
            }
            None => Domain::Base,
        };

        Self {
            framework,
            strategy,
            database,
            domain,
            rest_mode: framework.is_django() && ctx.flag("is_drf"),
        }
    }

    pub fn dependencies(&self) -> DependencyQuery {
        DependencyQuery::new(self.framework, self.strategy, self.database, self.domain)
            .with_rest_api(self.rest_mode)
    }
}

/// Everything the generator needs for one build
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub root: PathBuf,
    pub selection: Selection,
    pub blueprint: Blueprint,
    pub manifest: Vec<ManifestRule>,
    pub ctx: BuildContext,
}

impl BuildPlan {
    /// Append rules (e.g. infrastructure files) after the bundled manifest
    pub fn extend_manifest(&mut self, rules: impl IntoIterator<Item = ManifestRule>) {
        self.manifest.extend(rules);
        self.manifest = dedupe(std::mem::take(&mut self.manifest));
    }
}

/// Merges rule tables, resolved dependencies and dynamic defaults into a [`BuildPlan`]
pub struct Bundler {
    root: PathBuf,
    ctx: BuildContext,
}

impl Bundler {
    pub fn new(root: impl AsRef<Path>, ctx: BuildContext) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ctx,
        }
    }

    pub fn execute(self) -> BuildPlan {
        let Bundler { root, mut ctx } = self;

        let selection = Selection::from_context(&ctx);
        normalize_keys(&mut ctx, &selection);

        for (key, value) in constants::context_constants() {
            ctx.insert(key, value);
        }
        apply_defaults(&mut ctx, &selection);

        let deps = selection.dependencies().resolve();
        debug!("Resolved {} dependencies", deps.len());
        ctx.insert("dependencies", deps.joined());

        let app_name = ctx
            .text("app_name")
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        let (blueprint, family_files) = select_blueprint(&mut ctx, &selection);

        let mut manifest = global_manifest(selection.framework, selection.rest_mode, &app_name);
        manifest.extend(family_files);
        let manifest = dedupe(normalize_entry_aliases(manifest, selection.framework));

        debug!(
            "Planned {} directories and {} files for {}",
            blueprint.all_dirs().len(),
            manifest.len(),
            root.display()
        );

        BuildPlan {
            root,
            selection,
            blueprint,
            manifest,
            ctx,
        }
    }
}

fn normalize_keys(ctx: &mut BuildContext, selection: &Selection) {
    let fw = selection.framework;
    ctx.insert("framework", fw.slug());
    ctx.insert("fw_name", fw.slug());
    ctx.insert("framework_display", fw.display_name());
    ctx.insert("structure", selection.strategy.slug());
    ctx.insert("strategy", selection.strategy.slug());
    ctx.insert("database", selection.database.slug());
    ctx.insert("domain", selection.domain.slug());
    ctx.insert("is_drf", selection.rest_mode);
}

fn apply_defaults(ctx: &mut BuildContext, selection: &Selection) {
    let fw = selection.framework;

    ctx.insert_default("project_name", DEFAULT_PROJECT_NAME);
    ctx.insert_default("app_name", DEFAULT_APP_NAME);
    ctx.insert_default("description", constants::framework_description(fw));
    ctx.insert_default("version", "0.1.0");
    ctx.insert_default("port", constants::default_port(fw));
    ctx.insert_default("host", DEFAULT_HOST);
    ctx.insert_default("server_type", constants::default_server(fw));
    ctx.insert_default("debug", selection.strategy.is_lightest());
    ctx.insert_default("ui_folder", constants::ui_folder(fw));
    ctx.insert_default("venv_section", "");

    let host = ctx.text("host").unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = ctx.text("port").unwrap_or_default();
    if fw.is_django() {
        ctx.insert_default("entrypoint", DJANGO_ENTRYPOINT);
        ctx.insert_default(
            "run_command",
            format!("python {} runserver {}:{}", DJANGO_ENTRYPOINT, host, port),
        );
    } else {
        ctx.insert_default("entrypoint", ENTRYPOINT);
        ctx.insert_default("run_command", format!("python {}", ENTRYPOINT));
    }

    let snippet = constants::entry_snippet(fw);
    ctx.insert_default("entry_import", snippet.import);
    ctx.insert_default("entry_app", snippet.app);
    ctx.insert_default("entry_run", snippet.run);
}

/// Pick exactly one blueprint family member, plus that member's scaffold files
fn select_blueprint(
    ctx: &mut BuildContext,
    selection: &Selection,
) -> (Blueprint, Vec<ManifestRule>) {
    let fw = selection.framework;
    let rule = if fw.is_django() {
        &django::django(selection.rest_mode).blueprint
    } else if fw == Framework::Others {
        specialized(selection.domain)
    } else if selection.strategy.is_hardened() {
        production(fw)
    } else {
        standard(fw)
    };

    let mut blueprint = rule.to_blueprint();
    for package in &blueprint.packages {
        ctx.default_init(package, true);
    }

    if matches!(selection.strategy, Strategy::Custom | Strategy::AutoConfig) {
        let custom = ctx.list("custom_folders");
        for folder in &custom {
            let is_code = constants::CODE_FOLDERS.contains(&folder.as_str());
            ctx.default_init(folder, is_code);
        }
        blueprint.extend_folders(custom);
    }

    if selection.rest_mode {
        blueprint.strip_ui();
    }

    (blueprint, rule.manifest())
}

fn is_entry_alias(target: &str) -> bool {
    let target = target.trim_start_matches("./");
    if target.contains('/') {
        return false;
    }
    matches!(target, "run.py" | "main.py" | "entry.py") || target.ends_with("_main.py")
}

/// Redirect every root-level entry alias to the canonical entrypoint
fn normalize_entry_aliases(manifest: Vec<ManifestRule>, fw: Framework) -> Vec<ManifestRule> {
    manifest
        .into_iter()
        .map(|rule| {
            if !is_entry_alias(&rule.target) {
                return rule;
            }
            debug!("Normalizing entry alias {} -> {}", rule.target, ENTRYPOINT);
            let source = if fw.is_django() {
                rule.source
            } else {
                UNIVERSAL_ENTRY_TEMPLATE.to_string()
            };
            ManifestRule::new(source, ENTRYPOINT)
        })
        .collect()
}

/// Drop exact duplicate rules, keeping the first occurrence
fn dedupe(manifest: Vec<ManifestRule>) -> Vec<ManifestRule> {
    let mut seen = HashSet::new();
    manifest
        .into_iter()
        .filter(|rule| seen.insert((rule.source.clone(), rule.target.clone())))
        .collect()
}
