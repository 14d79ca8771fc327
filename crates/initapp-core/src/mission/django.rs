//! Django bootstrap and settings patches
//!
//! `django startproject`/`startapp` generate the project; the generated
//! `settings.py` is then patched as text. Each patch is a pure function that
//! checks whether its change is already present, so applying the set twice
//! leaves the file unchanged.

use super::command::{CommandRunner, ExternalCommand};
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::rules::DjangoPatches;
use crate::templates::renderer::write_text;
use crate::templates::Renderer;
use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

const SECRET_BLOCK: &str = r"(?s)SECRET_KEY\s*=.*?ALLOWED_HOSTS\s*=\s*\[[^\]]*\]";
const INSTALLED_APPS: &str = r"(?s)(INSTALLED_APPS\s*=\s*\[)(.*?)(\n?\])";

/// Files produced by the Django bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DjangoProject {
    /// Python package holding settings and urls
    pub module: String,
    pub settings: PathBuf,
    pub urls: PathBuf,
}

impl DjangoProject {
    pub fn locate(root: &Path, module: &str) -> Self {
        let dir = root.join(module);
        Self {
            module: module.to_string(),
            settings: dir.join("settings.py"),
            urls: dir.join("urls.py"),
        }
    }
}

/// Turn a project name into an importable module name
pub fn module_name(project_name: &str) -> String {
    let mut name: String = project_name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

fn patch_error(err: regex::Error) -> BuildError {
    BuildError::Bootstrap {
        command: "settings patch".to_string(),
        detail: err.to_string(),
    }
}

async fn run_bootstrap<R: CommandRunner>(runner: &R, cmd: ExternalCommand) -> Result<(), BuildError> {
    let label = cmd.to_string();
    let output = runner.run(&cmd).await.map_err(|e| BuildError::Bootstrap {
        command: label.clone(),
        detail: e.to_string(),
    })?;
    if !output.success {
        return Err(BuildError::Bootstrap {
            command: label,
            detail: output.summary(),
        });
    }
    debug!("{} succeeded", label);
    Ok(())
}

/// Create the project and the local app inside `root`
pub async fn bootstrap<R: CommandRunner>(
    runner: &R,
    python: &str,
    root: &Path,
    project_name: &str,
    app_name: &str,
) -> Result<DjangoProject, BuildError> {
    fs::create_dir_all(root)
        .await
        .map_err(|e| BuildError::io(root, e))?;

    let module = module_name(project_name);
    let project = DjangoProject::locate(root, &module);
    if project.settings.exists() {
        info!("Django project {} already exists, skipping startproject", module);
    } else {
        run_bootstrap(
            runner,
            ExternalCommand::new(python)
                .args(["-m", "django", "startproject", module.as_str(), "."])
                .current_dir(root),
        )
        .await?;
    }

    if root.join(app_name).join("apps.py").exists() {
        info!("Django app {} already exists, skipping startapp", app_name);
    } else {
        run_bootstrap(
            runner,
            ExternalCommand::new(python)
                .args(["-m", "django", "startapp", app_name])
                .current_dir(root),
        )
        .await?;
    }

    Ok(project)
}

/// Replace the SECRET_KEY..ALLOWED_HOSTS block with an environment-driven one
pub fn patch_secret(settings: &str, block: &str) -> Result<String, regex::Error> {
    let block = block.trim();
    if block.is_empty() || settings.contains(block) {
        return Ok(settings.to_string());
    }
    let re = Regex::new(SECRET_BLOCK)?;
    Ok(re.replacen(settings, 1, NoExpand(block)).into_owned())
}

/// Add every entry line missing from INSTALLED_APPS
pub fn inject_apps(settings: &str, entries: &str) -> Result<String, regex::Error> {
    let re = Regex::new(INSTALLED_APPS)?;
    let Some(caps) = re.captures(settings) else {
        return Ok(settings.to_string());
    };
    let (Some(whole), Some(body)) = (caps.get(0), caps.get(2)) else {
        return Ok(settings.to_string());
    };

    let missing: Vec<&str> = entries
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !body.as_str().contains(*l))
        .collect();
    if missing.is_empty() {
        return Ok(settings.to_string());
    }

    let mut inner = body.as_str().trim_end().to_string();
    if !inner.is_empty() && !inner.ends_with(',') {
        inner.push(',');
    }
    for entry in missing {
        inner.push_str("\n    ");
        inner.push_str(entry);
    }

    let mut out = String::with_capacity(settings.len() + inner.len());
    out.push_str(&settings[..body.start()]);
    out.push_str(&inner);
    out.push_str("\n]");
    out.push_str(&settings[whole.end()..]);
    Ok(out)
}

/// Append the REST_FRAMEWORK block unless one exists
pub fn append_rest(settings: &str, block: &str) -> String {
    if settings.contains("REST_FRAMEWORK") || block.trim().is_empty() {
        return settings.to_string();
    }
    let mut out = settings.trim_end().to_string();
    out.push_str("\n\n");
    out.push_str(block.trim());
    out.push('\n');
    out
}

/// The environment-driven block reads `os.environ`
pub fn ensure_os_import(settings: &str) -> String {
    if settings.starts_with("import os") || settings.contains("\nimport os\n") {
        return settings.to_string();
    }
    match settings.find("from pathlib import Path") {
        Some(pos) => format!("{}import os\n{}", &settings[..pos], &settings[pos..]),
        None => format!("import os\n{}", settings),
    }
}

/// Apply every settings patch for this build. Returns whether the file changed.
pub async fn apply_settings_patches(
    renderer: &Renderer<'_>,
    ctx: &BuildContext,
    patches: &DjangoPatches,
    project: &DjangoProject,
) -> Result<bool, BuildError> {
    if !project.settings.exists() {
        warn!("{} not found, skipping settings patches", project.settings.display());
        return Ok(false);
    }
    let original = fs::read_to_string(&project.settings)
        .await
        .map_err(|e| BuildError::io(&project.settings, e))?;

    let mut settings = original.clone();

    if renderer.pack().contains(patches.secret) {
        let block = renderer
            .render(patches.secret, ctx)
            .map_err(|e| BuildError::TemplatePack(e.to_string()))?;
        settings = patch_secret(&settings, &block.text).map_err(patch_error)?;
        if settings.contains("os.environ") {
            settings = ensure_os_import(&settings);
        }
    }

    let entries = match patches.apps {
        Some(id) if renderer.pack().contains(id) => renderer
            .render(id, ctx)
            .map_err(|e| BuildError::TemplatePack(e.to_string()))?
            .text,
        _ => format!("'{}',", ctx.text("app_name").unwrap_or_default()),
    };
    settings = inject_apps(&settings, &entries).map_err(patch_error)?;

    if let Some(id) = patches.rest {
        if renderer.pack().contains(id) {
            let block = renderer
                .render(id, ctx)
                .map_err(|e| BuildError::TemplatePack(e.to_string()))?;
            settings = append_rest(&settings, &block.text);
        }
    }

    if settings == original {
        debug!("Settings already patched");
        return Ok(false);
    }
    fs::write(&project.settings, settings)
        .await
        .map_err(|e| BuildError::io(&project.settings, e))?;
    info!("Patched {}", project.settings.display());
    Ok(true)
}

/// Replace the project `urls.py` with the rendered override, when the pack has one
pub async fn override_urls(
    renderer: &Renderer<'_>,
    ctx: &BuildContext,
    patches: &DjangoPatches,
    project: &DjangoProject,
) -> Result<(), BuildError> {
    if !renderer.pack().contains(patches.urls) {
        debug!("No {} in pack, keeping generated urls.py", patches.urls);
        return Ok(());
    }
    let rendered = renderer
        .render(patches.urls, ctx)
        .map_err(|e| BuildError::TemplatePack(e.to_string()))?;
    write_text(&project.urls, &rendered.text)
        .await
        .map_err(|e| BuildError::TemplatePack(e.to_string()))
}
