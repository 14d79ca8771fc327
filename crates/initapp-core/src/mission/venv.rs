//! Virtual environment creation and dependency installation

use super::command::{CommandRunner, ExternalCommand};
use crate::error::BuildError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const VENV_DIR: &str = ".venv";

/// Interpreter inside the environment, relative to the project root
pub fn venv_python() -> PathBuf {
    if cfg!(windows) {
        Path::new(VENV_DIR).join("Scripts").join("python.exe")
    } else {
        Path::new(VENV_DIR).join("bin").join("python")
    }
}

/// Shell command that activates the environment
pub fn activate_command() -> String {
    if cfg!(windows) {
        format!("{}\\Scripts\\activate", VENV_DIR)
    } else {
        format!("source {}/bin/activate", VENV_DIR)
    }
}

async fn run_step<R: CommandRunner>(runner: &R, cmd: ExternalCommand) -> Result<(), BuildError> {
    let label = cmd.to_string();
    let output = runner.run(&cmd).await.map_err(|e| BuildError::Environment {
        command: label.clone(),
        detail: e.to_string(),
    })?;
    if output.success {
        Ok(())
    } else {
        Err(BuildError::Environment {
            command: label,
            detail: output.summary(),
        })
    }
}

/// Create `<root>/.venv` and install `requirements.txt` into it
pub async fn setup<R: CommandRunner>(
    runner: &R,
    python: &str,
    root: &Path,
) -> Result<PathBuf, BuildError> {
    let venv_dir = root.join(VENV_DIR);
    if venv_dir.exists() {
        info!("Reusing existing {}", venv_dir.display());
    } else {
        run_step(
            runner,
            ExternalCommand::new(python)
                .args(["-m", "venv", VENV_DIR])
                .current_dir(root),
        )
        .await?;
    }

    if root.join("requirements.txt").exists() {
        let venv_python = root.join(venv_python());
        run_step(
            runner,
            ExternalCommand::new(venv_python.to_string_lossy())
                .args(["-m", "pip", "install", "-r", "requirements.txt"])
                .current_dir(root),
        )
        .await?;
    } else {
        warn!("No requirements.txt in {}, skipping install", root.display());
    }

    Ok(venv_dir)
}
