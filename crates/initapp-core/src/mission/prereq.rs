//! Prerequisite detection: interpreter, venv, pip and Django

use super::command::{CommandRunner, ExternalCommand};
use crate::error::BuildError;
use tracing::info;

/// Probe result for one tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

/// What a build needs from the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    pub venv: bool,
    pub django: bool,
}

async fn check<R: CommandRunner>(runner: &R, name: &'static str, cmd: ExternalCommand) -> ToolStatus {
    match runner.probe(&cmd).await {
        Some(version) => ToolStatus {
            name,
            version: Some(version),
            available: true,
        },
        None => ToolStatus {
            name,
            version: None,
            available: false,
        },
    }
}

/// Check the interpreter and whatever the build needs on top of it.
///
/// Fails with every missing item listed, before anything is written.
pub async fn check_prerequisites<R: CommandRunner>(
    runner: &R,
    python: &str,
    needs: Requirements,
) -> Result<Vec<ToolStatus>, BuildError> {
    let mut results = Vec::new();
    let mut missing = Vec::new();

    let interpreter = check(runner, "Python 3", ExternalCommand::new(python).arg("--version")).await;
    if !interpreter.available {
        // Nothing else can be probed without an interpreter
        return Err(BuildError::Prerequisite(format!(
            "  - Python 3 (`{}` not found, install from https://python.org or set INIT_APP_PYTHON)",
            python
        )));
    }
    results.push(interpreter);

    let mut probes: Vec<(&'static str, Vec<&str>, &'static str)> = Vec::new();
    if needs.venv {
        probes.push(("venv", vec!["-m", "venv", "--help"], "venv module (install python3-venv)"));
        probes.push(("pip", vec!["-m", "pip", "--version"], "pip (install python3-pip)"));
    }
    if needs.django {
        probes.push((
            "Django",
            vec!["-m", "django", "--version"],
            "Django (pip install django)",
        ));
    }

    for (name, args, hint) in probes {
        let status = check(runner, name, ExternalCommand::new(python).args(args)).await;
        if !status.available {
            missing.push(hint);
        }
        results.push(status);
    }

    if !missing.is_empty() {
        return Err(BuildError::Prerequisite(
            missing
                .iter()
                .map(|m| format!("  - {}", m))
                .collect::<Vec<_>>()
                .join("\n"),
        ));
    }

    for tool in &results {
        info!(
            "Found {} ({})",
            tool.name,
            tool.version.as_deref().unwrap_or("unknown")
        );
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::command::CommandOutput;
    use std::io;

    /// Succeeds for every command except those containing a blocked argument
    struct Host {
        blocked: &'static [&'static str],
    }

    impl CommandRunner for Host {
        async fn run(&self, command: &ExternalCommand) -> io::Result<CommandOutput> {
            let blocked = self
                .blocked
                .iter()
                .any(|b| command.program == *b || command.args.iter().any(|a| a == b));
            Ok(CommandOutput {
                success: !blocked,
                stdout: "Python 3.12.1\n".to_string(),
                stderr: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_all_present() {
        let host = Host { blocked: &[] };
        let found = check_prerequisites(
            &host,
            "python3",
            Requirements {
                venv: true,
                django: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 4);
        assert_eq!(found[0].version.as_deref(), Some("Python 3.12.1"));
    }

    #[tokio::test]
    async fn test_missing_items_are_listed_together() {
        let host = Host {
            blocked: &["pip", "django"],
        };
        let err = check_prerequisites(
            &host,
            "python3",
            Requirements {
                venv: true,
                django: true,
            },
        )
        .await
        .unwrap_err();
        let msg = err.user_message();
        assert!(msg.contains("pip"));
        assert!(msg.contains("django"));
        assert!(!msg.contains("venv module"));
    }

    #[tokio::test]
    async fn test_missing_interpreter_short_circuits() {
        let host = Host {
            blocked: &["python3"],
        };
        let err = check_prerequisites(&host, "python3", Requirements::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Prerequisite(_)));
    }

    #[tokio::test]
    async fn test_declined_venv_skips_pip_probe() {
        let host = Host { blocked: &["pip"] };
        let found = check_prerequisites(&host, "python3", Requirements::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }
}
