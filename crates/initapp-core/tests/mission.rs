//! End-to-end missions against the bundled template pack, with a fake Python toolchain

use initapp_core::framework::{Framework, Strategy};
use initapp_core::mission::{
    BuildRequest, CommandOutput, CommandRunner, Controller, ExternalCommand, MissionOutcome,
    MissionReport, MissionState, SilentReporter, VenvSignal,
};
use initapp_core::mission::django::{apply_settings_patches, DjangoProject};
use initapp_core::templates::Renderer;
use initapp_core::TemplatePack;
use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

const SETTINGS: &str = r#"from pathlib import Path

BASE_DIR = Path(__file__).resolve().parent.parent

SECRET_KEY = 'django-insecure-fixture'

DEBUG = True

ALLOWED_HOSTS = []

INSTALLED_APPS = [
    'django.contrib.admin',
    'django.contrib.staticfiles',
]
"#;

/// Stands in for python: answers probes and lays down what django/venv would create
#[derive(Default)]
struct FakePython {
    calls: RefCell<Vec<String>>,
    /// Fail any command whose arguments contain this word
    fail_on: Option<&'static str>,
}

impl FakePython {
    fn failing_on(word: &'static str) -> Self {
        Self {
            fail_on: Some(word),
            ..Default::default()
        }
    }

    fn ran(&self, needle: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.contains(needle))
    }
}

impl CommandRunner for FakePython {
    async fn run(&self, command: &ExternalCommand) -> io::Result<CommandOutput> {
        self.calls.borrow_mut().push(command.to_string());
        let args: Vec<&str> = command.args.iter().map(String::as_str).collect();

        if let Some(word) = self.fail_on {
            if args.contains(&word) {
                return Ok(CommandOutput {
                    success: false,
                    stdout: String::new(),
                    stderr: format!("CommandError: {} failed", word),
                });
            }
        }

        let cwd = command.cwd.clone().unwrap_or_else(|| PathBuf::from("."));
        match args.as_slice() {
            ["-m", "django", "startproject", module, "."] => {
                std::fs::create_dir_all(cwd.join(module))?;
                std::fs::write(cwd.join("manage.py"), "#!/usr/bin/env python\n")?;
                std::fs::write(cwd.join(module).join("settings.py"), SETTINGS)?;
                std::fs::write(cwd.join(module).join("urls.py"), "urlpatterns = []\n")?;
            }
            ["-m", "django", "startapp", app] => {
                std::fs::create_dir_all(cwd.join(app))?;
                std::fs::write(cwd.join(app).join("apps.py"), "")?;
            }
            ["-m", "venv", dir] => {
                std::fs::create_dir_all(cwd.join(dir))?;
            }
            _ => {}
        }

        Ok(CommandOutput {
            success: true,
            stdout: "Python 3.12.1\n".to_string(),
            stderr: String::new(),
        })
    }
}

fn bundled_pack() -> TemplatePack {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates");
    TemplatePack::from_dir(&dir).unwrap()
}

fn request(location: &Path, name: &str, framework: &str, structure: &str) -> BuildRequest {
    BuildRequest {
        name: Some(name.to_string()),
        framework: Some(framework.to_string()),
        structure: Some(structure.to_string()),
        location: Some(location.to_path_buf()),
        venv: VenvSignal::Flag(false),
        ..Default::default()
    }
}

async fn run(pack: &TemplatePack, runner: &FakePython, request: BuildRequest) -> MissionOutcome {
    let mut controller = Controller::new(pack, runner, SilentReporter);
    controller.run_mission(request).await
}

fn completed(outcome: MissionOutcome) -> MissionReport {
    match outcome {
        MissionOutcome::Completed(report) => report,
        other => panic!("mission did not complete: {:?}", other),
    }
}

#[tokio::test]
async fn test_fastapi_standard_build() {
    let dir = tempfile::tempdir().unwrap();
    let pack = bundled_pack();
    let runner = FakePython::default();

    let report = completed(run(&pack, &runner, request(dir.path(), "api", "fastapi", "standard")).await);
    let root = dir.path().join("api");

    assert_eq!(report.root, root);
    assert!(report.result.is_clean(), "{:?}", report.result.failed);
    let app = std::fs::read_to_string(root.join("app.py")).unwrap();
    assert!(app.contains("from fastapi import FastAPI"));
    assert!(app.contains("if __name__ == \"__main__\":\n    uvicorn.run"));
    let requirements = std::fs::read_to_string(root.join("requirements.txt")).unwrap();
    assert!(requirements.lines().any(|l| l == "fastapi"));
    assert!(root.join("app/__init__.py").exists());
    assert!(root.join("app/api/routes.py").exists());
    assert!(!root.join("manage.py").exists());
    assert!(!runner.ran("django"));
    assert!(report.success_line().contains("api is ready"));
}

#[tokio::test]
async fn test_fastapi_production_build() {
    let dir = tempfile::tempdir().unwrap();
    let pack = bundled_pack();
    let runner = FakePython::default();

    completed(run(&pack, &runner, request(dir.path(), "svc", "fastapi", "production")).await);
    let root = dir.path().join("svc");

    assert!(root.join("app.py").exists());
    assert!(!root.join("entry.py").exists());
    assert!(root.join("core/config.py").exists());
    let requirements = std::fs::read_to_string(root.join("requirements.txt")).unwrap();
    assert!(requirements.contains("slowapi"));
}

#[tokio::test]
async fn test_django_rest_build() {
    let dir = tempfile::tempdir().unwrap();
    let pack = bundled_pack();
    let runner = FakePython::default();
    let mut req = request(dir.path(), "shop", "django", "standard");
    req.is_drf = true;
    req.app_name = Some("orders".to_string());

    let mut controller = Controller::new(&pack, &runner, SilentReporter);
    let report = completed(controller.run_mission(req).await);
    let root = dir.path().join("shop");

    assert!(controller.history().contains(&MissionState::FrameworkBootstrap));
    assert_eq!(controller.state(), MissionState::Done);

    let settings = std::fs::read_to_string(root.join("shop/settings.py")).unwrap();
    assert_eq!(settings.matches("REST_FRAMEWORK").count(), 1);
    assert!(settings.contains("'rest_framework',"));
    assert!(settings.contains("'orders',"));
    assert!(settings.contains("DJANGO_SECRET_KEY"));
    assert!(settings.starts_with("import os\n"));

    let urls = std::fs::read_to_string(root.join("shop/urls.py")).unwrap();
    assert!(urls.contains("include(\"api.urls\")"));

    let requirements = std::fs::read_to_string(root.join("requirements.txt")).unwrap();
    assert!(requirements.lines().any(|l| l == "djangorestframework"));
    assert!(root.join("api/serializers.py").exists());
    assert!(!root.join("app.py").exists());
    assert!(!root.join("ui").exists());
    assert!(report.instructions.contains("manage.py runserver"));
}

#[tokio::test]
async fn test_django_rest_rebuild_leaves_settings_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let pack = bundled_pack();
    let runner = FakePython::default();
    let rest_request = || {
        let mut req = request(dir.path(), "shop", "django", "standard");
        req.is_drf = true;
        req.app_name = Some("orders".to_string());
        req
    };
    let settings_path = dir.path().join("shop/shop/settings.py");

    completed(run(&pack, &runner, rest_request()).await);
    let first = std::fs::read_to_string(&settings_path).unwrap();

    completed(run(&pack, &runner, rest_request()).await);
    let second = std::fs::read_to_string(&settings_path).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.matches("REST_FRAMEWORK").count(), 1);
    assert_eq!(second.matches("import os\n").count(), 1);
    assert_eq!(second.matches("'rest_framework',").count(), 1);

    let ctx = rest_request().to_context();
    let project = DjangoProject::locate(&dir.path().join("shop"), "shop");
    let renderer = Renderer::new(&pack);
    let patches = &initapp_core::rules::django::django(true).patches;
    let changed = apply_settings_patches(&renderer, &ctx, patches, &project)
        .await
        .unwrap();
    assert!(!changed);
    assert_eq!(std::fs::read_to_string(&settings_path).unwrap(), second);
}

#[tokio::test]
async fn test_plain_django_keeps_views_in_app() {
    let dir = tempfile::tempdir().unwrap();
    let pack = bundled_pack();
    let runner = FakePython::default();

    completed(run(&pack, &runner, request(dir.path(), "portal", "django", "standard")).await);
    let root = dir.path().join("portal");

    assert!(root.join("core_app/templates/index.html").exists());
    assert!(root.join("core_app/templates/base.html").exists());
    assert!(root.join("core_app/static/js/main.js").exists());
    assert!(!root.join("ui").exists());
    let settings = std::fs::read_to_string(root.join("portal/settings.py")).unwrap();
    assert!(!settings.contains("REST_FRAMEWORK"));
}

#[tokio::test]
async fn test_infra_selection_lands_in_workflows() {
    let dir = tempfile::tempdir().unwrap();
    let pack = bundled_pack();
    let runner = FakePython::default();
    let mut req = request(dir.path(), "ci", "flask", "standard");
    req.infra
        .insert("github".to_string(), vec!["ci.yml.tpl".to_string()]);

    completed(run(&pack, &runner, req).await);
    let root = dir.path().join("ci");

    assert!(root.join(".github/workflows/ci.yml").exists());
    assert!(!root.join(".github/workflows/security.yml").exists());
}

#[tokio::test]
async fn test_missing_template_leaves_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let pack = bundled_pack();
    let runner = FakePython::default();
    let mut req = request(dir.path(), "gaps", "flask", "standard");
    req.infra
        .insert("github".to_string(), vec!["nightly.yml.tpl".to_string()]);

    let report = completed(run(&pack, &runner, req).await);
    let target = dir.path().join("gaps/.github/workflows/nightly.yml");

    assert_eq!(std::fs::read_to_string(target).unwrap(), "");
    assert!(report
        .result
        .failed
        .iter()
        .any(|f| f.target == ".github/workflows/nightly.yml"));
}

#[tokio::test]
async fn test_declined_venv_is_never_created() {
    let pack = bundled_pack();
    for signal in [
        VenvSignal::Flag(false),
        VenvSignal::parse("no"),
        VenvSignal::parse("n"),
    ] {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakePython::default();
        let mut req = request(dir.path(), "novenv", "fastapi", "auto_config");
        req.venv = signal;

        let report = completed(run(&pack, &runner, req).await);
        assert!(report.venv.is_none());
        assert!(!dir.path().join("novenv/.venv").exists());
        assert!(!runner.ran("venv"));
        assert!(report.instructions.contains("  cd novenv\n  python app.py"));
        assert!(report
            .instructions
            .contains("Open http://localhost:8000 once the server is up."));
    }
}

#[tokio::test]
async fn test_requested_venv_installs_requirements() {
    let dir = tempfile::tempdir().unwrap();
    let pack = bundled_pack();
    let runner = FakePython::default();
    let mut req = request(dir.path(), "withenv", "flask", "standard");
    req.venv = VenvSignal::Unset;

    let report = completed(run(&pack, &runner, req).await);

    assert!(dir.path().join("withenv/.venv").is_dir());
    assert!(report.venv.is_some());
    assert!(runner.ran("pip install -r requirements.txt"));
    assert!(report.instructions.contains(".venv"));
}

#[tokio::test]
async fn test_auto_config_forces_everything() {
    let dir = tempfile::tempdir().unwrap();
    let pack = bundled_pack();
    let runner = FakePython::default();

    completed(run(&pack, &runner, request(dir.path(), "full", "flask", "auto_config")).await);
    let root = dir.path().join("full");

    assert!(root.join("docker/Dockerfile").exists());
    assert!(root.join(".github/workflows/security.yml").exists());
    assert!(root.join("k8s/deployment.yml").exists());
    assert!(root.join("jenkins/Jenkinsfile").exists());
    assert!(root.join("services/__init__.py").exists());
    assert!(root.join("logs").is_dir());
    assert!(!root.join("logs/__init__.py").exists());
    assert!(!root.join("static/__init__.py").exists());
    assert!(root.join("vectordb").is_dir());
    assert!(root.join("dags").is_dir());
}

#[tokio::test]
async fn test_every_framework_and_strategy_builds() {
    let pack = bundled_pack();
    for fw in Framework::ALL {
        for strategy in Strategy::ALL {
            let dir = tempfile::tempdir().unwrap();
            let runner = FakePython::default();
            let req = request(dir.path(), "matrix", fw.slug(), strategy.slug());

            let report = completed(run(&pack, &runner, req).await);
            assert!(report.root.is_dir(), "{} / {}", fw, strategy);
            assert!(!report.result.folders.is_empty(), "{} / {}", fw, strategy);
            assert!(report.root.join("requirements.txt").exists());
            if fw.is_django() {
                assert!(report.root.join("manage.py").exists(), "{}", strategy);
                assert!(report.root.join("matrix/settings.py").exists(), "{}", strategy);
                assert!(!report.root.join("app.py").exists(), "{}", strategy);
            }
        }
    }
}

#[tokio::test]
async fn test_others_domain_layout() {
    let dir = tempfile::tempdir().unwrap();
    let pack = bundled_pack();
    let runner = FakePython::default();
    let mut req = request(dir.path(), "rag", "others", "standard");
    req.domain = Some("rag_ai".to_string());

    let report = completed(run(&pack, &runner, req).await);
    let root = dir.path().join("rag");
    assert!(!report.instructions.contains("localhost"));

    assert!(root.join("src/engine/chains/pipeline.py").exists());
    assert!(root.join("src/engine/__init__.py").exists());
    let requirements = std::fs::read_to_string(root.join("requirements.txt")).unwrap();
    assert!(requirements.contains("langchain"));
}

#[tokio::test]
async fn test_failed_bootstrap_fails_mission() {
    let dir = tempfile::tempdir().unwrap();
    let pack = bundled_pack();
    let runner = FakePython::failing_on("startapp");

    let mut controller = Controller::new(&pack, &runner, SilentReporter);
    let outcome = controller
        .run_mission(request(dir.path(), "broken", "django", "standard"))
        .await;

    match outcome {
        MissionOutcome::Failed(message) => {
            assert_eq!(message, message.to_lowercase());
            assert!(!message.contains('\n'));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(controller.state(), MissionState::Failed);
    assert!(!controller.history().contains(&MissionState::PhysicalGeneration));
}

#[tokio::test]
async fn test_missing_interpreter_stops_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let pack = bundled_pack();
    let runner = FakePython::failing_on("--version");

    let outcome = run(&pack, &runner, request(dir.path(), "nopy", "fastapi", "standard")).await;

    assert!(matches!(outcome, MissionOutcome::Failed(_)));
    assert!(!dir.path().join("nopy").exists());
}
