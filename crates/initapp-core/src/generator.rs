//! Physical execution: directories, package markers and rendered files
//!
//! Rendering is best-effort. A broken or missing template is logged, leaves an
//! empty file at its target and is recorded as failed; the rest of the scaffold
//! is still written. Only failures to create the tree itself abort the build.

use crate::context::BuildContext;
use crate::error::{BuildError, RenderError};
use crate::framework::Framework;
use crate::templates::{is_contained, Blueprint, ManifestRule, Rendered, Renderer, TemplatePack};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, warn};

/// Marker file that turns a folder into an importable package
pub const PACKAGE_MARKER: &str = "__init__.py";

const TEMPLATE_EXT: &str = ".tpl";

/// A file that could not be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub target: String,
    pub reason: String,
}

/// What one generator run produced
#[derive(Debug, Clone, Default)]
pub struct ManifestResult {
    pub root: PathBuf,
    /// Targets written, relative to the root
    pub rendered: Vec<String>,
    pub failed: Vec<FailedFile>,
    /// Directories created, relative to the root
    pub folders: Vec<String>,
}

impl ManifestResult {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn fail(&mut self, target: &str, err: &RenderError) {
        self.failed.push(FailedFile {
            target: target.to_string(),
            reason: err.to_string(),
        });
    }
}

/// Writes a planned build to disk
pub struct Generator<'a> {
    root: &'a Path,
    renderer: Renderer<'a>,
    ctx: &'a BuildContext,
    framework: Framework,
}

impl<'a> Generator<'a> {
    pub fn new(root: &'a Path, pack: &'a TemplatePack, ctx: &'a BuildContext) -> Self {
        let framework = ctx
            .text("framework")
            .and_then(|fw| Framework::parse(&fw))
            .unwrap_or(Framework::FastApi);
        Self {
            root,
            renderer: Renderer::new(pack),
            ctx,
            framework,
        }
    }

    /// Create the blueprint's folders, render every manifest rule in order, then
    /// lay down the shared HTML and static assets when the build serves views.
    pub async fn run(
        &self,
        blueprint: &Blueprint,
        manifest: &[ManifestRule],
    ) -> Result<ManifestResult, BuildError> {
        fs::create_dir_all(self.root)
            .await
            .map_err(|e| BuildError::io(self.root, e))?;

        let mut result = ManifestResult {
            root: self.root.to_path_buf(),
            ..Default::default()
        };

        self.scaffold(blueprint, &mut result).await?;

        for rule in manifest {
            self.apply_rule(&rule.source, &rule.target, &mut result).await;
        }

        if self.serves_views(blueprint) {
            self.copy_assets(&mut result).await;
        }

        debug!(
            "Generated {} files ({} failed) under {}",
            result.rendered.len(),
            result.failed.len(),
            self.root.display()
        );
        Ok(result)
    }

    async fn scaffold(
        &self,
        blueprint: &Blueprint,
        result: &mut ManifestResult,
    ) -> Result<(), BuildError> {
        let init_strategy = self.ctx.init_strategy();

        for folder in blueprint.all_dirs() {
            let folder = folder.trim().trim_end_matches('/');
            if folder.is_empty() || folder.eq_ignore_ascii_case("none") {
                continue;
            }
            // Django keeps its views inside the app package
            if self.framework.is_django() && folder.eq_ignore_ascii_case("ui") {
                continue;
            }
            if !is_contained(folder) {
                warn!("Skipping folder outside the project root: {}", folder);
                continue;
            }

            let dir = self.root.join(folder);
            fs::create_dir_all(&dir)
                .await
                .map_err(|e| BuildError::io(&dir, e))?;
            result.folders.push(folder.to_string());

            let package =
                blueprint.is_package(folder) || init_strategy.get(folder).copied().unwrap_or(false);
            if package {
                let marker = dir.join(PACKAGE_MARKER);
                if !marker.exists() {
                    fs::write(&marker, "")
                        .await
                        .map_err(|e| BuildError::io(&marker, e))?;
                }
                debug!("Created package {}", folder);
            } else {
                debug!("Created folder {}", folder);
            }
        }
        Ok(())
    }

    /// Render one template into a target below the root
    async fn render_and_write(&self, source: &str, target: &str) -> Result<Rendered, RenderError> {
        if !is_contained(target) {
            return Err(RenderError::Escape(target.to_string()));
        }
        let path = self.root.join(target);
        self.renderer.render_to(source, self.ctx, &path).await
    }

    async fn apply_rule(&self, source: &str, target: &str, result: &mut ManifestResult) {
        match self.render_and_write(source, target).await {
            Ok(rendered) => {
                if rendered.is_blank() {
                    warn!("Template {} rendered empty output for {}", source, target);
                }
                debug!("Wrote {}", target);
                result.rendered.push(target.to_string());
            }
            Err(RenderError::Escape(path)) => {
                error!("Refusing to write outside the project root: {}", path);
                result.fail(target, &RenderError::Escape(path));
            }
            Err(err) => {
                error!("Failed to render {} -> {}: {}", source, target, err);
                self.touch_empty(target).await;
                result.fail(target, &err);
            }
        }
    }

    /// Leave an empty placeholder so the layout stays complete
    async fn touch_empty(&self, target: &str) {
        let path = self.root.join(target);
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                warn!("Failed to create {}: {}", parent.display(), e);
                return;
            }
        }
        if let Err(e) = fs::write(&path, "").await {
            warn!("Failed to create empty {}: {}", path.display(), e);
        }
    }

    fn rest_mode(&self) -> bool {
        self.framework.is_django() && self.ctx.flag("is_drf")
    }

    fn serves_views(&self, blueprint: &Blueprint) -> bool {
        if self.framework.is_django() {
            !self.rest_mode()
        } else {
            blueprint.folders.iter().any(|f| f.eq_ignore_ascii_case("ui"))
        }
    }

    fn asset_roots(&self) -> (String, String) {
        if self.framework.is_django() {
            let app = self
                .ctx
                .text("app_name")
                .unwrap_or_else(|| crate::rules::constants::DEFAULT_APP_NAME.to_string());
            (format!("{}/templates", app), format!("{}/static", app))
        } else {
            ("ui/templates".to_string(), "ui/static".to_string())
        }
    }

    async fn copy_assets(&self, result: &mut ManifestResult) {
        let pack = self.renderer.pack();
        let manifest = pack.manifest();
        let (html_root, static_root) = self.asset_roots();

        for (rel, id) in pack.files_under(&manifest.common_templates) {
            let target = format!("{}/{}", html_root, strip_template_ext(&rel));
            self.apply_rule(&id, &target, result).await;
        }

        for (rel, id) in pack.files_under(&manifest.common_static) {
            let rel = map_static_path(&rel);
            if rel.ends_with(TEMPLATE_EXT) {
                let target = format!("{}/{}", static_root, strip_template_ext(&rel));
                self.apply_rule(&id, &target, result).await;
                continue;
            }

            let target = format!("{}/{}", static_root, rel);
            let Some(bytes) = pack.get(&id) else {
                continue;
            };
            match write_bytes(&self.root.join(&target), bytes).await {
                Ok(()) => {
                    debug!("Copied {}", target);
                    result.rendered.push(target);
                }
                Err(err) => {
                    error!("Failed to copy {}: {}", id, err);
                    result.fail(&target, &err);
                }
            }
        }
    }
}

fn strip_template_ext(rel: &str) -> &str {
    rel.strip_suffix(TEMPLATE_EXT).unwrap_or(rel)
}

/// Source `scripts/` assets land in `js/`
fn map_static_path(rel: &str) -> String {
    match rel.strip_prefix("scripts/") {
        Some(rest) => format!("js/{}", rest),
        None => rel.to_string(),
    }
}

async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| RenderError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    fs::write(path, bytes)
        .await
        .map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn pack() -> TemplatePack {
        let mut files = BTreeMap::new();
        files.insert(
            "template.yaml".to_string(),
            b"name: test\nversion: 1.0.0\n".to_vec(),
        );
        files.insert("common/README.md.tpl".to_string(), b"# {{project_name}}\n".to_vec());
        files.insert("common/blank.tpl".to_string(), b"   \n".to_vec());
        files.insert(
            "common/templates/base.html.tpl".to_string(),
            b"<title>{{project_name}}</title>".to_vec(),
        );
        files.insert("common/static/css/style.css".to_string(), b"body {}".to_vec());
        files.insert(
            "common/static/scripts/main.js.tpl".to_string(),
            b"// {{project_name}}".to_vec(),
        );
        TemplatePack::from_files(files).unwrap()
    }

    fn ctx(fw: &str) -> BuildContext {
        let mut ctx = BuildContext::new();
        ctx.insert("project_name", "demo");
        ctx.insert("framework", fw);
        ctx.insert("app_name", "shop");
        ctx
    }

    #[tokio::test]
    async fn test_packages_get_markers_and_folders_do_not() {
        let dir = tempfile::tempdir().unwrap();
        let pack = pack();
        let ctx = ctx("fastapi");
        let bp = Blueprint::new(&["docs", "none", ""], &["app", "tests"]);
        let result = Generator::new(dir.path(), &pack, &ctx)
            .run(&bp, &[])
            .await
            .unwrap();

        assert!(dir.path().join("app/__init__.py").exists());
        assert!(dir.path().join("tests/__init__.py").exists());
        assert!(dir.path().join("docs").is_dir());
        assert!(!dir.path().join("docs/__init__.py").exists());
        assert!(!dir.path().join("none").exists());
        assert_eq!(result.folders, vec!["docs", "app", "tests"]);
    }

    #[tokio::test]
    async fn test_init_strategy_marks_plain_folders() {
        let dir = tempfile::tempdir().unwrap();
        let pack = pack();
        let mut ctx = ctx("fastapi");
        ctx.default_init("services", true);
        let bp = Blueprint::new(&["services"], &[]);
        Generator::new(dir.path(), &pack, &ctx)
            .run(&bp, &[])
            .await
            .unwrap();
        assert!(dir.path().join("services/__init__.py").exists());
    }

    #[tokio::test]
    async fn test_renders_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let pack = pack();
        let ctx = ctx("fastapi");
        let rules = vec![ManifestRule::new("common/README.md.tpl", "docs/README.md")];
        let result = Generator::new(dir.path(), &pack, &ctx)
            .run(&Blueprint::default(), &rules)
            .await
            .unwrap();
        let text = std::fs::read_to_string(dir.path().join("docs/README.md")).unwrap();
        assert_eq!(text, "# demo\n");
        assert!(result.is_clean());
    }

    #[tokio::test]
    async fn test_missing_template_leaves_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let pack = pack();
        let ctx = ctx("fastapi");
        let rules = vec![
            ManifestRule::new("common/nope.tpl", "nope.txt"),
            ManifestRule::new("common/README.md.tpl", "README.md"),
        ];
        let result = Generator::new(dir.path(), &pack, &ctx)
            .run(&Blueprint::default(), &rules)
            .await
            .unwrap();

        let path = dir.path().join("nope.txt");
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(path).unwrap(), "");
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].target, "nope.txt");
        assert!(dir.path().join("README.md").exists());
    }

    #[tokio::test]
    async fn test_blank_render_is_not_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let pack = pack();
        let ctx = ctx("fastapi");
        let rules = vec![ManifestRule::new("common/blank.tpl", "blank.txt")];
        let result = Generator::new(dir.path(), &pack, &ctx)
            .run(&Blueprint::default(), &rules)
            .await
            .unwrap();
        assert!(result.is_clean());
        assert_eq!(result.rendered, vec!["blank.txt"]);
    }

    #[tokio::test]
    async fn test_escaping_target_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        let pack = pack();
        let ctx = ctx("fastapi");
        let rules = vec![ManifestRule::new("common/README.md.tpl", "../escaped.md")];
        let result = Generator::new(&root, &pack, &ctx)
            .run(&Blueprint::default(), &rules)
            .await
            .unwrap();
        assert!(!dir.path().join("escaped.md").exists());
        assert_eq!(result.failed.len(), 1);
    }

    #[tokio::test]
    async fn test_later_rule_wins_on_same_target() {
        let dir = tempfile::tempdir().unwrap();
        let pack = pack();
        let ctx = ctx("fastapi");
        let rules = vec![
            ManifestRule::new("common/README.md.tpl", "out.txt"),
            ManifestRule::new("common/templates/base.html.tpl", "out.txt"),
        ];
        Generator::new(dir.path(), &pack, &ctx)
            .run(&Blueprint::default(), &rules)
            .await
            .unwrap();
        let text = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(text, "<title>demo</title>");
    }

    #[tokio::test]
    async fn test_ui_builds_get_assets() {
        let dir = tempfile::tempdir().unwrap();
        let pack = pack();
        let ctx = ctx("flask");
        let bp = Blueprint::new(&["ui"], &["app"]);
        Generator::new(dir.path(), &pack, &ctx)
            .run(&bp, &[])
            .await
            .unwrap();

        let root = dir.path();
        assert_eq!(
            std::fs::read_to_string(root.join("ui/templates/base.html")).unwrap(),
            "<title>demo</title>"
        );
        assert_eq!(
            std::fs::read_to_string(root.join("ui/static/css/style.css")).unwrap(),
            "body {}"
        );
        assert_eq!(
            std::fs::read_to_string(root.join("ui/static/js/main.js")).unwrap(),
            "// demo"
        );
    }

    #[tokio::test]
    async fn test_api_only_builds_skip_assets() {
        let dir = tempfile::tempdir().unwrap();
        let pack = pack();
        let ctx = ctx("fastapi");
        let bp = Blueprint::new(&["docs"], &["app"]);
        Generator::new(dir.path(), &pack, &ctx)
            .run(&bp, &[])
            .await
            .unwrap();
        assert!(!dir.path().join("ui").exists());
    }

    #[tokio::test]
    async fn test_django_assets_live_in_app_package() {
        let dir = tempfile::tempdir().unwrap();
        let pack = pack();
        let ctx = ctx("django");
        let bp = Blueprint::new(&["ui", "static"], &["core"]);
        Generator::new(dir.path(), &pack, &ctx)
            .run(&bp, &[])
            .await
            .unwrap();

        let root = dir.path();
        assert!(!root.join("ui").exists());
        assert!(root.join("shop/templates/base.html").exists());
        assert!(root.join("shop/static/js/main.js").exists());
    }

    #[tokio::test]
    async fn test_django_rest_has_no_views() {
        let dir = tempfile::tempdir().unwrap();
        let pack = pack();
        let mut ctx = ctx("django");
        ctx.insert("is_drf", true);
        Generator::new(dir.path(), &pack, &ctx)
            .run(&Blueprint::new(&["static"], &["api"]), &[])
            .await
            .unwrap();
        assert!(!dir.path().join("shop/templates").exists());
    }

    #[test]
    fn test_static_path_mapping() {
        assert_eq!(map_static_path("scripts/main.js"), "js/main.js");
        assert_eq!(map_static_path("css/scripts/x.css"), "css/scripts/x.css");
        assert_eq!(strip_template_ext("main.js.tpl"), "main.js");
    }
}
