//! Placeholder substitution for `{{key}}` templates

use super::pack::TemplatePack;
use crate::context::BuildContext;
use crate::error::RenderError;
use std::collections::BTreeSet;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Result of rendering one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Placeholder keys the context had no value for; left in the text as written
    pub unresolved: BTreeSet<String>,
}

impl Rendered {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

fn is_key(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Replace every `{{ key }}` with its context value.
///
/// Whitespace inside the braces is ignored. Anything between braces that is not a
/// plain key (e.g. `{{ a b }}`) is copied through untouched.
pub fn substitute(template: &str, ctx: &BuildContext) -> Rendered {
    let mut text = String::with_capacity(template.len());
    let mut unresolved = BTreeSet::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        text.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            text.push_str(&rest[open..]);
            rest = "";
            break;
        };

        let raw = &rest[open..open + 2 + close + 2];
        let key = after_open[..close].trim();
        match ctx.get(key) {
            Some(value) if is_key(key) => text.push_str(&value.to_string()),
            _ => {
                if is_key(key) {
                    unresolved.insert(key.to_string());
                }
                text.push_str(raw);
            }
        }
        rest = &after_open[close + 2..];
    }
    text.push_str(rest);

    Rendered { text, unresolved }
}

/// Renders templates from a pack against a build context
pub struct Renderer<'a> {
    pack: &'a TemplatePack,
}

impl<'a> Renderer<'a> {
    pub fn new(pack: &'a TemplatePack) -> Self {
        Self { pack }
    }

    pub fn pack(&self) -> &TemplatePack {
        self.pack
    }

    /// Render a template to a string
    pub fn render(&self, id: &str, ctx: &BuildContext) -> Result<Rendered, RenderError> {
        let source = self.pack.text(id)?;
        let rendered = substitute(source, ctx);
        if !rendered.unresolved.is_empty() {
            warn!(
                "Unreplaced placeholders in {}: {:?}",
                id, rendered.unresolved
            );
        }
        debug!("Rendered template {}", id);
        Ok(rendered)
    }

    /// Render a template and write it as UTF-8, creating parent directories
    pub async fn render_to(
        &self,
        id: &str,
        ctx: &BuildContext,
        output: &Path,
    ) -> Result<Rendered, RenderError> {
        let rendered = self.render(id, ctx)?;
        write_text(output, &rendered.text).await?;
        Ok(rendered)
    }

    /// Render a template and print it under a header
    pub fn preview(&self, id: &str, ctx: &BuildContext) -> Result<(), RenderError> {
        let rendered = self.render(id, ctx)?;
        let header = format!("--- Preview: {} ---", id);
        println!();
        println!("{}", header);
        println!("{}", rendered.text);
        println!("{}", "-".repeat(header.len()));
        Ok(())
    }
}

/// Write text to a file, creating parent directories as needed
pub async fn write_text(output: &Path, text: &str) -> Result<(), RenderError> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| RenderError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    fs::write(output, text)
        .await
        .map_err(|source| RenderError::Write {
            path: output.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> BuildContext {
        let mut ctx = BuildContext::new();
        ctx.insert("project_name", "demo");
        ctx.insert("port", "8000");
        ctx.insert("debug", true);
        ctx
    }

    #[test]
    fn test_substitute_tolerates_whitespace() {
        let out = substitute("name={{project_name}} port={{ port }} dbg={{  debug }}", &ctx());
        assert_eq!(out.text, "name=demo port=8000 dbg=True");
        assert!(out.unresolved.is_empty());
    }

    #[test]
    fn test_unresolved_placeholders_are_reported_and_kept() {
        let out = substitute("host={{ host }} name={{project_name}}", &ctx());
        assert_eq!(out.text, "host={{ host }} name=demo");
        assert_eq!(out.unresolved.into_iter().collect::<Vec<_>>(), vec!["host"]);
    }

    #[test]
    fn test_non_key_braces_pass_through() {
        let out = substitute("{% raw %}{{ a b }} and {{ unterminated", &ctx());
        assert_eq!(out.text, "{% raw %}{{ a b }} and {{ unterminated");
        assert!(out.unresolved.is_empty());
    }

    #[test]
    fn test_blank_detection() {
        assert!(substitute("  \n", &ctx()).is_blank());
        assert!(!substitute("{{project_name}}", &ctx()).is_blank());
    }

    #[tokio::test]
    async fn test_write_text_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/c.txt");
        write_text(&target, "hello").await.unwrap();
        assert_eq!(std::fs::read_to_string(target).unwrap(), "hello");
    }
}
