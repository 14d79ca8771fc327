//! Build request: everything a user asks for, from flags, a YAML file or prompts

use crate::context::{BuildContext, InitStrategy};
use crate::framework::InfraSuite;
use crate::rules::constants::{
    all_domain_folders, is_package_by_default, DEFAULT_APP_NAME, DEFAULT_PROJECT_NAME,
};
use crate::rules::suite_files;
use crate::templates::ManifestRule;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Answers that decline the virtual environment
pub const NEGATIVE_TOKENS: &[&str] = &["false", "no", "n", "0", "off", "skip", "none"];

/// Whether the user asked for a virtual environment.
///
/// Accepts a YAML bool or a string token. An absent signal means "create".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VenvSignal {
    Flag(bool),
    Token(String),
    #[default]
    Unset,
}

impl VenvSignal {
    /// Parse a CLI value such as `yes`, `no` or `false`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "on" => VenvSignal::Flag(true),
            _ => VenvSignal::Token(s.to_string()),
        }
    }

    /// Any negative form is final; everything else creates the environment
    pub fn is_declined(&self) -> bool {
        match self {
            VenvSignal::Flag(b) => !b,
            VenvSignal::Token(t) => NEGATIVE_TOKENS.contains(&t.trim().to_lowercase().as_str()),
            VenvSignal::Unset => false,
        }
    }

    pub fn wants_venv(&self) -> bool {
        !self.is_declined()
    }
}

/// A complete build request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildRequest {
    /// Project name; also the name of the root directory
    pub name: Option<String>,
    pub framework: Option<String>,
    #[serde(alias = "strategy")]
    pub structure: Option<String>,
    /// Parent directory of the project root (defaults to the current directory)
    pub location: Option<PathBuf>,
    pub database: Option<String>,
    #[serde(alias = "project_type")]
    pub domain: Option<String>,
    #[serde(alias = "drf")]
    pub is_drf: bool,
    pub app_name: Option<String>,
    pub venv: VenvSignal,
    /// Infrastructure suite name to the template files selected from it
    pub infra: BTreeMap<String, Vec<String>>,
    pub custom_folders: Vec<String>,
    pub init_strategy: InitStrategy,
    pub port: Option<String>,
    pub host: Option<String>,
}

impl BuildRequest {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse build request")
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read build request {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("Invalid build request {}", path.display()))
    }

    /// Fill every unset field from `other`
    pub fn merge_missing(&mut self, other: BuildRequest) {
        fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
            if slot.is_none() {
                *slot = value;
            }
        }
        fill(&mut self.name, other.name);
        fill(&mut self.framework, other.framework);
        fill(&mut self.structure, other.structure);
        fill(&mut self.location, other.location);
        fill(&mut self.database, other.database);
        fill(&mut self.domain, other.domain);
        fill(&mut self.app_name, other.app_name);
        fill(&mut self.port, other.port);
        fill(&mut self.host, other.host);
        self.is_drf |= other.is_drf;
        if self.venv == VenvSignal::Unset {
            self.venv = other.venv;
        }
        if self.infra.is_empty() {
            self.infra = other.infra;
        }
        if self.custom_folders.is_empty() {
            self.custom_folders = other.custom_folders;
        }
        for (folder, package) in other.init_strategy {
            self.init_strategy.entry(folder).or_insert(package);
        }
    }

    pub fn project_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_PROJECT_NAME)
    }

    pub fn app_name(&self) -> &str {
        self.app_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_APP_NAME)
    }

    /// Project root: `<location>/<name>`
    pub fn root(&self) -> PathBuf {
        let base = self.location.clone().unwrap_or_else(|| PathBuf::from("."));
        base.join(self.project_name())
    }

    pub fn is_auto_config(&self) -> bool {
        self.structure
            .as_deref()
            .and_then(crate::framework::Strategy::parse)
            .is_some_and(|s| s == crate::framework::Strategy::AutoConfig)
    }

    /// Maximum scaffold: every domain folder and every file of every
    /// infrastructure suite. Code folders default to packages unless the
    /// request already decided.
    pub fn force_auto_config(&mut self) {
        for folder in all_domain_folders() {
            if !self.custom_folders.iter().any(|f| f == folder) {
                self.custom_folders.push(folder.to_string());
            }
            self.init_strategy
                .entry(folder.to_string())
                .or_insert_with(|| is_package_by_default(folder));
        }
        self.infra = InfraSuite::ALL
            .iter()
            .map(|suite| {
                let files = suite_files(*suite).iter().map(|f| f.to_string()).collect();
                (suite.name().to_string(), files)
            })
            .collect();
    }

    /// Manifest rules for the selected infrastructure files; unknown suites are skipped
    pub fn infra_rules(&self) -> Vec<ManifestRule> {
        let mut rules = Vec::new();
        for (name, files) in &self.infra {
            let Some(suite) = InfraSuite::parse(name) else {
                warn!("Unknown infrastructure suite {:?}, skipping", name);
                continue;
            };
            let files: Vec<&str> = if files.is_empty() {
                suite_files(suite).to_vec()
            } else {
                files.iter().map(String::as_str).collect()
            };
            for file in files {
                rules.push(crate::rules::infra_rule(suite, file));
            }
        }
        rules
    }

    /// Flat context the bundler starts from
    pub fn to_context(&self) -> BuildContext {
        let mut ctx = BuildContext::new();
        ctx.insert("project_name", self.project_name());
        ctx.insert("app_name", self.app_name());
        let optional = [
            ("framework", &self.framework),
            ("structure", &self.structure),
            ("database", &self.database),
            ("domain", &self.domain),
            ("port", &self.port),
            ("host", &self.host),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                ctx.insert(key, value.as_str());
            }
        }
        ctx.insert("is_drf", self.is_drf);
        if !self.custom_folders.is_empty() {
            ctx.insert("custom_folders", self.custom_folders.clone());
        }
        ctx.set_init_strategy(self.init_strategy.clone());
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venv_negative_forms_are_absolute() {
        assert!(VenvSignal::Flag(false).is_declined());
        for token in ["no", "n", "No", "false", "FALSE", " skip "] {
            assert!(VenvSignal::Token(token.to_string()).is_declined(), "{}", token);
        }
        assert!(VenvSignal::Unset.wants_venv());
        assert!(VenvSignal::Token("maybe".to_string()).wants_venv());
        assert!(VenvSignal::parse("yes").wants_venv());
        assert!(VenvSignal::parse("n").is_declined());
    }

    #[test]
    fn test_yaml_request() {
        let yaml = r#"
name: shop
framework: django
strategy: production
drf: true
venv: "no"
infra:
  github: [ci.yml.tpl]
init_strategy:
  docs: false
"#;
        let req = BuildRequest::from_yaml_str(yaml).unwrap();
        assert_eq!(req.project_name(), "shop");
        assert_eq!(req.structure.as_deref(), Some("production"));
        assert!(req.is_drf);
        assert!(req.venv.is_declined());
        assert_eq!(req.init_strategy.get("docs"), Some(&false));
    }

    #[test]
    fn test_yaml_venv_bool_and_absent() {
        let req = BuildRequest::from_yaml_str("venv: false\n").unwrap();
        assert_eq!(req.venv, VenvSignal::Flag(false));
        let req = BuildRequest::from_yaml_str("name: x\n").unwrap();
        assert_eq!(req.venv, VenvSignal::Unset);
        assert!(req.venv.wants_venv());
    }

    #[test]
    fn test_infra_rules_and_unknown_suites() {
        let mut req = BuildRequest::default();
        req.infra.insert("github".to_string(), vec!["ci.yml.tpl".to_string()]);
        req.infra.insert("heroku".to_string(), vec!["Procfile.tpl".to_string()]);
        let rules = req.infra_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].target, ".github/workflows/ci.yml");
    }

    #[test]
    fn test_empty_file_list_selects_whole_suite() {
        let mut req = BuildRequest::default();
        req.infra.insert("docker".to_string(), Vec::new());
        assert_eq!(req.infra_rules().len(), suite_files(InfraSuite::Docker).len());
    }

    #[test]
    fn test_auto_config_forces_everything() {
        let mut req = BuildRequest {
            structure: Some("auto_config".to_string()),
            ..Default::default()
        };
        req.init_strategy.insert("docs".to_string(), true);
        assert!(req.is_auto_config());
        req.force_auto_config();
        assert!(req.custom_folders.iter().any(|f| f == "retrievers"));
        assert_eq!(req.init_strategy.get("docs"), Some(&true));
        assert_eq!(req.init_strategy.get("services"), Some(&true));
        assert_eq!(req.init_strategy.get("retrievers"), Some(&true));
        for folder in ["logs", "static", "templates", "assets"] {
            assert_eq!(req.init_strategy.get(folder), Some(&false), "{}", folder);
        }
        assert_eq!(req.infra.len(), InfraSuite::ALL.len());
    }

    #[test]
    fn test_merge_missing_keeps_explicit_values() {
        let mut flags = BuildRequest {
            name: Some("cli-name".to_string()),
            ..Default::default()
        };
        let file = BuildRequest {
            name: Some("file-name".to_string()),
            framework: Some("flask".to_string()),
            venv: VenvSignal::Flag(false),
            ..Default::default()
        };
        flags.merge_missing(file);
        assert_eq!(flags.project_name(), "cli-name");
        assert_eq!(flags.framework.as_deref(), Some("flask"));
        assert!(flags.venv.is_declined());
    }

    #[test]
    fn test_context_defaults() {
        let ctx = BuildRequest::default().to_context();
        assert_eq!(ctx.text("project_name").as_deref(), Some(DEFAULT_PROJECT_NAME));
        assert_eq!(ctx.text("app_name").as_deref(), Some(DEFAULT_APP_NAME));
        assert!(!ctx.contains("framework"));
    }

    #[test]
    fn test_root_joins_location() {
        let req = BuildRequest {
            name: Some("demo".to_string()),
            location: Some(PathBuf::from("/tmp/work")),
            ..Default::default()
        };
        assert_eq!(req.root(), PathBuf::from("/tmp/work/demo"));
    }
}
