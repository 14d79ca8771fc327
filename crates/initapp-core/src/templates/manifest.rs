//! Manifest, blueprint and template pack manifest types

use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// One file to render: a template identifier and where it lands in the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRule {
    /// Template identifier relative to the pack root (e.g. `common/README.md.tpl`)
    pub source: String,

    /// Output path relative to the project root
    pub target: String,
}

impl ManifestRule {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Whether the target stays inside the project root once joined to it
    pub fn target_is_contained(&self) -> bool {
        is_contained(&self.target)
    }
}

/// A relative path that cannot leave the directory it is joined to
pub fn is_contained(relative: &str) -> bool {
    !relative.trim().is_empty()
        && Path::new(relative)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Folders and packages to create for one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Plain directories
    #[serde(default)]
    pub folders: Vec<String>,

    /// Directories that also get a package marker (`__init__.py`)
    #[serde(default)]
    pub packages: Vec<String>,
}

impl Blueprint {
    pub fn new<S: AsRef<str>>(folders: &[S], packages: &[S]) -> Self {
        Self {
            folders: folders.iter().map(|s| s.as_ref().to_string()).collect(),
            packages: packages.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    /// Every directory to create, folders first, without duplicates
    pub fn all_dirs(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.folders
            .iter()
            .chain(self.packages.iter())
            .map(String::as_str)
            .filter(|d| seen.insert(*d))
            .collect()
    }

    pub fn is_package(&self, folder: &str) -> bool {
        self.packages.iter().any(|p| p == folder)
    }

    pub fn contains(&self, folder: &str) -> bool {
        self.folders.iter().chain(self.packages.iter()).any(|f| f == folder)
    }

    /// Append folders that are not already present
    pub fn extend_folders<I, S>(&mut self, folders: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for folder in folders {
            let folder = folder.into();
            if !self.contains(&folder) {
                self.folders.push(folder);
            }
        }
    }

    /// Remove every `ui` entry (case-insensitive) from both containers
    pub fn strip_ui(&mut self) {
        self.folders.retain(|f| !f.eq_ignore_ascii_case("ui"));
        self.packages.retain(|p| !p.eq_ignore_ascii_case("ui"));
    }
}

/// Root template pack manifest (`templates/template.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootManifest {
    /// Display name of the pack
    pub name: String,

    /// Description of what the pack provides
    #[serde(default)]
    pub description: String,

    /// Semver version for CLI compatibility checking
    pub version: String,

    /// Directory holding shared HTML templates
    #[serde(default = "default_common_templates")]
    pub common_templates: String,

    /// Directory holding shared CSS/JS/image assets
    #[serde(default = "default_common_static")]
    pub common_static: String,
}

fn default_common_templates() -> String {
    "common/templates".to_string()
}

fn default_common_static() -> String {
    "common/static".to_string()
}
