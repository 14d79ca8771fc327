//! Template packs, manifests and rendering
//!
//! This module provides:
//! - Manifest types (ManifestRule, Blueprint, RootManifest)
//! - Template pack loading from a local directory, a remote zip or the bundled pack
//! - `{{key}}` placeholder rendering
//! - Version compatibility checking

pub mod manifest;
pub mod pack;
pub mod renderer;
pub mod version;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

pub use manifest::{is_contained, Blueprint, ManifestRule, RootManifest};
pub use pack::{TemplatePack, TemplateSource};
pub use renderer::{substitute, Rendered, Renderer};
pub use version::check_compatibility;

/// Bundle a local template directory into `templates.zip` for publishing
pub fn build_zip(template_dir: &Option<PathBuf>, out_dir: &Option<PathBuf>) -> Result<PathBuf> {
    let dir = template_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("templates"));

    if !dir.exists() {
        anyhow::bail!("Template directory not found: {}", dir.display());
    }

    println!(
        "{}",
        format!("Packing templates from {}...", dir.display())
            .cyan()
            .bold()
    );

    let zip_bytes = TemplatePack::build_zip(&dir)?;
    let out = out_dir
        .clone()
        .unwrap_or_else(|| dir.parent().unwrap_or(Path::new(".")).join("dist"));
    std::fs::create_dir_all(&out)
        .with_context(|| format!("Failed to create {}", out.display()))?;

    let zip_path = out.join(pack::PACK_ARCHIVE);
    std::fs::write(&zip_path, &zip_bytes)
        .with_context(|| format!("Failed to write {}", zip_path.display()))?;

    println!(
        "{} {} ({} bytes)",
        "Built".green().bold(),
        zip_path.display(),
        zip_bytes.len()
    );

    Ok(zip_path)
}
