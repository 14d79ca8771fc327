//! Template pack loading from a local directory, a remote zip or the binary itself
//!
//! Every source ends up as the same in-memory [`TemplatePack`]:
//! - Local: the directory tree is walked and every file read into memory
//! - Remote: a pre-built `templates.zip` is downloaded and extracted
//! - Bundled: the workspace `templates/` tree compiled in with `include_dir`
//!
//! This keeps rendering identical between development and installed use.

use super::manifest::RootManifest;
use crate::error::RenderError;
use anyhow::{Context, Result};
use include_dir::{include_dir, Dir};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Environment variable pointing at a local template directory
pub const TEMPLATE_DIR_ENV: &str = "INIT_APP_TEMPLATE_DIR";

/// Environment variable pointing at a published pack (`<url>/templates.zip`)
pub const TEMPLATE_URL_ENV: &str = "INIT_APP_TEMPLATE_URL";

static BUNDLED_TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/../../templates");

/// Archive name for published packs
pub const PACK_ARCHIVE: &str = "templates.zip";

/// Name of the root manifest inside a pack
pub const ROOT_MANIFEST: &str = "template.yaml";

/// Template source - remote URL, local directory or the pack built into the binary
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Remote(Url),
    Local(PathBuf),
    Bundled,
}

impl TemplateSource {
    /// Resolve the source from the environment: a local directory wins over a
    /// URL, and with neither set the bundled pack is used
    pub fn from_env() -> Result<Self> {
        if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
            return Ok(Self::Local(PathBuf::from(dir)));
        }
        match std::env::var(TEMPLATE_URL_ENV) {
            Ok(url_str) if !url_str.trim().is_empty() => {
                let url = Url::parse(&url_str)
                    .with_context(|| format!("Invalid template URL: {}", url_str))?;
                Ok(Self::Remote(url))
            }
            _ => Ok(Self::Bundled),
        }
    }

    /// Create a local template source from a path
    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

/// A fully loaded template pack, files keyed by `/`-separated relative identifier
#[derive(Debug, Clone)]
pub struct TemplatePack {
    manifest: RootManifest,
    files: BTreeMap<String, Vec<u8>>,
}

/// Normalize a template identifier: forward slashes, no leading `./` or `/`
pub fn normalize_id(id: &str) -> String {
    let unified = id.replace('\\', "/");
    unified
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_string()
}

impl TemplatePack {
    /// Load a pack from its source. A remote pack that cannot be fetched falls
    /// back to the bundled one.
    pub async fn load(source: &TemplateSource, user_agent: &str) -> Result<Self> {
        match source {
            TemplateSource::Local(path) => Self::from_dir(path),
            TemplateSource::Bundled => Self::bundled(),
            TemplateSource::Remote(base_url) => match Self::fetch(base_url, user_agent).await {
                Ok(pack) => Ok(pack),
                Err(e) => {
                    warn!("{:#}, using the bundled template pack", e);
                    Self::bundled()
                }
            },
        }
    }

    async fn fetch(base_url: &Url, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        let zip_url = build_url(base_url, PACK_ARCHIVE)?;
        info!("Fetching template pack from {}", zip_url);
        let response = client
            .get(zip_url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch template pack from {}", zip_url))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to fetch template pack from {}: HTTP {}",
                zip_url,
                response.status()
            );
        }

        let bytes = response.bytes().await?;
        Self::from_zip(&bytes)
    }

    /// The pack compiled into this binary
    pub fn bundled() -> Result<Self> {
        fn collect(dir: &Dir<'_>, files: &mut BTreeMap<String, Vec<u8>>) {
            for file in dir.files() {
                let id = normalize_id(&file.path().to_string_lossy());
                files.insert(id, file.contents().to_vec());
            }
            for sub in dir.dirs() {
                collect(sub, files);
            }
        }

        let mut files = BTreeMap::new();
        collect(&BUNDLED_TEMPLATES, &mut files);
        debug!("Loaded {} bundled template files", files.len());
        Self::from_files(files)
    }

    /// Read every file under a local template directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("Template directory not found: {}", dir.display());
        }

        let mut files = BTreeMap::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(dir)
                .with_context(|| format!("{} is outside the pack", entry.path().display()))?;
            let id = normalize_id(&rel.to_string_lossy());
            let content = std::fs::read(entry.path())
                .with_context(|| format!("Failed to read {}", entry.path().display()))?;
            files.insert(id, content);
        }

        debug!("Loaded {} template files from {}", files.len(), dir.display());
        Self::from_files(files)
    }

    /// Extract a zipped pack
    pub fn from_zip(zip_bytes: &[u8]) -> Result<Self> {
        let mut archive =
            ZipArchive::new(Cursor::new(zip_bytes)).context("Failed to read template pack zip")?;

        let mut files = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let id = normalize_id(file.name());
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(id, contents);
        }

        Self::from_files(files)
    }

    /// Assemble a pack from already-read files; the root manifest must be among them
    pub fn from_files(files: BTreeMap<String, Vec<u8>>) -> Result<Self> {
        let raw = files
            .get(ROOT_MANIFEST)
            .ok_or_else(|| anyhow::anyhow!("Template pack is missing {}", ROOT_MANIFEST))?;
        let manifest: RootManifest = serde_yaml::from_slice(raw)
            .with_context(|| format!("Failed to parse {}", ROOT_MANIFEST))?;
        Ok(Self { manifest, files })
    }

    /// Zip a local template directory for publishing
    pub fn build_zip(dir: &Path) -> Result<Vec<u8>> {
        let pack = Self::from_dir(dir)?;

        let mut zip_buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut zip_buffer));
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            for (id, content) in &pack.files {
                zip.start_file(id.as_str(), options)?;
                zip.write_all(content)?;
            }

            zip.finish()?;
        }

        Ok(zip_buffer)
    }

    pub fn manifest(&self) -> &RootManifest {
        &self.manifest
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.files.contains_key(&normalize_id(id))
    }

    /// Raw bytes of a template, looked up by its full relative identifier
    pub fn get(&self, id: &str) -> Option<&[u8]> {
        self.files.get(&normalize_id(id)).map(Vec::as_slice)
    }

    /// Template text, looked up by its full relative identifier
    pub fn text(&self, id: &str) -> std::result::Result<&str, RenderError> {
        let bytes = self
            .get(id)
            .ok_or_else(|| RenderError::Missing(id.to_string()))?;
        std::str::from_utf8(bytes).map_err(|_| RenderError::NotUtf8(id.to_string()))
    }

    /// Files below a directory identifier, as `(path relative to that directory, full id)`
    pub fn files_under(&self, dir: &str) -> Vec<(String, String)> {
        let prefix = format!("{}/", normalize_id(dir).trim_end_matches('/'));
        self.files
            .keys()
            .filter_map(|id| {
                id.strip_prefix(&prefix)
                    .map(|rel| (rel.to_string(), id.clone()))
            })
            .collect()
    }
}

/// Build a URL by appending a path segment, preserving query parameters
fn build_url(base: &Url, path_segment: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
        .pop_if_empty()
        .push(path_segment);
    Ok(url)
}
