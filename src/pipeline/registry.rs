//! Stage 3: the plugin registry document.
//!
//! The registry lists, for every known plugin, the download URL of its
//! newest release. It is derived purely from the release catalog, so
//! running the stage twice against the same catalog yields identical bytes
//! and the second run leaves the file untouched.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::catalog::{best_release_for_prefix, pick_asset, ReleaseHost, RemoteRelease};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::version::{classify, BuildState};

/// Every listed plugin carries this state.
pub const UPDATED_STATE: &str = "updated";

/// One plugin in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    pub urls: BTreeMap<String, String>,
    pub version: String,
    pub state: String,
    pub build_state: BuildState,
}

/// The registry document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    pub name: String,
    pub plugins: Vec<RegistryEntry>,
}

impl RegistryDocument {
    /// Two-space indented JSON with a trailing newline.
    pub fn render(&self) -> Result<String> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        Ok(content)
    }
}

/// What happened to the registry file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryOutcome {
    Written { digest: String },
    Unchanged { digest: String },
}

impl RegistryOutcome {
    /// SHA-256 hex digest of the document.
    pub fn digest(&self) -> &str {
        match self {
            RegistryOutcome::Written { digest } | RegistryOutcome::Unchanged { digest } => digest,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, RegistryOutcome::Written { .. })
    }
}

/// SHA-256 hex digest of `content`.
pub fn content_digest(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Build the registry from a catalog snapshot, in configured plugin order.
///
/// Plugins without a release, or whose best release lacks a matching
/// asset, are left out with a warning.
pub fn build_registry(config: &PipelineConfig, releases: &[RemoteRelease]) -> RegistryDocument {
    let mut plugins = Vec::new();

    for plugin in &config.plugins {
        let Some(release) = best_release_for_prefix(releases, &plugin.id) else {
            tracing::warn!("No release found for {}; skipping", plugin.id);
            continue;
        };
        let version = release.version_for(&plugin.id).unwrap_or_default().to_string();

        let extension = plugin.artifact.extension();
        let Some(asset) = pick_asset(&release.assets, extension) else {
            tracing::warn!(
                "No {} asset in {} ({}); skipping",
                extension,
                release.tag_name,
                plugin.id
            );
            continue;
        };

        tracing::info!("Added {} -> {}", plugin.id, asset.name);
        plugins.push(RegistryEntry {
            name: plugin.id.clone(),
            urls: BTreeMap::from([(
                plugin.artifact.label().to_string(),
                asset.download_url.clone(),
            )]),
            build_state: classify(&version),
            version,
            state: UPDATED_STATE.to_string(),
        });
    }

    RegistryDocument {
        name: config.registry_name.clone(),
        plugins,
    }
}

/// Write `content` to `path` unless the file already holds exactly it.
pub fn write_if_changed(path: &Path, content: &str) -> Result<RegistryOutcome> {
    let digest = content_digest(content);

    match fs::read_to_string(path) {
        Ok(existing) if existing == content => {
            return Ok(RegistryOutcome::Unchanged { digest });
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    fs::write(path, content)?;
    Ok(RegistryOutcome::Written { digest })
}

/// Result of a registry run.
#[derive(Debug)]
pub struct RegistryRun {
    pub document: RegistryDocument,
    pub outcome: RegistryOutcome,
}

/// Runs stage 3.
pub struct RegistryGenerator<'a> {
    config: &'a PipelineConfig,
    workspace: &'a Path,
    host: &'a dyn ReleaseHost,
}

impl<'a> RegistryGenerator<'a> {
    pub fn new(config: &'a PipelineConfig, workspace: &'a Path, host: &'a dyn ReleaseHost) -> Self {
        Self {
            config,
            workspace,
            host,
        }
    }

    pub fn run(&self) -> Result<RegistryRun> {
        let releases = self.host.list_releases()?;
        let document = build_registry(self.config, &releases);
        let content = document.render()?;

        let path = self.workspace.join(&self.config.registry_output);
        let outcome = write_if_changed(&path, &content)?;
        match &outcome {
            RegistryOutcome::Written { digest } => tracing::info!(
                "Wrote {} ({} plugins, sha256 {})",
                path.display(),
                document.plugins.len(),
                digest
            ),
            RegistryOutcome::Unchanged { digest } => tracing::info!(
                "{} unchanged (sha256 {}); nothing to commit",
                path.display(),
                digest
            ),
        }

        Ok(RegistryRun { document, outcome })
    }
}
