//! Stage 1: decide what to release, tag it, create releases, write the
//! handoff manifest.

use std::path::Path;

use super::manifest::{HandoffManifest, ManifestEntry};
use super::outcome::{BatchReport, Outcome};
use crate::catalog::{best_version_for_prefix, release_tag, ReleaseHost, RemoteRelease, TagPublisher};
use crate::config::{PackageSpec, PipelineConfig};
use crate::error::Result;
use crate::version::{bump_cargo_patch, is_newer, resolve_local_version, try_parse};

/// The release decision for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePlan {
    pub id: String,
    pub tag_prefix: String,
    pub local: Option<String>,
    pub remote: Option<String>,
}

impl PackagePlan {
    /// The local version if it is present and starts with a number.
    ///
    /// Otherwise the reason the package cannot be released.
    pub fn usable_local(&self) -> std::result::Result<&str, String> {
        match self.local.as_deref() {
            None => Err("no local version".to_string()),
            Some(local) if try_parse(local).is_none() => {
                Err(format!("unparseable local version {local:?}"))
            }
            Some(local) => Ok(local),
        }
    }

    /// Whether a new release should be created.
    pub fn should_release(&self) -> bool {
        match self.usable_local() {
            Ok(local) => is_newer(local, self.remote.as_deref()),
            Err(_) => false,
        }
    }
}

/// Compare every configured package against the published releases.
pub fn plan_releases(
    config: &PipelineConfig,
    workspace: &Path,
    releases: &[RemoteRelease],
) -> Vec<PackagePlan> {
    config
        .packages
        .iter()
        .map(|spec| PackagePlan {
            id: spec.id.clone(),
            tag_prefix: spec.prefix().to_string(),
            local: resolve_local_version(spec, workspace),
            remote: best_version_for_prefix(releases, spec.prefix()),
        })
        .collect()
}

/// Result of a prepare run.
#[derive(Debug)]
pub struct PrepareRun {
    pub manifest: HandoffManifest,
    pub report: BatchReport,
}

/// Runs stage 1 against a release host and tag publisher.
pub struct Preparer<'a> {
    config: &'a PipelineConfig,
    workspace: &'a Path,
    host: &'a dyn ReleaseHost,
    tags: &'a dyn TagPublisher,
}

impl<'a> Preparer<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        workspace: &'a Path,
        host: &'a dyn ReleaseHost,
        tags: &'a dyn TagPublisher,
    ) -> Self {
        Self {
            config,
            workspace,
            host,
            tags,
        }
    }

    /// Run the stage.
    ///
    /// Only failing to list releases or to write the manifest is an error;
    /// every per-package problem ends up in the report.
    pub fn run(&self) -> Result<PrepareRun> {
        tracing::info!("Preparing releases...");
        let releases = self.host.list_releases()?;

        let mut manifest = HandoffManifest::new();
        let mut report = BatchReport::new();

        let plans = plan_releases(self.config, self.workspace, &releases);
        for (spec, plan) in self.config.packages.iter().zip(plans) {
            let local = match plan.usable_local() {
                Ok(local) => local,
                Err(reason) => {
                    report.record_warning(&spec.id, reason);
                    continue;
                }
            };
            let outcome = self.process(spec, &plan, local, &mut manifest);
            report.record(&spec.id, outcome);
        }

        if manifest.is_empty() {
            tracing::info!("No packages to release; manifest will be empty");
        } else if let Some(main) = &self.config.main_package {
            let outcome = self.bump_main(main, &mut manifest);
            report.record(&main.id, outcome);
        }

        let manifest_path = self.workspace.join(&self.config.manifest);
        manifest.write(&manifest_path)?;
        tracing::info!(
            "Wrote {} with {} entries ({})",
            manifest_path.display(),
            manifest.len(),
            report.summary()
        );

        Ok(PrepareRun { manifest, report })
    }

    fn process(
        &self,
        spec: &PackageSpec,
        plan: &PackagePlan,
        local: &str,
        manifest: &mut HandoffManifest,
    ) -> Outcome {
        tracing::info!(
            "{} local {} remote {}",
            spec.id,
            local,
            plan.remote.as_deref().unwrap_or("none")
        );

        if !plan.should_release() {
            return Outcome::Skipped(format!("{local} is already released"));
        }

        let title = format!("{} v{}", spec.id, local);
        let body = format!("Automatic release for {} v{}", spec.id, local);
        match self.publish(spec, local, &title, &body) {
            Ok(entry) => {
                let message = format!("created release {}", entry.tag_name);
                manifest.push(entry);
                Outcome::Done(message)
            }
            Err(e) => Outcome::Failed(format!("release creation failed: {e}")),
        }
    }

    fn bump_main(&self, main: &PackageSpec, manifest: &mut HandoffManifest) -> Outcome {
        let cargo_toml = main.dir(self.workspace).join("Cargo.toml");
        let bump = match bump_cargo_patch(&cargo_toml) {
            Ok(Some(bump)) => bump,
            Ok(None) => {
                return Outcome::Skipped("main version cannot be bumped; skipping bump".to_string())
            }
            Err(e) => return Outcome::Failed(format!("version bump failed: {e}")),
        };
        tracing::info!("Bumped {} from {} to {}", main.id, bump.from, bump.to);

        let version = bump.to.to_string();
        let title = format!("{} v{}", main.id, version);
        let body = format!("Automatic main release {}", version);
        match self.publish(main, &version, &title, &body) {
            Ok(entry) => {
                let message = format!("created main release {}", entry.tag_name);
                manifest.push(entry);
                Outcome::Done(message)
            }
            Err(e) => Outcome::Failed(format!("main release creation failed: {e}")),
        }
    }

    /// Tag and create the release. A failed tag push is only a warning: the
    /// tag may survive from an earlier run whose release creation failed.
    fn publish(
        &self,
        spec: &PackageSpec,
        version: &str,
        title: &str,
        body: &str,
    ) -> Result<ManifestEntry> {
        let tag = release_tag(spec.prefix(), version);

        if let Err(e) = self.tags.create_tag_and_push(&tag) {
            tracing::warn!("Tag push for {} failed: {}", tag, e);
        }

        let release = self.host.create_release(&tag, title, body)?;
        Ok(ManifestEntry::new(spec, &tag, version, &release.upload_url))
    }
}
