//! Stage 2: build and upload the artifacts listed in the handoff manifest
//! for one platform.

use std::fs;
use std::path::{Path, PathBuf};

use super::archive::zip_dir;
use super::manifest::{HandoffManifest, ManifestEntry};
use super::outcome::{BatchReport, Outcome};
use super::platform::Platform;
use crate::catalog::ReleaseHost;
use crate::config::{PackageKind, PipelineConfig};
use crate::error::{RelayError, Result};
use crate::shell::run_checked;

const WASM_TARGET: &str = "wasm32-wasip1";

/// Runs external build tools.
pub trait BuildRunner {
    /// Run `program` with `args` in `cwd`; non-zero exit is an error.
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<()>;
}

/// Runs build tools as real subprocesses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl BuildRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<()> {
        run_checked(program, args, cwd)
    }
}

/// Runs stage 2 for one platform.
pub struct Builder<'a> {
    config: &'a PipelineConfig,
    workspace: &'a Path,
    host: &'a dyn ReleaseHost,
    runner: &'a dyn BuildRunner,
}

impl<'a> Builder<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        workspace: &'a Path,
        host: &'a dyn ReleaseHost,
        runner: &'a dyn BuildRunner,
    ) -> Self {
        Self {
            config,
            workspace,
            host,
            runner,
        }
    }

    /// Build every manifest entry for `platform`.
    ///
    /// A missing or empty manifest means there is nothing to do. A malformed
    /// one is an error.
    pub fn run(&self, platform: Platform) -> Result<BatchReport> {
        let manifest_path = self.workspace.join(&self.config.manifest);
        let mut report = BatchReport::new();

        let Some(manifest) = HandoffManifest::read(&manifest_path)? else {
            tracing::info!("{} not found; nothing to build", manifest_path.display());
            return Ok(report);
        };
        if manifest.is_empty() {
            tracing::info!("Manifest is empty; nothing to build");
            return Ok(report);
        }

        tracing::info!("Building {} entries on {}", manifest.len(), platform);
        for entry in &manifest.created_releases {
            let outcome = if entry.kind.is_platform_independent()
                && platform != self.config.primary_platform
            {
                Outcome::Skipped(format!(
                    "{} artifacts are built on {}",
                    entry.kind.label(),
                    self.config.primary_platform
                ))
            } else {
                match self.build_entry(entry, platform) {
                    Ok(message) => Outcome::Done(message),
                    Err(e) => Outcome::Failed(format!("{} on {}: {}", entry.tag_name, platform, e)),
                }
            };
            report.record(&entry.id, outcome);
        }

        tracing::info!("Build on {} finished: {}", platform, report.summary());
        Ok(report)
    }

    fn build_entry(&self, entry: &ManifestEntry, platform: Platform) -> Result<String> {
        let package_dir = self.workspace.join(&entry.path);

        match &entry.kind {
            PackageKind::NativeBinary {
                crate_name,
                bin_name,
            } => {
                self.runner.run(
                    "cargo",
                    &["build", "-p", crate_name.as_str(), "--release"],
                    &package_dir,
                )?;
                let bin = bin_name.as_deref().unwrap_or(crate_name);
                let artifact = self.find_native_artifact(entry, bin, platform)?;
                let renamed = self.workspace.join(format!(
                    "{}-{}{}",
                    bin,
                    platform.asset_suffix(),
                    platform.exe_suffix()
                ));
                self.upload_transient(entry, &renamed, |out| {
                    fs::copy(&artifact, out)?;
                    Ok(())
                })
            }

            PackageKind::WasmComponent { crate_name } => {
                self.runner.run(
                    "cargo",
                    &[
                        "component",
                        "build",
                        "--package",
                        crate_name.as_str(),
                        "--target",
                        WASM_TARGET,
                        "--release",
                    ],
                    &package_dir,
                )?;
                let artifact = self.find_wasm_artifact(entry, crate_name)?;
                self.upload(entry, &artifact)
            }

            PackageKind::InterpretedPlugin { plugin_file } => {
                let source = package_dir.join(plugin_file);
                if !source.is_file() {
                    return Err(RelayError::ArtifactNotFound {
                        package: entry.id.clone(),
                        path: source,
                    });
                }
                self.upload(entry, &source)
            }

            PackageKind::WebBundle {
                archive_name,
                build_dir,
                install_command,
                build_command,
            } => {
                self.run_command(install_command, &package_dir)?;
                self.run_command(build_command, &package_dir)?;

                let archive = self.workspace.join(archive_name);
                self.upload_transient(entry, &archive, |out| {
                    zip_dir(&package_dir.join(build_dir), out)?;
                    Ok(())
                })
            }
        }
    }

    /// Look in `target/release` for the binary, crate, then id name.
    fn find_native_artifact(
        &self,
        entry: &ManifestEntry,
        bin: &str,
        platform: Platform,
    ) -> Result<PathBuf> {
        let release_dir = self.workspace.join("target").join("release");
        let crate_name = match &entry.kind {
            PackageKind::NativeBinary { crate_name, .. } => crate_name.as_str(),
            _ => bin,
        };

        let mut names: Vec<&str> = Vec::new();
        for name in [bin, crate_name, entry.id.as_str()] {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        names
            .iter()
            .map(|name| release_dir.join(format!("{}{}", name, platform.exe_suffix())))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| RelayError::ArtifactNotFound {
                package: entry.id.clone(),
                path: release_dir.join(bin),
            })
    }

    /// Cargo writes library artifacts with `-` replaced by `_`.
    fn find_wasm_artifact(&self, entry: &ManifestEntry, crate_name: &str) -> Result<PathBuf> {
        let out_dir = self
            .workspace
            .join("target")
            .join(WASM_TARGET)
            .join("release");
        let exact = out_dir.join(format!("{crate_name}.wasm"));
        let underscored = out_dir.join(format!("{}.wasm", crate_name.replace('-', "_")));

        [exact.clone(), underscored]
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or(RelayError::ArtifactNotFound {
                package: entry.id.clone(),
                path: exact,
            })
    }

    fn run_command(&self, command: &[String], cwd: &Path) -> Result<()> {
        let Some((program, args)) = command.split_first() else {
            return Err(RelayError::ConfigValidationError {
                message: "empty build command".to_string(),
            });
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner.run(program, &args, cwd)
    }

    /// Write `file` with `produce`, upload it, then remove it. The file is
    /// removed even when writing or uploading failed halfway.
    fn upload_transient(
        &self,
        entry: &ManifestEntry,
        file: &Path,
        produce: impl FnOnce(&Path) -> Result<()>,
    ) -> Result<String> {
        let uploaded = produce(file).and_then(|()| self.upload(entry, file));
        if file.exists() {
            if let Err(e) = fs::remove_file(file) {
                tracing::debug!("Could not remove {}: {}", file.display(), e);
            }
        }
        uploaded
    }

    fn upload(&self, entry: &ManifestEntry, file: &Path) -> Result<String> {
        tracing::info!("Uploading {} to {}", file.display(), entry.tag_name);
        let asset = self.host.upload_asset(&entry.upload_url, file)?;
        Ok(format!("uploaded {}", asset.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Asset, RemoteRelease};
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Records invocations and drops the expected artifact in place.
    struct FakeRunner {
        workspace: PathBuf,
        calls: RefCell<Vec<String>>,
        fail_on: Option<String>,
    }

    impl FakeRunner {
        fn new(workspace: &Path) -> Self {
            Self {
                workspace: workspace.to_path_buf(),
                calls: RefCell::new(Vec::new()),
                fail_on: None,
            }
        }
    }

    impl BuildRunner for FakeRunner {
        fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<()> {
            let line = format!("{} {}", program, args.join(" "));
            self.calls.borrow_mut().push(line.clone());
            if self.fail_on.as_deref().is_some_and(|f| line.contains(f)) {
                return Err(RelayError::CommandFailed {
                    command: line,
                    code: Some(101),
                });
            }

            match (program, args) {
                ("cargo", ["build", "-p", name, ..]) => {
                    let dir = self.workspace.join("target/release");
                    fs::create_dir_all(&dir).unwrap();
                    fs::write(dir.join(name), "elf").unwrap();
                }
                ("cargo", ["component", "build", "--package", name, ..]) => {
                    let dir = self.workspace.join("target/wasm32-wasip1/release");
                    fs::create_dir_all(&dir).unwrap();
                    fs::write(dir.join(format!("{}.wasm", name.replace('-', "_"))), "wasm")
                        .unwrap();
                }
                ("bun", ["run", "build"]) => {
                    fs::create_dir_all(cwd.join("build")).unwrap();
                    fs::write(cwd.join("build/index.html"), "<html/>").unwrap();
                }
                _ => {}
            }
            Ok(())
        }
    }

    /// Succeeds without producing anything.
    struct SilentRunner;

    impl BuildRunner for SilentRunner {
        fn run(&self, _program: &str, _args: &[&str], _cwd: &Path) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeHost {
        uploads: RefCell<Vec<(String, String)>>,
    }

    impl ReleaseHost for FakeHost {
        fn list_releases(&self) -> Result<Vec<RemoteRelease>> {
            Ok(Vec::new())
        }

        fn create_release(&self, _tag: &str, _title: &str, _body: &str) -> Result<RemoteRelease> {
            unreachable!("build never creates releases")
        }

        fn upload_asset(&self, upload_url: &str, file: &Path) -> Result<Asset> {
            assert!(file.is_file(), "{} should exist during upload", file.display());
            let name = file.file_name().unwrap().to_string_lossy().to_string();
            self.uploads
                .borrow_mut()
                .push((upload_url.to_string(), name.clone()));
            Ok(Asset {
                name,
                download_url: String::new(),
            })
        }
    }

    fn entry(id: &str, path: &str, kind: PackageKind) -> ManifestEntry {
        ManifestEntry {
            id: id.to_string(),
            tag_name: format!("{id}@v1.0.0"),
            version: "1.0.0".to_string(),
            upload_url: format!("https://uploads/{id}/assets{{?name,label}}"),
            path: PathBuf::from(path),
            kind,
        }
    }

    fn write_manifest(ws: &Path, entries: Vec<ManifestEntry>) {
        let mut manifest = HandoffManifest::new();
        for e in entries {
            manifest.push(e);
        }
        manifest.write(&ws.join("release_manifest.json")).unwrap();
    }

    fn native(id: &str, bin: Option<&str>) -> ManifestEntry {
        entry(
            id,
            ".",
            PackageKind::NativeBinary {
                crate_name: id.to_string(),
                bin_name: bin.map(str::to_string),
            },
        )
    }

    #[test]
    fn missing_manifest_is_no_work() {
        let temp = TempDir::new().unwrap();
        let config = PipelineConfig::default();
        let runner = FakeRunner::new(temp.path());
        let host = FakeHost::default();

        let report = Builder::new(&config, temp.path(), &host, &runner)
            .run(Platform::Linux)
            .unwrap();
        assert!(report.units.is_empty());
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn malformed_manifest_is_fatal() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("release_manifest.json"), "[oops").unwrap();
        let config = PipelineConfig::default();
        let runner = FakeRunner::new(temp.path());

        assert!(Builder::new(&config, temp.path(), &FakeHost::default(), &runner)
            .run(Platform::Linux)
            .is_err());
    }

    #[test]
    fn native_binary_is_renamed_uploaded_and_cleaned_up() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path();
        write_manifest(ws, vec![native("gql-api", None)]);
        let config = PipelineConfig::default();
        let runner = FakeRunner::new(ws);
        let host = FakeHost::default();

        let report = Builder::new(&config, ws, &host, &runner)
            .run(Platform::MacosArm)
            .unwrap();

        assert!(report.get("gql-api").unwrap().is_done());
        assert_eq!(
            *runner.calls.borrow(),
            ["cargo build -p gql-api --release"]
        );
        let uploads = host.uploads.borrow();
        assert_eq!(uploads[0].1, "gql-api-macos-aarch64");
        assert!(!ws.join("gql-api-macos-aarch64").exists());
    }

    #[test]
    fn native_binary_falls_back_to_crate_name() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path();
        write_manifest(ws, vec![native("server", Some("manga-vault"))]);
        let config = PipelineConfig::default();
        let runner = FakeRunner::new(ws);
        let host = FakeHost::default();

        let report = Builder::new(&config, ws, &host, &runner)
            .run(Platform::Linux)
            .unwrap();

        assert!(report.get("server").unwrap().is_done());
        assert_eq!(host.uploads.borrow()[0].1, "manga-vault-linux-x86_64");
    }

    #[test]
    fn native_binary_falls_back_to_package_id() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path();
        let mut server = native("website-server", Some("manga-vault-web"));
        server.kind = PackageKind::NativeBinary {
            crate_name: "web-crate".to_string(),
            bin_name: Some("manga-vault-web".to_string()),
        };
        write_manifest(ws, vec![server]);
        fs::create_dir_all(ws.join("target/release")).unwrap();
        fs::write(ws.join("target/release/website-server"), "elf").unwrap();
        let config = PipelineConfig::default();
        let host = FakeHost::default();

        let report = Builder::new(&config, ws, &host, &SilentRunner)
            .run(Platform::Linux)
            .unwrap();

        assert!(report.get("website-server").unwrap().is_done());
        assert_eq!(host.uploads.borrow()[0].1, "manga-vault-web-linux-x86_64");
        assert!(!ws.join("manga-vault-web-linux-x86_64").exists());
    }

    #[test]
    fn native_binary_without_any_artifact_fails() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path();
        write_manifest(ws, vec![native("website-server", Some("manga-vault-web"))]);
        let config = PipelineConfig::default();
        let host = FakeHost::default();

        let report = Builder::new(&config, ws, &host, &SilentRunner)
            .run(Platform::Linux)
            .unwrap();

        assert!(report.get("website-server").unwrap().is_failed());
        assert!(host.uploads.borrow().is_empty());
    }

    #[test]
    fn transient_file_is_removed_when_writing_fails() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path();
        let config = PipelineConfig::default();
        let host = FakeHost::default();
        let builder = Builder::new(&config, ws, &host, &SilentRunner);
        let archive = ws.join("website.zip");

        let result = builder.upload_transient(&native("website", None), &archive, |out| {
            fs::write(out, "PK partial")?;
            Err(RelayError::ArtifactNotFound {
                package: "website".to_string(),
                path: out.to_path_buf(),
            })
        });

        assert!(result.is_err());
        assert!(!archive.exists());
        assert!(host.uploads.borrow().is_empty());
    }

    #[test]
    fn web_bundle_without_build_output_leaves_no_archive() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path();
        fs::create_dir_all(ws.join("apps/web")).unwrap();
        write_manifest(
            ws,
            vec![entry(
                "website",
                "apps/web",
                PackageKind::WebBundle {
                    archive_name: "website.zip".to_string(),
                    build_dir: "build".to_string(),
                    install_command: vec!["bun".to_string(), "install".to_string()],
                    build_command: vec!["bun".to_string(), "run".to_string(), "build".to_string()],
                },
            )],
        );
        let config = PipelineConfig::default();
        let host = FakeHost::default();

        let report = Builder::new(&config, ws, &host, &SilentRunner)
            .run(Platform::Linux)
            .unwrap();

        assert!(report.get("website").unwrap().is_failed());
        assert!(!ws.join("website.zip").exists());
    }

    #[test]
    fn windows_requires_exe_artifact() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path();
        write_manifest(ws, vec![native("tui", None)]);
        let config = PipelineConfig::default();
        let runner = FakeRunner::new(ws);
        let host = FakeHost::default();

        // The fake runner writes `tui` without `.exe`.
        let report = Builder::new(&config, ws, &host, &runner)
            .run(Platform::Windows)
            .unwrap();
        assert!(report.get("tui").unwrap().is_failed());

        fs::write(ws.join("target/release/tui.exe"), "pe").unwrap();
        let report = Builder::new(&config, ws, &host, &runner)
            .run(Platform::Windows)
            .unwrap();
        assert!(report.get("tui").unwrap().is_done());
        assert_eq!(host.uploads.borrow()[0].1, "tui-windows-x86_64.exe");
    }

    #[test]
    fn platform_independent_entries_only_on_primary() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path();
        fs::create_dir_all(ws.join("scrapers/natomanga")).unwrap();
        fs::write(ws.join("scrapers/natomanga/natomanga.lua"), "-- lua").unwrap();
        write_manifest(
            ws,
            vec![
                entry(
                    "manga-dex",
                    "scrapers/manga-dex",
                    PackageKind::WasmComponent {
                        crate_name: "manga-dex".to_string(),
                    },
                ),
                entry(
                    "natomanga",
                    "scrapers/natomanga",
                    PackageKind::InterpretedPlugin {
                        plugin_file: "natomanga.lua".to_string(),
                    },
                ),
            ],
        );
        let config = PipelineConfig::default();
        let host = FakeHost::default();

        let runner = FakeRunner::new(ws);
        let report = Builder::new(&config, ws, &host, &runner)
            .run(Platform::Windows)
            .unwrap();
        assert!(report.get("manga-dex").unwrap().is_skipped());
        assert!(report.get("natomanga").unwrap().is_skipped());
        assert!(host.uploads.borrow().is_empty());

        let report = Builder::new(&config, ws, &host, &runner)
            .run(Platform::Linux)
            .unwrap();
        assert!(report.get("manga-dex").unwrap().is_done());
        assert!(report.get("natomanga").unwrap().is_done());
        let names: Vec<_> = host.uploads.borrow().iter().map(|u| u.1.clone()).collect();
        assert_eq!(names, ["manga_dex.wasm", "natomanga.lua"]);
    }

    #[test]
    fn missing_plugin_file_fails_entry() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path();
        write_manifest(
            ws,
            vec![entry(
                "ghost",
                "scrapers/ghost",
                PackageKind::InterpretedPlugin {
                    plugin_file: "ghost.lua".to_string(),
                },
            )],
        );
        let config = PipelineConfig::default();
        let runner = FakeRunner::new(ws);

        let report = Builder::new(&config, ws, &FakeHost::default(), &runner)
            .run(Platform::Linux)
            .unwrap();
        assert!(report.get("ghost").unwrap().is_failed());
    }

    #[test]
    fn web_bundle_runs_commands_and_uploads_archive() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path();
        fs::create_dir_all(ws.join("apps/web")).unwrap();
        write_manifest(
            ws,
            vec![entry(
                "website",
                "apps/web",
                PackageKind::WebBundle {
                    archive_name: "website.zip".to_string(),
                    build_dir: "build".to_string(),
                    install_command: vec!["bun".to_string(), "install".to_string()],
                    build_command: vec!["bun".to_string(), "run".to_string(), "build".to_string()],
                },
            )],
        );
        let config = PipelineConfig::default();
        let runner = FakeRunner::new(ws);
        let host = FakeHost::default();

        let report = Builder::new(&config, ws, &host, &runner)
            .run(Platform::Linux)
            .unwrap();

        assert!(report.get("website").unwrap().is_done());
        assert_eq!(*runner.calls.borrow(), ["bun install", "bun run build"]);
        assert_eq!(host.uploads.borrow()[0].1, "website.zip");
        assert!(!ws.join("website.zip").exists());
    }

    #[test]
    fn failed_build_does_not_stop_later_entries() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path();
        write_manifest(ws, vec![native("broken", None), native("fine", None)]);
        let config = PipelineConfig::default();
        let mut runner = FakeRunner::new(ws);
        runner.fail_on = Some("broken".to_string());
        let host = FakeHost::default();

        let report = Builder::new(&config, ws, &host, &runner)
            .run(Platform::Linux)
            .unwrap();

        assert!(report.get("broken").unwrap().is_failed());
        assert!(report.get("fine").unwrap().is_done());
    }
}
