//! Local version resolution.
//!
//! Each [`PackageKind`] declares its version in a different manifest. The
//! readers here never fail: a missing file, a missing key or a malformed
//! document all resolve to `None`, and the caller decides to skip.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use toml_edit::{DocumentMut, Item};

use crate::config::{PackageKind, PackageSpec};

/// Key paths checked in a Cargo manifest, in priority order.
pub(crate) const CARGO_VERSION_PATHS: &[&[&str]] = &[
    &["package", "version"],
    &["workspace", "package", "version"],
    &["version"],
];

static PLUGIN_VERSION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"PLUGIN_VERSION\s*=\s*["']([\d.]+[^\n"']*)["']"#).unwrap()
});

static INFO_ACCESSOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)function\s+Get_info\s*\(\s*\)\s*return\s*\{(?P<body>.*?)\}\s*end").unwrap()
});

static TABLE_VERSION_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bversion\s*=\s*["']([^"'\n]+)["']"#).unwrap());

/// Where a package declares its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// `Cargo.toml` key/value table.
    CargoManifest(PathBuf),
    /// Script source with a version marker or info accessor.
    PluginSource(PathBuf),
    /// `package.json` object document.
    PackageJson(PathBuf),
}

impl VersionSource {
    /// The manifest a package's version is read from.
    pub fn for_package(spec: &PackageSpec, workspace: &Path) -> Self {
        let dir = spec.dir(workspace);
        match &spec.kind {
            PackageKind::NativeBinary { .. } | PackageKind::WasmComponent { .. } => {
                VersionSource::CargoManifest(dir.join("Cargo.toml"))
            }
            PackageKind::InterpretedPlugin { plugin_file } => {
                VersionSource::PluginSource(dir.join(plugin_file))
            }
            PackageKind::WebBundle { .. } => VersionSource::PackageJson(dir.join("package.json")),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            VersionSource::CargoManifest(p)
            | VersionSource::PluginSource(p)
            | VersionSource::PackageJson(p) => p,
        }
    }

    /// Read the declared version.
    pub fn read(&self) -> Option<String> {
        let content = fs::read_to_string(self.path()).ok()?;
        let version = match self {
            VersionSource::CargoManifest(_) => cargo_version(&content),
            VersionSource::PluginSource(_) => plugin_version(&content),
            VersionSource::PackageJson(_) => package_json_version(&content),
        }?;

        let version = version.trim();
        if version.is_empty() {
            None
        } else {
            Some(version.to_string())
        }
    }
}

/// Resolve the locally declared version of a package.
pub fn resolve_local_version(spec: &PackageSpec, workspace: &Path) -> Option<String> {
    let source = VersionSource::for_package(spec, workspace);
    let version = source.read();
    if version.is_none() {
        tracing::debug!(
            "No version found for {} in {}",
            spec.id,
            source.path().display()
        );
    }
    version
}

/// Version from `[package]`, `[workspace.package]` or the top level.
///
/// Non-string values such as `version.workspace = true` do not count.
pub fn cargo_version(content: &str) -> Option<String> {
    let doc: DocumentMut = content.parse().ok()?;
    CARGO_VERSION_PATHS
        .iter()
        .find_map(|path| lookup(&doc, path).and_then(Item::as_str))
        .map(String::from)
}

/// Version from a `PLUGIN_VERSION = "..."` marker, falling back to the
/// `version` field of the table returned by `Get_info()`.
pub fn plugin_version(content: &str) -> Option<String> {
    if let Some(caps) = PLUGIN_VERSION_MARKER.captures(content) {
        return Some(caps[1].trim().to_string());
    }

    let body = INFO_ACCESSOR.captures(content)?.name("body")?.as_str();
    TABLE_VERSION_FIELD
        .captures(body)
        .map(|caps| caps[1].trim().to_string())
}

/// Top-level string `version` of a JSON object.
pub fn package_json_version(content: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(content).ok()?;
    value.get("version")?.as_str().map(String::from)
}

pub(crate) fn lookup<'a>(doc: &'a DocumentMut, path: &[&str]) -> Option<&'a Item> {
    let (first, rest) = path.split_first()?;
    let mut item = doc.as_table().get(first)?;
    for key in rest {
        item = item.get(*key)?;
    }
    Some(item)
}

pub(crate) fn lookup_mut<'a>(doc: &'a mut DocumentMut, path: &[&str]) -> Option<&'a mut Item> {
    let (first, rest) = path.split_first()?;
    let mut item = doc.as_table_mut().get_mut(first)?;
    for key in rest {
        item = item.get_mut(*key)?;
    }
    Some(item)
}
