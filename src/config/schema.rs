//! Configuration schema definitions.
//!
//! This module contains the struct definitions that map to the YAML
//! pipeline configuration file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pipeline::Platform;

/// Root configuration structure for the release pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name written at the top of the plugin registry document.
    pub registry_name: String,

    /// Handoff manifest location (relative to the workspace).
    pub manifest: PathBuf,

    /// Registry document location (relative to the workspace).
    pub registry_output: PathBuf,

    /// Platform that builds the platform-independent artifacts.
    pub primary_platform: Platform,

    /// Release host API root.
    pub api_base: String,

    /// Umbrella package bumped whenever anything else is released.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_package: Option<PackageSpec>,

    /// Released packages, processed in declaration order.
    pub packages: Vec<PackageSpec>,

    /// Plugins listed in the registry document.
    pub plugins: Vec<PluginSpec>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            registry_name: "dewn_plugins".to_string(),
            manifest: PathBuf::from("release_manifest.json"),
            registry_output: PathBuf::from("repo.json"),
            primary_platform: Platform::Linux,
            api_base: "https://api.github.com".to_string(),
            main_package: None,
            packages: Vec::new(),
            plugins: Vec::new(),
        }
    }
}

/// A package that can be released independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub id: String,

    /// Package directory relative to the workspace.
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Tag namespace; defaults to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_prefix: Option<String>,

    #[serde(flatten)]
    pub kind: PackageKind,
}

impl PackageSpec {
    /// Prefix used in `{prefix}@v{version}` tags.
    pub fn prefix(&self) -> &str {
        self.tag_prefix.as_deref().unwrap_or(&self.id)
    }

    /// Absolute package directory.
    pub fn dir(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.path)
    }
}

/// What a package builds and how its version is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PackageKind {
    /// A native executable built per platform.
    NativeBinary {
        #[serde(rename = "crate")]
        crate_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bin_name: Option<String>,
    },

    /// A platform-independent WebAssembly component.
    WasmComponent {
        #[serde(rename = "crate")]
        crate_name: String,
    },

    /// A script plugin shipped as its source file.
    InterpretedPlugin { plugin_file: String },

    /// A static web bundle shipped as a zip archive.
    WebBundle {
        archive_name: String,
        #[serde(default = "default_build_dir")]
        build_dir: String,
        #[serde(default = "default_install_command")]
        install_command: Vec<String>,
        #[serde(default = "default_build_command")]
        build_command: Vec<String>,
    },
}

impl PackageKind {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            PackageKind::NativeBinary { .. } => "native-binary",
            PackageKind::WasmComponent { .. } => "wasm-component",
            PackageKind::InterpretedPlugin { .. } => "interpreted-plugin",
            PackageKind::WebBundle { .. } => "web-bundle",
        }
    }

    /// Whether the artifact is the same on every platform.
    pub fn is_platform_independent(&self) -> bool {
        !matches!(self, PackageKind::NativeBinary { .. })
    }
}

/// A plugin listed in the registry document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSpec {
    pub id: String,
    pub artifact: PluginArtifact,
}

/// The kind of file a plugin release carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginArtifact {
    Wasm,
    Lua,
}

impl PluginArtifact {
    /// Asset file extension, including the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            PluginArtifact::Wasm => ".wasm",
            PluginArtifact::Lua => ".lua",
        }
    }

    /// Key used in the registry entry's `urls` map.
    pub fn label(&self) -> &'static str {
        match self {
            PluginArtifact::Wasm => "wasm",
            PluginArtifact::Lua => "lua",
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_build_dir() -> String {
    "build".to_string()
}

fn default_install_command() -> Vec<String> {
    vec!["bun".to_string(), "install".to_string()]
}

fn default_build_command() -> Vec<String> {
    vec!["bun".to_string(), "run".to_string(), "build".to_string()]
}
