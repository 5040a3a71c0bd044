//! Handoff manifest between the prepare and build stages.
//!
//! The manifest lists exactly the releases created by `prepare`. Build jobs
//! on other machines act on it without re-deriving any decision. It is
//! written even when empty, which tells every build job there is no work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{PackageKind, PackageSpec};
use crate::error::{RelayError, Result};

/// One freshly created release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    pub tag_name: String,
    pub version: String,
    pub upload_url: String,

    /// Package directory relative to the workspace.
    pub path: PathBuf,

    #[serde(flatten)]
    pub kind: PackageKind,
}

impl ManifestEntry {
    pub fn new(spec: &PackageSpec, tag_name: &str, version: &str, upload_url: &str) -> Self {
        Self {
            id: spec.id.clone(),
            tag_name: tag_name.to_string(),
            version: version.to_string(),
            upload_url: upload_url.to_string(),
            path: spec.path.clone(),
            kind: spec.kind.clone(),
        }
    }
}

/// The document handed from `prepare` to `build`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_releases: Vec<ManifestEntry>,
}

impl HandoffManifest {
    /// Empty manifest stamped with the current time.
    pub fn new() -> Self {
        Self {
            generated_at: Some(Utc::now()),
            created_releases: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.created_releases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.created_releases.len()
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.created_releases.push(entry);
    }

    /// Write as two-space indented JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        fs::write(path, content)?;
        Ok(())
    }

    /// Read a manifest; a missing file is `Ok(None)`.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| RelayError::ManifestError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}
