//! In-place patch bump of a Cargo manifest version.

use std::fs;
use std::path::Path;
use toml_edit::{DocumentMut, Value};

use super::resolver::{lookup, lookup_mut, CARGO_VERSION_PATHS};
use super::semver::{parse_exact, VersionTriple};
use crate::error::{RelayError, Result};

/// A version before and after a bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bump {
    pub from: VersionTriple,
    pub to: VersionTriple,
}

/// Increment the patch component of the manifest's version, keeping the
/// rest of the file byte-for-byte.
///
/// Returns `Ok(None)` when the manifest has no plain `x.y.z` version or the
/// patch cannot be incremented, in which case nothing is written.
pub fn bump_cargo_patch(manifest: &Path) -> Result<Option<Bump>> {
    let content = fs::read_to_string(manifest)?;
    let mut doc: DocumentMut = content
        .parse()
        .map_err(|e: toml_edit::TomlError| RelayError::ConfigParseError {
            path: manifest.to_path_buf(),
            message: e.to_string(),
        })?;

    let Some(path) = CARGO_VERSION_PATHS
        .iter()
        .find(|path| lookup(&doc, path).and_then(|item| item.as_str()).is_some())
    else {
        return Ok(None);
    };

    let Some(item) = lookup_mut(&mut doc, path) else {
        return Ok(None);
    };
    let Some(value) = item.as_value_mut() else {
        return Ok(None);
    };
    let Some(from) = value.as_str().and_then(parse_exact) else {
        return Ok(None);
    };

    let Some(to) = from.bump_patch() else {
        return Ok(None);
    };
    let decor = value.decor().clone();
    *value = Value::from(to.to_string());
    *value.decor_mut() = decor;

    fs::write(manifest, doc.to_string())?;
    Ok(Some(Bump { from, to }))
}
