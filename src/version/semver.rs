//! Version triples, comparison and maturity classification.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static LEADING_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:\.(\d+))?(?:\.(\d+))?").unwrap());

/// A `(major, minor, patch)` triple ordered lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionTriple {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Same triple with the patch component incremented, or `None` when
    /// the patch is already `u32::MAX`.
    pub fn bump_patch(self) -> Option<Self> {
        Some(Self {
            patch: self.patch.checked_add(1)?,
            ..self
        })
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parse the leading `major[.minor[.patch]]` of a version string.
///
/// Missing components default to 0. Returns `None` when the string does not
/// start with a number or a component is too large for `u32`.
pub fn try_parse(version: &str) -> Option<VersionTriple> {
    let caps = LEADING_VERSION.captures(version.trim())?;

    let component = |idx: usize| -> Option<u32> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    Some(VersionTriple::new(component(1)?, component(2)?, component(3)?))
}

/// Like [`try_parse`], but anything unparseable collapses to `0.0.0`.
pub fn parse(version: &str) -> VersionTriple {
    try_parse(version).unwrap_or_default()
}

/// Parse a version that must spell out all three components.
///
/// Used where a version is rewritten, so `"1.2"` or `"abc"` are rejected
/// instead of silently becoming something else.
pub fn parse_exact(version: &str) -> Option<VersionTriple> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(VersionTriple::new(major, minor, patch))
}

/// Whether `local` should be released given the best published version.
pub fn is_newer(local: &str, remote: Option<&str>) -> bool {
    match remote {
        None => true,
        Some(remote) => parse(local) > parse(remote),
    }
}

/// Maturity label derived purely from the version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    Alpha,
    Beta,
    Stable,
}

impl BuildState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildState::Alpha => "alpha",
            BuildState::Beta => "beta",
            BuildState::Stable => "stable",
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a version: major > 0 is stable, else minor > 0 is beta, else alpha.
pub fn classify(version: &str) -> BuildState {
    let triple = parse(version);
    if triple.major > 0 {
        BuildState::Stable
    } else if triple.minor > 0 {
        BuildState::Beta
    } else {
        BuildState::Alpha
    }
}
