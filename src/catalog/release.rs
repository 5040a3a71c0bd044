//! Remote release snapshots and tag-prefix matching.
//!
//! Every package's releases live in one shared repository, namespaced by
//! tags of the form `{prefix}@v{version}`. A tag belongs to a prefix only
//! if it starts with exactly `{prefix}@v`, so `gql` never claims
//! `gql-api@v1.0.0`.

use serde::{Deserialize, Serialize};

use crate::version::semver::parse;

/// A release as listed by the release host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRelease {
    pub tag_name: String,

    /// Upload URL template, e.g. `https://uploads.example/…/assets{?name,label}`.
    #[serde(default)]
    pub upload_url: String,

    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,

    #[serde(rename = "browser_download_url", default)]
    pub download_url: String,
}

impl RemoteRelease {
    /// Version part of the tag if it belongs to `prefix`.
    pub fn version_for(&self, prefix: &str) -> Option<&str> {
        tag_version(&self.tag_name, prefix)
    }
}

/// Build the tag for a package version.
pub fn release_tag(prefix: &str, version: &str) -> String {
    format!("{}@v{}", prefix, version)
}

/// Version part of `tag` when it starts with exactly `{prefix}@v`.
pub fn tag_version<'a>(tag: &'a str, prefix: &str) -> Option<&'a str> {
    let version = tag.trim().strip_prefix(prefix)?.strip_prefix("@v")?;
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

/// The release with the highest version for `prefix`.
///
/// Ties keep the first release encountered.
pub fn best_release_for_prefix<'a>(
    releases: &'a [RemoteRelease],
    prefix: &str,
) -> Option<&'a RemoteRelease> {
    let mut best: Option<(&RemoteRelease, _)> = None;

    for release in releases {
        let Some(version) = release.version_for(prefix) else {
            continue;
        };
        let triple = parse(version);
        match best {
            Some((_, best_triple)) if triple <= best_triple => {}
            _ => best = Some((release, triple)),
        }
    }

    best.map(|(release, _)| release)
}

/// The highest published version for `prefix`.
pub fn best_version_for_prefix(releases: &[RemoteRelease], prefix: &str) -> Option<String> {
    best_release_for_prefix(releases, prefix)
        .and_then(|release| release.version_for(prefix))
        .map(String::from)
}

/// Pick the asset carrying `extension`.
///
/// An asset whose name ends with the extension wins. Failing that, the
/// first asset whose name merely contains it is taken; that fallback can
/// match unrelated files such as `x.wasm.sig` and exists only for
/// releases whose assets were named inconsistently.
pub fn pick_asset<'a>(assets: &'a [Asset], extension: &str) -> Option<&'a Asset> {
    let wanted = extension.to_lowercase();

    assets
        .iter()
        .find(|asset| asset.name.to_lowercase().ends_with(&wanted))
        .or_else(|| {
            assets
                .iter()
                .find(|asset| asset.name.to_lowercase().contains(&wanted))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str) -> RemoteRelease {
        RemoteRelease {
            tag_name: tag.to_string(),
            upload_url: format!("https://uploads.example/{tag}/assets{{?name,label}}"),
            assets: Vec::new(),
        }
    }

    fn asset(name: &str) -> Asset {
        Asset {
            name: name.to_string(),
            download_url: format!("https://dl.example/{name}"),
        }
    }

    #[test]
    fn tag_format() {
        assert_eq!(release_tag("manga_dex", "0.4.1"), "manga_dex@v0.4.1");
    }

    #[test]
    fn tag_version_requires_exact_separator() {
        assert_eq!(tag_version("gql@v1.0.0", "gql"), Some("1.0.0"));
        assert_eq!(tag_version("gql-api@v1.0.0", "gql"), None);
        assert_eq!(tag_version("gql@1.0.0", "gql"), None);
        assert_eq!(tag_version("gql@v", "gql"), None);
        assert_eq!(tag_version("other@v1.0.0", "gql"), None);
    }

    #[test]
    fn substring_prefix_is_not_matched() {
        let releases = vec![release("gql-api@v1.0.0")];
        assert_eq!(best_version_for_prefix(&releases, "gql"), None);
        assert_eq!(
            best_version_for_prefix(&releases, "gql-api"),
            Some("1.0.0".to_string())
        );
    }

    #[test]
    fn best_version_is_highest_not_newest() {
        let releases = vec![
            release("scheduler@v1.2.0"),
            release("scheduler@v1.10.0"),
            release("scheduler@v1.9.3"),
            release("website-server@v9.0.0"),
        ];
        assert_eq!(
            best_version_for_prefix(&releases, "scheduler"),
            Some("1.10.0".to_string())
        );
    }

    #[test]
    fn no_matching_release() {
        assert_eq!(best_version_for_prefix(&[], "scheduler"), None);
        assert!(best_release_for_prefix(&[release("a@v1.0.0")], "b").is_none());
    }

    #[test]
    fn best_release_keeps_first_on_tie() {
        let mut first = release("a@v1.0.0");
        first.upload_url = "first".to_string();
        let mut second = release("a@v1.0");
        second.upload_url = "second".to_string();

        let releases = vec![first, second];
        let best = best_release_for_prefix(&releases, "a").unwrap();
        assert_eq!(best.upload_url, "first");
    }

    #[test]
    fn exact_extension_beats_substring() {
        let assets = vec![asset("x.wasm.sig"), asset("x.wasm")];
        assert_eq!(pick_asset(&assets, ".wasm").unwrap().name, "x.wasm");

        let assets = vec![asset("x.wasm"), asset("x.wasm.sig")];
        assert_eq!(pick_asset(&assets, ".wasm").unwrap().name, "x.wasm");
    }

    #[test]
    fn substring_fallback_is_used_without_exact_match() {
        let assets = vec![asset("README.md"), asset("plugin.lua.txt")];
        assert_eq!(pick_asset(&assets, ".lua").unwrap().name, "plugin.lua.txt");
    }

    #[test]
    fn extension_match_ignores_case() {
        let assets = vec![asset("Scraper.WASM")];
        assert_eq!(pick_asset(&assets, ".wasm").unwrap().name, "Scraper.WASM");
    }

    #[test]
    fn no_asset_matches() {
        let assets = vec![asset("notes.txt")];
        assert!(pick_asset(&assets, ".wasm").is_none());
    }

    #[test]
    fn deserializes_host_payload() {
        let json = r#"{
            "id": 1,
            "tag_name": "hari_manga@v0.1.0",
            "upload_url": "https://uploads.github.com/repos/o/r/releases/1/assets{?name,label}",
            "assets": [
                {"name": "hari_manga.wasm", "browser_download_url": "https://github.com/o/r/releases/download/hari_manga@v0.1.0/hari_manga.wasm", "size": 10}
            ]
        }"#;
        let release: RemoteRelease = serde_json::from_str(json).unwrap();
        assert_eq!(release.version_for("hari_manga"), Some("0.1.0"));
        assert_eq!(release.assets[0].name, "hari_manga.wasm");
        assert!(release.assets[0].download_url.ends_with("hari_manga.wasm"));
    }
}
