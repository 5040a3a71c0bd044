//! Release host API client.
//!
//! [`ReleaseHost`] is the seam the pipeline stages talk to; [`GitHubClient`]
//! implements it over the GitHub REST API with a blocking HTTP client.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

use super::release::{Asset, RemoteRelease};
use crate::config::ReleaseEnv;
use crate::error::{RelayError, Result};

/// Releases are listed as a single page of this size.
pub const RELEASES_PER_PAGE: u32 = 100;

const USER_AGENT: &str = "release-relay";

/// Operations the pipeline needs from the release host.
pub trait ReleaseHost {
    /// List existing releases (one page, order unspecified).
    fn list_releases(&self) -> Result<Vec<RemoteRelease>>;

    /// Create a release for an existing or new tag.
    fn create_release(&self, tag: &str, title: &str, body: &str) -> Result<RemoteRelease>;

    /// Upload a local file as an asset named after the file.
    fn upload_asset(&self, upload_url: &str, file: &Path) -> Result<Asset>;
}

/// GitHub REST API client for one repository.
pub struct GitHubClient {
    client: Client,
    api_base: String,
    owner: String,
    repo: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct CreateRelease<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    prerelease: bool,
}

impl GitHubClient {
    /// Create a client with a 30-second timeout.
    pub fn new(api_base: &str, env: &ReleaseEnv) -> Result<Self> {
        Self::with_timeout(api_base, env, Duration::from_secs(30))
    }

    /// Create a client with a custom timeout.
    pub fn with_timeout(api_base: &str, env: &ReleaseEnv, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            owner: env.owner.clone(),
            repo: env.repo.clone(),
            token: env.token.clone(),
        })
    }

    fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_base, self.owner, self.repo
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
    }
}

impl ReleaseHost for GitHubClient {
    fn list_releases(&self) -> Result<Vec<RemoteRelease>> {
        let url = format!("{}?per_page={}", self.releases_url(), RELEASES_PER_PAGE);
        tracing::debug!("GET {}", url);

        let response = self.authorized(self.client.get(&url)).send()?;
        let releases: Vec<RemoteRelease> = check_status(response, &url)?.json()?;

        tracing::debug!("Fetched {} releases", releases.len());
        Ok(releases)
    }

    fn create_release(&self, tag: &str, title: &str, body: &str) -> Result<RemoteRelease> {
        let url = self.releases_url();
        tracing::debug!("POST {} ({})", url, tag);

        let payload = CreateRelease {
            tag_name: tag,
            name: title,
            body,
            prerelease: false,
        };
        let response = self
            .authorized(self.client.post(&url))
            .json(&payload)
            .send()?;

        Ok(check_status(response, &url)?.json()?)
    }

    fn upload_asset(&self, upload_url: &str, file: &Path) -> Result<Asset> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| anyhow::anyhow!("{} has no file name", file.display()))?;

        let mut url = Url::parse(upload_endpoint(upload_url))
            .map_err(|e| anyhow::anyhow!("Invalid upload URL '{}': {}", upload_url, e))?;
        url.query_pairs_mut().append_pair("name", &name);
        tracing::debug!("POST {}", url);

        let body = File::open(file)?;
        let response = self
            .authorized(self.client.post(url.clone()))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()?;

        Ok(check_status(response, url.as_str())?.json()?)
    }
}

/// Strip the `{?name,label}` template suffix from an upload URL.
pub fn upload_endpoint(upload_url: &str) -> &str {
    upload_url
        .split_once('{')
        .map_or(upload_url, |(base, _)| base)
}

fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response.text().unwrap_or_default();
    tracing::debug!("{} responded {}: {}", url, status, detail);
    Err(RelayError::HttpStatus {
        status: status.as_u16(),
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn env() -> ReleaseEnv {
        ReleaseEnv {
            token: "test-token".to_string(),
            owner: "octo".to_string(),
            repo: "vault".to_string(),
            workspace: PathBuf::from("."),
        }
    }

    #[test]
    fn upload_endpoint_strips_template() {
        assert_eq!(
            upload_endpoint("https://uploads.github.com/repos/o/r/releases/7/assets{?name,label}"),
            "https://uploads.github.com/repos/o/r/releases/7/assets"
        );
        assert_eq!(upload_endpoint("https://u/assets"), "https://u/assets");
    }

    #[test]
    fn list_releases_sends_auth_and_page_size() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/octo/vault/releases")
                .query_param("per_page", "100")
                .header("Authorization", "Bearer test-token");
            then.status(200).json_body(serde_json::json!([
                {
                    "tag_name": "manga_dex@v0.2.0",
                    "upload_url": "https://uploads/1/assets{?name,label}",
                    "assets": [
                        {"name": "manga_dex.wasm", "browser_download_url": "https://dl/manga_dex.wasm"}
                    ]
                },
                {"tag_name": "scheduler@v1.0.0", "upload_url": "https://uploads/2/assets{?name,label}", "assets": []}
            ]));
        });

        let client = GitHubClient::new(&server.base_url(), &env()).unwrap();
        let releases = client.list_releases().unwrap();

        mock.assert();
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].tag_name, "manga_dex@v0.2.0");
        assert_eq!(releases[0].assets[0].download_url, "https://dl/manga_dex.wasm");
    }

    #[test]
    fn list_releases_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/vault/releases");
            then.status(401).body("Bad credentials");
        });

        let client = GitHubClient::new(&server.base_url(), &env()).unwrap();
        let err = client.list_releases().unwrap_err();
        assert!(matches!(err, RelayError::HttpStatus { status: 401, .. }));
    }

    #[test]
    fn create_release_returns_upload_url() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/repos/octo/vault/releases")
                .header("Authorization", "Bearer test-token")
                .json_body(serde_json::json!({
                    "tag_name": "gql-api@v1.1.0",
                    "name": "gql-api v1.1.0",
                    "body": "Automatic release for gql-api v1.1.0",
                    "prerelease": false
                }));
            then.status(201).json_body(serde_json::json!({
                "tag_name": "gql-api@v1.1.0",
                "upload_url": "https://uploads.github.com/repos/octo/vault/releases/42/assets{?name,label}",
                "assets": []
            }));
        });

        let client = GitHubClient::new(&server.base_url(), &env()).unwrap();
        let release = client
            .create_release(
                "gql-api@v1.1.0",
                "gql-api v1.1.0",
                "Automatic release for gql-api v1.1.0",
            )
            .unwrap();

        mock.assert();
        assert!(release.upload_url.contains("/releases/42/assets"));
    }

    #[test]
    fn create_release_conflict_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/repos/octo/vault/releases");
            then.status(422).body("already_exists");
        });

        let client = GitHubClient::new(&server.base_url(), &env()).unwrap();
        let err = client.create_release("a@v1.0.0", "a", "b").unwrap_err();
        assert!(matches!(err, RelayError::HttpStatus { status: 422, .. }));
    }

    #[test]
    fn upload_asset_streams_file_with_name() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/uploads/42/assets")
                .query_param("name", "manga-vault-linux-x86_64")
                .header("Content-Type", "application/octet-stream")
                .body("ELF-BYTES");
            then.status(201).json_body(serde_json::json!({
                "name": "manga-vault-linux-x86_64",
                "browser_download_url": "https://dl/manga-vault-linux-x86_64"
            }));
        });

        let temp = TempDir::new().unwrap();
        let file = temp.path().join("manga-vault-linux-x86_64");
        std::fs::write(&file, "ELF-BYTES").unwrap();

        let client = GitHubClient::new(&server.base_url(), &env()).unwrap();
        let template = format!("{}{{?name,label}}", server.url("/uploads/42/assets"));
        let asset = client.upload_asset(&template, &file).unwrap();

        mock.assert();
        assert_eq!(asset.name, "manga-vault-linux-x86_64");
    }

    #[test]
    fn upload_missing_file_is_io_error() {
        let server = MockServer::start();
        let client = GitHubClient::new(&server.base_url(), &env()).unwrap();
        let err = client
            .upload_asset(&server.url("/uploads/1/assets"), Path::new("/nonexistent/file.wasm"))
            .unwrap_err();
        assert!(matches!(err, RelayError::Io(_)));
    }
}
