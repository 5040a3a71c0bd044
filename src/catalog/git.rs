//! Release tags in the shared repository.

use std::path::PathBuf;

use crate::error::Result;
use crate::shell::run_checked;

/// Creates release tags and publishes them.
pub trait TagPublisher {
    /// Create an annotated tag at HEAD and push it to the shared remote.
    ///
    /// Nothing here guards against tagging the same version twice; callers
    /// only tag versions newer than anything released.
    fn create_tag_and_push(&self, tag: &str) -> Result<()>;
}

const REMOTE: &str = "origin";

/// Tags through the system `git` binary.
pub struct SystemGit {
    repo_dir: PathBuf,
}

impl SystemGit {
    /// Use the repository at `repo_dir`, pushing to `origin`.
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }
}

impl TagPublisher for SystemGit {
    fn create_tag_and_push(&self, tag: &str) -> Result<()> {
        let message = format!("Release {tag}");
        run_checked("git", &["tag", "-a", tag, "-m", message.as_str()], &self.repo_dir)?;
        run_checked("git", &["push", REMOTE, tag], &self.repo_dir)
    }
}
