//! Release catalog: what is already published and how to publish more.
//!
//! - [`release`] - release snapshots, tag-prefix matching, asset selection
//! - [`client`] - the [`ReleaseHost`] seam and its GitHub implementation
//! - [`git`] - the [`TagPublisher`] seam and its system-git implementation

pub mod client;
pub mod git;
pub mod release;

pub use client::{upload_endpoint, GitHubClient, ReleaseHost, RELEASES_PER_PAGE};
pub use git::{SystemGit, TagPublisher};
pub use release::{
    best_release_for_prefix, best_version_for_prefix, pick_asset, release_tag, tag_version, Asset,
    RemoteRelease,
};
