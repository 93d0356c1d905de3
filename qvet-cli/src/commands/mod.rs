//! CLI command implementations

pub mod overview;
pub mod status;
pub mod watch;

pub use overview::OverviewArgs;
pub use status::StatusArgs;
pub use watch::WatchArgs;

use std::sync::Arc;

use anyhow::Context;
use qvet_core::Config;
use qvet_github::{GitHubClient, RepoRef};

/// Client for the configured repository
pub(crate) fn open_client(config: &Config) -> anyhow::Result<Arc<GitHubClient>> {
    let repo = RepoRef::new(&config.repository.owner, &config.repository.repo);
    let client = GitHubClient::new(repo).context("Failed to create GitHub client")?;
    Ok(Arc::new(client))
}
