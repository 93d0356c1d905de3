//! GitHub API client using octocrab

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};
use octocrab::Octocrab;
use qvet_core::Secrets;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Identifies a repository on the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse a repository reference
    ///
    /// Supports formats:
    /// - owner/repo
    /// - https://github.com/owner/repo
    /// - git@github.com:owner/repo.git
    pub fn parse(url: &str) -> Result<Self> {
        let (owner, repo) = parse_github_url(url)?;
        Ok(Self { owner, repo })
    }

    /// REST route prefix, `/repos/{owner}/{repo}`
    pub(crate) fn route(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// GitHub API client bound to one repository
pub struct GitHubClient {
    client: Octocrab,
    repo: RepoRef,
}

impl GitHubClient {
    /// Create a new GitHub client for the specified repository
    ///
    /// Token is loaded from (in priority order):
    /// 1. GITHUB_TOKEN / GH_TOKEN environment variables
    /// 2. ~/.config/qvet/secrets.toml
    pub fn new(repo: RepoRef) -> Result<Self> {
        let secrets = Secrets::load().map_err(|e| Error::Auth(e.to_string()))?;

        let token = secrets.github_token().ok_or_else(|| {
            Error::Auth(
                "GitHub token not found. Set GITHUB_TOKEN environment variable \
                 or add token to ~/.config/qvet/secrets.toml"
                    .to_string(),
            )
        })?;

        Self::with_token(repo, token)
    }

    /// Create a client with an explicit personal access token
    pub fn with_token(repo: RepoRef, token: String) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!(repo = %repo, "Created GitHub client");

        Ok(Self { client, repo })
    }

    /// Get the repository this client talks to
    pub fn repo_ref(&self) -> &RepoRef {
        &self.repo
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

fn split_owner_repo(path: &str, original: &str) -> Result<(String, String)> {
    let path = path.trim_matches('/').trim_end_matches(".git");
    let mut parts = path.split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            original
        ))),
    }
}

/// Parse a GitHub URL into owner and repo
fn parse_github_url(url: &str) -> Result<(String, String)> {
    if url.starts_with("https://") || url.starts_with("http://") {
        let parsed = url::Url::parse(url).map_err(|e| Error::Parse(e.to_string()))?;
        return split_owner_repo(parsed.path(), url);
    }

    if let Some(rest) = url.strip_prefix("git@") {
        return match rest.split_once(':') {
            Some((_host, path)) => split_owner_repo(path, url),
            None => Err(Error::Parse(format!("Invalid SSH URL: {}", url))),
        };
    }

    if url.contains("://") || url.split('/').count() != 2 {
        return Err(Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            url
        )));
    }

    split_owner_repo(url, url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shorthand() {
        let repo = RepoRef::parse("reinfer/platform").unwrap();
        assert_eq!(repo, RepoRef::new("reinfer", "platform"));
        assert_eq!(repo.to_string(), "reinfer/platform");
    }

    #[test]
    fn test_parse_https_url() {
        let repo = RepoRef::parse("https://github.com/owner/repo.git").unwrap();
        assert_eq!(repo.owner, "owner");
        assert_eq!(repo.repo, "repo");
    }

    #[test]
    fn test_parse_ssh_url() {
        let repo: RepoRef = "git@github.com:owner/repo.git".parse().unwrap();
        assert_eq!(repo.owner, "owner");
        assert_eq!(repo.repo, "repo");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(RepoRef::parse("invalid").is_err());
        assert!(RepoRef::parse("a/b/c").is_err());
        assert!(RepoRef::parse("/repo").is_err());
        assert!(RepoRef::parse("git@github.com").is_err());
    }

    #[test]
    fn test_route() {
        assert_eq!(RepoRef::new("o", "r").route(), "/repos/o/r");
    }
}
