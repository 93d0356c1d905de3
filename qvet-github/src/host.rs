//! Repository host access
//!
//! [`RepoHost`] is the seam between qvet's logic and GitHub. The octocrab
//! implementation deserializes every response into the private payload
//! structs below and converts them once into the public types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::{
    Commit, CommitComparison, CommitStatus, ComparisonStatus, Error, GitHubClient, NewStatus,
    RepoRef, Result, StatusState, Tag,
};

/// Operations qvet needs from a repository host
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Repository every call refers to
    fn repo(&self) -> &RepoRef;

    /// One page of tags, 1-based, in host order
    async fn list_tags(&self, page: u32, per_page: u8) -> Result<Vec<Tag>>;

    /// SHA of the commit at the tip of `branch`
    async fn branch_head_sha(&self, branch: &str) -> Result<String>;

    /// Commits reachable from `head` but not from `base`
    async fn compare(&self, base: &str, head: &str) -> Result<CommitComparison>;

    /// Statuses attached to a commit reference, most recent first
    async fn list_statuses(&self, reference: &str) -> Result<Vec<CommitStatus>>;

    /// Attach a new status to a commit
    async fn create_status(&self, sha: &str, status: &NewStatus) -> Result<CommitStatus>;

    /// Login of the account the host authenticated us as
    async fn authenticated_login(&self) -> Result<String>;
}

#[async_trait]
impl RepoHost for GitHubClient {
    fn repo(&self) -> &RepoRef {
        self.repo_ref()
    }

    async fn list_tags(&self, page: u32, per_page: u8) -> Result<Vec<Tag>> {
        debug!(page, per_page, "Listing tags");

        let route = format!("{}/tags", self.repo_ref().route());
        let tags: Vec<TagPayload> = self
            .client()
            .get(route, Some(&PageParams { per_page, page }))
            .await
            .map_err(Error::Api)?;

        Ok(tags.into_iter().map(Tag::from).collect())
    }

    async fn branch_head_sha(&self, branch: &str) -> Result<String> {
        debug!(branch, "Fetching branch head");

        let route = format!("{}/branches/{}", self.repo_ref().route(), branch);
        let payload: BranchPayload = self
            .client()
            .get(route, None::<&()>)
            .await
            .map_err(Error::Api)?;

        Ok(payload.commit.sha)
    }

    async fn compare(&self, base: &str, head: &str) -> Result<CommitComparison> {
        debug!(base, head, "Comparing commits");

        let route = format!("{}/compare/{}...{}", self.repo_ref().route(), base, head);
        let payload: ComparisonPayload = self
            .client()
            .get(route, None::<&()>)
            .await
            .map_err(Error::Api)?;

        Ok(payload.into())
    }

    async fn list_statuses(&self, reference: &str) -> Result<Vec<CommitStatus>> {
        debug!(reference, "Listing commit statuses");

        let route = format!("{}/commits/{}/statuses", self.repo_ref().route(), reference);
        let statuses: Vec<StatusPayload> = self
            .client()
            .get(route, Some(&PageParams { per_page: 100, page: 1 }))
            .await
            .map_err(Error::Api)?;

        Ok(statuses.into_iter().map(CommitStatus::from).collect())
    }

    async fn create_status(&self, sha: &str, status: &NewStatus) -> Result<CommitStatus> {
        debug!(sha, context = %status.context, "Creating commit status");

        let route = format!("{}/statuses/{}", self.repo_ref().route(), sha);
        let payload: StatusPayload = self
            .client()
            .post(route, Some(status))
            .await
            .map_err(Error::Api)?;

        Ok(payload.into())
    }

    async fn authenticated_login(&self) -> Result<String> {
        let user: UserPayload = self
            .client()
            .get("/user", None::<&()>)
            .await
            .map_err(Error::Api)?;

        Ok(user.login)
    }
}

#[derive(Debug, serde::Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Debug, Deserialize)]
struct TagPayload {
    name: String,
    commit: CommitRefPayload,
}

#[derive(Debug, Deserialize)]
struct CommitRefPayload {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct BranchPayload {
    commit: CommitRefPayload,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ComparisonPayload {
    html_url: String,
    status: ComparisonStatus,
    ahead_by: u64,
    behind_by: u64,
    total_commits: u64,
    commits: Vec<CommitPayload>,
}

#[derive(Debug, Deserialize)]
struct CommitPayload {
    sha: String,
    html_url: String,
    commit: GitCommitPayload,
    /// Linked GitHub account; absent when the author email matches no user
    author: Option<UserPayload>,
}

#[derive(Debug, Deserialize)]
struct GitCommitPayload {
    message: String,
    author: Option<GitActorPayload>,
}

#[derive(Debug, Deserialize)]
struct GitActorPayload {
    name: Option<String>,
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    context: String,
    state: StatusState,
    description: Option<String>,
    target_url: Option<String>,
    creator: Option<UserPayload>,
    created_at: Option<DateTime<Utc>>,
}

impl From<TagPayload> for Tag {
    fn from(tag: TagPayload) -> Self {
        Tag {
            name: tag.name,
            commit_sha: tag.commit.sha,
        }
    }
}

impl From<CommitPayload> for Commit {
    fn from(commit: CommitPayload) -> Self {
        let (author_name, authored_at) = match commit.commit.author {
            Some(actor) => (actor.name, actor.date),
            None => (None, None),
        };

        Commit {
            sha: commit.sha,
            author_login: commit.author.map(|u| u.login),
            author_name,
            message: commit.commit.message,
            authored_at,
            html_url: commit.html_url,
        }
    }
}

impl From<ComparisonPayload> for CommitComparison {
    fn from(payload: ComparisonPayload) -> Self {
        CommitComparison {
            html_url: payload.html_url,
            status: payload.status,
            ahead_by: payload.ahead_by,
            behind_by: payload.behind_by,
            total_commits: payload.total_commits,
            commits: payload.commits.into_iter().map(Commit::from).collect(),
        }
    }
}

impl From<StatusPayload> for CommitStatus {
    fn from(status: StatusPayload) -> Self {
        CommitStatus {
            context: status.context,
            state: status.state,
            description: status.description,
            target_url: status.target_url,
            creator_login: status.creator.map(|u| u.login),
            created_at: status.created_at,
        }
    }
}
