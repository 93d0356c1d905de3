//! QA sign-off through a commit status

use std::fmt;

use crate::{RepoHost, Result};
use chrono::{DateTime, Utc};
use qvet_core::StatusConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// State of a commit status as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Success,
    Failure,
    Pending,
    Error,
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusState::Success => "success",
            StatusState::Failure => "failure",
            StatusState::Pending => "pending",
            StatusState::Error => "error",
        };
        f.write_str(s)
    }
}

/// States qvet writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteableState {
    Success,
    Failure,
    Pending,
}

impl WriteableState {
    /// Verb used in the status description
    pub fn description_stem(self) -> &'static str {
        match self {
            WriteableState::Success => "Approved",
            WriteableState::Failure => "Rejected",
            WriteableState::Pending => "Cleared",
        }
    }

    /// `"<Stem> by <login>"`
    pub fn description(self, actor_login: &str) -> String {
        format!("{} by {}", self.description_stem(), actor_login)
    }
}

impl From<WriteableState> for StatusState {
    fn from(state: WriteableState) -> Self {
        match state {
            WriteableState::Success => StatusState::Success,
            WriteableState::Failure => StatusState::Failure,
            WriteableState::Pending => StatusState::Pending,
        }
    }
}

/// A status attached to a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    pub context: String,
    pub state: StatusState,
    pub description: Option<String>,
    pub target_url: Option<String>,
    pub creator_login: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of a status write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStatus {
    pub state: WriteableState,
    pub target_url: String,
    pub description: String,
    pub context: String,
}

/// Where qvet's statuses live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSettings {
    pub context: String,
    pub target_url: String,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self::from(&StatusConfig::default())
    }
}

impl From<&StatusConfig> for StatusSettings {
    fn from(config: &StatusConfig) -> Self {
        Self {
            context: config.context.clone(),
            target_url: config.target_url.clone(),
        }
    }
}

/// Read the status qvet owns on a commit
///
/// Returns the first status with a matching context in host order, which on
/// GitHub is the most recent one.
pub async fn read_status<H>(host: &H, sha: &str, context: &str) -> Result<Option<CommitStatus>>
where
    H: RepoHost + ?Sized,
{
    debug!(repo = %host.repo(), sha, context, "Reading commit status");

    let status = host
        .list_statuses(sha)
        .await?
        .into_iter()
        .find(|s| s.context == context);

    debug!(sha, found = status.is_some(), "Read commit status");
    Ok(status)
}

/// Login recorded as the actor of a status write
pub async fn current_login<H>(host: &H) -> Result<String>
where
    H: RepoHost + ?Sized,
{
    let login = host.authenticated_login().await?;
    debug!(login = %login, "Resolved authenticated user");
    Ok(login)
}

/// Record a QA decision on a commit
///
/// Every call creates a new status entry; the host keeps the history.
pub async fn write_status<H>(
    host: &H,
    sha: &str,
    actor_login: &str,
    state: WriteableState,
    settings: &StatusSettings,
) -> Result<CommitStatus>
where
    H: RepoHost + ?Sized,
{
    let status = NewStatus {
        state,
        target_url: settings.target_url.clone(),
        description: state.description(actor_login),
        context: settings.context.clone(),
    };

    let created = host.create_status(sha, &status).await?;
    info!(
        repo = %host.repo(),
        sha,
        state = %created.state,
        description = ?created.description,
        "Wrote commit status"
    );

    Ok(created)
}
