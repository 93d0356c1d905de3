//! Commit comparison and bot filtering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commit as listed in a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    /// Login of the GitHub account the commit is attributed to, if any
    pub author_login: Option<String>,
    /// Git author name
    pub author_name: Option<String>,
    pub message: String,
    pub authored_at: Option<DateTime<Utc>>,
    pub html_url: String,
}

impl Commit {
    /// First line of the commit message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }

    /// Login if known, otherwise the git author name
    pub fn author_display(&self) -> &str {
        self.author_login
            .as_deref()
            .or(self.author_name.as_deref())
            .unwrap_or("unknown")
    }
}

/// How head relates to base in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonStatus {
    Ahead,
    Behind,
    Identical,
    Diverged,
}

/// Result of comparing two commits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitComparison {
    /// Human-viewable comparison page
    pub html_url: String,
    pub status: ComparisonStatus,
    pub ahead_by: u64,
    pub behind_by: u64,
    pub total_commits: u64,
    /// Commits in host order
    pub commits: Vec<Commit>,
}

/// Commits left after hiding bot commits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredCommits {
    /// Remaining commits, reverse of host order
    pub visible: Vec<Commit>,
    pub hidden_count: usize,
}

/// Drop commits attributed to `bot_login` and reverse the rest
///
/// Commits without an attributed login are always kept.
pub fn filter_and_order(commits: Vec<Commit>, bot_login: &str) -> FilteredCommits {
    let total = commits.len();
    let visible: Vec<Commit> = commits
        .into_iter()
        .rev()
        .filter(|c| c.author_login.as_deref() != Some(bot_login))
        .collect();

    FilteredCommits {
        hidden_count: total - visible.len(),
        visible,
    }
}

/// What the overview shows for one comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub html_url: String,
    pub commits: FilteredCommits,
}

impl CommitSummary {
    pub fn from_comparison(comparison: CommitComparison, bot_login: &str) -> Self {
        Self {
            html_url: comparison.html_url,
            commits: filter_and_order(comparison.commits, bot_login),
        }
    }

    /// "Showing N undeployed commits on <branch> ..." caption
    pub fn showing_caption(&self, branch: &str) -> String {
        format!(
            "Showing {} undeployed commits on {} (view the GitHub comparison: {}):",
            self.commits.visible.len(),
            branch,
            self.html_url
        )
    }

    /// "N commits from <bot> are hidden." caption
    pub fn hidden_caption(&self, bot_display_name: &str) -> String {
        format!(
            "{} commits from {} are hidden.",
            self.commits.hidden_count, bot_display_name
        )
    }
}
