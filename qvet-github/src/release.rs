//! Release gap: what is on the branch but not yet in production

use crate::{
    find_latest_prod_tag, CommitComparison, CommitSummary, Error, RepoHost, Result, Tag,
    TagSelector,
};
use qvet_core::Config;
use tracing::{debug, info};

/// Inputs for locating the release gap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapSettings {
    /// Branch compared against production
    pub branch: String,
    pub selector: TagSelector,
    /// Commits by this login are hidden
    pub bot_login: String,
}

impl From<&Config> for GapSettings {
    fn from(config: &Config) -> Self {
        Self {
            branch: config.repository.branch.clone(),
            selector: TagSelector::from(&config.release),
            bot_login: config.commits.bot_login.clone(),
        }
    }
}

/// Outcome of one release-gap lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseGap {
    /// No tag follows the release convention yet
    NoProdRelease { head_sha: String },
    /// Commits on the branch since the latest release tag
    Undeployed {
        head_sha: String,
        prod_tag: Tag,
        summary: CommitSummary,
    },
}

impl ReleaseGap {
    pub fn head_sha(&self) -> &str {
        match self {
            ReleaseGap::NoProdRelease { head_sha } | ReleaseGap::Undeployed { head_sha, .. } => {
                head_sha
            }
        }
    }
}

/// Comparison points: the branch head and the latest release tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonPoints {
    pub head_sha: String,
    pub prod_tag: Option<Tag>,
}

/// Get the SHA at the tip of a branch
pub async fn get_branch_head_sha<H>(host: &H, branch: &str) -> Result<String>
where
    H: RepoHost + ?Sized,
{
    let sha = host.branch_head_sha(branch).await?;
    debug!(repo = %host.repo(), branch, sha = %sha, "Resolved branch head");
    Ok(sha)
}

/// Compare `base...head`
pub async fn compare_commits<H>(host: &H, base: &str, head: &str) -> Result<CommitComparison>
where
    H: RepoHost + ?Sized,
{
    let comparison = host.compare(base, head).await?;
    info!(
        repo = %host.repo(),
        base,
        head,
        commits = comparison.commits.len(),
        "Compared commits"
    );
    Ok(comparison)
}

/// Resolve the branch head and the latest release tag concurrently
pub async fn find_comparison_points<H>(host: &H, settings: &GapSettings) -> Result<ComparisonPoints>
where
    H: RepoHost + ?Sized,
{
    let (head_sha, prod_tag) = tokio::try_join!(
        get_branch_head_sha(host, &settings.branch),
        find_latest_prod_tag(host, &settings.selector),
    )?;

    Ok(ComparisonPoints { head_sha, prod_tag })
}

/// Look up the release gap once
///
/// Failures are tagged with the stage that failed:
/// [`Error::ComparisonPoints`] or [`Error::Comparison`].
pub async fn find_release_gap<H>(host: &H, settings: &GapSettings) -> Result<ReleaseGap>
where
    H: RepoHost + ?Sized,
{
    ReleaseGapFinder::new(settings.clone()).find(host).await
}

/// Repeated release-gap lookups that reuse the last comparison
///
/// The comparison is keyed by `(base, head)`. While neither the branch head
/// nor the release tag moves, refreshing only re-reads the two comparison
/// points.
#[derive(Debug)]
pub struct ReleaseGapFinder {
    settings: GapSettings,
    cached: Option<((String, String), CommitComparison)>,
}

impl ReleaseGapFinder {
    pub fn new(settings: GapSettings) -> Self {
        Self {
            settings,
            cached: None,
        }
    }

    pub async fn find<H>(&mut self, host: &H) -> Result<ReleaseGap>
    where
        H: RepoHost + ?Sized,
    {
        let ComparisonPoints { head_sha, prod_tag } =
            find_comparison_points(host, &self.settings)
                .await
                .map_err(|e| Error::ComparisonPoints(Box::new(e)))?;

        let Some(prod_tag) = prod_tag else {
            info!(head = %head_sha, "No previous production release");
            return Ok(ReleaseGap::NoProdRelease { head_sha });
        };

        let key = (prod_tag.commit_sha.clone(), head_sha.clone());
        let cached = self
            .cached
            .as_ref()
            .filter(|(cached_key, _)| *cached_key == key)
            .map(|(_, comparison)| comparison.clone());

        let comparison = match cached {
            Some(comparison) => {
                debug!(base = %key.0, head = %key.1, "Comparison points unchanged");
                comparison
            }
            None => {
                let comparison = compare_commits(host, &key.0, &key.1)
                    .await
                    .map_err(|e| Error::Comparison(Box::new(e)))?;
                self.cached = Some((key, comparison.clone()));
                comparison
            }
        };

        Ok(ReleaseGap::Undeployed {
            head_sha,
            prod_tag,
            summary: CommitSummary::from_comparison(comparison, &self.settings.bot_login),
        })
    }
}
