//! In-memory host for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    Commit, CommitComparison, CommitStatus, ComparisonStatus, Error, NewStatus, RepoHost,
    RepoRef, Result, Tag,
};

pub(crate) fn commit(sha: &str, login: Option<&str>) -> Commit {
    Commit {
        sha: sha.to_string(),
        author_login: login.map(str::to_string),
        author_name: None,
        message: format!("Commit {}", sha),
        authored_at: None,
        html_url: format!("https://github.com/o/r/commit/{}", sha),
    }
}

pub(crate) fn comparison(commits: Vec<Commit>) -> CommitComparison {
    let count = commits.len() as u64;
    CommitComparison {
        html_url: "https://github.com/o/r/compare/base...head".to_string(),
        status: if count == 0 {
            ComparisonStatus::Identical
        } else {
            ComparisonStatus::Ahead
        },
        ahead_by: count,
        behind_by: 0,
        total_commits: count,
        commits,
    }
}

#[derive(Debug)]
pub(crate) struct FakeHost {
    repo: RepoRef,
    tags: Vec<Tag>,
    branches: Mutex<HashMap<String, String>>,
    comparisons: HashMap<(String, String), CommitComparison>,
    statuses: Mutex<HashMap<String, Vec<CommitStatus>>>,
    login: String,
    fail: bool,
    branch_delay: Option<Duration>,
    branch_lookups: AtomicUsize,
    tag_pages: AtomicUsize,
    compares: AtomicUsize,
}

impl FakeHost {
    pub(crate) fn new() -> Self {
        Self {
            repo: RepoRef::new("reinfer", "platform"),
            tags: Vec::new(),
            branches: Mutex::new(HashMap::new()),
            comparisons: HashMap::new(),
            statuses: Mutex::new(HashMap::new()),
            login: "carol".to_string(),
            fail: false,
            branch_delay: None,
            branch_lookups: AtomicUsize::new(0),
            tag_pages: AtomicUsize::new(0),
            compares: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub(crate) fn with_branch(self, branch: &str, sha: &str) -> Self {
        self.move_branch(branch, sha);
        self
    }

    pub(crate) fn with_comparison(
        mut self,
        base: &str,
        head: &str,
        comparison: CommitComparison,
    ) -> Self {
        self.comparisons
            .insert((base.to_string(), head.to_string()), comparison);
        self
    }

    /// Statuses in host order (most recent first)
    pub(crate) fn with_statuses(self, sha: &str, statuses: Vec<CommitStatus>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(sha.to_string(), statuses);
        self
    }

    /// Every call fails
    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Branch lookups take `delay` before answering
    pub(crate) fn with_branch_delay(mut self, delay: Duration) -> Self {
        self.branch_delay = Some(delay);
        self
    }

    /// Branch lookups that ran to completion
    pub(crate) fn branch_lookups_finished(&self) -> usize {
        self.branch_lookups.load(Ordering::SeqCst)
    }

    pub(crate) fn move_branch(&self, branch: &str, sha: &str) {
        self.branches
            .lock()
            .unwrap()
            .insert(branch.to_string(), sha.to_string());
    }

    pub(crate) fn statuses_for(&self, sha: &str) -> Vec<CommitStatus> {
        self.statuses
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn tag_pages_fetched(&self) -> usize {
        self.tag_pages.load(Ordering::SeqCst)
    }

    pub(crate) fn compare_calls(&self) -> usize {
        self.compares.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(Error::Upstream("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RepoHost for FakeHost {
    fn repo(&self) -> &RepoRef {
        &self.repo
    }

    async fn list_tags(&self, page: u32, per_page: u8) -> Result<Vec<Tag>> {
        self.check()?;
        self.tag_pages.fetch_add(1, Ordering::SeqCst);

        let per_page = usize::from(per_page);
        let start = (page as usize - 1) * per_page;
        Ok(self.tags.iter().skip(start).take(per_page).cloned().collect())
    }

    async fn branch_head_sha(&self, branch: &str) -> Result<String> {
        self.check()?;
        if let Some(delay) = self.branch_delay {
            tokio::time::sleep(delay).await;
        }
        self.branch_lookups.fetch_add(1, Ordering::SeqCst);
        self.branches
            .lock()
            .unwrap()
            .get(branch)
            .cloned()
            .ok_or_else(|| Error::Upstream(format!("Branch not found: {}", branch)))
    }

    async fn compare(&self, base: &str, head: &str) -> Result<CommitComparison> {
        self.check()?;
        self.compares.fetch_add(1, Ordering::SeqCst);
        self.comparisons
            .get(&(base.to_string(), head.to_string()))
            .cloned()
            .ok_or_else(|| Error::Upstream(format!("No common ancestor: {}...{}", base, head)))
    }

    async fn list_statuses(&self, reference: &str) -> Result<Vec<CommitStatus>> {
        self.check()?;
        Ok(self.statuses_for(reference))
    }

    async fn create_status(&self, sha: &str, status: &NewStatus) -> Result<CommitStatus> {
        self.check()?;
        let created = CommitStatus {
            context: status.context.clone(),
            state: status.state.into(),
            description: Some(status.description.clone()),
            target_url: Some(status.target_url.clone()),
            creator_login: Some(self.login.clone()),
            created_at: None,
        };

        self.statuses
            .lock()
            .unwrap()
            .entry(sha.to_string())
            .or_default()
            .insert(0, created.clone());
        Ok(created)
    }

    async fn authenticated_login(&self) -> Result<String> {
        self.check()?;
        Ok(self.login.clone())
    }
}
