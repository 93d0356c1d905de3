//! qvet GitHub - release gap and QA sign-off on GitHub
//!
//! This crate finds the commits on a branch that are newer than the latest
//! production tag, hides bot commits from that list, and reads and writes
//! the commit status qvet uses to record manual QA.

mod client;
mod commits;
mod error;
mod host;
mod release;
mod status;
mod tags;
mod watch;

#[cfg(test)]
mod testing;

pub use client::{GitHubClient, RepoRef};
pub use commits::{
    filter_and_order, Commit, CommitComparison, CommitSummary, ComparisonStatus, FilteredCommits,
};
pub use error::{Error, Result};
pub use host::RepoHost;
pub use release::{
    compare_commits, find_comparison_points, find_release_gap, get_branch_head_sha,
    ComparisonPoints, GapSettings, ReleaseGap, ReleaseGapFinder,
};
pub use status::{
    current_login, read_status, write_status, CommitStatus, NewStatus, StatusSettings,
    StatusState, WriteableState,
};
pub use tags::{find_latest_prod_tag, Tag, TagSelector, TAGS_PER_PAGE};
pub use watch::ReleaseGapWatcher;
