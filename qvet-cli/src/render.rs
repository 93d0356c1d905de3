//! Terminal rendering of the overview

use std::collections::HashMap;

use qvet_core::Config;
use qvet_github::{Commit, CommitStatus, ReleaseGap, StatusState};

/// QA status per commit SHA; `None` means no qvet status yet
pub type StatusColumn = HashMap<String, Option<CommitStatus>>;

pub fn print_gap(gap: &ReleaseGap, config: &Config, statuses: Option<&StatusColumn>) {
    for line in render_gap(gap, config, statuses) {
        println!("{}", line);
    }
}

/// Lines printed for a release gap
pub fn render_gap(
    gap: &ReleaseGap,
    config: &Config,
    statuses: Option<&StatusColumn>,
) -> Vec<String> {
    let mut lines = Vec::new();

    match gap {
        ReleaseGap::NoProdRelease { head_sha } => {
            lines.push(format!(
                "No previous prod release ({} is at {})",
                config.repository.branch,
                short(head_sha)
            ));
        }
        ReleaseGap::Undeployed {
            prod_tag, summary, ..
        } => {
            lines.push(format!(
                "Latest release: {} ({})",
                prod_tag.name,
                short(&prod_tag.commit_sha)
            ));
            lines.push(String::new());

            for commit in &summary.commits.visible {
                let status = statuses
                    .map(|s| status_cell(s.get(&commit.sha).and_then(Option::as_ref)));
                lines.push(commit_row(commit, status));
            }
            if !summary.commits.visible.is_empty() {
                lines.push(String::new());
            }

            lines.push(summary.showing_caption(&config.repository.branch));
            lines.push(summary.hidden_caption(&config.commits.bot_display_name));
        }
    }

    lines
}

fn commit_row(commit: &Commit, status: Option<&str>) -> String {
    let date = commit
        .authored_at
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    match status {
        Some(status) => format!(
            "{}  {:<9} {:<20} {:<16} {}",
            commit.short_sha(),
            status,
            commit.author_display(),
            date,
            commit.summary()
        ),
        None => format!(
            "{}  {:<20} {:<16} {}",
            commit.short_sha(),
            commit.author_display(),
            date,
            commit.summary()
        ),
    }
}

fn status_cell(status: Option<&CommitStatus>) -> &'static str {
    match status.map(|s| s.state) {
        Some(StatusState::Success) => "approved",
        Some(StatusState::Failure) => "rejected",
        Some(StatusState::Error) => "error",
        Some(StatusState::Pending) | None => "-",
    }
}

/// One-line description of a status
pub fn describe_status(status: &CommitStatus) -> String {
    match &status.description {
        Some(description) => format!("{} ({})", status.state, description),
        None => status.state.to_string(),
    }
}

fn short(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
