//! One-shot release gap overview

use std::collections::HashMap;

use anyhow::Context;
use clap::Args;
use qvet_core::Config;
use qvet_github::{find_release_gap, read_status, GapSettings, ReleaseGap, RepoHost};

use crate::render::{print_gap, StatusColumn};

/// Show commits on the branch that are not in production yet
#[derive(Args, Debug)]
pub struct OverviewArgs {
    /// Also show the QA status of every listed commit
    #[arg(short, long)]
    pub statuses: bool,
}

impl OverviewArgs {
    /// Execute the overview command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let client = super::open_client(config)?;

        if verbose {
            println!(
                "Comparing {} on {} with the latest {}* tag...",
                config.repository.branch,
                client.repo(),
                config.release.tag_prefix
            );
        }

        // The error already names the stage that failed
        let gap = find_release_gap(client.as_ref(), &GapSettings::from(config)).await?;

        let statuses = if self.statuses {
            Some(load_statuses(client.as_ref(), &gap, &config.status.context).await?)
        } else {
            None
        };

        print_gap(&gap, config, statuses.as_ref());
        Ok(())
    }
}

/// QA status of every visible commit, by SHA
pub(crate) async fn load_statuses<H>(
    host: &H,
    gap: &ReleaseGap,
    context: &str,
) -> anyhow::Result<StatusColumn>
where
    H: RepoHost + ?Sized,
{
    let mut statuses = HashMap::new();
    if let ReleaseGap::Undeployed { summary, .. } = gap {
        for commit in &summary.commits.visible {
            let status = read_status(host, &commit.sha, context)
                .await
                .with_context(|| format!("Error loading status of {}", commit.short_sha()))?;
            statuses.insert(commit.sha.clone(), status);
        }
    }
    Ok(statuses)
}
