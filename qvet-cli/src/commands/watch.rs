//! Continuously refreshed overview

use anyhow::Context;
use chrono::Local;
use clap::Args;
use qvet_core::Config;
use qvet_github::{GapSettings, ReleaseGapFinder, ReleaseGapWatcher, RepoHost};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::overview::load_statuses;
use crate::render::print_gap;

/// Refresh the overview on the configured poll interval
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Also show the QA status of every listed commit
    #[arg(short, long)]
    pub statuses: bool,
}

impl WatchArgs {
    /// Execute the watch command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let client = super::open_client(config)?;
        let interval = config.release.poll_interval;

        if verbose {
            println!(
                "Watching {} on {} every {}s (Ctrl-C to stop)",
                config.repository.branch,
                client.repo(),
                interval.as_secs()
            );
        }

        let cancel = CancellationToken::new();
        let finder = ReleaseGapFinder::new(GapSettings::from(config));
        let (mut updates, handle) =
            ReleaseGapWatcher::new(client.clone(), finder, interval).spawn(cancel.clone());

        let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Interrupted, stopping watch");
                    cancel.cancel();
                    break;
                }
                update = updates.recv() => {
                    let Some(update) = update else { break };

                    println!();
                    println!("--- {} ---", Local::now().format("%Y-%m-%d %H:%M:%S"));
                    match update {
                        Ok(gap) => {
                            let statuses = if self.statuses {
                                let context = &config.status.context;
                                match load_statuses(client.as_ref(), &gap, context).await {
                                    Ok(statuses) => Some(statuses),
                                    Err(e) => {
                                        println!("{:#}", e);
                                        None
                                    }
                                }
                            } else {
                                None
                            };
                            print_gap(&gap, config, statuses.as_ref());
                        }
                        Err(e) => println!("{}", e),
                    }
                }
            }
        }

        handle.await.context("Watcher task failed")?;
        Ok(())
    }
}
