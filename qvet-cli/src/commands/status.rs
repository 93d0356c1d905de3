//! QA sign-off on individual commits

use anyhow::Context;
use clap::{Args, Subcommand, ValueEnum};
use qvet_core::Config;
use qvet_github::{current_login, read_status, write_status, StatusSettings, WriteableState};

use crate::render::describe_status;

/// Read or record QA sign-off on a commit
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(subcommand)]
    pub command: StatusCommand,
}

#[derive(Subcommand, Debug)]
pub enum StatusCommand {
    /// Show the QA status of a commit
    Get {
        /// Commit SHA
        sha: String,
    },

    /// Approve, reject or clear QA on a commit
    Set {
        /// Commit SHA
        sha: String,

        /// QA decision
        decision: Decision,

        /// Login recorded in the description (defaults to the token owner)
        #[arg(long = "as")]
        actor: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Decision {
    Approve,
    Reject,
    Clear,
}

impl From<Decision> for WriteableState {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => WriteableState::Success,
            Decision::Reject => WriteableState::Failure,
            Decision::Clear => WriteableState::Pending,
        }
    }
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let client = super::open_client(config)?;

        match &self.command {
            StatusCommand::Get { sha } => {
                let status = read_status(client.as_ref(), sha, &config.status.context)
                    .await
                    .context("Error loading commit status")?;
                match status {
                    Some(status) => println!("{}: {}", sha, describe_status(&status)),
                    None => println!("{}: no {} status", sha, config.status.context),
                }
            }
            StatusCommand::Set {
                sha,
                decision,
                actor,
            } => {
                let actor = match actor {
                    Some(actor) => actor.clone(),
                    None => current_login(client.as_ref())
                        .await
                        .context("Error resolving the authenticated user")?,
                };

                if verbose {
                    println!("Recording {:?} on {} as {}...", decision, sha, actor);
                }

                let status = write_status(
                    client.as_ref(),
                    sha,
                    &actor,
                    (*decision).into(),
                    &StatusSettings::from(&config.status),
                )
                .await
                .context("Error writing commit status")?;
                println!("{}: {}", sha, describe_status(&status));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_mapping() {
        assert_eq!(WriteableState::from(Decision::Approve), WriteableState::Success);
        assert_eq!(WriteableState::from(Decision::Reject), WriteableState::Failure);
        assert_eq!(WriteableState::from(Decision::Clear), WriteableState::Pending);
    }
}
