//! qvet - what's on master that isn't in prod yet, and has it been QA'd?

mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use qvet_core::{Config, Secrets};
use qvet_github::RepoRef;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{OverviewArgs, StatusArgs, WatchArgs};

/// qvet: track undeployed commits and their QA sign-off
#[derive(Parser, Debug)]
#[command(name = "qvet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository (owner/repo or GitHub URL, overrides config)
    #[arg(long, global = true, env = "QVET_REPO")]
    repo: Option<String>,

    /// Branch to compare against production (overrides config)
    #[arg(long, global = true, env = "QVET_BRANCH")]
    branch: Option<String>,

    /// Config file (defaults to ~/.config/qvet/config.toml)
    #[arg(long, global = true, env = "QVET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Show commits not yet deployed to production
    #[command(visible_alias = "o")]
    Overview(OverviewArgs),

    /// Keep the overview up to date until interrupted
    #[command(visible_alias = "w")]
    Watch(WatchArgs),

    /// Read or record QA sign-off on a commit
    Status(StatusArgs),

    /// Show current configuration
    Config,

    /// Create a secrets file template for the GitHub token
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let repository = cli
        .repo
        .as_deref()
        .map(RepoRef::parse)
        .transpose()?
        .map(|r| (r.owner, r.repo));

    let config = Config::load_with_overrides(cli.config.as_deref(), repository, cli.branch.clone())
        .context("Failed to load configuration")?;
    config.validate()?;

    if cli.verbose {
        tracing::info!(
            owner = %config.repository.owner,
            repo = %config.repository.repo,
            branch = %config.repository.branch,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("qvet {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Overview(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Watch(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Status(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Config) => {
            print_config(&config, cli.config.as_deref());
        }
        Some(Commands::Init) => {
            let path = Secrets::default_secrets_path()
                .context("Could not determine the config directory")?;
            Secrets::create_template(&path)?;
            println!("Created {}", path.display());
            println!("Add a GitHub token there, or set GITHUB_TOKEN.");
        }
        None => {
            println!("qvet - undeployed commits and QA sign-off");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config, explicit_path: Option<&std::path::Path>) {
    println!("qvet Configuration");
    println!("==================");
    println!();
    println!("Repository:");
    println!("  repository: {}/{}", config.repository.owner, config.repository.repo);
    println!("  branch: {}", config.repository.branch);
    println!();
    println!("Release:");
    println!("  tag_prefix: {}", config.release.tag_prefix);
    println!("  excluded_tag_prefix: {}", config.release.excluded_tag_prefix);
    println!(
        "  poll_interval: {}s",
        config.release.poll_interval.as_secs()
    );
    println!();
    println!("Commits:");
    println!("  bot_login: {}", config.commits.bot_login);
    println!("  bot_display_name: {}", config.commits.bot_display_name);
    println!();
    println!("Status:");
    println!("  context: {}", config.status.context);
    println!("  target_url: {}", config.status.target_url);
    println!();

    let path = explicit_path
        .map(std::path::Path::to_path_buf)
        .or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
