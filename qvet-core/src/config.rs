//! Configuration management for qvet
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (QVET_*)
//! 3. Config file (~/.config/qvet/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Which repository and branch to watch
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Repository owner (user or organisation)
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Branch whose head is compared against the latest release tag
    pub branch: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: "reinfer".to_string(),
            repo: "platform".to_string(),
            branch: "master".to_string(),
        }
    }
}

/// Release tag convention and refresh policy
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Tags starting with this prefix mark a production release
    pub tag_prefix: String,

    /// Tags starting with this (more specific) prefix are never releases
    pub excluded_tag_prefix: String,

    /// How often the comparison points are refreshed by `watch`
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            tag_prefix: "prod-".to_string(),
            excluded_tag_prefix: "prod-revert-".to_string(),
            poll_interval: Duration::from_secs(5 * 60),
        }
    }
}

/// Commit filtering
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CommitsConfig {
    /// Commits authored by this login are hidden from the overview
    pub bot_login: String,

    /// Name used for the bot in the "hidden" caption
    pub bot_display_name: String,
}

impl Default for CommitsConfig {
    fn default() -> Self {
        Self {
            bot_login: "rebors[bot]".to_string(),
            bot_display_name: "bors".to_string(),
        }
    }
}

/// Commit status channel used for QA sign-off
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Status context owned by qvet
    pub context: String,

    /// Target URL attached to every status qvet writes
    pub target_url: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            context: "qvet/qa".to_string(),
            target_url: "http://localhost:39105/".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub repository: RepositoryConfig,
    pub release: ReleaseConfig,
    pub commits: CommitsConfig,
    pub status: StatusConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration");
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/qvet/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("qvet").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - QVET_TAG_PREFIX: release tag prefix
    /// - QVET_BOT_LOGIN: login whose commits are hidden
    /// - QVET_STATUS_CONTEXT: status context to read and write
    /// - QVET_POLL_INTERVAL: refresh interval, e.g. `30s` or `5m`
    ///
    /// The repository and branch are taken from `QVET_REPO` and `QVET_BRANCH`
    /// by the CLI flag parser.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(prefix) = std::env::var("QVET_TAG_PREFIX") {
            self.release.tag_prefix = prefix;
        }

        if let Ok(login) = std::env::var("QVET_BOT_LOGIN") {
            self.commits.bot_login = login;
        }

        if let Ok(context) = std::env::var("QVET_STATUS_CONTEXT") {
            self.status.context = context;
        }

        if let Ok(interval) = std::env::var("QVET_POLL_INTERVAL") {
            self.release.poll_interval = parse_interval(&interval)?;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        repository: Option<(String, String)>,
        branch: Option<String>,
    ) -> Self {
        if let Some((owner, repo)) = repository {
            self.repository.owner = owner;
            self.repository.repo = repo;
        }

        if let Some(branch) = branch {
            self.repository.branch = branch;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        repository: Option<(String, String)>,
        branch: Option<String>,
    ) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        Ok(base
            .with_env_overrides()?
            .with_cli_overrides(repository, branch))
    }

    /// Validate values that would otherwise only fail at the first request
    pub fn validate(&self) -> Result<()> {
        if self.repository.owner.is_empty() || self.repository.repo.is_empty() {
            return Err(Error::Config(
                "repository owner and name must not be empty".to_string(),
            ));
        }
        if self.release.tag_prefix.is_empty() {
            return Err(Error::Config("release.tag_prefix must not be empty".to_string()));
        }
        if self.release.poll_interval.is_zero() {
            return Err(Error::Config(
                "release.poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.status.context.is_empty() {
            return Err(Error::Config("status.context must not be empty".to_string()));
        }
        Ok(())
    }
}

fn parse_interval(value: &str) -> Result<Duration> {
    humantime_serde::re::humantime::parse_duration(value.trim())
        .map_err(|e| Error::Config(format!("Invalid poll interval '{}': {}", value, e)))
}
