//! GitHub token lookup for qvet
//!
//! The token lives outside `config.toml` so the configuration can be shared
//! freely. The secrets file is `~/.config/qvet/secrets.toml` and must not be
//! readable by group or others on Unix.
//!
//! Lookup order:
//! 1. `GITHUB_TOKEN`, then `GH_TOKEN`
//! 2. Secrets file

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variables checked for a token, in order
const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

const TEMPLATE: &str = r#"# qvet secrets
# Keep this file private (chmod 600) and out of version control.

[github]
# Personal access token, created at https://github.com/settings/tokens
# Needs read access to contents and read/write access to commit statuses.
token = ""
"#;

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    pub github: GitHubSecrets,
}

/// GitHub-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub Personal Access Token
    pub token: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns empty secrets if the file doesn't exist
    pub fn load() -> Result<Self> {
        match Self::default_secrets_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load secrets from a specific file, refusing files others can read
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        check_permissions(path)?;

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        secrets.github.token = secrets
            .github
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/qvet/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("qvet").join("secrets.toml"))
    }

    /// GitHub token, environment first
    pub fn github_token(&self) -> Option<String> {
        for var in TOKEN_ENV_VARS {
            if let Ok(token) = std::env::var(var) {
                let token = token.trim();
                if !token.is_empty() {
                    debug!(var, "Using GitHub token from environment");
                    return Some(token.to_string());
                }
            }
        }

        self.github.token.clone().inspect(|_| {
            debug!("Using GitHub token from secrets file");
        })
    }

    /// Write an empty secrets template with owner-only permissions
    pub fn create_template(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        std::fs::write(path, TEMPLATE).map_err(Error::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .map_err(Error::Io)?;
        }

        warn!(path = %path.display(), "Created secrets template - add your GitHub token");

        Ok(())
    }
}

#[cfg(unix)]
fn check_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path).map_err(Error::Io)?.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(Error::Config(format!(
            "Secrets file {} has insecure permissions {:o}. Please run: chmod 600 {}",
            path.display(),
            mode & 0o777,
            path.display()
        )));
    }

    Ok(())
}
