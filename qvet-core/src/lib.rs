//! qvet core - configuration and secrets shared by the qvet crates
//!
//! Everything that used to be a hidden literal (bot login, status context,
//! tag convention, poll interval) lives in [`Config`] and is injected at
//! startup.

pub mod config;
pub mod error;
pub mod secrets;

pub use config::{CommitsConfig, Config, ReleaseConfig, RepositoryConfig, StatusConfig};
pub use error::{Error, Result};
pub use secrets::{GitHubSecrets, Secrets};
