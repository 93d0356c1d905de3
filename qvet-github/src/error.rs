//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error (transport, auth, not found, ...)
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Host failure reported by a `RepoHost` that is not backed by octocrab
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Resolving the branch head or the release tag failed
    #[error("Error loading comparison points: {0}")]
    ComparisonPoints(#[source] Box<Error>),

    /// Comparing the release tag with the branch head failed
    #[error("Error loading comparison: {0}")]
    Comparison(#[source] Box<Error>),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Whether this error came from a call to the host
    ///
    /// Every host failure surfaces as-is; nothing is retried locally.
    pub fn is_upstream(&self) -> bool {
        match self {
            Error::Api(_) | Error::Upstream(_) => true,
            Error::ComparisonPoints(inner) | Error::Comparison(inner) => inner.is_upstream(),
            Error::Auth(_) | Error::Parse(_) => false,
        }
    }
}
