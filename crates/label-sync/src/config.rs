//! Runtime configuration for the label sync service.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::LabelSyncError;
use crate::github::DEFAULT_API_URL;
use crate::reconcile::DEFAULT_CONCURRENCY;

/// Default time between sync passes.
pub const DEFAULT_INTERVAL_SECS: u64 = 600;

/// Environment variables checked, in order, for the GitHub token.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Configuration for the label sync service.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Desired-state label file.
    pub label_file: PathBuf,
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// GitHub API token.
    pub token: String,
    /// GitHub API root.
    pub api_url: String,
    /// Time between passes.
    pub interval: Duration,
    /// Label creations in flight at once.
    pub concurrency: usize,
}

impl SyncConfig {
    /// Build a configuration for `owner/repo`, reading the token from the environment.
    ///
    /// # Environment Variables
    /// - `GITHUB_TOKEN` or `GH_TOKEN`: API token (required)
    pub fn new(label_file: PathBuf, repository: &str) -> Result<Self, LabelSyncError> {
        let (owner, repo) = parse_repository(repository)?;
        Ok(Self {
            label_file,
            owner,
            repo,
            token: token_from_env()?,
            api_url: DEFAULT_API_URL.to_string(),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            concurrency: DEFAULT_CONCURRENCY,
        })
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Reject settings the control loop cannot run with.
    pub fn validate(&self) -> Result<(), LabelSyncError> {
        if self.interval.is_zero() {
            return Err(LabelSyncError::Configuration(
                "sync interval must be greater than zero".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(LabelSyncError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.token.trim().is_empty() {
            return Err(LabelSyncError::Configuration(
                "GitHub token is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Split an `owner/repo` slug.
pub fn parse_repository(repository: &str) -> Result<(String, String), LabelSyncError> {
    match repository.trim().split_once('/') {
        Some((owner, repo))
            if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
        {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(LabelSyncError::Configuration(format!(
            "repository must be in owner/repo format, got '{repository}'"
        ))),
    }
}

/// First non-empty token from [`TOKEN_ENV_VARS`].
pub fn token_from_env() -> Result<String, LabelSyncError> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            LabelSyncError::Configuration(format!(
                "{} not set",
                TOKEN_ENV_VARS.join(" or ")
            ))
        })
}
