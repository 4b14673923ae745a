//! Error types for label synchronization.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can end a reconciliation pass (or, for `Configuration`, startup).
#[derive(Debug, Error)]
pub enum LabelSyncError {
    /// Bad startup settings: label file option, repository slug, token
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Label file could not be read this iteration
    #[error("Failed to read the label config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Label file content does not match the expected schema
    #[error("Failed to decode the label config: {0}")]
    Decode(#[from] serde_yaml::Error),

    /// Listing the repository labels failed
    #[error("Failed to list repository labels: {0}")]
    RemoteList(#[source] GitHubLabelError),

    /// Creating a single label failed
    #[error("Failed to create label '{name}': {source}")]
    RemoteCreate {
        name: String,
        #[source]
        source: GitHubLabelError,
    },
}

/// Errors returned by a remote label accessor.
#[derive(Debug, Error)]
pub enum GitHubLabelError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("GitHub API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limit exceeded, reset in {reset_in:?}")]
    RateLimitExceeded { reset_in: Duration },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LabelSyncError {
    /// Short machine-friendly name of the failure kind, used as a log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Read { .. } => "read",
            Self::Decode(_) => "decode",
            Self::RemoteList(_) => "remote_list",
            Self::RemoteCreate { .. } => "remote_create",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = LabelSyncError::Configuration("missing".to_string());
        assert_eq!(err.kind(), "configuration");

        let err = LabelSyncError::RemoteCreate {
            name: "bug".to_string(),
            source: GitHubLabelError::ApiError {
                status: 422,
                message: "Validation Failed".to_string(),
            },
        };
        assert_eq!(err.kind(), "remote_create");
        assert_eq!(
            err.to_string(),
            "Failed to create label 'bug': GitHub API error: 422 - Validation Failed"
        );
    }

    #[test]
    fn test_read_error_mentions_path() {
        let err = LabelSyncError::Read {
            path: PathBuf::from("/etc/labels.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/etc/labels.yaml"));
        assert_eq!(err.kind(), "read");
    }
}
