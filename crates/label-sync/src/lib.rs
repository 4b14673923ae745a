//! Label sync keeps a repository's labels in line with a desired-state file.
//!
//! This crate provides:
//! - YAML desired-state parsing
//! - Content fingerprinting so unchanged files cost no API calls
//! - Additive reconciliation: missing labels are created, nothing is removed
//! - A GitHub REST implementation of the label accessor
//!
//! # Usage
//!
//! ```no_run
//! use label_sync::{GitHubLabelClient, LabelFileOption, LabelSyncer, Reconciler};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GitHubLabelClient::new(
//!     std::env::var("GITHUB_TOKEN")?,
//!     "kubernetes".to_string(),
//!     "test-infra".to_string(),
//! )?;
//! let label_file = LabelFileOption::new("labels.yaml")?;
//! let mut syncer = LabelSyncer::new(label_file, client, Reconciler::default());
//!
//! // Call once per control loop iteration
//! syncer.run_once().await?;
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod config;
pub mod desired;
pub mod error;
pub mod fingerprint;
pub mod github;
pub mod options;
pub mod reconcile;
pub mod syncer;

pub use accessor::LabelAccessor;
pub use config::SyncConfig;
pub use desired::{DesiredState, LabelDefinition};
pub use error::{GitHubLabelError, LabelSyncError};
pub use fingerprint::Fingerprint;
pub use github::GitHubLabelClient;
pub use options::{LabelFileOption, LABEL_FILE_OPTION};
pub use reconcile::{ReconcileReport, Reconciler};
pub use syncer::{LabelSyncer, PassOutcome};
