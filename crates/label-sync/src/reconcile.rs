//! # Label Reconciler
//!
//! Adds every desired label whose name is missing from the repository.
//! Existing labels are never removed or modified, and one failed creation
//! does not stop the others.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::{error, info};

use crate::accessor::LabelAccessor;
use crate::desired::LabelDefinition;
use crate::error::{GitHubLabelError, LabelSyncError};

/// Default number of label creations in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Results of a reconciliation pass
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Names of labels created in this pass
    pub created: Vec<String>,
    /// One `RemoteCreate` error per label that failed to create
    pub failed: Vec<LabelSyncError>,
}

impl ReconcileReport {
    /// Number of creation calls issued.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.created.len() + self.failed.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Names of the labels that failed to create.
    pub fn failed_names(&self) -> impl Iterator<Item = &str> {
        self.failed.iter().filter_map(|e| match e {
            LabelSyncError::RemoteCreate { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Desired labels whose names are absent remotely, first occurrence wins.
pub fn missing_labels<'a>(
    remote: &[LabelDefinition],
    desired: &'a [LabelDefinition],
) -> Vec<&'a LabelDefinition> {
    let remote_names: HashSet<&str> = remote.iter().map(|l| l.name.as_str()).collect();
    let mut seen = HashSet::new();
    let mut missing = Vec::new();

    for label in desired {
        let name = label.name.as_str();
        if !remote_names.contains(name) && seen.insert(name) {
            missing.push(label);
        }
    }

    missing
}

/// Creates missing labels with bounded concurrency.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    concurrency: usize,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl Reconciler {
    /// Create a reconciler; a concurrency of zero is treated as one.
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Create every desired label missing from the `remote` snapshot.
    pub async fn reconcile<A>(
        &self,
        accessor: &A,
        remote: &[LabelDefinition],
        desired: &[LabelDefinition],
    ) -> ReconcileReport
    where
        A: LabelAccessor + ?Sized,
    {
        let missing = missing_labels(remote, desired);
        if missing.is_empty() {
            info!(desired = desired.len(), "All desired labels already exist");
            return ReconcileReport::default();
        }

        info!(
            missing = missing.len(),
            concurrency = self.concurrency,
            "Creating missing labels"
        );

        let results: Vec<(String, Result<(), GitHubLabelError>)> = stream::iter(missing)
            .map(|label| async move {
                (label.name.clone(), accessor.create_label(label).await)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = ReconcileReport::default();
        for (name, result) in results {
            match result {
                Ok(()) => report.created.push(name),
                Err(source) => {
                    error!(label = %name, error = %source, "Error adding label");
                    report
                        .failed
                        .push(LabelSyncError::RemoteCreate { name, source });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<LabelDefinition> {
        names.iter().map(|n| LabelDefinition::named(*n)).collect()
    }

    fn names<'a>(labels: &[&'a LabelDefinition]) -> Vec<&'a str> {
        labels.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_missing_labels_set_difference() {
        let remote = labels(&["bug"]);
        let desired = labels(&["bug", "enhancement"]);
        assert_eq!(names(&missing_labels(&remote, &desired)), vec!["enhancement"]);
    }

    #[test]
    fn test_missing_labels_nothing_missing() {
        let remote = labels(&["bug", "enhancement", "extra"]);
        let desired = labels(&["enhancement", "bug"]);
        assert!(missing_labels(&remote, &desired).is_empty());
    }

    #[test]
    fn test_missing_labels_dedups_by_name() {
        let remote = labels(&[]);
        let mut desired = labels(&["a", "b"]);
        desired.push(LabelDefinition {
            name: "a".to_string(),
            color: Some("ffffff".to_string()),
            description: None,
        });

        let missing = missing_labels(&remote, &desired);
        assert_eq!(names(&missing), vec!["a", "b"]);
        assert!(missing[0].color.is_none());
    }

    #[test]
    fn test_missing_labels_ignores_remote_attributes() {
        let remote = vec![LabelDefinition {
            name: "bug".to_string(),
            color: Some("000000".to_string()),
            description: Some("old".to_string()),
        }];
        let desired = vec![LabelDefinition {
            name: "bug".to_string(),
            color: Some("d73a4a".to_string()),
            description: Some("new".to_string()),
        }];
        assert!(missing_labels(&remote, &desired).is_empty());
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        assert_eq!(Reconciler::new(0).concurrency(), 1);
        assert_eq!(Reconciler::default().concurrency(), DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_report_counts() {
        let report = ReconcileReport {
            created: vec!["a".to_string(), "c".to_string()],
            failed: vec![LabelSyncError::RemoteCreate {
                name: "b".to_string(),
                source: GitHubLabelError::ApiError {
                    status: 422,
                    message: "Validation Failed".to_string(),
                },
            }],
        };
        assert_eq!(report.attempted(), 3);
        assert!(!report.is_clean());
        assert_eq!(report.failed_names().collect::<Vec<_>>(), vec!["b"]);
    }
}
