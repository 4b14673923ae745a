//! # Label Sync Loop Driver
//!
//! One call to [`LabelSyncer::run_once`] is one reconciliation pass:
//!
//! 1. Read the label file (every pass, it is cheap)
//! 2. Fingerprint the bytes; stop if unchanged since the last completed pass
//! 3. Decode the desired state
//! 4. List the repository labels
//! 5. Create the missing ones
//! 6. Remember the fingerprint
//!
//! Read, decode and list failures abort the pass without touching the stored
//! fingerprint, so the next pass retries from the same baseline. A pass that
//! reaches step 5 commits the fingerprint even when some creations failed.

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::accessor::LabelAccessor;
use crate::desired::{DesiredState, LabelDefinition};
use crate::error::LabelSyncError;
use crate::fingerprint::{self, Fingerprint};
use crate::options::LabelFileOption;
use crate::reconcile::{missing_labels, ReconcileReport, Reconciler};

/// What a single pass did.
#[derive(Debug)]
pub enum PassOutcome {
    /// Label file identical to the last completed pass; nothing was called
    Unchanged,
    /// Reconciliation ran to completion
    Reconciled(ReconcileReport),
}

/// Owns the label file option and the fingerprint of the last completed pass.
pub struct LabelSyncer<A> {
    label_file: LabelFileOption,
    accessor: A,
    reconciler: Reconciler,
    prev_fingerprint: Option<Fingerprint>,
}

impl<A: LabelAccessor> LabelSyncer<A> {
    #[must_use]
    pub fn new(label_file: LabelFileOption, accessor: A, reconciler: Reconciler) -> Self {
        Self {
            label_file,
            accessor,
            reconciler,
            prev_fingerprint: None,
        }
    }

    #[must_use]
    pub fn label_file(&self) -> &Path {
        self.label_file.path()
    }

    #[must_use]
    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    /// Fingerprint of the last completed pass, if any.
    #[must_use]
    pub fn last_fingerprint(&self) -> Option<&Fingerprint> {
        self.prev_fingerprint.as_ref()
    }

    /// Host option update hook; re-validates the label file when it changed.
    pub fn options_changed(
        &mut self,
        changed: &HashMap<String, String>,
    ) -> Result<(), LabelSyncError> {
        self.label_file.apply_changes(changed).map(|_| ())
    }

    async fn read_label_file(&self) -> Result<Vec<u8>, LabelSyncError> {
        let path = self.label_file.path();
        tokio::fs::read(path)
            .await
            .map_err(|source| LabelSyncError::Read {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn fetch_remote(&self) -> Result<Vec<LabelDefinition>, LabelSyncError> {
        self.accessor
            .list_labels()
            .await
            .map_err(LabelSyncError::RemoteList)
    }

    /// Run one reconciliation pass.
    pub async fn run_once(&mut self) -> Result<PassOutcome, LabelSyncError> {
        let contents = self.read_label_file().await?;
        let current = Fingerprint::of(&contents);

        if !fingerprint::changed(self.prev_fingerprint.as_ref(), &current) {
            debug!(fingerprint = %current, "Label file unchanged, skipping");
            return Ok(PassOutcome::Unchanged);
        }

        let desired = DesiredState::from_yaml(&contents)?;
        let remote = self.fetch_remote().await?;

        debug!(
            desired = desired.len(),
            remote = remote.len(),
            "Reconciling labels"
        );

        let report = self
            .reconciler
            .reconcile(&self.accessor, &remote, &desired.labels)
            .await;

        if report.is_clean() {
            info!(
                created = report.created.len(),
                fingerprint = %current,
                "Label sync pass complete"
            );
        } else {
            warn!(
                created = report.created.len(),
                failed = report.failed.len(),
                fingerprint = %current,
                "Label sync pass complete with failures; not retried until the label file changes"
            );
        }

        self.prev_fingerprint = Some(current);
        Ok(PassOutcome::Reconciled(report))
    }

    /// Labels a pass would create right now, without creating them.
    ///
    /// Ignores and does not update the stored fingerprint.
    pub async fn plan(&self) -> Result<Vec<LabelDefinition>, LabelSyncError> {
        let contents = self.read_label_file().await?;
        let desired = DesiredState::from_yaml(&contents)?;
        let remote = self.fetch_remote().await?;

        Ok(missing_labels(&remote, &desired.labels)
            .into_iter()
            .cloned()
            .collect())
    }
}
