//! Remote label accessor abstraction.

use async_trait::async_trait;

use crate::desired::LabelDefinition;
use crate::error::GitHubLabelError;

/// The two operations the syncer needs from a repository host.
#[async_trait]
pub trait LabelAccessor: Send + Sync {
    /// List every label currently defined on the repository.
    async fn list_labels(&self) -> Result<Vec<LabelDefinition>, GitHubLabelError>;

    /// Create exactly one label.
    async fn create_label(&self, label: &LabelDefinition) -> Result<(), GitHubLabelError>;
}
