//! Desired-state label file parsing.
//!
//! The label file is a YAML mapping with a single `labels` key:
//!
//! ```yaml
//! labels:
//!   - name: bug
//!     color: d73a4a
//!     description: Something isn't working
//!   - name: enhancement
//! ```

use serde::{Deserialize, Serialize};

use crate::error::LabelSyncError;

/// A single label, as declared in the label file or reported by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDefinition {
    /// Label name (unique key)
    pub name: String,
    /// Hex color, with or without a leading `#`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LabelDefinition {
    /// Create a label with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
            description: None,
        }
    }
}

/// Ordered list of labels declared by the label file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    pub labels: Vec<LabelDefinition>,
}

impl DesiredState {
    /// Decode the raw label file bytes.
    ///
    /// The `labels` key is required and must hold a sequence; write
    /// `labels: []` for an empty list, since a bare `labels:` is null and fails.
    pub fn from_yaml(bytes: &[u8]) -> Result<Self, LabelSyncError> {
        let state: Self = serde_yaml::from_slice(bytes)?;
        Ok(state)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
