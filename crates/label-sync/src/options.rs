//! Runtime-settable label file option.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::LabelSyncError;

/// Option name under which the host exposes the label file path.
pub const LABEL_FILE_OPTION: &str = "label-file";

/// Path to the desired-state label file, validated whenever it is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFileOption {
    path: PathBuf,
}

impl LabelFileOption {
    /// Create the option, failing fast if the path is empty or missing.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, LabelSyncError> {
        let path = path.into();
        validate_label_file(&path)?;
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the path. An invalid path is rejected and the old one kept.
    pub fn set(&mut self, path: impl Into<PathBuf>) -> Result<(), LabelSyncError> {
        let path = path.into();
        validate_label_file(&path)?;
        if path != self.path {
            info!(old = %self.path.display(), new = %path.display(), "Label file changed");
            self.path = path;
        }
        Ok(())
    }

    /// Apply a batch of changed host options, reacting only to `label-file`.
    ///
    /// Returns whether the label file option was part of the batch.
    pub fn apply_changes(
        &mut self,
        changed: &HashMap<String, String>,
    ) -> Result<bool, LabelSyncError> {
        match changed.get(LABEL_FILE_OPTION) {
            Some(value) => self.set(value).map(|()| true),
            None => Ok(false),
        }
    }
}

/// Check that the label file option names an existing file.
pub fn validate_label_file(path: &Path) -> Result<(), LabelSyncError> {
    if path.as_os_str().is_empty() {
        return Err(LabelSyncError::Configuration(format!(
            "no '{LABEL_FILE_OPTION}' option specified, cannot check labels"
        )));
    }
    if !path.exists() {
        return Err(LabelSyncError::Configuration(format!(
            "label file {} does not exist",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_rejected() {
        let err = LabelFileOption::new("").unwrap_err();
        assert!(matches!(err, LabelSyncError::Configuration(_)));
        assert!(err.to_string().contains("label-file"));
    }

    #[test]
    fn test_missing_path_rejected() {
        let err = LabelFileOption::new("/definitely/not/here/labels.yaml").unwrap_err();
        assert!(matches!(err, LabelSyncError::Configuration(_)));
    }

    #[test]
    fn test_set_keeps_old_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("labels.yaml");
        std::fs::write(&file, "labels: []\n").unwrap();

        let mut option = LabelFileOption::new(&file).unwrap();
        assert!(option.set(dir.path().join("missing.yaml")).is_err());
        assert_eq!(option.path(), file.as_path());
    }

    #[test]
    fn test_apply_changes() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.yaml");
        let second = dir.path().join("b.yaml");
        std::fs::write(&first, "labels: []\n").unwrap();
        std::fs::write(&second, "labels: []\n").unwrap();

        let mut option = LabelFileOption::new(&first).unwrap();

        let unrelated = HashMap::from([("period".to_string(), "5m".to_string())]);
        assert!(!option.apply_changes(&unrelated).unwrap());
        assert_eq!(option.path(), first.as_path());

        let changed = HashMap::from([(
            LABEL_FILE_OPTION.to_string(),
            second.display().to_string(),
        )]);
        assert!(option.apply_changes(&changed).unwrap());
        assert_eq!(option.path(), second.as_path());

        let emptied = HashMap::from([(LABEL_FILE_OPTION.to_string(), String::new())]);
        assert!(option.apply_changes(&emptied).is_err());
        assert_eq!(option.path(), second.as_path());
    }
}
