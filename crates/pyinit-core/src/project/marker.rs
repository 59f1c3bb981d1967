//! Completion marker written as the last step of a successful run

use crate::error::BootstrapError;
use std::fs;
use std::path::{Path, PathBuf};

/// Marker file name, relative to the project root
pub const COMPLETION_MARKER: &str = ".pyinit.lock";

/// Fixed content of the marker. Never parsed.
pub const MARKER_TOKEN: &str = "ok";

/// The marker inside one project root
#[derive(Debug, Clone)]
pub struct CompletionMarker {
    path: PathBuf,
}

impl CompletionMarker {
    pub fn in_root(root: &Path) -> Self {
        Self {
            path: root.join(COMPLETION_MARKER),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn write(&self) -> Result<(), BootstrapError> {
        fs::write(&self.path, MARKER_TOKEN)
            .map_err(|e| BootstrapError::io("Failed to write completion marker", e))
    }

    pub fn remove(&self) -> Result<(), BootstrapError> {
        fs::remove_file(&self.path)
            .map_err(|e| BootstrapError::io("Failed to remove completion marker", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let marker = CompletionMarker::in_root(dir.path());
        assert!(!marker.exists());

        marker.write().unwrap();
        assert!(marker.exists());
        assert_eq!(fs::read_to_string(marker.path()).unwrap(), MARKER_TOKEN);

        marker.remove().unwrap();
        assert!(!marker.exists());
    }

    #[test]
    fn test_content_is_irrelevant() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(COMPLETION_MARKER), "anything at all").unwrap();
        assert!(CompletionMarker::in_root(dir.path()).exists());
    }
}
