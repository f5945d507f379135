//! Read-only view of the shared task store's JSON export.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::task::SchedulableTask;

/// Tasks read from a `data.json` export. Every other collection in the
/// export (projects, areas, settings) is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskSnapshot {
    #[serde(default)]
    pub tasks: Vec<SchedulableTask>,
}

impl TaskSnapshot {
    /// Load a snapshot from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| CoreError::TaskDataUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn find(&self, id: &str) -> Option<&SchedulableTask> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskStatus, TimeEstimate};
    use tempfile::TempDir;

    const EXPORT: &str = r#"{
        "tasks": [
            {"id": "t1", "title": "Review PR", "status": "next",
             "startTime": "2026-03-02T10:00:00Z", "timeEstimate": "1hr",
             "createdAt": "2026-03-01T08:00:00Z", "updatedAt": "2026-03-01T08:00:00Z"},
            {"id": "t2", "title": "Archive notes", "status": "done",
             "completedAt": "2026-03-01T09:00:00Z"}
        ],
        "projects": [{"id": "p1", "title": "Ops"}],
        "settings": {"theme": "dark"}
    }"#;

    #[test]
    fn reads_tasks_and_ignores_rest() {
        let snapshot = TaskSnapshot::from_json(EXPORT).unwrap();
        assert_eq!(snapshot.tasks.len(), 2);
        let t1 = snapshot.find("t1").unwrap();
        assert_eq!(t1.time_estimate, Some(TimeEstimate::OneHour));
        assert_eq!(snapshot.find("t2").unwrap().status, TaskStatus::Done);
        assert!(snapshot.find("t3").is_none());
    }

    #[test]
    fn load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, EXPORT).unwrap();
        assert_eq!(TaskSnapshot::load(&path).unwrap().tasks.len(), 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");
        match TaskSnapshot::load(&path) {
            Err(CoreError::TaskDataUnreadable { path: reported, source }) => {
                assert_eq!(reported, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected unreadable task data, got {other:?}"),
        }
    }
}
