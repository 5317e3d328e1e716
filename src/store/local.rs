use std::path::{Path, PathBuf};

use crate::error::PlannerError;
use crate::model::Task;

/// Synchronous whole-collection store: one JSON file holding the task array.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store file in the platform data directory, e.g.
    /// `~/.local/share/rust-planner-app/tasks.json` on Linux.
    pub fn default_location() -> Result<Self, PlannerError> {
        let dirs = directories::ProjectDirs::from("com", "hjertis", "rust-planner-app")
            .ok_or_else(|| PlannerError::persistence("no home directory available"))?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(PlannerError::persistence)?;
        Ok(Self::at(data_dir.join("tasks.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole collection. A missing file is an empty collection.
    pub fn read_all(&self) -> Result<Vec<Task>, PlannerError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PlannerError::persistence(e)),
        };
        serde_json::from_str(&json).map_err(PlannerError::persistence)
    }

    /// Write the whole collection under the single storage key.
    pub fn write_all(&self, tasks: &[Task]) -> Result<(), PlannerError> {
        let json = serde_json::to_string_pretty(tasks).map_err(PlannerError::persistence)?;
        std::fs::write(&self.path, json).map_err(PlannerError::persistence)
    }
}
