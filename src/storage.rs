//! Persistence collaborators for model state and labeled tasks.
//!
//! The learning loop talks to two narrow storage interfaces: [`ModelStore`]
//! for the trained model snapshot and [`TaskStore`] for the completed,
//! labeled tasks owned by the backing database. [`FsModelStore`] persists
//! the model as a single staged-write file; [`MemoryTaskStore`] backs tests
//! and the CLI.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::classifier::TrainedModelState;
use crate::error::{Result, TaskmindError};
use crate::task::{LabeledTask, UserId};

/// File name of the persisted model snapshot.
pub const MODEL_FILE: &str = "priority_model.bin";
/// Temp file name used for the staged write.
pub const MODEL_TEMP_FILE: &str = "priority_model.tmp";

/// Durable storage for the trained model snapshot.
pub trait ModelStore: Send + Sync + fmt::Debug {
    /// Load the persisted snapshot, if any.
    fn load(&self) -> Result<Option<TrainedModelState>>;

    /// Persist a snapshot, replacing any previous one.
    fn save(&self, state: &TrainedModelState) -> Result<()>;
}

/// Read-only access to a user's labeled tasks.
#[async_trait]
pub trait TaskStore: Send + Sync + fmt::Debug {
    /// All completed tasks for the given user.
    async fn completed_tasks(&self, user_id: UserId) -> Result<Vec<LabeledTask>>;
}

/// File-system model store using a staged write.
///
/// The snapshot (vocabulary and classifier together) is serialized into one
/// file, written to a temp path and atomically renamed into place, so a
/// reader can never observe a vocabulary without its matching classifier.
#[derive(Debug)]
pub struct FsModelStore {
    dir: PathBuf,
}

impl FsModelStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            TaskmindError::persistence(format!(
                "failed to create model directory {}: {e}",
                dir.display()
            ))
        })?;
        Ok(Self { dir })
    }

    fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }
}

impl ModelStore for FsModelStore {
    fn load(&self) -> Result<Option<TrainedModelState>> {
        let path = self.model_path();
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(|e| {
            TaskmindError::persistence(format!("failed to read {}: {e}", path.display()))
        })?;
        let state = bincode::deserialize(&bytes).map_err(|e| {
            TaskmindError::persistence(format!("failed to decode {}: {e}", path.display()))
        })?;
        Ok(Some(state))
    }

    fn save(&self, state: &TrainedModelState) -> Result<()> {
        let bytes = bincode::serialize(state)
            .map_err(|e| TaskmindError::persistence(format!("failed to encode model: {e}")))?;

        // Staged write: temp file first, then atomic rename over the live
        // snapshot.
        let temp_path = self.dir.join(MODEL_TEMP_FILE);
        fs::write(&temp_path, &bytes).map_err(|e| {
            TaskmindError::persistence(format!("failed to write {}: {e}", temp_path.display()))
        })?;
        fs::rename(&temp_path, self.model_path()).map_err(|e| {
            TaskmindError::persistence(format!("failed to swap model file: {e}"))
        })?;
        Ok(())
    }
}

/// In-memory task store for tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<UserId, Vec<LabeledTask>>>,
}

impl MemoryTaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task for a user.
    pub fn add_task(&self, user_id: UserId, task: LabeledTask) {
        self.tasks.write().entry(user_id).or_default().push(task);
    }

    /// Add a batch of tasks for a user.
    pub fn add_tasks(&self, user_id: UserId, tasks: impl IntoIterator<Item = LabeledTask>) {
        self.tasks.write().entry(user_id).or_default().extend(tasks);
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn completed_tasks(&self, user_id: UserId) -> Result<Vec<LabeledTask>> {
        let tasks = self.tasks.read();
        Ok(tasks
            .get(&user_id)
            .map(|list| list.iter().filter(|t| t.completed).cloned().collect())
            .unwrap_or_default())
    }
}
