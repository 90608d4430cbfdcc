//! Task data model shared across the learning loop.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskmindError};

/// Identifier of the user a task belongs to.
pub type UserId = i64;

/// Task priority level.
///
/// The mapping to integer class ids is a fixed total bijection
/// (Low↔0, Medium↔1, High↔2) used for classifier training and prediction.
/// Changing it breaks train/predict round-trips against persisted models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Integer class id used for training and prediction.
    pub fn class_id(self) -> usize {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }

    /// Inverse of [`class_id`](Self::class_id).
    pub fn from_class_id(id: usize) -> Result<Self> {
        match id {
            0 => Ok(Priority::Low),
            1 => Ok(Priority::Medium),
            2 => Ok(Priority::High),
            _ => Err(TaskmindError::other(format!("unknown priority class id: {id}"))),
        }
    }

    /// Number of priority classes.
    pub const NUM_CLASSES: usize = 3;

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskmindError;

    /// Case-insensitive parse of the three canonical values.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(TaskmindError::other(format!("unknown priority: {other}"))),
        }
    }
}

/// A to-do item with a user-assigned priority label.
///
/// Owned by the persistence collaborator; the core reads training batches
/// of these and never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledTask {
    /// Raw task text.
    pub text: String,
    /// Optional due date (UTC).
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// User-assigned priority, the training label.
    pub priority: Priority,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
}

impl LabeledTask {
    /// Convenience constructor used by tests and the CLI.
    pub fn new(
        text: impl Into<String>,
        due_date: Option<DateTime<Utc>>,
        priority: Priority,
        completed: bool,
    ) -> Self {
        Self {
            text: text.into(),
            due_date,
            priority,
            completed,
        }
    }
}

/// Per-user model readiness statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStats {
    /// Number of completed (labeled) tasks available for training.
    pub completed_count: usize,
    /// Minimum number of samples required before training runs.
    pub min_samples_needed: usize,
    /// Whether enough labeled data exists to train.
    pub model_ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_class_id_bijection() {
        for priority in [Priority::Low, Priority::Medium, Priority::High] {
            assert_eq!(
                Priority::from_class_id(priority.class_id()).unwrap(),
                priority
            );
        }
        assert!(Priority::from_class_id(3).is_err());
    }

    #[test]
    fn test_priority_parse_case_insensitive() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("Medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("banana".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_serde_lowercase() {
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "\"high\"");
        let parsed: Priority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(parsed, Priority::Low);
    }
}
