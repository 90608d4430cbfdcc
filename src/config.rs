//! Configuration types for the learning loop and its collaborators.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classifier::ForestConfig;
use crate::features::DEFAULT_MAX_TERMS;

/// Configuration for the priority classifier and its training cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Minimum number of labeled samples before training runs.
    pub min_training_samples: usize,
    /// Upper bound on the TF-IDF vocabulary.
    pub max_vocabulary: usize,
    /// Seed for the reproducible 80/20 train/holdout split.
    pub holdout_seed: u64,
    /// Forest hyperparameters.
    pub forest: ForestConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_training_samples: 20,
            max_vocabulary: DEFAULT_MAX_TERMS,
            holdout_seed: 42,
            forest: ForestConfig::default(),
        }
    }
}

/// Top-level configuration for [`TaskIntelligence`](crate::service::TaskIntelligence).
#[derive(Debug, Clone)]
pub struct TaskmindConfig {
    /// Classifier and training-cycle settings.
    pub classifier: ClassifierConfig,
    /// Upper bound on one generative-suggestion call.
    pub suggestion_timeout: Duration,
    /// Capacity of the background training queue.
    pub training_queue_depth: usize,
}

impl Default for TaskmindConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            suggestion_timeout: Duration::from_secs(10),
            training_queue_depth: 64,
        }
    }
}
