//! Trainable priority classification.
//!
//! - `RandomForest`: a seeded bagged decision-tree ensemble (Gini splits,
//!   bootstrap resampling, majority vote) retrained from scratch on the full
//!   growing dataset each cycle
//! - `PriorityClassifier`: owns the train/evaluate/persist cycle and the
//!   atomically swapped trained-model snapshot used for prediction

mod forest;
mod priority;

pub use forest::{DecisionTree, ForestConfig, RandomForest};
pub use priority::{PriorityClassifier, TrainedModelState};
