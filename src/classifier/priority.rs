//! Priority classifier owning the train/evaluate/persist cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classifier::forest::RandomForest;
use crate::config::ClassifierConfig;
use crate::error::{Result, TaskmindError};
use crate::features::FeatureExtractor;
use crate::storage::ModelStore;
use crate::task::{LabeledTask, Priority};

/// A complete trained model: the fitted vocabulary and the forest trained
/// against it.
///
/// Always created, swapped, and persisted as one unit. A vocabulary from one
/// training run paired with a forest from another would feed the forest
/// vectors of the wrong width.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModelState {
    extractor: FeatureExtractor,
    forest: RandomForest,
}

impl TrainedModelState {
    /// Predict the priority for one task.
    pub fn predict(&self, text: &str, due_date: Option<DateTime<Utc>>) -> Result<Priority> {
        let features = self.extractor.transform(text, due_date)?;
        Priority::from_class_id(self.forest.predict(&features))
    }

    /// Width of the feature vectors this model consumes.
    pub fn feature_len(&self) -> usize {
        self.extractor.feature_len()
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        use crate::classifier::forest::ForestConfig;

        let corpus = vec![
            LabeledTask::new("alpha beta", None, Priority::Low, true),
            LabeledTask::new("gamma delta", None, Priority::High, true),
        ];
        let mut extractor = FeatureExtractor::new();
        extractor.fit(&corpus).unwrap();
        let x: Vec<Vec<f64>> = corpus
            .iter()
            .map(|t| extractor.transform(&t.text, t.due_date).unwrap())
            .collect();
        let y: Vec<usize> = corpus.iter().map(|t| t.priority.class_id()).collect();
        let forest =
            RandomForest::fit(&x, &y, Priority::NUM_CLASSES, &ForestConfig::default()).unwrap();
        Self { extractor, forest }
    }
}

/// Trainable priority classifier with an atomically swapped model snapshot.
///
/// `predict` clones the current `Arc` snapshot under a brief read lock, so a
/// concurrent retrain can never expose a half-updated model. Before any
/// training (and with no persisted state to reload) predictions fall back to
/// [`Priority::Medium`]; the fallback is logged and counted so operators can
/// tell "no model yet" apart from "model disagrees".
#[derive(Debug)]
pub struct PriorityClassifier {
    current: RwLock<Option<Arc<TrainedModelState>>>,
    store: Arc<dyn ModelStore>,
    config: ClassifierConfig,
    fallback_predictions: AtomicU64,
}

impl PriorityClassifier {
    /// Create a classifier with no trained state.
    pub fn new(store: Arc<dyn ModelStore>, config: ClassifierConfig) -> Self {
        Self {
            current: RwLock::new(None),
            store,
            config,
            fallback_predictions: AtomicU64::new(0),
        }
    }

    /// Minimum number of labeled samples required to train.
    pub fn min_training_samples(&self) -> usize {
        self.config.min_training_samples
    }

    /// Whether a trained model snapshot is available.
    pub fn is_trained(&self) -> bool {
        self.current.read().is_some()
    }

    /// Number of predictions answered by the Medium fallback.
    pub fn fallback_count(&self) -> u64 {
        self.fallback_predictions.load(Ordering::Relaxed)
    }

    /// Train from scratch on the full labeled corpus.
    ///
    /// Fits the vocabulary on the whole corpus, then fits the forest on a
    /// seeded 80% partition and reports accuracy on the held-out 20%. On
    /// success the new snapshot is persisted (staged write) and swapped in;
    /// a persistence failure abandons the cycle without touching the
    /// in-memory model.
    pub fn train(&self, tasks: &[LabeledTask]) -> Result<f64> {
        if tasks.len() < self.config.min_training_samples {
            return Err(TaskmindError::insufficient_data(
                self.config.min_training_samples,
                tasks.len(),
            ));
        }

        let mut extractor = FeatureExtractor::with_max_terms(self.config.max_vocabulary);
        extractor.fit(tasks)?;

        let now = Utc::now();
        let mut x = Vec::with_capacity(tasks.len());
        let mut y = Vec::with_capacity(tasks.len());
        for task in tasks {
            x.push(extractor.transform_at(&task.text, task.due_date, now)?);
            y.push(task.priority.class_id());
        }

        // Reproducible 80/20 holdout split.
        let mut indices: Vec<usize> = (0..tasks.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.config.holdout_seed);
        indices.shuffle(&mut rng);
        let holdout_len = (tasks.len() / 5).max(1);
        let (holdout_indices, train_indices) = indices.split_at(holdout_len);

        let train_x: Vec<Vec<f64>> = train_indices.iter().map(|&i| x[i].clone()).collect();
        let train_y: Vec<usize> = train_indices.iter().map(|&i| y[i]).collect();
        let holdout_x: Vec<Vec<f64>> = holdout_indices.iter().map(|&i| x[i].clone()).collect();
        let holdout_y: Vec<usize> = holdout_indices.iter().map(|&i| y[i]).collect();

        let forest = RandomForest::fit(
            &train_x,
            &train_y,
            Priority::NUM_CLASSES,
            &self.config.forest,
        )?;
        let accuracy = forest.accuracy(&holdout_x, &holdout_y);

        let state = TrainedModelState { extractor, forest };
        self.store.save(&state)?;
        *self.current.write() = Some(Arc::new(state));

        info!(
            samples = tasks.len(),
            accuracy, "priority model trained and persisted"
        );
        Ok(accuracy)
    }

    /// Predict the priority for one task. Infallible: degraded states fall
    /// back to Medium.
    pub fn predict(&self, text: &str, due_date: Option<DateTime<Utc>>) -> Priority {
        let snapshot = self.current.read().clone();
        match snapshot {
            Some(model) => match model.predict(text, due_date) {
                Ok(priority) => {
                    debug!(%priority, "predicted priority");
                    priority
                }
                Err(e) => {
                    self.fallback_predictions.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, "prediction failed, falling back to medium");
                    Priority::Medium
                }
            },
            None => {
                self.fallback_predictions.fetch_add(1, Ordering::Relaxed);
                debug!("no trained model, falling back to medium");
                Priority::Medium
            }
        }
    }

    /// Reload a previously persisted snapshot, if any.
    ///
    /// Returns `true` when prior state was found and loaded.
    pub fn load(&self) -> Result<bool> {
        match self.store.load()? {
            Some(state) => {
                *self.current.write() = Some(Arc::new(state));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Persist the current snapshot, if one exists.
    pub fn save(&self) -> Result<()> {
        let snapshot = self.current.read().clone();
        match snapshot {
            Some(state) => self.store.save(&state),
            None => Err(TaskmindError::not_fitted("no trained model to save")),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::storage::FsModelStore;

    fn corpus(n_per_class: usize) -> Vec<LabeledTask> {
        let now = Utc::now();
        let mut tasks = Vec::new();
        for i in 0..n_per_class {
            tasks.push(LabeledTask::new(
                format!("water the office plants batch {i}"),
                None,
                Priority::Low,
                true,
            ));
            tasks.push(LabeledTask::new(
                format!("write weekly status report {i}"),
                Some(now + Duration::days(14)),
                Priority::Medium,
                true,
            ));
            tasks.push(LabeledTask::new(
                format!("urgent pay invoice {i} immediately"),
                Some(now + Duration::days(1)),
                Priority::High,
                true,
            ));
        }
        tasks
    }

    fn classifier(dir: &std::path::Path) -> PriorityClassifier {
        let store = Arc::new(FsModelStore::new(dir).unwrap());
        PriorityClassifier::new(store, ClassifierConfig::default())
    }

    #[test]
    fn test_predict_before_training_is_medium() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = classifier(dir.path());

        assert!(!classifier.is_trained());
        assert_eq!(classifier.predict("anything at all", None), Priority::Medium);
        assert_eq!(classifier.predict("anything at all", None), Priority::Medium);
        assert_eq!(classifier.fallback_count(), 2);
    }

    #[test]
    fn test_train_below_threshold_fails() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = classifier(dir.path());

        let tasks = corpus(7); // 21 samples, threshold is 20
        let err = classifier.train(&tasks[..19]).unwrap_err();
        assert!(matches!(
            err,
            TaskmindError::InsufficientData {
                needed: 20,
                actual: 19
            }
        ));
        assert!(!classifier.is_trained());
    }

    #[test]
    fn test_train_at_threshold_reports_accuracy() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = classifier(dir.path());

        let tasks = corpus(7); // 21 samples
        let accuracy = classifier.train(&tasks[..20]).unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
        assert!(classifier.is_trained());
    }

    #[test]
    fn test_save_load_round_trip_reproduces_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let trained = classifier(dir.path());
        trained.train(&corpus(8)).unwrap();

        let restored = classifier(dir.path());
        assert!(restored.load().unwrap());
        assert!(restored.is_trained());

        let now = Utc::now();
        let inputs = [
            ("urgent pay rent", Some(now + Duration::days(1))),
            ("water the office plants batch 1", None),
            ("write weekly status report 3", Some(now + Duration::days(14))),
        ];
        for (text, due) in inputs {
            assert_eq!(trained.predict(text, due), restored.predict(text, due));
        }
    }

    #[test]
    fn test_load_without_prior_state() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = classifier(dir.path());
        assert!(!classifier.load().unwrap());
        assert!(!classifier.is_trained());
    }
}
