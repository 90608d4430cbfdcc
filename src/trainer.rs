//! Background retraining trigger with per-user coalescing.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::classifier::PriorityClassifier;
use crate::error::TaskmindError;
use crate::storage::TaskStore;
use crate::task::UserId;

/// Fire-and-forget trigger for the train/evaluate/persist cycle.
///
/// Task-completion handlers call [`notify`](Self::notify) and return
/// immediately; a single background worker drains a bounded queue and runs
/// at most one training cycle at a time. A user stays in the pending set
/// from notify until their cycle finishes, so repeated notifications for
/// the same user coalesce instead of queueing duplicate cycles (and
/// duplicate writes to the same persisted model file).
///
/// Failures inside a cycle are logged and swallowed: a broken training run
/// must never affect the task-completion operation that triggered it.
#[derive(Debug)]
pub struct TrainingTrigger {
    tx: mpsc::Sender<UserId>,
    pending: Arc<Mutex<HashSet<UserId>>>,
}

impl TrainingTrigger {
    /// Spawn the background worker and return the trigger handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        tasks: Arc<dyn TaskStore>,
        classifier: Arc<PriorityClassifier>,
        queue_depth: usize,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<UserId>(queue_depth);
        let pending = Arc::new(Mutex::new(HashSet::new()));

        let worker_pending = Arc::clone(&pending);
        tokio::spawn(async move {
            while let Some(user_id) = rx.recv().await {
                run_cycle(&tasks, &classifier, user_id).await;
                worker_pending.lock().remove(&user_id);
            }
        });

        Self { tx, pending }
    }

    /// Request a training cycle for a user. Non-blocking; coalesces with a
    /// cycle already queued or in flight for the same user.
    pub fn notify(&self, user_id: UserId) {
        {
            let mut pending = self.pending.lock();
            if !pending.insert(user_id) {
                debug!(user_id, "training already pending, coalescing");
                return;
            }
        }

        if self.tx.try_send(user_id).is_err() {
            self.pending.lock().remove(&user_id);
            warn!(user_id, "training queue full, dropping trigger");
        }
    }
}

/// One training cycle for one user. Never propagates errors.
async fn run_cycle(
    tasks: &Arc<dyn TaskStore>,
    classifier: &Arc<PriorityClassifier>,
    user_id: UserId,
) {
    let labeled = match tasks.completed_tasks(user_id).await {
        Ok(labeled) => labeled,
        Err(e) => {
            warn!(user_id, error = %e, "failed to load labeled tasks, skipping training cycle");
            return;
        }
    };

    let min_samples = classifier.min_training_samples();
    if labeled.len() < min_samples {
        // Expected steady state for new users.
        debug!(
            user_id,
            completed = labeled.len(),
            min_samples,
            "not enough labeled tasks yet"
        );
        return;
    }

    // Training is CPU-bound; keep it off the async worker thread.
    let train_classifier = Arc::clone(classifier);
    let result =
        tokio::task::spawn_blocking(move || train_classifier.train(&labeled)).await;

    match result {
        Ok(Ok(accuracy)) => {
            info!(user_id, accuracy, "model retrained");
        }
        Ok(Err(TaskmindError::InsufficientData { needed, actual })) => {
            debug!(user_id, needed, actual, "training skipped, not enough samples");
        }
        Ok(Err(e)) => {
            warn!(user_id, error = %e, "training cycle skipped");
        }
        Err(e) => {
            warn!(user_id, error = %e, "training task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::classifier::TrainedModelState;
    use crate::config::ClassifierConfig;
    use crate::error::Result;
    use crate::storage::{FsModelStore, MemoryTaskStore, ModelStore};
    use crate::task::{LabeledTask, Priority};

    fn classifier(dir: &std::path::Path) -> Arc<PriorityClassifier> {
        let store = Arc::new(FsModelStore::new(dir).unwrap());
        Arc::new(PriorityClassifier::new(store, ClassifierConfig::default()))
    }

    fn seed_tasks(store: &MemoryTaskStore, user_id: UserId, count: usize) {
        let now = Utc::now();
        for i in 0..count {
            let (text, priority) = match i % 3 {
                0 => (format!("water plants {i}"), Priority::Low),
                1 => (format!("write report {i}"), Priority::Medium),
                _ => (format!("urgent invoice {i}"), Priority::High),
            };
            store.add_task(
                user_id,
                LabeledTask::new(text, Some(now + chrono::Duration::days(i as i64 % 7)), priority, true),
            );
        }
    }

    async fn wait_until_trained(classifier: &PriorityClassifier) -> bool {
        for _ in 0..200 {
            if classifier.is_trained() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        false
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_notify_trains_when_enough_samples() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = classifier(dir.path());
        let tasks = Arc::new(MemoryTaskStore::new());
        seed_tasks(&tasks, 1, 24);

        let trigger = TrainingTrigger::spawn(tasks, Arc::clone(&classifier), 16);
        trigger.notify(1);

        assert!(wait_until_trained(&classifier).await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_notify_below_threshold_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = classifier(dir.path());
        let tasks = Arc::new(MemoryTaskStore::new());
        seed_tasks(&tasks, 1, 5);

        let trigger = TrainingTrigger::spawn(tasks, Arc::clone(&classifier), 16);
        trigger.notify(1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!classifier.is_trained());
    }

    #[derive(Debug)]
    struct FailingTaskStore;

    #[async_trait]
    impl TaskStore for FailingTaskStore {
        async fn completed_tasks(&self, _user_id: UserId) -> Result<Vec<LabeledTask>> {
            Err(TaskmindError::persistence("database unreachable"))
        }
    }

    #[derive(Debug)]
    struct ReadOnlyModelStore;

    impl ModelStore for ReadOnlyModelStore {
        fn load(&self) -> Result<Option<TrainedModelState>> {
            Ok(None)
        }

        fn save(&self, _state: &TrainedModelState) -> Result<()> {
            Err(TaskmindError::persistence("disk full"))
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failing_task_store_never_reaches_caller() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = classifier(dir.path());

        let trigger =
            TrainingTrigger::spawn(Arc::new(FailingTaskStore), Arc::clone(&classifier), 16);
        trigger.notify(1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!classifier.is_trained());

        // The trigger stays usable after a failed cycle.
        trigger.notify(1);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!classifier.is_trained());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failing_model_save_abandons_cycle() {
        let classifier = Arc::new(PriorityClassifier::new(
            Arc::new(ReadOnlyModelStore),
            ClassifierConfig::default(),
        ));
        let tasks = Arc::new(MemoryTaskStore::new());
        seed_tasks(&tasks, 1, 24);

        let trigger = TrainingTrigger::spawn(tasks, Arc::clone(&classifier), 16);
        trigger.notify(1);

        // The persistence failure aborts the cycle before the in-memory
        // swap, and never reaches the caller.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!classifier.is_trained());
        assert_eq!(classifier.predict("anything", None), Priority::Medium);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_repeated_notifies_coalesce() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = classifier(dir.path());
        let tasks = Arc::new(MemoryTaskStore::new());
        seed_tasks(&tasks, 1, 24);

        let trigger = TrainingTrigger::spawn(tasks, Arc::clone(&classifier), 16);
        for _ in 0..10 {
            trigger.notify(1);
        }

        assert!(wait_until_trained(&classifier).await);
    }
}
