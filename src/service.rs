//! Composition root for the priority-prediction learning loop.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::classifier::PriorityClassifier;
use crate::config::TaskmindConfig;
use crate::error::Result;
use crate::storage::{ModelStore, TaskStore};
use crate::suggest::{Suggestion, SuggestionBlender, SuggestionProvider};
use crate::task::{ModelStats, Priority, UserId};
use crate::trainer::TrainingTrigger;

/// The ML/AI service the HTTP layer talks to.
///
/// Constructed once at process startup with its collaborators injected,
/// then passed by reference to request handlers. Construction reloads any
/// persisted model state; a persistence failure at startup is logged and
/// the service starts with the Medium-default fallback instead.
pub struct TaskIntelligence {
    classifier: Arc<PriorityClassifier>,
    blender: SuggestionBlender,
    trigger: TrainingTrigger,
    tasks: Arc<dyn TaskStore>,
}

impl TaskIntelligence {
    /// Wire up the service. Must be called from within a tokio runtime
    /// (the training worker is spawned here).
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        model_store: Arc<dyn ModelStore>,
        provider: Arc<dyn SuggestionProvider>,
        config: TaskmindConfig,
    ) -> Self {
        let classifier = Arc::new(PriorityClassifier::new(model_store, config.classifier));

        match classifier.load() {
            Ok(true) => info!("loaded persisted priority model"),
            Ok(false) => info!("no persisted priority model, starting untrained"),
            Err(e) => warn!(error = %e, "failed to load persisted model, starting untrained"),
        }

        let blender = SuggestionBlender::new(
            Arc::clone(&classifier),
            provider,
            config.suggestion_timeout,
        );
        let trigger = TrainingTrigger::spawn(
            Arc::clone(&tasks),
            Arc::clone(&classifier),
            config.training_queue_depth,
        );

        Self {
            classifier,
            blender,
            trigger,
            tasks,
        }
    }

    /// Predict a priority and blend it with a generative suggestion.
    ///
    /// Synchronous from the caller's point of view, bounded by the
    /// suggestion timeout, and infallible: every degraded path yields a
    /// valid default suggestion.
    pub async fn predict_and_blend(
        &self,
        text: &str,
        due_date: Option<DateTime<Utc>>,
    ) -> Suggestion {
        self.blender.blend(text, due_date).await
    }

    /// Predict the priority alone, without the generative call.
    pub fn predict_priority(&self, text: &str, due_date: Option<DateTime<Utc>>) -> Priority {
        self.classifier.predict(text, due_date)
    }

    /// Fire-and-forget retraining trigger for a completed task.
    pub fn on_task_completed(&self, user_id: UserId) {
        self.trigger.notify(user_id);
    }

    /// Model readiness statistics for a user.
    pub async fn model_stats(&self, user_id: UserId) -> Result<ModelStats> {
        let completed_count = self.tasks.completed_tasks(user_id).await?.len();
        let min_samples_needed = self.classifier.min_training_samples();
        Ok(ModelStats {
            completed_count,
            min_samples_needed,
            model_ready: completed_count >= min_samples_needed,
        })
    }

    /// The underlying classifier, for callers that need training or
    /// observability access.
    pub fn classifier(&self) -> &Arc<PriorityClassifier> {
        &self.classifier
    }
}
