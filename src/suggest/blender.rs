//! Blending policy: classifier prediction + generative suggestion.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::classifier::PriorityClassifier;
use crate::error::Result;
use crate::suggest::provider::SuggestionProvider;
use crate::suggest::types::{RawSuggestion, Suggestion};
use crate::task::Priority;

/// Merges the classifier's predicted priority with a generative suggestion.
///
/// This is the single place where defaults are decided: any provider
/// failure, timeout, or malformed response ends in
/// [`Suggestion::fallback`], and an out-of-range priority from the
/// generator is overridden by the classifier's. `blend` never returns an
/// error.
pub struct SuggestionBlender {
    classifier: Arc<PriorityClassifier>,
    provider: Arc<dyn SuggestionProvider>,
    timeout: Duration,
}

impl SuggestionBlender {
    /// Create a blender with the given collaborators and call timeout.
    pub fn new(
        classifier: Arc<PriorityClassifier>,
        provider: Arc<dyn SuggestionProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            provider,
            timeout,
        }
    }

    /// Produce a blended suggestion for one task.
    pub async fn blend(&self, text: &str, due_date: Option<DateTime<Utc>>) -> Suggestion {
        let ml_priority = self.classifier.predict(text, due_date);
        let prompt = build_prompt(text, due_date, ml_priority);

        let body = match tokio::time::timeout(self.timeout, self.provider.complete(&prompt)).await
        {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                warn!(error = %e, "generative provider failed, using default suggestion");
                return Suggestion::fallback(ml_priority);
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "generative provider timed out, using default suggestion");
                return Suggestion::fallback(ml_priority);
            }
        };

        match parse_suggestion(&body, ml_priority) {
            Ok(suggestion) => {
                debug!(category = %suggestion.category, priority = %suggestion.priority,
                       "blended suggestion");
                suggestion
            }
            Err(e) => {
                warn!(error = %e, "unparseable generative response, using default suggestion");
                Suggestion::fallback(ml_priority)
            }
        }
    }
}

/// Prompt asking for a JSON object, passing the classifier's priority as a
/// hint the generator is asked to respect.
fn build_prompt(text: &str, due_date: Option<DateTime<Utc>>, ml_priority: Priority) -> String {
    let due = due_date.map_or_else(|| "none".to_string(), |d| d.to_rfc3339());
    format!(
        "For the following to-do item, respond with a single JSON object with these \
         fields:\n\
         - category: a short category name\n\
         - priority: one of \"low\", \"medium\", \"high\" (a trained model suggests \
         \"{ml_priority}\"; follow it unless the text clearly contradicts it)\n\
         - estimated_hours: estimated effort in hours (number)\n\
         - notes: supplementary advice\n\
         - reasoning: why you chose this priority and category\n\
         - steps: an ordered list of short step descriptions\n\
         \n\
         To-do item: {text}\n\
         Due date: {due}\n"
    )
}

/// Parse the generator's body into a validated suggestion.
///
/// Tolerates a fenced code block around the JSON, a habit chat models have.
fn parse_suggestion(body: &str, ml_priority: Priority) -> Result<Suggestion> {
    let json = strip_code_fence(body);
    let raw: RawSuggestion = serde_json::from_str(json)?;
    Ok(raw.into_suggestion(ml_priority))
}

fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag after the opening fence.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_end_matches('`').trim()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::config::ClassifierConfig;
    use crate::error::TaskmindError;
    use crate::storage::FsModelStore;

    struct FixedProvider(String);

    #[async_trait]
    impl SuggestionProvider for FixedProvider {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl SuggestionProvider for FailingProvider {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(TaskmindError::generative("connection refused"))
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl SuggestionProvider for SlowProvider {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("{}".to_string())
        }
    }

    fn untrained_classifier(dir: &std::path::Path) -> Arc<PriorityClassifier> {
        let store = Arc::new(FsModelStore::new(dir).unwrap());
        Arc::new(PriorityClassifier::new(store, ClassifierConfig::default()))
    }

    fn blender(provider: Arc<dyn SuggestionProvider>, dir: &std::path::Path) -> SuggestionBlender {
        SuggestionBlender::new(
            untrained_classifier(dir),
            provider,
            Duration::from_millis(100),
        )
    }

    #[tokio::test]
    async fn test_blend_with_valid_response() {
        let body = r#"{"category": "Finance", "priority": "high",
                       "estimated_hours": 2.5, "notes": "pay before friday",
                       "reasoning": "late fees", "steps": ["check balance", "pay"]}"#;
        let dir = tempfile::tempdir().unwrap();
        let blender = blender(Arc::new(FixedProvider(body.to_string())), dir.path());

        let suggestion = blender.blend("pay the electricity bill", None).await;
        assert_eq!(suggestion.category, "Finance");
        assert_eq!(suggestion.priority, Priority::High);
        assert_eq!(suggestion.estimated_hours, 2.5);
        assert_eq!(suggestion.steps.len(), 2);
    }

    #[tokio::test]
    async fn test_blend_overrides_invalid_priority() {
        let body = r#"{"category": "Finance", "priority": "banana",
                       "notes": "pay it", "estimated_hours": 2.0}"#;
        let dir = tempfile::tempdir().unwrap();
        let blender = blender(Arc::new(FixedProvider(body.to_string())), dir.path());

        let suggestion = blender.blend("pay rent", None).await;
        // Untrained classifier predicts medium; "banana" must be overridden
        // while the advisory fields survive.
        assert_eq!(suggestion.priority, Priority::Medium);
        assert_eq!(suggestion.category, "Finance");
        assert_eq!(suggestion.notes, "pay it");
        assert_eq!(suggestion.estimated_hours, 2.0);
    }

    #[tokio::test]
    async fn test_blend_with_failing_provider() {
        let dir = tempfile::tempdir().unwrap();
        let blender = blender(Arc::new(FailingProvider), dir.path());

        let suggestion = blender.blend("pay rent", None).await;
        assert_eq!(suggestion, Suggestion::fallback(Priority::Medium));
    }

    #[tokio::test]
    async fn test_blend_with_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let blender = blender(Arc::new(SlowProvider), dir.path());

        let suggestion = blender.blend("pay rent", None).await;
        assert_eq!(suggestion, Suggestion::fallback(Priority::Medium));
    }

    #[tokio::test]
    async fn test_blend_with_garbage_body() {
        let dir = tempfile::tempdir().unwrap();
        let blender = blender(
            Arc::new(FixedProvider("not json at all".to_string())),
            dir.path(),
        );

        let suggestion = blender.blend("pay rent", None).await;
        assert_eq!(suggestion, Suggestion::fallback(Priority::Medium));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
    }
}
