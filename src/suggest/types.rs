//! Suggestion types and the lenient wire-format parser.

use serde::{Deserialize, Serialize};

use crate::task::Priority;

/// One step of a suggested execution plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionStep {
    /// What to do.
    pub description: String,
    /// 1-based position in the plan.
    pub order: u32,
    /// Whether the step is already done.
    #[serde(default)]
    pub completed: bool,
}

/// A blended planning suggestion for one task.
///
/// Ephemeral: produced per request, persisted (if at all) by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggested category for the task.
    pub category: String,
    /// Authoritative priority (classifier-backed, see the blender policy).
    pub priority: Priority,
    /// Estimated effort in hours.
    pub estimated_hours: f64,
    /// Free-text advice.
    pub notes: String,
    /// Why this priority and category were chosen.
    pub reasoning: String,
    /// Suggested execution plan.
    pub steps: Vec<SuggestionStep>,
}

impl Suggestion {
    /// The deterministic default returned when the generative provider is
    /// unreachable, times out, or produces an unusable response.
    pub fn fallback(ml_priority: Priority) -> Self {
        Self {
            category: "Uncategorized".to_string(),
            priority: ml_priority,
            estimated_hours: 1.0,
            notes: "<ai suggestion unavailable>".to_string(),
            reasoning: "<default used>".to_string(),
            steps: default_plan(),
        }
    }
}

/// The generic execution plan used whenever the generator supplies none.
pub fn default_plan() -> Vec<SuggestionStep> {
    [
        "Analyze the task requirements",
        "Draft an execution plan",
        "Carry out the task",
        "Verify the result",
    ]
    .iter()
    .enumerate()
    .map(|(idx, description)| SuggestionStep {
        description: (*description).to_string(),
        order: idx as u32 + 1,
        completed: false,
    })
    .collect()
}

/// The generator's structured response, with every field optional so a
/// partially usable reply still contributes its advisory fields.
#[derive(Debug, Deserialize)]
pub(crate) struct RawSuggestion {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    estimated_hours: Option<f64>,
    #[serde(default, alias = "suggestions")]
    notes: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    steps: Option<Vec<RawStep>>,
}

/// Steps may arrive as plain strings or structured objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawStep {
    Text(String),
    Structured {
        description: String,
        #[serde(default)]
        order: Option<u32>,
        #[serde(default)]
        completed: Option<bool>,
    },
}

impl RawSuggestion {
    /// Validate field-by-field into a [`Suggestion`].
    ///
    /// A priority outside {low, medium, high} (case-insensitive) is
    /// overridden with `ml_priority`; absent advisory fields take the same
    /// defaults as [`Suggestion::fallback`].
    pub(crate) fn into_suggestion(self, ml_priority: Priority) -> Suggestion {
        let priority = self
            .priority
            .as_deref()
            .and_then(|p| p.parse::<Priority>().ok())
            .unwrap_or(ml_priority);

        let steps = match self.steps {
            Some(raw_steps) if !raw_steps.is_empty() => raw_steps
                .into_iter()
                .enumerate()
                .map(|(idx, step)| match step {
                    RawStep::Text(description) => SuggestionStep {
                        description,
                        order: idx as u32 + 1,
                        completed: false,
                    },
                    RawStep::Structured {
                        description,
                        order,
                        completed,
                    } => SuggestionStep {
                        description,
                        order: order.unwrap_or(idx as u32 + 1),
                        completed: completed.unwrap_or(false),
                    },
                })
                .collect(),
            _ => default_plan(),
        };

        Suggestion {
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "Uncategorized".to_string()),
            priority,
            estimated_hours: self
                .estimated_hours
                .filter(|h| h.is_finite() && *h > 0.0)
                .unwrap_or(1.0),
            notes: self
                .notes
                .unwrap_or_else(|| "<ai suggestion unavailable>".to_string()),
            reasoning: self
                .reasoning
                .unwrap_or_else(|| "<default used>".to_string()),
            steps,
        }
    }
}
