//! Feature extraction combining TF-IDF text weights with task metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskmindError};
use crate::features::tfidf::TfIdfVectorizer;
use crate::task::LabeledTask;

/// Number of metadata features appended after the TF-IDF weights.
pub const METADATA_FEATURES: usize = 4;

/// Keywords that flip the urgent-keyword feature, matched case-insensitively
/// as substrings. The CJK terms mean "urgent", "immediately" and "right away".
pub const URGENT_KEYWORDS: [&str; 4] = ["urgent", "紧急", "立即", "马上"];

/// Turns task text plus metadata into a fixed-width feature vector.
///
/// The vector layout is `[tf-idf weights] ++ [has_due_date, days_until_due,
/// word_count, has_urgent_keyword]`, so its length is always
/// `vocabulary_size + 4` for one fitted extractor.
///
/// All date arithmetic is UTC, at both training and prediction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureExtractor {
    vectorizer: TfIdfVectorizer,
}

impl FeatureExtractor {
    /// Create an unfitted extractor with the default vocabulary bound.
    pub fn new() -> Self {
        Self {
            vectorizer: TfIdfVectorizer::new(),
        }
    }

    /// Create an unfitted extractor with an explicit vocabulary bound.
    pub fn with_max_terms(max_terms: usize) -> Self {
        Self {
            vectorizer: TfIdfVectorizer::with_max_terms(max_terms),
        }
    }

    /// Whether `fit` has been called at least once.
    pub fn is_fitted(&self) -> bool {
        self.vectorizer.is_fitted()
    }

    /// Fit the text vocabulary on a task corpus.
    pub fn fit(&mut self, corpus: &[LabeledTask]) -> Result<()> {
        let documents: Vec<String> = corpus.iter().map(|t| t.text.clone()).collect();
        self.vectorizer.fit(&documents)
    }

    /// Transform one task into a feature vector.
    ///
    /// Fails with [`TaskmindError::NotFitted`] if no `fit` has happened yet.
    pub fn transform(&self, text: &str, due_date: Option<DateTime<Utc>>) -> Result<Vec<f64>> {
        self.transform_at(text, due_date, Utc::now())
    }

    /// Transform with an explicit "now", so date features are testable.
    pub fn transform_at(
        &self,
        text: &str,
        due_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Vec<f64>> {
        if !self.vectorizer.is_fitted() {
            return Err(TaskmindError::not_fitted(
                "feature extractor used before fit",
            ));
        }

        let mut features = self.vectorizer.transform(text);
        features.extend_from_slice(&metadata_features(text, due_date, now));
        Ok(features)
    }

    /// Length of every vector this extractor produces: vocabulary size + 4.
    pub fn feature_len(&self) -> usize {
        self.vectorizer.vocabulary_size() + METADATA_FEATURES
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// The four metadata features, independent of the vocabulary.
///
/// `days_until_due` is the whole-day difference between the due date and
/// `now`; negative for overdue tasks, never clamped, 0 when absent.
fn metadata_features(
    text: &str,
    due_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> [f64; METADATA_FEATURES] {
    let has_due_date = if due_date.is_some() { 1.0 } else { 0.0 };
    let days_until_due = due_date.map_or(0.0, |due| (due - now).num_days() as f64);
    let word_count = text.split_whitespace().count() as f64;

    let lower = text.to_lowercase();
    let has_urgent_keyword = if URGENT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        1.0
    } else {
        0.0
    };

    [has_due_date, days_until_due, word_count, has_urgent_keyword]
}
