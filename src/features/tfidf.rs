//! TF-IDF vectorizer for text feature extraction.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;

/// Default cap on vocabulary size.
pub const DEFAULT_MAX_TERMS: usize = 1000;

/// TF-IDF vectorizer with a bounded vocabulary.
///
/// When the corpus contains more distinct terms than `max_terms`, the most
/// frequent terms win, with an alphabetical tie-break so that fitting the
/// same corpus with the same configuration always yields the same
/// vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// Vocabulary: term -> index mapping.
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency for each term.
    idf: Vec<f64>,
    /// Total number of documents seen during fitting.
    n_documents: usize,
    /// Upper bound on vocabulary size.
    max_terms: usize,
}

impl TfIdfVectorizer {
    /// Create a new vectorizer with the default vocabulary bound.
    pub fn new() -> Self {
        Self::with_max_terms(DEFAULT_MAX_TERMS)
    }

    /// Create a new vectorizer with an explicit vocabulary bound.
    pub fn with_max_terms(max_terms: usize) -> Self {
        Self {
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            max_terms,
        }
    }

    /// Whether `fit` has been called at least once.
    pub fn is_fitted(&self) -> bool {
        self.n_documents > 0
    }

    /// Fit the vectorizer on a document corpus.
    ///
    /// Builds the bounded vocabulary and per-term smoothed IDF
    /// (`ln((N + 1) / (df + 1)) + 1`). Deterministic for a given corpus
    /// and `max_terms`.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        let mut term_frequency: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = tokenize(doc);
            for token in &tokens {
                *term_frequency.entry(token.clone()).or_insert(0) += 1;
            }
            let unique_tokens: HashSet<_> = tokens.into_iter().collect();
            for token in unique_tokens {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        // Keep the most frequent terms; ties broken alphabetically so the
        // vocabulary is stable across refits of the same corpus.
        let mut terms: Vec<(String, usize)> = term_frequency.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(self.max_terms);

        let n_documents = documents.len();
        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = vec![0.0; terms.len()];
        for (idx, (term, _)) in terms.into_iter().enumerate() {
            let df = document_frequency.get(&term).copied().unwrap_or(0);
            idf[idx] = ((n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0;
            vocabulary.insert(term, idx);
        }

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n_documents;

        Ok(())
    }

    /// Transform a document into a TF-IDF feature vector of
    /// [`vocabulary_size`](Self::vocabulary_size) elements.
    pub fn transform(&self, document: &str) -> Vec<f64> {
        let tokens = tokenize(document);
        let mut tf = vec![0.0; self.vocabulary.len()];

        for token in &tokens {
            if let Some(&idx) = self.vocabulary.get(token) {
                tf[idx] += 1.0;
            }
        }

        // Normalize by document length
        let doc_length = tokens.len() as f64;
        if doc_length > 0.0 {
            for count in &mut tf {
                *count /= doc_length;
            }
        }

        // Apply IDF
        for (idx, count) in tf.iter_mut().enumerate() {
            *count *= self.idf[idx];
        }

        tf
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Unicode-aware word tokenization, lowercased.
fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tfidf_vectorizer() {
        let documents = vec![
            "pay the electricity bill".to_string(),
            "book flight to tokyo".to_string(),
            "buy groceries for the week".to_string(),
        ];

        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&documents).unwrap();
        assert!(vectorizer.vocabulary_size() > 0);
        assert!(vectorizer.is_fitted());

        let features = vectorizer.transform("pay for the flight");
        assert_eq!(features.len(), vectorizer.vocabulary_size());
        assert!(features.iter().any(|&w| w > 0.0));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let documents = vec![
            "write the quarterly report".to_string(),
            "review the quarterly numbers".to_string(),
            "send report to the team".to_string(),
        ];

        let mut a = TfIdfVectorizer::with_max_terms(5);
        let mut b = TfIdfVectorizer::with_max_terms(5);
        a.fit(&documents).unwrap();
        b.fit(&documents).unwrap();

        assert_eq!(a.vocabulary_size(), 5);
        assert_eq!(a.transform("quarterly report"), b.transform("quarterly report"));
    }

    #[test]
    fn test_vocabulary_bound() {
        let documents = vec!["one two three four five six seven eight".to_string()];
        let mut vectorizer = TfIdfVectorizer::with_max_terms(3);
        vectorizer.fit(&documents).unwrap();
        assert_eq!(vectorizer.vocabulary_size(), 3);
    }

    #[test]
    fn test_unknown_terms_ignored() {
        let documents = vec!["call the dentist".to_string()];
        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&documents).unwrap();

        let features = vectorizer.transform("completely unrelated words");
        assert!(features.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_cjk_tokenization() {
        let documents = vec!["支付 房租 紧急".to_string(), "预订 机票".to_string()];
        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&documents).unwrap();

        let features = vectorizer.transform("紧急 支付");
        assert!(features.iter().any(|&w| w > 0.0));
    }
}
