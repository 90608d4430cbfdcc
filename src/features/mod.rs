//! Feature extraction for priority prediction.
//!
//! Raw task text plus metadata is turned into a fixed-width numeric
//! feature vector:
//!
//! - `TfIdfVectorizer`: bounded-vocabulary TF-IDF weights over the task text
//! - `FeatureExtractor`: TF-IDF weights concatenated with four metadata
//!   features (due-date presence, days until due, word count, urgent-keyword
//!   flag)
//!
//! Every vector produced by one fitted extractor has the same length:
//! vocabulary size + 4.

mod extractor;
mod tfidf;

pub use extractor::{FeatureExtractor, METADATA_FEATURES, URGENT_KEYWORDS};
pub use tfidf::{DEFAULT_MAX_TERMS, TfIdfVectorizer};
