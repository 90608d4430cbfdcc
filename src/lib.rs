//! # Taskmind
//!
//! The priority-prediction learning loop for a personal task tracker.
//!
//! Taskmind learns a per-user priority model from completed, labeled tasks
//! and blends its prediction with a generative planning suggestion:
//!
//! - TF-IDF + metadata feature extraction over task text
//! - A seeded bagged decision-tree classifier with atomic persistence
//! - A background retraining trigger with per-user coalescing
//! - A validation/fallback policy over the generative suggestion, with the
//!   classifier as the authoritative priority source
//!
//! The HTTP layer, auth, and the relational schema are external
//! collaborators behind the narrow traits in [`storage`] and [`suggest`].

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod service;
pub mod storage;
pub mod suggest;
pub mod task;
pub mod trainer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
