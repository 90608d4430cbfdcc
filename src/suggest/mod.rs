//! Generative suggestion blending.
//!
//! The blender combines the statistical classifier's predicted priority with
//! a generative-model suggestion:
//!
//! - `Suggestion` / `SuggestionStep`: the blended result returned to callers
//! - `SuggestionProvider` trait: opaque generative-text collaborator
//! - `OpenAiChatProvider`: OpenAI-compatible chat-completions client
//! - `SuggestionBlender`: validation and fallback policy
//!
//! The classifier is authoritative for the priority; the generative output
//! is advisory for the free-text fields. Every failure path terminates in a
//! valid default suggestion, never an error.

mod blender;
mod provider;
mod types;

pub use blender::SuggestionBlender;
pub use provider::{OpenAiChatProvider, ProviderConfig, SuggestionProvider};
pub use types::{Suggestion, SuggestionStep, default_plan};
