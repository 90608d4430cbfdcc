//! Command Line Interface for the taskmind learning loop.

pub mod args;
pub mod commands;

// Re-export commonly used types
pub use args::*;
pub use commands::*;
