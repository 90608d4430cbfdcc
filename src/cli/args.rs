//! Command line argument parsing for the taskmind CLI using clap.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// Taskmind - priority prediction for personal task tracking
#[derive(Parser, Debug, Clone)]
#[command(name = "taskmind")]
#[command(about = "Train, inspect and query the task priority model")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TaskmindArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TaskmindArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train the priority model from a labeled task corpus
    Train(TrainArgs),

    /// Predict the priority of one task
    Predict(PredictArgs),

    /// Predict and blend with a generative suggestion
    Suggest(SuggestArgs),

    /// Show model readiness statistics for a corpus
    Stats(StatsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// JSON file containing an array of labeled tasks
    #[arg(short, long)]
    pub corpus: PathBuf,

    /// Directory holding the persisted model
    #[arg(short, long, default_value = "ml_models")]
    pub model_dir: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Task text
    pub text: String,

    /// Due date (RFC 3339, e.g. 2026-09-01T00:00:00Z)
    #[arg(short, long)]
    pub due: Option<DateTime<Utc>>,

    /// Directory holding the persisted model
    #[arg(short, long, default_value = "ml_models")]
    pub model_dir: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct SuggestArgs {
    /// Task text
    pub text: String,

    /// Due date (RFC 3339)
    #[arg(short, long)]
    pub due: Option<DateTime<Utc>>,

    /// Directory holding the persisted model
    #[arg(short, long, default_value = "ml_models")]
    pub model_dir: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// JSON file containing an array of labeled tasks
    #[arg(short, long)]
    pub corpus: PathBuf,
}
