//! Command implementations for the taskmind CLI.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::cli::args::*;
use crate::classifier::PriorityClassifier;
use crate::config::{ClassifierConfig, TaskmindConfig};
use crate::error::Result;
use crate::service::TaskIntelligence;
use crate::storage::{FsModelStore, MemoryTaskStore};
use crate::suggest::OpenAiChatProvider;
use crate::task::LabeledTask;

/// Execute a CLI command.
pub async fn execute_command(args: TaskmindArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Predict(predict_args) => predict(predict_args.clone(), &args),
        Command::Suggest(suggest_args) => suggest(suggest_args.clone(), &args).await,
        Command::Stats(stats_args) => stats(stats_args.clone(), &args),
    }
}

/// Load a labeled-task corpus from a JSON file.
fn load_corpus(path: &Path) -> Result<Vec<LabeledTask>> {
    let content = fs::read_to_string(path)?;
    let tasks: Vec<LabeledTask> = serde_json::from_str(&content)?;
    Ok(tasks)
}

fn open_classifier(model_dir: &Path) -> Result<PriorityClassifier> {
    let store = Arc::new(FsModelStore::new(model_dir)?);
    Ok(PriorityClassifier::new(store, ClassifierConfig::default()))
}

/// Train the model from a corpus file.
fn train(args: TrainArgs, cli_args: &TaskmindArgs) -> Result<()> {
    let corpus = load_corpus(&args.corpus)?;
    let completed: Vec<LabeledTask> = corpus.into_iter().filter(|t| t.completed).collect();

    if cli_args.verbosity() > 1 {
        println!(
            "Training on {} completed tasks from {}",
            completed.len(),
            args.corpus.display()
        );
    }

    let classifier = open_classifier(&args.model_dir)?;
    let accuracy = classifier.train(&completed)?;
    println!("Model trained, holdout accuracy: {accuracy:.2}");
    println!("Persisted to: {}", args.model_dir.display());
    Ok(())
}

/// Predict the priority for one task.
fn predict(args: PredictArgs, cli_args: &TaskmindArgs) -> Result<()> {
    let classifier = open_classifier(&args.model_dir)?;
    let loaded = classifier.load()?;
    if !loaded && cli_args.verbosity() > 0 {
        eprintln!("No persisted model found, falling back to medium");
    }

    let priority = classifier.predict(&args.text, args.due);
    println!("{priority}");
    Ok(())
}

/// Predict and blend with a generative suggestion.
async fn suggest(args: SuggestArgs, _cli_args: &TaskmindArgs) -> Result<()> {
    let provider = Arc::new(OpenAiChatProvider::from_env()?);
    let model_store = Arc::new(FsModelStore::new(&args.model_dir)?);
    let service = TaskIntelligence::new(
        Arc::new(MemoryTaskStore::new()),
        model_store,
        provider,
        TaskmindConfig::default(),
    );

    let suggestion = service.predict_and_blend(&args.text, args.due).await;
    println!("{}", serde_json::to_string_pretty(&suggestion)?);
    Ok(())
}

/// Show model readiness statistics for a corpus.
fn stats(args: StatsArgs, _cli_args: &TaskmindArgs) -> Result<()> {
    let corpus = load_corpus(&args.corpus)?;
    let completed_count = corpus.iter().filter(|t| t.completed).count();
    let min_samples_needed = ClassifierConfig::default().min_training_samples;

    println!("Completed tasks:    {completed_count}");
    println!("Min samples needed: {min_samples_needed}");
    println!(
        "Model ready:        {}",
        completed_count >= min_samples_needed
    );
    Ok(())
}
