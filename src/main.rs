//! PredictBuddy v0.1 - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use predictbuddy::cli::{load_context, load_input, Args, Commands};
use predictbuddy::persistence::JsonFileStore;
use predictbuddy::telemetry::TracingMetrics;
use predictbuddy::{EngineConfig, PredictiveEngine};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(&args);

    if let Err(err) = run(&args).await {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.verbosity().filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;

    match &args.command {
        Commands::Config => show_config(args, &config),
        Commands::Health => {
            let engine = build_engine(args, config).await?;
            engine.initialize().await?;
            print_json(&engine.health_status().await)
        }
        Commands::Patterns { input, context } => {
            let input = load_input(input.as_deref())?;
            let context = load_context(context.as_deref())?;
            let engine = build_engine(args, config).await?;
            let outcome = engine.recognize_patterns(&input, context).await?;
            print_json(&outcome)
        }
        Commands::Forecast {
            kind,
            horizon,
            input,
        } => {
            let input = load_input(input.as_deref())?;
            let engine = build_engine(args, config).await?;
            let outcome = engine.generate_forecast(&input, *kind, *horizon).await?;
            if outcome.from_cache {
                eprintln!("{}", "  ✓ Served from forecast cache".green());
            }
            print_json(&outcome)
        }
        Commands::Recommend { input, context } => {
            let input = load_input(input.as_deref())?;
            let context = load_context(context.as_deref())?;
            let engine = build_engine(args, config).await?;
            let set = engine.generate_recommendations(&input, context).await?;
            print_json(&set)
        }
    }
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    match &args.config {
        Some(path) => EngineConfig::load(path),
        None => EngineConfig::load_or_default(),
    }
}

fn storage_dir(args: &Args) -> PathBuf {
    args.storage_dir
        .clone()
        .unwrap_or_else(JsonFileStore::default_dir)
}

async fn build_engine(args: &Args, config: EngineConfig) -> Result<PredictiveEngine> {
    let dir = storage_dir(args);
    let store = JsonFileStore::new(&dir)
        .await
        .with_context(|| format!("Failed to open storage directory {}", dir.display()))?;

    let engine = PredictiveEngine::new(config, Arc::new(store), Arc::new(TracingMetrics))?;
    Ok(engine)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn show_config(args: &Args, config: &EngineConfig) -> Result<()> {
    println!("{}", "PredictBuddy Configuration".cyan().bold());
    println!();

    let source = match &args.config {
        Some(path) => path.display().to_string(),
        None => EngineConfig::default_path()
            .map(|p| format!("{} (defaults if missing)", p.display()))
            .unwrap_or_else(|_| "built-in defaults".to_string()),
    };
    println!("Source:    {}", source);
    println!("Storage:   {}", storage_dir(args).display());
    println!("Verbosity: {}", args.verbosity().as_str());
    println!();

    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}
