//! # clu-cli
//!
//! Command-line front end for the CLU recognizer: live recognition, offline
//! normalization of saved responses and configuration checks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clu::{normalize, CluApplication, CluOptions, CluRecognizer};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clu")]
#[command(about = "Recognize intents and entities with a CLU deployment", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Options file (YAML or JSON); defaults to CLU_* environment variables
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send an utterance to the deployment and print the normalized result
    Recognize {
        /// Utterance to analyze
        utterance: String,

        /// Utterance language (e.g. "en")
        #[arg(short, long)]
        language: Option<String>,

        /// Route an orchestration request to a single target project
        #[arg(long)]
        direct_target: Option<String>,

        /// Print the raw service response instead of the normalized result
        #[arg(long)]
        raw: bool,
    },

    /// Normalize a saved analyze-conversations response
    Normalize {
        /// Path to the JSON response
        file: PathBuf,

        /// Utterance the response was produced for
        #[arg(short, long, default_value = "")]
        text: String,
    },

    /// Check the configuration without calling the service
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output = match cli.command {
        Commands::Recognize {
            utterance,
            language,
            direct_target,
            raw,
        } => {
            let mut options = load_options(cli.config.as_deref())?;
            if let Some(language) = language {
                options = options.with_language(language);
            }
            if let Some(target) = direct_target {
                options = options.with_direct_target(target);
            }
            recognize(options, &utterance, raw).await?
        }
        Commands::Normalize { file, text } => normalize_file(&file, &text)?,
        Commands::Validate => validate(cli.config.as_deref())?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_options(config: Option<&Path>) -> Result<CluOptions> {
    match config {
        Some(path) => {
            debug!(path = %path.display(), "Loading options file");
            CluOptions::from_file(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))
        }
        None => {
            let application = CluApplication::from_env()
                .context("Failed to read CLU settings from the environment")?;
            Ok(CluOptions::new(application))
        }
    }
}

async fn recognize(options: CluOptions, utterance: &str, raw: bool) -> Result<Value> {
    let recognizer = CluRecognizer::new(options)?;
    if raw {
        return Ok(recognizer.analyze(utterance).await?);
    }
    let result = recognizer.recognize(utterance).await?;
    Ok(serde_json::to_value(result)?)
}

fn normalize_file(file: &Path, text: &str) -> Result<Value> {
    let body = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let raw: Value = serde_json::from_str(&body)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    let result = normalize(&raw, text)?;
    Ok(serde_json::to_value(result)?)
}

fn validate(config: Option<&Path>) -> Result<Value> {
    let options = load_options(config)?;
    let app = &options.application;
    Ok(json!({
        "valid": true,
        "projectName": app.project_name(),
        "deploymentName": app.deployment_name(),
        "endpoint": app.endpoint(),
        "apiVersion": options.api_version,
        "analyzeUrl": options.analyze_url(),
    }))
}
