//! IXT CLI - Command-line interface
//!
//! Usage:
//!   ixt extract [--category <name>] <text>
//!   ixt classify <text>
//!   ixt rules
//!
//! Author: IXT Contributors

use anyhow::Context;
use clap::{Parser, Subcommand};
use ixt_core::AppConfig;
use ixt_extractor::Pipeline;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ixt")]
#[command(about = "Intent classification and entity extraction CLI")]
#[command(version)]
struct Cli {
    /// TOML configuration file (defaults to IXT_CONFIG, then environment only)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a request and extract its entities
    Extract {
        /// Request text
        text: String,
        /// Skip the classifier and extract as this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Print the predicted category only
    Classify {
        /// Request text
        text: String,
    },
    /// List the loaded extraction rules
    Rules,
}

/// Same shape as the HTTP response
#[derive(Serialize)]
struct Output<'a> {
    predicted_class: &'a str,
    entities: &'a ixt_core::EntityMapping,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::load()?,
    };

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "warn,ixt_cli={level},ixt_extractor={level}",
                level = config.logging.level
            ))
        }))
        .with_writer(std::io::stderr)
        .init();

    let pipeline = Pipeline::from_config(&config.models, &config.extraction)
        .context("failed to load models")?;
    tracing::debug!(
        classifier = pipeline.classifier_name(),
        recognizer = pipeline.extractor().recognizer_name(),
        rules = pipeline.extractor().rules().len(),
        "pipeline loaded"
    );

    match cli.command {
        Commands::Extract { text, category } => {
            let extraction = match category {
                Some(category) => pipeline.extract_as(&text, &category)?,
                None => pipeline.run(&text)?,
            };
            let output = Output {
                predicted_class: &extraction.category,
                entities: &extraction.entities,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Classify { text } => {
            println!("{}", pipeline.classify(&text)?);
        }
        Commands::Rules => {
            for rule in pipeline.extractor().rules().iter() {
                println!("{:<20} {:<18} {}", rule.scope(), rule.field(), rule.pattern());
            }
        }
    }

    Ok(())
}
