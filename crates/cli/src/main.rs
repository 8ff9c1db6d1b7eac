//! Fundify CLI
//!
//! A command-line client for checking the prediction service, loading
//! its models and predicting campaign outcomes.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{models, predict};

/// Fundify CLI
#[derive(Parser)]
#[command(name = "fundify")]
#[command(author, version, about = "CLI for the Fundify ML Prediction API", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via FUNDIFY_API_URL env var)
    #[arg(long, env = "FUNDIFY_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the service is running
    Health,

    /// Load the classifier and encoders now
    Load,

    /// Show which models are loaded
    Info,

    /// Predict whether a campaign will succeed
    Predict(predict::PredictArgs),
}

async fn run(cli: Cli) -> Result<()> {
    let client = client::ApiClient::new(&cli.api_url)?;

    match cli.command {
        Commands::Health => models::show_health(&client, cli.format).await,
        Commands::Load => models::load_models(&client, cli.format).await,
        Commands::Info => models::show_info(&client, cli.format).await,
        Commands::Predict(args) => predict::predict(&client, args, cli.format).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
