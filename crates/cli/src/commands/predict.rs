//! Campaign prediction command

use anyhow::{Context, Result};
use clap::Args;
use predictor_lib::{CampaignRecord, PredictResponse, PredictionResult};
use std::path::PathBuf;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_probability, color_status, format_percent, print_json, OutputFormat};

/// Campaign to predict, from a JSON file or individual flags
#[derive(Debug, Args)]
pub struct PredictArgs {
    /// JSON file holding the full campaign record
    #[arg(long, short, conflicts_with_all = [
        "main_category", "currency", "goal", "pledged", "backers",
        "country", "pkr_pledged", "pkr_pledged_real", "pkr_goal_real",
    ])]
    pub file: Option<PathBuf>,

    /// Main category (e.g. Games)
    #[arg(long, required_unless_present = "file")]
    pub main_category: Option<String>,

    /// Currency code (e.g. USD)
    #[arg(long, required_unless_present = "file")]
    pub currency: Option<String>,

    /// Funding goal in campaign currency
    #[arg(long, required_unless_present = "file")]
    pub goal: Option<f64>,

    /// Amount pledged in campaign currency
    #[arg(long, required_unless_present = "file")]
    pub pledged: Option<f64>,

    /// Number of backers
    #[arg(long, required_unless_present = "file")]
    pub backers: Option<i64>,

    /// Country code (e.g. US)
    #[arg(long, required_unless_present = "file")]
    pub country: Option<String>,

    /// Pledged amount in PKR
    #[arg(long, required_unless_present = "file")]
    pub pkr_pledged: Option<f64>,

    /// Pledged amount in PKR at real exchange rates
    #[arg(long, required_unless_present = "file")]
    pub pkr_pledged_real: Option<f64>,

    /// Goal in PKR at real exchange rates
    #[arg(long, required_unless_present = "file")]
    pub pkr_goal_real: Option<f64>,
}

impl PredictArgs {
    /// Build the campaign record from the file or the flags
    pub fn into_record(self) -> Result<CampaignRecord> {
        if let Some(path) = &self.file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Invalid campaign record in {}", path.display()));
        }

        Ok(CampaignRecord {
            main_category: self.main_category.context("Missing --main-category")?,
            currency: self.currency.context("Missing --currency")?,
            goal: self.goal.context("Missing --goal")?,
            pledged: self.pledged.context("Missing --pledged")?,
            backers: self.backers.context("Missing --backers")?,
            country: self.country.context("Missing --country")?,
            pkr_pledged: self.pkr_pledged.context("Missing --pkr-pledged")?,
            pkr_pledged_real: self.pkr_pledged_real.context("Missing --pkr-pledged-real")?,
            pkr_goal_real: self.pkr_goal_real.context("Missing --pkr-goal-real")?,
        })
    }
}

/// Row for the prediction table
#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "Predicted State")]
    predicted_state: String,
    #[tabled(rename = "Code")]
    prediction_code: i64,
    #[tabled(rename = "Class 0")]
    class_0: String,
    #[tabled(rename = "Class 1")]
    class_1: String,
    #[tabled(rename = "Success Probability")]
    success_probability: String,
}

impl From<&PredictionResult> for PredictionRow {
    fn from(result: &PredictionResult) -> Self {
        Self {
            predicted_state: color_status(&result.predicted_state),
            prediction_code: result.prediction_code,
            class_0: format_percent(result.probabilities.class_0),
            class_1: format_percent(result.probabilities.class_1),
            success_probability: color_probability(result.success_probability),
        }
    }
}

/// Predict the outcome of a single campaign
pub async fn predict(client: &ApiClient, args: PredictArgs, format: OutputFormat) -> Result<()> {
    let record = args.into_record()?;
    let response: PredictResponse = client.post("/predict", &record).await?;

    if let OutputFormat::Json = format {
        print_json(&response)?;
    }

    let result = match response {
        PredictResponse::Prediction(result) => result,
        PredictResponse::Error(e) => anyhow::bail!("Prediction failed: {}", e.error),
    };

    if let OutputFormat::Table = format {
        let table = tabled::Table::new([PredictionRow::from(&result)])
            .with(tabled::settings::Style::rounded())
            .to_string();
        println!("{}", table);
    }

    Ok(())
}
