//! Service health and model management commands

use anyhow::Result;
use predictor_lib::{HealthResponse, LoadResponse, ModelInfo};
use tabled::Tabled;

use crate::client::{ApiClient, InfoResponse};
use crate::output::{
    color_flag, color_status, print_info, print_json, print_success, print_warning, OutputFormat,
};

/// Row for the model info table
#[derive(Tabled)]
struct ArtifactRow {
    #[tabled(rename = "Artifact")]
    artifact: String,
    #[tabled(rename = "Loaded")]
    loaded: String,
}

/// Show service health
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: HealthResponse = client.get("/").await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            println!("Status:        {}", color_status(&health.status));
            println!("Message:       {}", health.message);
            println!("Models loaded: {}", color_flag(health.models_loaded));
        }
    }

    Ok(())
}

/// Ask the service to load its models now
pub async fn load_models(client: &ApiClient, format: OutputFormat) -> Result<()> {
    print_info("Loading models; the first load downloads every artifact");
    let load: LoadResponse = client.post("/load-models", &()).await?;

    if let OutputFormat::Json = format {
        print_json(&load)?;
    }

    if !load.is_success() {
        anyhow::bail!("Model loading failed: {}", load.message);
    }

    if let OutputFormat::Table = format {
        print_success(&load.message);
    }

    Ok(())
}

/// Show which artifacts are loaded
pub async fn show_info(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let response: InfoResponse = client.get("/model-info").await?;

    if let OutputFormat::Json = format {
        print_json(&response)?;
    }

    let info = match response {
        InfoResponse::Info(info) => info,
        InfoResponse::Error(e) => anyhow::bail!("{}", e.error),
    };

    if let OutputFormat::Table = format {
        print_info_table(&info);
    }

    Ok(())
}

fn print_info_table(info: &ModelInfo) {
    let rows = vec![
        ArtifactRow {
            artifact: "classifier".to_string(),
            loaded: color_flag(info.model_loaded),
        },
        ArtifactRow {
            artifact: "category encoder".to_string(),
            loaded: color_flag(info.encoders_loaded.category),
        },
        ArtifactRow {
            artifact: "country encoder".to_string(),
            loaded: color_flag(info.encoders_loaded.country),
        },
        ArtifactRow {
            artifact: "currency encoder".to_string(),
            loaded: color_flag(info.encoders_loaded.currency),
        },
        ArtifactRow {
            artifact: "state encoder".to_string(),
            loaded: color_flag(info.encoders_loaded.state),
        },
    ];

    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);

    match &info.expected_features {
        Some(features) => println!("\nExpected features: {}", features.join(", ")),
        None if !info.models_loaded_flag => {
            print_warning("Models are not loaded yet; run `fundify load` or send a prediction")
        }
        None => {}
    }
}
