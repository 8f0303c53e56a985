//! Service status: health, readiness and the resident model

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use serde_json::json;
use tabled::Tabled;

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Last Check")]
    last_check: String,
}

/// Show component health, readiness and model details
pub async fn show_status(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;
    let readiness = client.readiness().await?;
    let model = client.model_info().await?;

    if let OutputFormat::Json = format {
        return output::print_json(&json!({
            "health": health,
            "readiness": readiness,
            "model": model,
        }));
    }

    println!(
        "Service: {}  (up {}s)",
        output::color_status(health.status),
        health.uptime_seconds
    );
    if readiness.ready {
        output::print_success("Ready to serve");
    } else {
        output::print_warning(&format!(
            "Not ready: {}",
            readiness.reason.as_deref().unwrap_or("unknown")
        ));
    }

    let mut rows: Vec<ComponentRow> = health
        .components
        .into_iter()
        .map(|(name, component)| ComponentRow {
            name,
            status: output::color_status(component.status),
            message: component.message.unwrap_or_else(|| "-".to_string()),
            last_check: output::format_timestamp(component.last_check_timestamp),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    output::print_table(&rows);

    println!();
    println!("Model version:      {}", model.version);
    println!("Training samples:   {}", model.training_samples);
    println!(
        "Bad-risk threshold: {}",
        output::format_percent(model.decision_threshold)
    );
    println!("Trained at:         {}", output::format_timestamp(model.trained_at));
    println!("Features:           {}", model.features.join(", "));

    Ok(())
}
