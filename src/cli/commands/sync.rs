use anyhow::anyhow;
use clap::Args;
use serde_json::json;

use crate::cli::output::{output_error, output_success};
use crate::cli::{app_state, OutputFormat};
use crate::database::DatabaseManager;
use crate::services::SyncDirection;

#[derive(Args)]
pub struct SyncArgs {
    #[arg(long, default_value = "ghl_to_clio", help = "ghl_to_clio or clio_to_ghl")]
    pub direction: String,

    #[arg(long, default_value = "contact", help = "Entity type to sync")]
    pub entity: String,

    #[arg(long, help = "Single source record id; omit to sync the whole list")]
    pub id: Option<String>,
}

pub async fn handle(args: SyncArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let direction =
        SyncDirection::parse(&args.direction).ok_or_else(|| anyhow!("Invalid sync direction: {}", args.direction))?;

    let state = app_state()?;
    let outcome = state.integration.sync(direction, &args.entity, args.id.as_deref()).await;
    DatabaseManager::close().await;

    if outcome.success {
        let message = outcome.message.clone().unwrap_or_else(|| "Sync complete".to_string());
        output_success(&output_format, &message, Some(json!({ "outcome": outcome })))
    } else {
        let message = outcome.error.clone().unwrap_or_else(|| "Sync failed".to_string());
        output_error(&output_format, &message, Some(json!(outcome)))?;
        Err(anyhow!(message))
    }
}
