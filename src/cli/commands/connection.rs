use anyhow::anyhow;

use crate::cli::output::{output_error, output_success};
use crate::cli::{app_state, OutputFormat};
use crate::database::DatabaseManager;
use crate::types::Platform;

pub async fn handle(service: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let platform = Platform::parse_service(service).ok_or_else(|| anyhow!("Invalid service specified: {}", service))?;

    let state = app_state()?;
    let outcome = state.integration.test_connection(platform).await;
    DatabaseManager::close().await;

    match (outcome.success, outcome.message, outcome.error) {
        (true, Some(message), _) => output_success(&output_format, &message, None),
        (_, _, error) => {
            let message = error.unwrap_or_else(|| format!("Connection to {} failed", platform.display_name()));
            output_error(&output_format, &message, None)?;
            Err(anyhow!(message))
        }
    }
}
