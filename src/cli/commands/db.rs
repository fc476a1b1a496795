use clap::Subcommand;

use crate::cli::output::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Connect and run SELECT 1")]
    Check,

    #[command(about = "Apply pending schema migrations")]
    Migrate,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let result = match cmd {
        DbCommands::Check => DatabaseManager::health_check().await.map(|_| "Database connection OK"),
        DbCommands::Migrate => DatabaseManager::migrate().await.map(|_| "Migrations applied"),
    };
    DatabaseManager::close().await;

    match result {
        Ok(message) => output_success(&output_format, message, None),
        Err(e) => {
            output_error(&output_format, &e.to_string(), None)?;
            Err(e.into())
        }
    }
}
