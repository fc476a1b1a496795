use chrono::{Duration, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::cli::output::{output_success, print_fields};
use crate::cli::OutputFormat;
use crate::database::{DatabaseManager, PgStore, Store};

#[derive(Subcommand)]
pub enum LogsCommands {
    #[command(about = "Transactions and errors from the last N hours")]
    Recent {
        #[arg(long, default_value_t = 24, help = "Look-back window in hours")]
        hours: i64,

        #[arg(long, default_value_t = 20, help = "Maximum rows per list")]
        limit: i64,
    },
}

pub async fn handle(cmd: LogsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        LogsCommands::Recent { hours, limit } => {
            let since = Utc::now() - Duration::hours(hours);
            let store = PgStore::new();

            let transactions = store.recent_transactions(Some(since), limit).await?;
            let error_count = store.count_errors(Some(since)).await?;
            let errors = store.recent_errors(Some(since), limit).await?;
            DatabaseManager::close().await;

            let message = format!(
                "{} transactions and {} errors in the last {}h",
                transactions.len(),
                error_count,
                hours
            );
            if let OutputFormat::Json = output_format {
                return output_success(
                    &output_format,
                    &message,
                    Some(json!({
                        "transactions": transactions,
                        "error_count": error_count,
                        "errors": errors
                    })),
                );
            }

            output_success(&output_format, &message, None)?;
            for tx in &transactions {
                println!(
                    "{} {:>5} {} -> {} {} {} {}",
                    tx.created_at.format("%Y-%m-%d %H:%M:%S"),
                    tx.id,
                    tx.source,
                    tx.destination,
                    tx.request_method,
                    tx.request_url,
                    tx.response_status.map_or_else(|| "-".to_string(), |s| s.to_string()),
                );
            }
            if !errors.is_empty() {
                println!("Errors:");
            }
            for err in &errors {
                print_fields(&[
                    ("type", err.error_type.clone()),
                    ("message", err.error_message.clone()),
                    ("at", err.created_at.to_rfc3339()),
                ]);
            }
            Ok(())
        }
    }
}
