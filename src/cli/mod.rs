pub mod commands;
pub mod output;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::database::PgStore;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "bridge")]
#[command(about = "Operator CLI for the GHL to Clio bridge")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve,

    #[command(about = "Database connectivity and migrations")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },

    #[command(about = "Inspect the transaction and error logs")]
    Logs {
        #[command(subcommand)]
        cmd: commands::logs::LogsCommands,
    },

    #[command(about = "Sync contacts between GHL and Clio")]
    Sync(commands::sync::SyncArgs),

    #[command(about = "Check credentials against a service (ghl or clio)")]
    TestConnection {
        #[arg(help = "Service to check: ghl or clio")]
        service: String,
    },

    #[command(about = "Dashboard API tokens")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Services wired to the configured database, as the server builds them
pub(crate) fn app_state() -> anyhow::Result<AppState> {
    AppState::new(config::config().clone(), Arc::new(PgStore::new())).context("failed to build HTTP client")
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve => crate::server::serve(config::config().clone()).await,
        Commands::Db { cmd } => commands::db::handle(cmd, output_format).await,
        Commands::Logs { cmd } => commands::logs::handle(cmd, output_format).await,
        Commands::Sync(args) => commands::sync::handle(args, output_format).await,
        Commands::TestConnection { service } => commands::connection::handle(&service, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, output_format),
    }
}
