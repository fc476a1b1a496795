use ghl_clio_bridge::{config, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, GHL_API_KEY, etc.
    let _ = dotenvy::dotenv();
    server::init_tracing();

    server::serve(config::config().clone()).await
}
