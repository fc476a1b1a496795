use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

pub const JWT_SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary; assumes the debug profile
        let mut cmd = Command::new("target/debug/ghl-clio-bridge");
        cmd.env("BRIDGE_PORT", port.to_string())
            .env("BRIDGE_BIND_HOST", "127.0.0.1")
            .env("BRIDGE_JWT_SECRET", JWT_SECRET)
            .env("APP_ENV", "development")
            .env("DATABASE_RUN_MIGRATIONS", "false")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(format!("{}/ping", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Mint a dashboard token with the operator CLI, as an operator would
#[allow(dead_code)]
pub fn issue_token() -> Result<String> {
    let output = Command::new("target/debug/bridge")
        .args(["token", "issue", "--subject", "integration", "--hours", "1"])
        .env("BRIDGE_JWT_SECRET", JWT_SECRET)
        .env("APP_ENV", "development")
        .output()
        .context("failed to run bridge CLI")?;
    anyhow::ensure!(output.status.success(), "token issue failed: {:?}", output);
    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}
