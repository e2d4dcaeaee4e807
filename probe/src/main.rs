mod probe;

use anyhow::Result;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "probe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get server URL from environment or use default
    let server_url = env::var("SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());

    tracing::info!("Probing random song endpoint at {}", server_url);

    if let Err(e) = probe::run(&server_url).await {
        tracing::error!("Probe failed: {:#}", e);
        std::process::exit(1);
    }

    tracing::info!("All checks passed");
    Ok(())
}
