use crop_buddy::{api::start_server, config::Settings};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let settings = Settings::from_env()?;

    info!("🚀 Crop Buddy - API Server");
    info!("📍 Port: {}", settings.api_port);

    let engine = Arc::new(settings.build_engine()?);

    info!("✅ Dialogue engine initialized");
    info!("📡 Starting API server...");

    start_server(engine, settings.api_port).await?;

    Ok(())
}
