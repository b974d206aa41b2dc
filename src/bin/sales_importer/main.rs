//! Sales importer - bulk-loads the cleaned CSV into PostgreSQL

use dealer_sales_backend::ingestion::run_importer;
use dealer_sales_backend::ImporterConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting sales importer");

    // Load configuration from environment
    dotenvy::dotenv().ok();
    let config = match ImporterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("✗ Configuration error: {:#}", e);
            return;
        }
    };
    info!("Configuration loaded: {:?}", config.database);

    match run_importer(&config).await {
        Ok(stats) => info!("✓ Importer completed: {}", stats),
        Err(e) => error!("✗ Importer failed: {:#}", e),
    }
}
