//! Sales cleaner - normalizes the raw dealer export into the cleaned CSV

use dealer_sales_backend::ingestion::run_cleaner;
use dealer_sales_backend::CleanerConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting sales cleaner");

    // Load configuration from environment
    dotenvy::dotenv().ok();
    let config = match CleanerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("✗ Configuration error: {:#}", e);
            return;
        }
    };
    info!(
        "Configuration loaded: {:?} -> {:?}",
        config.input_path, config.output_path
    );

    match run_cleaner(&config) {
        Ok(summary) => info!("✓ Cleaner completed: {}", summary),
        Err(e) => error!("✗ Cleaner failed: {:#}", e),
    }
}
