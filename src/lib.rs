// Library module for the sales cleaner and importer jobs

pub mod config;
pub mod ingestion;

pub use config::{CleanerConfig, DatabaseConfig, ImporterConfig};
