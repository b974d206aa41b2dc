//! Configuration loaded from environment variables

use crate::ingestion::rules::CleanRules;
use anyhow::{Context, Result};
use sqlx::postgres::PgConnectOptions;
use std::env;
use std::path::PathBuf;

const DEFAULT_PG_PORT: u16 = 5432;

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    lookup(name).with_context(|| format!("{} must be set", name))
}

fn or_default(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    lookup(name).unwrap_or_else(|| default.to_string())
}

fn rules_from(lookup: &impl Fn(&str) -> Option<String>) -> Result<CleanRules> {
    match lookup("CLEAN_RULES_PATH") {
        Some(path) => CleanRules::from_json_file(&PathBuf::from(path)),
        None => Ok(CleanRules::default()),
    }
}

/// PostgreSQL connection parameters
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("PGPORT") {
            Some(port) => port
                .parse()
                .context("PGPORT must be a valid port number")?,
            None => DEFAULT_PG_PORT,
        };

        Ok(DatabaseConfig {
            host: required(&lookup, "PGHOST")?,
            port,
            dbname: required(&lookup, "PGDATABASE")?,
            user: required(&lookup, "PGUSER")?,
            password: required(&lookup, "PGPASSWORD")?,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.dbname)
            .username(&self.user)
            .password(&self.password)
    }
}

/// Cleaner job: input export, temp file and published output
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    pub input_path: PathBuf,
    pub temp_path: PathBuf,
    pub output_path: PathBuf,
    pub rules: CleanRules,
}

impl CleanerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(CleanerConfig {
            input_path: or_default(&lookup, "SALES_INPUT_PATH", "sale.csv").into(),
            temp_path: or_default(&lookup, "SALES_TEMP_PATH", "sales_temp.csv").into(),
            output_path: or_default(&lookup, "SALES_OUTPUT_PATH", "sales.csv").into(),
            rules: rules_from(&lookup)?,
        })
    }
}

/// Importer job: cleaned CSV and target database
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    pub csv_path: PathBuf,
    pub database: DatabaseConfig,
    pub rules: CleanRules,
}

impl ImporterConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(ImporterConfig {
            csv_path: or_default(&lookup, "SALES_CSV_PATH", "sales.csv").into(),
            database: DatabaseConfig::from_lookup(&lookup)?,
            rules: rules_from(&lookup)?,
        })
    }
}
