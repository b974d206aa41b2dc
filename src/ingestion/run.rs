//! Job entry points - cleaner and importer runs, independent of any binary

use crate::config::{CleanerConfig, ImporterConfig};
use crate::ingestion::clean::{clean_all, replace_missing_values, run_stage};
use crate::ingestion::parse::{coerce_table, load_dataset};
use crate::ingestion::save::save_dataset;
use crate::ingestion::schema::{integer_columns, DATE_COLUMN, SALE_COLUMNS};
use crate::ingestion::rules::CleanRules;
use crate::ingestion::types::{CleanSummary, ImportStats, RecordTable, TypedBatch};
use crate::ingestion::write::load_sales;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Load, clean and publish the sales export
pub fn run_cleaner(config: &CleanerConfig) -> Result<CleanSummary> {
    info!("=== Sales Cleaner ===");

    info!("Step 1/3: Loading data...");
    let table = load_dataset(&config.input_path)
        .with_context(|| format!("Failed to load {:?}", config.input_path))?;
    let input_columns = table.columns.clone();
    info!("✓ Loaded {} rows", table.len());

    info!("Step 2/3: Cleaning data...");
    let (table, warnings) = clean_all(table, &config.rules);
    info!("✓ Cleaned {} rows", table.len());

    info!("Step 3/3: Saving data...");
    save_dataset(&table, &config.temp_path, &config.output_path)?;
    info!("✓ Save complete");

    Ok(CleanSummary {
        rows: table.len(),
        input_columns: input_columns.len(),
        output_columns: table.columns.len(),
        dropped_columns: input_columns
            .into_iter()
            .filter(|c| !table.columns.contains(c))
            .collect(),
        degraded_stages: warnings.iter().map(|w| w.stage).collect(),
    })
}

/// Read the cleaned CSV and coerce it into typed rows
pub fn prepare_import(config: &ImporterConfig) -> Result<TypedBatch> {
    let table = load_dataset(&config.csv_path)
        .with_context(|| format!("Failed to load {:?}", config.csv_path))?;

    let batch = normalize_and_coerce(table, &config.rules);

    let integers: Vec<&str> = integer_columns().collect();
    debug!(
        "Coercing {} to INTEGER, {} to DATE",
        integers.join(", "),
        DATE_COLUMN
    );
    let layout: Vec<String> = SALE_COLUMNS
        .iter()
        .map(|c| format!("{} {}", c.name, c.sql_type))
        .collect();
    debug!("Column types: {}", layout.join(", "));
    for row in batch.rows.iter().take(5) {
        debug!("{:?}", row.values);
    }

    Ok(batch)
}

fn normalize_and_coerce(table: RecordTable, rules: &CleanRules) -> TypedBatch {
    let (table, warning) =
        run_stage("replace_missing_values", replace_missing_values, table, rules).into_parts();

    let mut batch = coerce_table(&table);
    batch.degraded_stages.extend(warning.map(|w| w.stage));
    batch
}

/// Load the cleaned CSV into the sales table
pub async fn run_importer(config: &ImporterConfig) -> Result<ImportStats> {
    info!("=== Sales Importer ===");

    info!("Step 1/2: Reading and coercing data...");
    let batch = prepare_import(config)?;
    info!("✓ Prepared {} rows", batch.rows.len());

    info!("Step 2/2: Writing to database...");
    let write = load_sales(&config.database, &batch.rows).await?;
    info!("✓ Write complete");

    Ok(ImportStats {
        rows_read: batch.rows.len(),
        coerced_to_null: batch.report.total(),
        degraded_stages: batch.degraded_stages,
        write,
    })
}
