//! Cleaning stages - pure record-table rewrites
//!
//! Every stage validates before it mutates, so an `Err` means the table is
//! exactly what the stage received. `run_stage` turns that into a
//! `StageOutcome` and the pipeline carries on.

use crate::ingestion::error::TransformError;
use crate::ingestion::rules::CleanRules;
use crate::ingestion::types::{RecordTable, StageOutcome, StageWarning};
use crate::ingestion::utils::{
    format_phone_number, strip_zero_extension, title_case, uppercase_directionals,
};
use tracing::{debug, info, warn};

pub type Stage = fn(&mut RecordTable, &CleanRules) -> Result<(), TransformError>;

/// Cleaning stages in execution order.
/// Directionals must follow case normalization, which lowercases them.
pub const CLEANING_STAGES: [(&str, Stage); 5] = [
    ("replace_missing_values", replace_missing_values),
    ("drop_columns", drop_columns),
    ("normalize_case", normalize_case),
    ("format_phone_numbers", format_phone_numbers),
    ("normalize_directionals", normalize_directionals),
];

/// Rewrite empty strings and missing-value markers to null
pub fn replace_missing_values(
    table: &mut RecordTable,
    rules: &CleanRules,
) -> Result<(), TransformError> {
    table.check_shape()?;

    let mut replaced = 0usize;
    for cell in table.rows.iter_mut().flat_map(|row| row.iter_mut()) {
        if cell.as_deref().is_some_and(|v| rules.is_missing(v)) {
            *cell = None;
            replaced += 1;
        }
    }

    debug!("Replaced {} missing values with NULL", replaced);
    Ok(())
}

/// Remove drop-list columns, keeping the order of the rest
pub fn drop_columns(table: &mut RecordTable, rules: &CleanRules) -> Result<(), TransformError> {
    table.check_shape()?;

    let keep: Vec<bool> = table
        .columns
        .iter()
        .map(|c| !rules.drop_columns.contains(c))
        .collect();

    if keep.iter().all(|k| *k) {
        return Ok(());
    }

    let columns = std::mem::take(&mut table.columns);
    table.columns = columns
        .into_iter()
        .zip(&keep)
        .filter_map(|(c, k)| k.then_some(c))
        .collect();

    for row in &mut table.rows {
        let cells = std::mem::take(row);
        *row = cells
            .into_iter()
            .zip(&keep)
            .filter_map(|(cell, k)| k.then_some(cell))
            .collect();
    }

    debug!("Dropped {} columns", keep.iter().filter(|k| !**k).count());
    Ok(())
}

/// Title-case name/address/descriptive columns, lowercase email
pub fn normalize_case(table: &mut RecordTable, rules: &CleanRules) -> Result<(), TransformError> {
    table.check_shape()?;
    let title = table.resolve_columns(&rules.title_case_columns)?;
    let lower = table.resolve_columns(&rules.lowercase_columns)?;

    for idx in title {
        table.map_cells(idx, title_case);
    }
    for idx in lower {
        table.map_cells(idx, str::to_lowercase);
    }

    Ok(())
}

/// Hyphenate "555 123-4567" numbers; strip " 0000" from business lines
pub fn format_phone_numbers(
    table: &mut RecordTable,
    rules: &CleanRules,
) -> Result<(), TransformError> {
    table.check_shape()?;
    let phones = table.resolve_columns(&rules.phone_columns)?;
    let with_zeros = table.resolve_columns(&rules.phone_columns_strip_zeros)?;

    for idx in phones {
        table.map_cells(idx, format_phone_number);
    }
    for idx in with_zeros {
        table.map_cells(idx, strip_zero_extension);
    }

    Ok(())
}

/// Uppercase Sw/Nw/Se/Ne in street addresses
pub fn normalize_directionals(
    table: &mut RecordTable,
    rules: &CleanRules,
) -> Result<(), TransformError> {
    table.check_shape()?;
    let columns = table.resolve_columns(&rules.directional_columns)?;

    for idx in columns {
        table.map_cells(idx, uppercase_directionals);
    }

    Ok(())
}

/// Null out values that the earlier stages turned into a missing-value
/// marker ("none" title-cased to "None", "NAN" lowercased to "nan").
/// Published as text they would read back as null anyway.
pub fn clear_marker_collisions(
    table: &mut RecordTable,
    rules: &CleanRules,
) -> Result<(), TransformError> {
    table.check_shape()?;

    let mut cleared: Vec<usize> = vec![0; table.columns.len()];
    for row in &mut table.rows {
        for (idx, cell) in row.iter_mut().enumerate() {
            if cell.as_deref().is_some_and(|v| rules.is_missing(v)) {
                *cell = None;
                cleared[idx] += 1;
            }
        }
    }

    for (column, count) in table.columns.iter().zip(cleared) {
        if count > 0 {
            warn!(
                "{} {} values became a missing-value marker after cleaning, set to NULL",
                count, column
            );
        }
    }

    Ok(())
}

/// Run one stage, keeping the input table if the stage fails
pub fn run_stage(
    name: &'static str,
    stage: Stage,
    mut table: RecordTable,
    rules: &CleanRules,
) -> StageOutcome {
    match stage(&mut table, rules) {
        Ok(()) => {
            debug!("Stage {} applied", name);
            StageOutcome::Applied(table)
        }
        Err(error) => {
            warn!("Stage {} failed, continuing with unchanged table: {}", name, error);
            StageOutcome::Degraded {
                table,
                warning: StageWarning { stage: name, error },
            }
        }
    }
}

/// Run all cleaning stages in sequence
pub fn clean_all(table: RecordTable, rules: &CleanRules) -> (RecordTable, Vec<StageWarning>) {
    info!("Cleaning {} records", table.len());

    let mut table = table;
    let mut warnings = Vec::new();

    for (name, stage) in CLEANING_STAGES {
        let (next, warning) = run_stage(name, stage, table, rules).into_parts();
        table = next;
        warnings.extend(warning);
    }

    let (next, warning) = run_stage(
        "clear_marker_collisions",
        clear_marker_collisions,
        table,
        rules,
    )
    .into_parts();
    table = next;
    warnings.extend(warning);

    info!(
        "Cleaning complete: {} records, {} degraded stages",
        table.len(),
        warnings.len()
    );

    (table, warnings)
}
