//! Parse functions - read CSV into a RecordTable, coerce it into typed rows

use crate::ingestion::error::LoadError;
use crate::ingestion::schema::{is_sale_column, SALE_COLUMNS};
use crate::ingestion::types::{
    CoercionReport, ColumnSpec, RecordTable, SqlType, SqlValue, TypedBatch, TypedRow,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::{info, warn};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
];

/// Load a CSV file with every cell as text.
///
/// Short rows are padded with nulls; rows longer than the header are
/// rejected. No value is interpreted here, not even empty strings.
pub fn load_dataset(path: &Path) -> Result<RecordTable, LoadError> {
    info!("Loading CSV from {:?}", path);

    let read_err = |source: csv::Error| LoadError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(LoadError::EmptyHeader(path.to_path_buf()));
    }

    let mut table = RecordTable::new(headers.iter().map(str::to_string).collect());
    let width = table.columns.len();

    for result in reader.records() {
        let record = result.map_err(read_err)?;

        if record.len() > width {
            return Err(LoadError::RowTooLong {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: width,
                found: record.len(),
            });
        }

        let mut row: Vec<Option<String>> = record.iter().map(|v| Some(v.to_string())).collect();
        row.resize(width, None);
        table.rows.push(row);
    }

    info!(
        "Loaded {} rows x {} columns from {:?}",
        table.len(),
        width,
        path
    );

    Ok(table)
}

/// Parse an integer cell. Integral decimals like "2019.0" are accepted;
/// anything else, including values outside INTEGER range, is `None`.
pub fn parse_integer(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i32>() {
        return Some(value);
    }

    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite()
        && value.fract() == 0.0
        && value >= f64::from(i32::MIN)
        && value <= f64::from(i32::MAX)
    {
        Some(value as i32)
    } else {
        None
    }
}

/// Parse a calendar date, dropping any time of day
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();

    // YYYYMMDD date keys
    if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let year = trimmed[0..4].parse().ok()?;
        let month = trimmed[4..6].parse().ok()?;
        let day = trimmed[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn coerce_value(
    spec: &ColumnSpec,
    raw: Option<&str>,
    row: usize,
    report: &mut CoercionReport,
) -> SqlValue {
    match spec.sql_type {
        SqlType::Integer => {
            let value = raw.and_then(|s| {
                let parsed = parse_integer(s);
                if parsed.is_none() {
                    report.record(spec.name, row, s);
                }
                parsed
            });
            SqlValue::Integer(value)
        }
        SqlType::Date => {
            let value = raw.and_then(|s| {
                let parsed = parse_date(s);
                if parsed.is_none() {
                    report.record(spec.name, row, s);
                }
                parsed
            });
            SqlValue::Date(value)
        }
        SqlType::Char(_) | SqlType::Varchar(_) => SqlValue::Text(raw.map(str::to_string)),
    }
}

/// Coerce a null-normalized table into rows in sales table column order.
///
/// Columns are matched by header name. Table columns missing from the CSV
/// are bound as null; CSV columns outside the layout are reported and left
/// out.
pub fn coerce_table(table: &RecordTable) -> TypedBatch {
    let positions: Vec<Option<usize>> = SALE_COLUMNS
        .iter()
        .map(|spec| table.column_index(spec.name))
        .collect();

    let unmapped_columns: Vec<String> = table
        .columns
        .iter()
        .filter(|c| !is_sale_column(c))
        .cloned()
        .collect();

    if !unmapped_columns.is_empty() {
        warn!(
            "Ignoring {} columns not in the sales table: {}",
            unmapped_columns.len(),
            unmapped_columns.join(", ")
        );
    }

    let mut report = CoercionReport::default();
    let mut rows = Vec::with_capacity(table.len());

    for (idx, row) in table.rows.iter().enumerate() {
        let values = SALE_COLUMNS
            .iter()
            .zip(&positions)
            .map(|(spec, pos)| {
                let raw = pos.and_then(|p| row.get(p)).and_then(|c| c.as_deref());
                coerce_value(spec, raw, idx, &mut report)
            })
            .collect();
        rows.push(TypedRow { values });
    }

    info!(
        "Coerced {} rows ({} invalid values set to NULL)",
        rows.len(),
        report.total()
    );

    TypedBatch {
        rows,
        report,
        unmapped_columns,
        degraded_stages: Vec::new(),
    }
}
