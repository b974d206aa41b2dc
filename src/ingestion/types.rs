//! Core data types for the cleaning and import pipelines
//! Pure data structures with minimal behavior

use crate::ingestion::error::TransformError;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

/// Literal token written for null cells, and read back as null
pub const NULL_TOKEN: &str = "NULL";

/// One row of a record table, one optional cell per header column
pub type Row = Vec<Option<String>>;

/// In-memory table for one CSV's worth of data.
///
/// `None` is the canonical null marker. Empty strings and missing-value
/// markers only survive until the null normalizer has run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RecordTable {
    pub fn new(columns: Vec<String>) -> Self {
        RecordTable {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with this name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell value by row number and column name, `None` for null or absent
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// Every row must carry exactly one cell per header column
    pub fn check_shape(&self) -> Result<(), TransformError> {
        let expected = self.columns.len();
        for (idx, row) in self.rows.iter().enumerate() {
            if row.len() != expected {
                return Err(TransformError::RaggedRow {
                    row: idx,
                    expected,
                    found: row.len(),
                });
            }
        }
        Ok(())
    }

    /// Resolve column names to positions, skipping names not in the header.
    /// A name that appears more than once cannot be targeted.
    pub fn resolve_columns(&self, names: &[String]) -> Result<Vec<usize>, TransformError> {
        let mut indices = Vec::new();
        for name in names {
            let mut matches = self
                .columns
                .iter()
                .enumerate()
                .filter(|(_, c)| *c == name)
                .map(|(i, _)| i);

            match (matches.next(), matches.next()) {
                (Some(idx), None) => indices.push(idx),
                (Some(_), Some(_)) => return Err(TransformError::AmbiguousColumn(name.clone())),
                (None, _) => {}
            }
        }
        Ok(indices)
    }

    /// Rewrite every non-null cell at `idx`. Null cells are left alone.
    pub fn map_cells<F>(&mut self, idx: usize, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        for row in &mut self.rows {
            if let Some(Some(value)) = row.get_mut(idx) {
                *value = f(value);
            }
        }
    }
}

/// A stage failure recorded instead of aborting the pipeline
#[derive(Debug)]
pub struct StageWarning {
    pub stage: &'static str,
    pub error: TransformError,
}

impl std::fmt::Display for StageWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.stage, self.error)
    }
}

/// Result of running one cleaning stage.
/// A degraded stage hands back its input unchanged along with the warning.
#[derive(Debug)]
pub enum StageOutcome {
    Applied(RecordTable),
    Degraded {
        table: RecordTable,
        warning: StageWarning,
    },
}

impl StageOutcome {
    pub fn table(&self) -> &RecordTable {
        match self {
            StageOutcome::Applied(table) => table,
            StageOutcome::Degraded { table, .. } => table,
        }
    }

    pub fn warning(&self) -> Option<&StageWarning> {
        match self {
            StageOutcome::Applied(_) => None,
            StageOutcome::Degraded { warning, .. } => Some(warning),
        }
    }

    pub fn into_parts(self) -> (RecordTable, Option<StageWarning>) {
        match self {
            StageOutcome::Applied(table) => (table, None),
            StageOutcome::Degraded { table, warning } => (table, Some(warning)),
        }
    }
}

/// Column types of the sales table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Char(u16),
    Varchar(u16),
    Date,
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlType::Integer => write!(f, "INTEGER"),
            SqlType::Char(n) => write!(f, "CHAR({})", n),
            SqlType::Varchar(n) => write!(f, "VARCHAR({})", n),
            SqlType::Date => write!(f, "DATE"),
        }
    }
}

/// One column of the fixed sales table layout
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub primary_key: bool,
}

/// A coerced cell, ready to bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Integer(Option<i32>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
}

/// Row in sales table column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedRow {
    pub values: Vec<SqlValue>,
}

/// Values that were present but failed coercion, per column
#[derive(Debug, Default, Clone)]
pub struct CoercionReport {
    pub invalid: BTreeMap<&'static str, usize>,
}

impl CoercionReport {
    const LOG_LIMIT: usize = 10;

    pub fn record(&mut self, column: &'static str, row: usize, raw: &str) {
        let total = self.total();
        if total < Self::LOG_LIMIT {
            // Only log first 10
            warn!("Row {}: could not coerce {} value {:?}, using NULL", row, column, raw);
        }
        *self.invalid.entry(column).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.invalid.values().sum()
    }

    pub fn count(&self, column: &str) -> usize {
        self.invalid.get(column).copied().unwrap_or(0)
    }
}

/// Typed rows plus what the coercer had to discard
#[derive(Debug, Default)]
pub struct TypedBatch {
    pub rows: Vec<TypedRow>,
    pub report: CoercionReport,
    pub unmapped_columns: Vec<String>,
    pub degraded_stages: Vec<&'static str>,
}

/// Cleaner run summary
#[derive(Debug, Default, Clone)]
pub struct CleanSummary {
    pub rows: usize,
    pub input_columns: usize,
    pub output_columns: usize,
    pub dropped_columns: Vec<String>,
    pub degraded_stages: Vec<&'static str>,
}

impl std::fmt::Display for CleanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rows: {}, columns: {} -> {}, dropped: [{}], degraded stages: [{}]",
            self.rows,
            self.input_columns,
            self.output_columns,
            self.dropped_columns.join(", "),
            self.degraded_stages.join(", ")
        )
    }
}

/// Write operation statistics
#[derive(Debug, Default, Clone)]
pub struct WriteStats {
    pub inserted: usize,
    pub statements: usize,
}

impl std::fmt::Display for WriteStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "inserted: {}, statements: {}",
            self.inserted, self.statements
        )
    }
}

/// Importer run summary
#[derive(Debug, Default, Clone)]
pub struct ImportStats {
    pub rows_read: usize,
    pub coerced_to_null: usize,
    pub degraded_stages: Vec<&'static str>,
    pub write: WriteStats,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "read: {}, coerced to NULL: {}, degraded stages: [{}], {}",
            self.rows_read,
            self.coerced_to_null,
            self.degraded_stages.join(", "),
            self.write
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Row>) -> RecordTable {
        RecordTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn test_check_shape_ragged_row() {
        let t = table(
            &["A", "B"],
            vec![
                vec![Some("1".to_string()), None],
                vec![Some("2".to_string())],
            ],
        );

        match t.check_shape() {
            Err(TransformError::RaggedRow { row, expected, found }) => {
                assert_eq!(row, 1);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("Expected RaggedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_columns_skips_absent() {
        let t = table(&["City", "State"], vec![]);
        let names = vec!["State".to_string(), "Missing".to_string()];

        assert_eq!(t.resolve_columns(&names).unwrap(), vec![1]);
    }

    #[test]
    fn test_resolve_columns_duplicate_header() {
        let t = table(&["City", "City"], vec![]);
        let names = vec!["City".to_string()];

        assert!(matches!(
            t.resolve_columns(&names),
            Err(TransformError::AmbiguousColumn(_))
        ));
    }

    #[test]
    fn test_map_cells_skips_nulls() {
        let mut t = table(
            &["A"],
            vec![vec![Some("x".to_string())], vec![None]],
        );
        t.map_cells(0, |v| v.to_uppercase());

        assert_eq!(t.get(0, "A"), Some("X"));
        assert_eq!(t.get(1, "A"), None);
    }

    #[test]
    fn test_coercion_report_counts() {
        let mut report = CoercionReport::default();
        report.record("SaleId", 0, "abc");
        report.record("SaleId", 3, "x1");
        report.record("DateKey", 4, "soon");

        assert_eq!(report.count("SaleId"), 2);
        assert_eq!(report.count("DateKey"), 1);
        assert_eq!(report.count("VehicleYear"), 0);
        assert_eq!(report.total(), 3);
    }
}
